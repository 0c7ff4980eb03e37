//! Live capture from a cpal input device.
//!
//! The cpal callback only appends samples to a shared queue; `read_chunk`
//! blocks on a condvar until a whole chunk is queued, which keeps the
//! blocking-read shape of one chunk per tick.
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{debug, error, info, warn};
use crate::config::MonitorConfig;
use crate::drivers::{ChunkSource, MonitorError, SampleChunk, SourceWaker};
/// Queued chunks kept before the oldest samples are dropped.
const QUEUE_CHUNKS: usize = 8;
#[derive(Default)]
struct CaptureQueue {
    samples: VecDeque<i16>,
    error: Option<String>,
    dropped: usize,
    closing: bool,
}
type SharedQueue = Arc<(Mutex<CaptureQueue>, Condvar)>;
pub struct AudioSource {
    stream: Stream,
    queue: SharedQueue,
    device_name: String,
    sample_rate_hz: u32,
    chunk_size: usize,
    read_timeout: Duration,
}
impl AudioSource {
    /// Open the configured input device and start capturing.
    pub fn open(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let host = cpal::default_host();
        let device = select_device(&host, config.device_name.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
        let (stream_config, sample_format) = pick_stream_config(&device, config)?;
        info!(
            "Using input device {:?}: {} Hz, {} channel(s), {:?}",
            device_name, stream_config.sample_rate.0, stream_config.channels, sample_format
        );
        if stream_config.sample_rate.0 != config.sample_rate_hz {
            warn!(
                "Device does not support {} Hz, capturing at {} Hz instead",
                config.sample_rate_hz, stream_config.sample_rate.0
            );
        }
        let queue: SharedQueue = Arc::new((Mutex::new(CaptureQueue::default()), Condvar::new()));
        let capacity = config.chunk_size * QUEUE_CHUNKS;
        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &queue, capacity)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &queue, capacity)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &queue, capacity)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &queue, capacity)?,
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, &queue, capacity)?,
            other => {
                return Err(MonitorError::UnsupportedConfig(format!(
                    "sample format {other:?}"
                )))
            }
        };
        stream.play()?;
        Ok(Self {
            stream,
            queue,
            device_name,
            sample_rate_hz: stream_config.sample_rate.0,
            chunk_size: config.chunk_size,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        })
    }
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
    fn clear_queue(&self) -> Result<(), MonitorError> {
        let mut queue = lock_queue(&self.queue)?;
        queue.samples.clear();
        queue.error = None;
        Ok(())
    }
}
impl ChunkSource for AudioSource {
    fn read_chunk(&mut self) -> Result<SampleChunk, MonitorError> {
        let samples = wait_for_chunk(&self.queue, self.chunk_size, self.read_timeout)?;
        Ok(SampleChunk::new(self.sample_rate_hz, samples))
    }
    fn waker(&self) -> Option<SourceWaker> {
        let queue = self.queue.clone();
        Some(SourceWaker::new(move || {
            let (lock, cvar) = &*queue;
            if let Ok(mut q) = lock.lock() {
                q.closing = true;
            }
            cvar.notify_all();
        }))
    }
    fn start(&mut self) -> Result<(), MonitorError> {
        self.clear_queue()?;
        self.stream.play()?;
        Ok(())
    }
    fn stop(&mut self) -> Result<(), MonitorError> {
        self.stream.pause()?;
        self.clear_queue()
    }
}
impl Drop for AudioSource {
    fn drop(&mut self) {
        info!("Releasing input device {:?}", self.device_name);
    }
}
/// Block until `chunk_size` samples are queued, the stream reports an
/// error, the queue is closed, or `timeout` passes.
fn wait_for_chunk(
    queue: &SharedQueue,
    chunk_size: usize,
    timeout: Duration,
) -> Result<Vec<i16>, MonitorError> {
    let (lock, cvar) = &**queue;
    let started = Instant::now();
    let guard = lock
        .lock()
        .map_err(|_| MonitorError::Stream("capture queue lock poisoned".into()))?;
    let (mut queue, _) = cvar
        .wait_timeout_while(guard, timeout, |q| {
            q.samples.len() < chunk_size && q.error.is_none() && !q.closing
        })
        .map_err(|_| MonitorError::Stream("capture queue lock poisoned".into()))?;
    if queue.closing {
        return Err(MonitorError::Interrupted);
    }
    if let Some(err) = queue.error.take() {
        return Err(MonitorError::Stream(err));
    }
    if queue.samples.len() < chunk_size {
        return Err(MonitorError::ReadTimeout {
            wanted: chunk_size,
            waited_ms: started.elapsed().as_millis() as u64,
        });
    }
    if queue.dropped > 0 {
        warn!("Input overflowed, dropped {} samples", queue.dropped);
        queue.dropped = 0;
    }
    let samples: Vec<i16> = queue.samples.drain(..chunk_size).collect();
    debug!("Read {} samples, {} still queued", samples.len(), queue.samples.len());
    Ok(samples)
}
/// Names of all input devices on the default host.
pub fn input_device_names() -> Result<Vec<String>, MonitorError> {
    let host = cpal::default_host();
    Ok(host
        .input_devices()?
        .map(|d| d.name().unwrap_or_else(|_| "Unknown Device".to_string()))
        .collect())
}
fn select_device(host: &cpal::Host, wanted: Option<&str>) -> Result<Device, MonitorError> {
    let Some(wanted) = wanted else {
        return host.default_input_device().ok_or(MonitorError::NoInputDevice);
    };
    let needle = wanted.to_lowercase();
    host.input_devices()?
        .find(|d| {
            d.name()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .ok_or_else(|| MonitorError::DeviceNotFound(wanted.to_string()))
}
/// Prefer a supported range covering the requested rate, with the requested
/// channel count and i16 samples; otherwise fall back to the device default.
fn pick_stream_config(
    device: &Device,
    config: &MonitorConfig,
) -> Result<(StreamConfig, SampleFormat), MonitorError> {
    let rate = cpal::SampleRate(config.sample_rate_hz);
    let best = device
        .supported_input_configs()?
        .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .max_by_key(|range| {
            (
                range.channels() == config.channels,
                range.sample_format() == SampleFormat::I16,
            )
        });
    let supported = match best {
        Some(range) => range.with_sample_rate(rate),
        None => device.default_input_config()?,
    };
    let sample_format = supported.sample_format();
    Ok((supported.config(), sample_format))
}
fn lock_queue(queue: &SharedQueue) -> Result<std::sync::MutexGuard<'_, CaptureQueue>, MonitorError> {
    queue
        .0
        .lock()
        .map_err(|_| MonitorError::Stream("capture queue lock poisoned".into()))
}
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    queue: &SharedQueue,
    capacity: usize,
) -> Result<Stream, MonitorError>
where
    T: SizedSample + Send + 'static,
    i16: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let data_queue = queue.clone();
    let error_queue = queue.clone();
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let (lock, cvar) = &*data_queue;
            if let Ok(mut q) = lock.lock() {
                push_first_channel(&mut q, data, channels, capacity);
                cvar.notify_all();
            }
        },
        move |err| {
            error!("Input stream error: {err}");
            let (lock, cvar) = &*error_queue;
            if let Ok(mut q) = lock.lock() {
                q.error = Some(err.to_string());
                cvar.notify_all();
            }
        },
        None,
    )?;
    Ok(stream)
}
fn push_first_channel<T>(queue: &mut CaptureQueue, data: &[T], channels: usize, capacity: usize)
where
    T: Sample,
    i16: FromSample<T>,
{
    for frame in data.chunks(channels) {
        queue.samples.push_back(i16::from_sample(frame[0]));
    }
    let excess = queue.samples.len().saturating_sub(capacity);
    if excess > 0 {
        queue.samples.drain(..excess);
        queue.dropped += excess;
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn keeps_first_channel_of_interleaved_frames() {
        let mut queue = CaptureQueue::default();
        push_first_channel(&mut queue, &[1i16, 100, 2, 200, 3, 300], 2, 16);
        assert_eq!(queue.samples, VecDeque::from(vec![1, 2, 3]));
    }
    #[test]
    fn converts_float_samples_to_i16() {
        let mut queue = CaptureQueue::default();
        push_first_channel(&mut queue, &[0.0f32, 0.5, -1.0], 1, 16);
        assert_eq!(queue.samples[0], 0);
        assert_eq!(queue.samples[1], 16384);
        assert_eq!(queue.samples[2], i16::MIN);
    }
    #[test]
    fn overflow_drops_oldest_samples() {
        let mut queue = CaptureQueue::default();
        let data: Vec<i16> = (0..10).collect();
        push_first_channel(&mut queue, &data, 1, 4);
        assert_eq!(queue.samples, VecDeque::from(vec![6, 7, 8, 9]));
        assert_eq!(queue.dropped, 6);
    }
    fn shared(queue: CaptureQueue) -> SharedQueue {
        Arc::new((Mutex::new(queue), Condvar::new()))
    }
    #[test]
    fn empty_queue_times_out() {
        let queue = shared(CaptureQueue::default());
        match wait_for_chunk(&queue, 4, Duration::from_millis(20)) {
            Err(MonitorError::ReadTimeout { wanted, waited_ms }) => {
                assert_eq!(wanted, 4);
                assert!(waited_ms >= 20);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
    #[test]
    fn stream_error_is_returned_once() {
        let queue = shared(CaptureQueue {
            error: Some("device unplugged".into()),
            ..CaptureQueue::default()
        });
        match wait_for_chunk(&queue, 4, Duration::from_millis(20)) {
            Err(MonitorError::Stream(msg)) => assert_eq!(msg, "device unplugged"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(queue.0.lock().unwrap().error.is_none());
        assert!(matches!(
            wait_for_chunk(&queue, 4, Duration::from_millis(10)),
            Err(MonitorError::ReadTimeout { .. })
        ));
    }
    #[test]
    fn producer_thread_unblocks_reader() {
        let queue = shared(CaptureQueue::default());
        let producer_queue = queue.clone();
        let producer = std::thread::spawn(move || {
            for _ in 0..3 {
                std::thread::sleep(Duration::from_millis(10));
                let (lock, cvar) = &*producer_queue;
                let mut q = lock.lock().unwrap();
                push_first_channel(&mut q, &[5i16, 6, 7], 1, 64);
                cvar.notify_all();
            }
        });
        let samples = wait_for_chunk(&queue, 8, Duration::from_secs(5)).unwrap();
        producer.join().unwrap();
        assert_eq!(samples, vec![5, 6, 7, 5, 6, 7, 5, 6]);
        assert_eq!(queue.0.lock().unwrap().samples.len(), 1);
    }
    #[test]
    fn overflow_counter_resets_after_read() {
        let queue = shared(CaptureQueue::default());
        {
            let mut q = queue.0.lock().unwrap();
            let data: Vec<i16> = (0..10).collect();
            push_first_channel(&mut q, &data, 1, 4);
        }
        let samples = wait_for_chunk(&queue, 4, Duration::from_millis(10)).unwrap();
        assert_eq!(samples, vec![6, 7, 8, 9]);
        assert_eq!(queue.0.lock().unwrap().dropped, 0);
    }
    #[test]
    fn closing_wakes_a_blocked_reader() {
        let queue = shared(CaptureQueue::default());
        let closer_queue = queue.clone();
        let waker = SourceWaker::new(move || {
            let (lock, cvar) = &*closer_queue;
            lock.lock().unwrap().closing = true;
            cvar.notify_all();
        });
        let closer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            waker.wake();
        });
        let started = Instant::now();
        let result = wait_for_chunk(&queue, 4, Duration::from_secs(10));
        closer.join().unwrap();
        assert!(matches!(result, Err(MonitorError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
