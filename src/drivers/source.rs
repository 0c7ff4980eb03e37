use std::collections::VecDeque;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::drivers::MonitorError;
/// One block of mono 16-bit samples, as read per tick.
#[derive(Clone, Debug)]
pub struct SampleChunk {
    pub captured_at: SystemTime,
    pub sample_rate_hz: u32,
    pub samples: Vec<i16>,
}
impl SampleChunk {
    pub fn new(sample_rate_hz: u32, samples: Vec<i16>) -> Self {
        Self {
            captured_at: SystemTime::now(),
            sample_rate_hz,
            samples,
        }
    }
    pub fn validate(&self, chunk_size: usize) -> Result<(), MonitorError> {
        if self.sample_rate_hz == 0 {
            return Err(MonitorError::InvalidConfig(
                "sample rate must be greater than zero".into(),
            ));
        }
        if self.samples.len() != chunk_size {
            return Err(MonitorError::ChunkLength {
                expected: chunk_size,
                actual: self.samples.len(),
            });
        }
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate_hz.max(1) as f64)
    }
}
/// Cancels a blocked `read_chunk` from another thread.
#[derive(Clone)]
pub struct SourceWaker(Arc<dyn Fn() + Send + Sync>);
impl SourceWaker {
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(wake))
    }
    pub fn wake(&self) {
        (self.0)()
    }
}
impl std::fmt::Debug for SourceWaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceWaker")
    }
}
/// Something that hands out fixed-size chunks, blocking until one is ready.
pub trait ChunkSource {
    fn read_chunk(&mut self) -> Result<SampleChunk, MonitorError>;
    /// Sources whose reads can block for long return a way to interrupt them.
    fn waker(&self) -> Option<SourceWaker> {
        None
    }
    fn start(&mut self) -> Result<(), MonitorError> {
        Ok(())
    }
    fn stop(&mut self) -> Result<(), MonitorError> {
        Ok(())
    }
}
impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    fn read_chunk(&mut self) -> Result<SampleChunk, MonitorError> {
        (**self).read_chunk()
    }
    fn waker(&self) -> Option<SourceWaker> {
        (**self).waker()
    }
    fn start(&mut self) -> Result<(), MonitorError> {
        (**self).start()
    }
    fn stop(&mut self) -> Result<(), MonitorError> {
        (**self).stop()
    }
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<SampleChunk>,
}
impl ManualSource {
    pub fn new(chunks: impl IntoIterator<Item = SampleChunk>) -> Self {
        Self {
            queue: chunks.into_iter().collect(),
        }
    }
}
impl ChunkSource for ManualSource {
    fn read_chunk(&mut self) -> Result<SampleChunk, MonitorError> {
        self.queue.pop_front().ok_or(MonitorError::SourceExhausted)
    }
}
/// Synthetic signal for running without an input device.
///
/// Mixes one sine per EEG band plus uniform noise and paces itself so a chunk
/// takes as long to arrive as it would from a real device.
pub struct SimulatedSource {
    sample_rate_hz: u32,
    chunk_size: usize,
    sample_index: u64,
    rng: StdRng,
    next_due: Option<Instant>,
    paced: bool,
}
const SIM_TONES: [(f64, f64); 5] = [(2.0, 6000.0), (5.5, 3500.0), (10.0, 4000.0), (20.0, 2000.0), (40.0, 1200.0)];
const SIM_NOISE: f64 = 800.0;
/// Every tone completes whole cycles in this many seconds, so the sample
/// index can wrap here without a phase jump.
const SIM_PERIOD_SECS: u64 = 2;
fn tone_value(sample_index: u64, sample_rate_hz: u32) -> f64 {
    let t = sample_index as f64 / sample_rate_hz as f64;
    SIM_TONES
        .iter()
        .map(|(freq_hz, amp)| (2.0 * PI * freq_hz * t).sin() * amp)
        .sum()
}
impl SimulatedSource {
    pub fn new(sample_rate_hz: u32, chunk_size: usize) -> Self {
        Self {
            sample_rate_hz,
            chunk_size,
            sample_index: 0,
            rng: StdRng::from_entropy(),
            next_due: None,
            paced: true,
        }
    }
    /// Fixed seed and no real-time pacing.
    pub fn deterministic(sample_rate_hz: u32, chunk_size: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            paced: false,
            ..Self::new(sample_rate_hz, chunk_size)
        }
    }
    fn next_sample(&mut self) -> i16 {
        let period = SIM_PERIOD_SECS * self.sample_rate_hz as u64;
        let mut value = tone_value(self.sample_index, self.sample_rate_hz);
        self.sample_index = (self.sample_index + 1) % period.max(1);
        value += self.rng.gen_range(-SIM_NOISE..SIM_NOISE);
        value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
    fn wait_until_due(&mut self) {
        let chunk_time =
            Duration::from_secs_f64(self.chunk_size as f64 / self.sample_rate_hz as f64);
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        // Do not try to catch up after a long pause.
        self.next_due = Some(due.max(now) + chunk_time);
    }
}
impl ChunkSource for SimulatedSource {
    fn read_chunk(&mut self) -> Result<SampleChunk, MonitorError> {
        if self.paced {
            self.wait_until_due();
        }
        let samples = (0..self.chunk_size).map(|_| self.next_sample()).collect();
        Ok(SampleChunk::new(self.sample_rate_hz, samples))
    }
    fn start(&mut self) -> Result<(), MonitorError> {
        self.next_due = None;
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn manual_source_yields_in_order_then_exhausts() {
        let mut source = ManualSource::new(vec![
            SampleChunk::new(100, vec![1, 2]),
            SampleChunk::new(100, vec![3, 4]),
        ]);
        assert_eq!(source.read_chunk().unwrap().samples, vec![1, 2]);
        assert_eq!(source.read_chunk().unwrap().samples, vec![3, 4]);
        assert!(matches!(
            source.read_chunk(),
            Err(MonitorError::SourceExhausted)
        ));
    }
    #[test]
    fn chunk_validation_checks_length() {
        let chunk = SampleChunk::new(50_000, vec![0; 999]);
        match chunk.validate(1000) {
            Err(MonitorError::ChunkLength { expected, actual }) => {
                assert_eq!(expected, 1000);
                assert_eq!(actual, 999);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(SampleChunk::new(50_000, vec![0; 1000]).validate(1000).is_ok());
        assert!(SampleChunk::new(0, vec![0; 4]).validate(4).is_err());
    }
    #[test]
    fn chunk_duration_follows_sample_rate() {
        let chunk = SampleChunk::new(50_000, vec![0; 1000]);
        assert_eq!(chunk.duration(), Duration::from_millis(20));
    }
    #[test]
    fn simulated_source_produces_full_chunks() {
        let mut source = SimulatedSource::deterministic(1000, 256, 7);
        for _ in 0..3 {
            let chunk = source.read_chunk().unwrap();
            assert!(chunk.validate(256).is_ok());
            assert!(chunk.samples.iter().any(|&s| s != 0));
        }
    }
    #[test]
    fn simulated_source_with_same_seed_repeats() {
        let mut a = SimulatedSource::deterministic(1000, 64, 42);
        let mut b = SimulatedSource::deterministic(1000, 64, 42);
        assert_eq!(a.read_chunk().unwrap().samples, b.read_chunk().unwrap().samples);
    }
    #[test]
    fn tone_phase_survives_long_runs() {
        let rate = 50_000;
        // Past 2^24 samples an f32 time axis can no longer tell these apart.
        let late = 1u64 << 25;
        assert_ne!(tone_value(late, rate), tone_value(late + 1, rate));
        let period = SIM_PERIOD_SECS * rate as u64;
        for i in [0, 1, 777, 49_999] {
            assert!((tone_value(i, rate) - tone_value(i + period, rate)).abs() < 1e-6);
        }
    }
    #[test]
    fn sample_index_wraps_at_the_tone_period() {
        let mut source = SimulatedSource::deterministic(100, 150, 1);
        source.read_chunk().unwrap();
        source.read_chunk().unwrap();
        assert_eq!(source.sample_index, 300 % (SIM_PERIOD_SECS * 100));
    }
}
