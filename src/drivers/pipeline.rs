use std::collections::VecDeque;
use log::debug;
use crate::drivers::buffer::ChunkBuffer;
use crate::drivers::error::MonitorError;
use crate::drivers::fft::{FrequencySpectrum, SpectrumBuilder};
use crate::drivers::frame::PlotFrame;
use crate::drivers::source::{ChunkSource, SampleChunk, SourceWaker};
/// Length of the trailing window behind the band-power readout. One second
/// gives 1 Hz bins whatever the sample rate.
const SPECTRUM_SECONDS: usize = 1;
/// Most recent samples across chunks, sized from the capture rate.
struct SpectrumWindow {
    samples: VecDeque<i16>,
    sample_rate_hz: u32,
    builder: Option<SpectrumBuilder>,
}
impl SpectrumWindow {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            sample_rate_hz: 0,
            builder: None,
        }
    }
    fn push(&mut self, chunk: &SampleChunk) {
        if chunk.sample_rate_hz != self.sample_rate_hz || self.builder.is_none() {
            let size = (chunk.sample_rate_hz as usize * SPECTRUM_SECONDS).max(chunk.len());
            debug!("Spectrum window: {size} samples at {} Hz", chunk.sample_rate_hz);
            self.samples = VecDeque::with_capacity(size);
            self.sample_rate_hz = chunk.sample_rate_hz;
            self.builder = Some(SpectrumBuilder::with_size(size));
        }
        let size = self.builder.as_ref().map_or(0, SpectrumBuilder::fft_size);
        self.samples.extend(chunk.samples.iter().copied());
        let excess = self.samples.len().saturating_sub(size);
        self.samples.drain(..excess);
    }
    fn spectrum(&self) -> Option<FrequencySpectrum> {
        let builder = self.builder.as_ref()?;
        Some(builder.compute_samples(self.sample_rate_hz, self.samples.iter().copied()))
    }
    fn clear(&mut self) {
        self.samples.clear();
    }
}
/// Reads one chunk per call and turns it into a ready-to-plot frame.
pub struct MonitorPipeline<S: ChunkSource> {
    source: S,
    buffer: ChunkBuffer,
    voltage_scale: f64,
    window: SpectrumWindow,
}
impl<S: ChunkSource> MonitorPipeline<S> {
    pub fn new(source: S, chunk_size: usize, voltage_scale: f64) -> Result<Self, MonitorError> {
        Ok(Self {
            source,
            buffer: ChunkBuffer::new(chunk_size)?,
            voltage_scale,
            window: SpectrumWindow::new(),
        })
    }
    pub fn pump_once(&mut self) -> Result<PlotFrame, MonitorError> {
        let chunk = self.source.read_chunk()?;
        let chunk = self.buffer.replace(chunk)?;
        self.window.push(chunk);
        debug!("Pumped chunk #{}", self.buffer.chunks_seen());
        self.latest_frame()
    }
    pub fn latest_frame(&self) -> Result<PlotFrame, MonitorError> {
        let chunk = self
            .buffer
            .current()
            .ok_or(MonitorError::BufferUninitialized)?;
        let spectrum = self.latest_spectrum()?;
        Ok(PlotFrame::from_chunk(chunk, self.voltage_scale).with_spectrum(&spectrum))
    }
    /// Spectrum of the last second of samples, zero-padded until it fills.
    pub fn latest_spectrum(&self) -> Result<FrequencySpectrum, MonitorError> {
        if self.buffer.current().is_none() {
            return Err(MonitorError::BufferUninitialized);
        }
        self.window.spectrum().ok_or(MonitorError::BufferUninitialized)
    }
    pub fn waker(&self) -> Option<SourceWaker> {
        self.source.waker()
    }
    pub fn chunks_seen(&self) -> u64 {
        self.buffer.chunks_seen()
    }
    pub fn start(&mut self) -> Result<(), MonitorError> {
        self.source.start()
    }
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        self.buffer.clear();
        self.window.clear();
        self.source.stop()
    }
}
