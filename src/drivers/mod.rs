// src/drivers/mod.rs
pub mod audio;
pub mod bands;
pub mod buffer;
pub mod error;
pub mod fft;
pub mod frame;
pub mod pipeline;
pub mod plot;
pub mod source;
pub use audio::{input_device_names, AudioSource};
pub use bands::EegBand;
pub use buffer::ChunkBuffer;
pub use error::MonitorError;
pub use fft::{FrequencySpectrum, SpectrumBuilder};
pub use frame::{BandFill, PlotFrame};
pub use pipeline::MonitorPipeline;
pub use plot::{default_export_path, render_frame_png, save_frame_png, PlotStyle};
pub use source::{ChunkSource, ManualSource, SampleChunk, SimulatedSource, SourceWaker};
