use thiserror::Error;
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no audio input device available")]
    NoInputDevice,
    #[error("no input device matches {0:?}")]
    DeviceNotFound(String),
    #[error("input device has no usable stream configuration: {0}")]
    UnsupportedConfig(String),
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("failed to pause input stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),
    #[error("input stream reported an error: {0}")]
    Stream(String),
    #[error("timed out after {waited_ms} ms waiting for {wanted} samples")]
    ReadTimeout { wanted: usize, waited_ms: u64 },
    #[error("chunk length mismatch: expected {expected}, got {actual}")]
    ChunkLength { expected: usize, actual: usize },
    #[error("buffer not initialized yet; read at least one chunk first")]
    BufferUninitialized,
    #[error("read interrupted by shutdown")]
    Interrupted,
    #[error("source exhausted")]
    SourceExhausted,
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}
impl From<cpal::DevicesError> for MonitorError {
    fn from(value: cpal::DevicesError) -> Self {
        MonitorError::UnsupportedConfig(value.to_string())
    }
}
impl From<cpal::SupportedStreamConfigsError> for MonitorError {
    fn from(value: cpal::SupportedStreamConfigsError) -> Self {
        MonitorError::UnsupportedConfig(value.to_string())
    }
}
impl From<cpal::DefaultStreamConfigError> for MonitorError {
    fn from(value: cpal::DefaultStreamConfigError) -> Self {
        MonitorError::UnsupportedConfig(value.to_string())
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for MonitorError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        MonitorError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for MonitorError {
    fn from(value: image::ImageError) -> Self {
        MonitorError::Plot(value.to_string())
    }
}
