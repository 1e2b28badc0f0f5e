use thiserror::Error;

/// Errors from media capture.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Camera could not be opened or read.
    #[error("camera unavailable: {0}")]
    Camera(String),

    /// Microphone could not be opened or started.
    #[error("microphone unavailable: {0}")]
    Microphone(String),

    /// A captured frame could not be encoded.
    #[error("frame encoding failed: {0}")]
    Encode(String),
}
