use tokio::sync::mpsc;

use super::CaptureError;

/// A camera frame in packed RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Packed RGB8 pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

/// Camera collaborator seam.
///
/// `grab` hands out each captured frame at most once; the sampler polls at
/// its own cadence and simply skips ticks with nothing new, so a slow
/// consumer never builds a frame backlog.
pub trait FrameSource: Send + Sync {
    /// Acquire the camera and start capturing.
    ///
    /// # Errors
    /// Returns error if no camera is available or the requested format
    /// cannot be negotiated.
    fn open(&self) -> Result<(), CaptureError>;

    /// Take the newest frame captured since the last call, if any.
    fn grab(&self) -> Option<RgbFrame>;

    /// Release the camera. Safe to call when not open.
    fn close(&self);
}

/// Microphone collaborator seam.
///
/// Fixed-size sample blocks flow into the given channel from the device
/// callback; a full channel drops the block rather than queueing.
pub trait AudioBlockSource: Send + Sync {
    /// Acquire the microphone and start delivering blocks.
    ///
    /// # Errors
    /// Returns error if no input device is available or the stream cannot
    /// be built.
    fn start(&self, blocks: mpsc::Sender<Vec<f32>>) -> Result<(), CaptureError>;

    /// Release the microphone. Safe to call when not started.
    fn stop(&self);
}
