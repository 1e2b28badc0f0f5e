use serde::{Deserialize, Serialize};

/// Camera and microphone capture configuration.
///
/// Defaults match what the server-side analyzers expect: 640x480 JPEG
/// frames at no more than 10 per second and 16 kHz mono audio in
/// 4096-sample blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Requested camera frame width in pixels.
    pub frame_width: u32,

    /// Requested camera frame height in pixels.
    pub frame_height: u32,

    /// Frame rate requested from the camera hardware.
    pub camera_fps: u32,

    /// Ceiling on frames emitted to the server per second.
    pub emit_fps: u32,

    /// Microphone sample rate in Hz.
    pub sample_rate: u32,

    /// Samples per emitted audio block.
    pub block_size: usize,

    /// JPEG quality (1-100) for emitted frames.
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            camera_fps: 15,
            emit_fps: 10,
            sample_rate: 16_000,
            block_size: 4096,
            jpeg_quality: 80,
        }
    }
}
