//! Camera and microphone capture streamed to the inference pipeline.
//!
//! Acquires both devices as one all-or-nothing request, samples frames at
//! a bounded cadence well below the hardware rate, encodes everything for
//! the socket (JPEG data URLs, base64 sample blocks) and stays lossy end
//! to end: a busy encoder or a full outbound channel drops the sample
//! instead of building backlog.

/// Camera source backed by nokhwa
pub mod camera;
/// Capture engine lifecycle and sampling tasks
pub mod core;
/// Frame and sample encoding
pub mod encode;
/// Capture error types
pub mod error;
/// Microphone source backed by cpal
pub mod mic;
/// Hardware collaborator seams
pub mod source;

#[cfg(test)]
mod tests;

pub use camera::CameraSource;
pub use core::CaptureEngine;
pub use error::CaptureError;
pub use mic::MicSource;
pub use source::{AudioBlockSource, FrameSource, RgbFrame};
