//! Attention-adaptive playback control.
//!
//! Polls the server's attention state and translates it into playback
//! adaptations: smooth volume fades, music-style treatments, and UI
//! intensity levels. User input always wins over an in-progress
//! adaptation, and fade-induced control movement is never reported back
//! as a user interaction.

/// Adaptation engine and interaction tracking
pub mod core;
/// Attention service errors
pub mod error;
/// Volume fade controller
mod fade;
/// UI surface collaborator seam
pub mod surface;

pub use core::AdaptationEngine;
pub use error::AttentionError;
pub use surface::{ControlSurface, NullSurface};

#[cfg(test)]
mod tests;
