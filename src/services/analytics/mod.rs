//! Listening analytics reporting.
//!
//! Wraps the analytics endpoints so playback control flow can emit
//! session/song events without ever failing on their account: every
//! reporting call logs transport errors and moves on. Aggregate queries
//! (`stats`, `reset`) propagate errors since their callers want the data.

/// Analytics reporting service
pub mod core;
/// Listened-duration bookkeeping for the current song
pub mod tracker;

pub use core::AnalyticsService;
pub use tracker::{FinishedSong, ListeningTracker};

#[cfg(test)]
mod tests;
