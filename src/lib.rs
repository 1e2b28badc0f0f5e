//! Attune - Native client for an attention-adaptive music server.
//!
//! The server owns playback state (playlist, current track, transport flags,
//! a monotonically increasing `state_version`) behind an HTTP JSON API and
//! streams inference results over a persistent WebSocket. Attune mirrors that
//! state locally and keeps a real audio engine in sync with it:
//!
//! - Versioned state reconciliation driving a local audio engine
//! - Camera/microphone capture streamed to the server's analyzers
//! - Last-write-wins rendering of video/audio/fusion inference results
//! - Attention-driven volume, music-style and UI-intensity adaptation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use attune::config::AttuneConfig;
//! use attune::service_manager::Services;
//! use attune::services::attention::NullSurface;
//! use attune::services::inference::NullOverlay;
//!
//! # async fn run() -> Result<(), attune::AttuneError> {
//! let config = AttuneConfig::default();
//! let services = Services::new(&config, Arc::new(NullSurface), Arc::new(NullOverlay))?;
//! services.start().await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Simple service instance manager.
pub mod service_manager;

/// Reactive services talking to the music server.
pub mod services;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{AttuneError, Result};
