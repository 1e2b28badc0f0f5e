/// Player service implementation
pub mod core;
/// Player error types
pub mod error;
/// Audio output seam and rodio backend
pub mod output;
/// Rodio-backed audio output
pub mod rodio;
/// Local cache and reactive mirrors of server playback state
pub mod store;
/// Versioned state reconciliation
pub mod sync;


pub use core::PlayerService;
pub use error::PlayerError;
pub use output::AudioOutput;
pub use rodio::RodioOutput;
pub use store::PlaybackStateStore;
pub use sync::{ReconcileOutcome, SyncController};
