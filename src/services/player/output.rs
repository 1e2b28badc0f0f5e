use std::time::Duration;

use tokio::sync::broadcast;

use super::PlayerError;

/// Seam over the local audio engine.
///
/// The sync controller and the adaptation engine drive playback through
/// this trait only; the production implementation is [`super::RodioOutput`],
/// tests substitute an in-memory recorder. All methods are synchronous
/// commands against an engine that does its own buffering.
pub trait AudioOutput: Send + Sync {
    /// Replace the current source with a freshly decoded track.
    ///
    /// The new track starts paused at position zero; any previous source
    /// is dropped.
    ///
    /// # Errors
    /// Returns error if the bytes cannot be decoded or the device is gone.
    fn load(&self, bytes: Vec<u8>) -> Result<(), PlayerError>;

    /// Begin or resume playback of the loaded track.
    ///
    /// # Errors
    /// Returns error if no track is loaded.
    fn play(&self) -> Result<(), PlayerError>;

    /// Pause playback, keeping source and position.
    fn pause(&self);

    /// Stop playback and drop the current source.
    fn stop(&self);

    /// Set engine gain, clamped to 0.0..=1.0.
    fn set_volume(&self, volume: f32);

    /// Current engine gain.
    fn volume(&self) -> f32;

    /// Playback position within the current track.
    fn position(&self) -> Duration;

    /// Total duration of the current track, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;

    /// Whether a track is loaded and has not finished or been stopped.
    ///
    /// False after natural completion, so a same-track transport command
    /// knows the source must be fetched again.
    fn is_loaded(&self) -> bool;

    /// Whether audio is actually coming out right now.
    fn is_playing(&self) -> bool;

    /// Seek within the current track.
    ///
    /// # Errors
    /// Returns error if no track is loaded or the source cannot seek.
    fn seek(&self, position: Duration) -> Result<(), PlayerError>;

    /// Subscribe to end-of-track notifications.
    ///
    /// Fires once per track that plays to completion; explicit `stop`
    /// or `load` does not fire it.
    fn ended(&self) -> broadcast::Receiver<()>;
}
