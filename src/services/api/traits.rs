use std::path::PathBuf;

use async_trait::async_trait;

use super::{
    ApiError,
    types::{
        AttentionState, CurrentState, InteractionKind, ModesInfo, PlaylistInfo, ReloadResult,
        UploadResult,
    },
};

/// Playback endpoints of the music server.
///
/// The sync controller and user actions are written against this trait so
/// tests can substitute an in-memory server.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    /// Fetch the current playback state.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn current_state(&self) -> Result<CurrentState, ApiError>;

    /// Toggle play/pause on the server.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn play_pause(&self) -> Result<CurrentState, ApiError>;

    /// Advance to the next track.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn next(&self) -> Result<CurrentState, ApiError>;

    /// Go back to the previous track.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn previous(&self) -> Result<CurrentState, ApiError>;

    /// Jump to a playlist entry by index.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn play_index(&self, index: i64) -> Result<CurrentState, ApiError>;

    /// Fetch shuffle/repeat modes.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn modes(&self) -> Result<ModesInfo, ApiError>;

    /// Toggle shuffle; returns the new flag.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn toggle_shuffle(&self) -> Result<bool, ApiError>;

    /// Toggle repeat; returns the new flag.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn toggle_repeat(&self) -> Result<bool, ApiError>;

    /// Upload local audio files to the server playlist.
    ///
    /// # Errors
    /// Returns error if a file cannot be read or the request fails.
    async fn upload(&self, files: Vec<PathBuf>) -> Result<UploadResult, ApiError>;

    /// Clear the server playlist.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn clear(&self) -> Result<CurrentState, ApiError>;

    /// Fetch the full playlist.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn playlist(&self) -> Result<PlaylistInfo, ApiError>;

    /// Ask the server to rescan its media directory.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn reload_files(&self) -> Result<ReloadResult, ApiError>;

    /// Download the audio bytes for a track filename.
    ///
    /// # Errors
    /// Returns error if the request fails or the body cannot be read.
    async fn track_bytes(&self, filename: &str) -> Result<Vec<u8>, ApiError>;
}

/// Attention endpoints of the music server.
#[async_trait]
pub trait AttentionApi: Send + Sync {
    /// Fetch the current attention state.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn attention_state(&self) -> Result<AttentionState, ApiError>;

    /// Report a user interaction; returns the recomputed attention state
    /// when the server includes one.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn track_interaction(
        &self,
        kind: InteractionKind,
        data: serde_json::Value,
    ) -> Result<Option<AttentionState>, ApiError>;
}

/// Listening analytics endpoints of the music server.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Open a listening session.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn start_session(&self) -> Result<(), ApiError>;

    /// Record that a song started playing.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn song_start(&self, song_id: &str) -> Result<(), ApiError>;

    /// Record that a song finished or was left.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn song_end(
        &self,
        song_id: &str,
        duration_secs: f64,
        listened_secs: f64,
        completed: bool,
    ) -> Result<(), ApiError>;

    /// Record that a song was skipped.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn song_skip(&self, song_id: &str) -> Result<(), ApiError>;

    /// Fetch aggregate listening statistics.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    async fn stats(&self) -> Result<serde_json::Value, ApiError>;

    /// Reset server-side listening statistics.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn reset(&self) -> Result<(), ApiError>;
}

/// Capture lifecycle notifications to the music server.
#[async_trait]
pub trait CaptureControlApi: Send + Sync {
    /// Notify the server that multimodal capture started.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn capture_started(&self) -> Result<(), ApiError>;

    /// Notify the server that multimodal capture stopped.
    ///
    /// # Errors
    /// Returns error if the request fails.
    async fn capture_stopped(&self) -> Result<(), ApiError>;
}
