use crate::services::api::ApiError;

/// Errors that can occur in the playback engine and reconciliation.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// Server call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Audio output device could not be opened
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Downloaded track bytes could not be decoded
    #[error("failed to decode audio: {0}")]
    DecodeFailed(String),

    /// Playback requested with no loaded source
    #[error("no track loaded")]
    NothingLoaded,

    /// Seek inside the current track failed
    #[error("seek failed: {0}")]
    SeekFailed(String),

    /// Seek target cannot be computed without a known track duration
    #[error("track duration unknown")]
    UnknownDuration,
}
