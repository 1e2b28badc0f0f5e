use std::path::Path;

use thiserror::Error;

use crate::services::{
    api::ApiError, attention::AttentionError, capture::CaptureError, channel::ChannelError,
    player::PlayerError,
};

/// Top-level error type for the Attune application.
///
/// Composes the per-service errors so the binary can bubble any failure
/// through one `Result` type.
#[derive(Error, Debug)]
pub enum AttuneError {
    /// HTTP collaborator failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// WebSocket channel failure
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Playback engine or reconciliation failure
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// Camera or microphone capture failure
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Attention adaptation failure
    #[error(transparent)]
    Attention(#[from] AttentionError),

    /// I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },
}

/// A specialized `Result` type for Attune operations.
///
/// This type alias simplifies error handling by defaulting the error type
/// to `AttuneError`.
pub type Result<T> = std::result::Result<T, AttuneError>;

impl AttuneError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        AttuneError::TomlParse {
            location,
            details: error.to_string(),
        }
    }
}
