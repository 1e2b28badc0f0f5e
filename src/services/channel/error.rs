/// Errors that can occur on the inference WebSocket channel.
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    /// Connection to the server failed
    #[error("WebSocket connection to '{url}' failed: {details}")]
    ConnectionFailed {
        /// Socket URL
        url: String,
        /// Underlying error details
        details: String,
    },

    /// Outbound message could not be serialized
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    /// Socket transport failed mid-session
    #[error("WebSocket transport error: {0}")]
    Transport(String),
}
