/// HTTP client backed by reqwest
pub mod client;
/// API error types
pub mod error;
/// Collaborator trait definitions
pub mod traits;
/// Wire types shared with the server
pub mod types;

#[cfg(test)]
mod tests;

pub use client::HttpApi;
pub use error::ApiError;
pub use traits::{AnalyticsApi, AttentionApi, CaptureControlApi, PlayerApi};
pub use types::*;
