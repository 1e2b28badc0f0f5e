use thiserror::Error;

use crate::services::api::ApiError;

/// Errors from the attention adaptation service.
#[derive(Error, Debug)]
pub enum AttentionError {
    /// Attention endpoint request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
