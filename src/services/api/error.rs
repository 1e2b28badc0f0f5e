/// Errors that can occur when talking to the music server's HTTP API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Request could not be sent or the connection failed
    #[error("request to '{endpoint}' failed: {source}")]
    Request {
        /// Endpoint path that was being called
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status code
    #[error("server returned {status} for '{endpoint}'")]
    Status {
        /// Endpoint path that was being called
        endpoint: String,
        /// HTTP status code received
        status: reqwest::StatusCode,
    },

    /// Response body could not be decoded into the expected type
    #[error("failed to decode response from '{endpoint}': {source}")]
    Decode {
        /// Endpoint path that was being called
        endpoint: String,
        /// Underlying decode error
        #[source]
        source: reqwest::Error,
    },

    /// Local file could not be read for upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Creates a request error for an endpoint.
    pub(crate) fn request(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Request {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    /// Creates a decode error for an endpoint.
    pub(crate) fn decode(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}
