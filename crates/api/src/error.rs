//! API client errors.

use casefile_uploader::TransportError;

/// Errors produced by HTTP calls to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

impl From<ApiError> for TransportError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::InvalidUrl(msg) => TransportError::Request(format!("invalid URL: {msg}")),
            ApiError::Request(msg) => TransportError::Request(msg),
            ApiError::Timeout => TransportError::Timeout,
            ApiError::Status { status, message } => TransportError::Status { status, message },
            ApiError::InvalidResponse(msg) => TransportError::InvalidResponse(msg),
        }
    }
}
