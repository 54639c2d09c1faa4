//! Upload error types.

use casefile_protocol::UploadStatus;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors produced by upload sessions and the batch coordinator.
///
/// `Start`, `Part`, `Complete`, `Validation` and `Read` are recorded on the
/// session as its last error and leave it `Failed`; they are never returned
/// from [`UploadSession::start`](crate::UploadSession::start).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("failed to start upload: {0}")]
    Start(TransportError),

    #[error("part {part_number} failed: {source}")]
    Part {
        part_number: u32,
        source: TransportError,
    },

    #[error("failed to complete upload: {0}")]
    Complete(TransportError),

    #[error("invalid acknowledgment for part {part_number}: {reason}")]
    Validation { part_number: u32, reason: String },

    #[error("failed to read part {part_number}: {message}")]
    Read { part_number: u32, message: String },

    #[error("cannot {op} while {status}")]
    InvalidOperation {
        op: &'static str,
        status: UploadStatus,
    },

    #[error("no session at index {0}")]
    NoSuchSession(usize),
}

impl UploadError {
    /// Message shown to the user under a failed file.
    ///
    /// Prefers the backend's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Start(TransportError::Status { message, .. })
            | Self::Part {
                source: TransportError::Status { message, .. },
                ..
            }
            | Self::Complete(TransportError::Status { message, .. })
                if !message.is_empty() =>
            {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Why a file was not accepted into a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("too many files (max {max})")]
    TooManyFiles { max: usize },

    #[error("file is {size} bytes, larger than {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("file is {size} bytes, smaller than {min}")]
    TooSmall { size: u64, min: u64 },

    #[error("file needs {parts} parts, more than the {max} a multipart upload allows")]
    TooManyParts { parts: u64, max: u64 },

    #[error("{0}")]
    InvalidName(String),
}

/// Errors loading or saving [`UploaderConfig`](crate::UploaderConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
