//! Resumable chunked file uploads for case documents.
//!
//! This crate implements the **upload coordinator**. It has no HTTP
//! dependency: the app provides a [`PartTransport`] implementation that
//! talks to the multipart-upload backend (see `casefile-api`).
//!
//! # Pipeline
//!
//! 1. **Submit**: files join an [`UploadBatch`] as `Pending` sessions
//! 2. **Start**: the backend assigns an upload id
//! 3. **Parts**: fixed-size parts are sent one at a time, in order
//! 4. **Complete**: the ordered part manifest is committed
//!
//! A session can be paused between parts and resumed (or retried after a
//! failure) from the first part the backend has not acknowledged.

pub mod batch;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience.
pub use batch::{RunSummary, UploadBatch};
pub use config::{UploadLimits, UploaderConfig};
pub use error::{ConfigError, RejectReason, TransportError, UploadError};
pub use session::UploadSession;
pub use transport::{PartResult, PartTransport};
pub use types::{Rejection, SessionId, UploadEvent};
pub use view::{FilesModal, SessionView, format_file_size};

pub use casefile_protocol::UploadStatus;
