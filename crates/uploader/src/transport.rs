//! Backend contract for multipart uploads.
//!
//! `PartTransport` is implemented by the app (over HTTP in `casefile-api`).

use std::future::Future;
use std::pin::Pin;

use casefile_protocol::{CompletedPart, FinalizedObject};

use crate::error::TransportError;

/// The backend's acknowledgment of one stored part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResult {
    pub part_number: u32,
    /// Opaque digest assigned by the backend (an ETag).
    pub etag: String,
}

impl From<&PartResult> for CompletedPart {
    fn from(part: &PartResult) -> Self {
        CompletedPart {
            etag: part.etag.clone(),
            part_number: part.part_number,
        }
    }
}

/// Multipart-upload backend.
///
/// Each call is awaited before the next one is issued; an implementation
/// never sees two outstanding calls for the same upload.
pub trait PartTransport: Send + Sync {
    /// Opens a multipart upload for `name` and returns its upload id.
    fn start_upload<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + 'a>>;

    /// Stores the bytes of one part.
    ///
    /// Must tolerate being called again for the same `(upload_id,
    /// part_number)`; the backend overwrites the earlier attempt.
    fn upload_part<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<PartResult, TransportError>> + Send + 'a>>;

    /// Commits the upload. `parts` is ordered by increasing part number.
    fn complete_upload<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        parts: &'a [PartResult],
    ) -> Pin<Box<dyn Future<Output = Result<FinalizedObject, TransportError>> + Send + 'a>>;
}
