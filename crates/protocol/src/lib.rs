//! Wire types shared between the upload coordinator and the REST backend.
//!
//! Field names follow the backend's JSON exactly (`uploadId`, `ETag`,
//! `PartNumber`, ...), so every struct here carries explicit serde renames.

pub mod messages;
pub mod types;

pub use messages::{
    ApiErrorBody, CompleteUploadRequest, CompletedPart, DocumentFilesResponse, FinalizedObject,
    StartUploadRequest, StartUploadResponse, UploadPartResponse,
};
pub use types::{DocumentFile, UploadStatus};
