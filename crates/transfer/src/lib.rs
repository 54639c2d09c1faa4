//! Chunk planning and part reading for multipart uploads.
//!
//! [`plan`] splits a file length into 1-based [`FilePart`]s; a
//! [`FileSource`] hands out the bytes of one part at a time so an upload
//! never buffers more than a single chunk.

mod chunked;
mod source;
mod validation;

pub use chunked::{FilePart, PartReader, checked_part_count, part_count, plan};
pub use source::{FileSource, LocalFile, MemoryFile};
pub use validation::validate_object_name;

/// Default chunk size: 5 MiB.
///
/// S3-compatible backends reject non-final parts smaller than this.
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("part {part_number} is out of bounds for a file of {file_len} bytes")]
    PartOutOfBounds { part_number: u32, file_len: u64 },

    #[error("file splits into {parts} parts, more than a part number can address")]
    TooManyParts { parts: u64 },

    #[error("invalid object name: {0}")]
    InvalidName(String),

    #[error("read task failed: {0}")]
    Join(String),
}
