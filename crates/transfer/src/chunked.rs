use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use crate::{DEFAULT_CHUNK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// Chunk planning
// ---------------------------------------------------------------------------

/// One contiguous byte range of a file, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilePart {
    /// 1-based part number.
    pub part_number: u32,
    /// First byte of the part.
    pub start: u64,
    /// One past the last byte of the part.
    pub end: u64,
}

impl FilePart {
    /// Size of the part in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length part. [`plan`] never produces one.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The part's byte range `[start, end)`.
    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }

    /// Computes part `part_number` of a file without building the whole plan.
    ///
    /// Returns `None` if the part does not exist for this length.
    pub fn nth(file_len: u64, chunk_size: u64, part_number: u32) -> Option<Self> {
        let chunk_size = effective_chunk_size(chunk_size);
        if part_number == 0 || part_number as u64 > part_count(file_len, chunk_size) {
            return None;
        }
        let start = (part_number as u64 - 1) * chunk_size;
        let end = start.saturating_add(chunk_size).min(file_len);
        Some(Self {
            part_number,
            start,
            end,
        })
    }
}

fn effective_chunk_size(chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    }
}

/// Number of parts a file of `file_len` bytes splits into.
///
/// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (5 MiB) is used.
pub fn part_count(file_len: u64, chunk_size: u64) -> u64 {
    file_len.div_ceil(effective_chunk_size(chunk_size))
}

/// Part count as a wire part number.
///
/// Fails with [`TransferError::TooManyParts`] when the count does not fit
/// in a `u32`.
pub fn checked_part_count(file_len: u64, chunk_size: u64) -> Result<u32, TransferError> {
    let parts = part_count(file_len, chunk_size);
    u32::try_from(parts).map_err(|_| TransferError::TooManyParts { parts })
}

/// Splits a file of `file_len` bytes into ordered parts of `chunk_size`.
///
/// Every part is exactly `chunk_size` long except the last, which holds
/// the remainder. A zero-length file yields no parts.
pub fn plan(file_len: u64, chunk_size: u64) -> Result<Vec<FilePart>, TransferError> {
    let chunk_size = effective_chunk_size(chunk_size);
    let count = checked_part_count(file_len, chunk_size)?;
    Ok((1..=count)
        .map(|part_number| {
            let start = u64::from(part_number - 1) * chunk_size;
            FilePart {
                part_number,
                start,
                end: start.saturating_add(chunk_size).min(file_len),
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// PartReader
// ---------------------------------------------------------------------------

/// Reads individual parts of a file on disk.
///
/// Blocking; callers on an async runtime wrap it in `spawn_blocking`.
pub struct PartReader {
    file: std::fs::File,
    file_len: u64,
}

impl PartReader {
    /// Opens `path` for part reads.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self { file, file_len })
    }

    /// Reads exactly the bytes of `part`.
    ///
    /// Fails with `UnexpectedEof` if the file shrank since it was planned.
    pub fn read_part(&mut self, part: &FilePart) -> Result<Vec<u8>, TransferError> {
        if part.end > self.file_len {
            return Err(TransferError::PartOutOfBounds {
                part_number: part.part_number,
                file_len: self.file_len,
            });
        }
        self.file.seek(SeekFrom::Start(part.start))?;
        let mut buf = vec![0u8; part.len() as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Total file size in bytes.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }
}
