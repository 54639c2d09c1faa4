//! Byte sources an upload reads its parts from.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::TransferError;
use crate::chunked::{FilePart, PartReader};

/// A file handed to the uploader.
///
/// The caller keeps ownership of the underlying data; an upload only asks
/// for one part at a time.
pub trait FileSource: Send + Sync {
    /// Object name the file is uploaded under.
    fn name(&self) -> &str;

    /// File length in bytes.
    fn len(&self) -> u64;

    /// Returns `true` for a zero-length file.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the bytes of `part`.
    fn read_part(
        &self,
        part: FilePart,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>>;
}

// ---------------------------------------------------------------------------
// LocalFile
// ---------------------------------------------------------------------------

/// A file on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    len: u64,
}

impl LocalFile {
    /// Stats `path` and uses its file name as the object name.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TransferError::InvalidName(path.display().to_string()))?;
        Ok(Self {
            path,
            name,
            len: meta.len(),
        })
    }

    /// Overrides the object name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn read_part(
        &self,
        part: FilePart,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>> {
        let path = self.path.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || PartReader::open(&path)?.read_part(&part))
                .await
                .map_err(|e| TransferError::Join(e.to_string()))?
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryFile
// ---------------------------------------------------------------------------

/// An in-memory blob, e.g. a file dropped into a browser view.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    data: Arc<[u8]>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_part(
        &self,
        part: FilePart,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>> {
        Box::pin(async move {
            let len = self.data.len() as u64;
            if part.end > len || part.start > part.end {
                return Err(TransferError::PartOutOfBounds {
                    part_number: part.part_number,
                    file_len: len,
                });
            }
            Ok(self.data[part.start as usize..part.end as usize].to_vec())
        })
    }
}
