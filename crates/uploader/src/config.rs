//! Uploader configuration.
//!
//! Stored as JSON; every field has a default so a partial or missing file
//! still yields a usable config.

use std::path::Path;

use casefile_transfer::{DEFAULT_CHUNK_SIZE, FileSource, validate_object_name};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RejectReason};

/// Default request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Settings shared by the coordinator and the HTTP transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// Base URL of the REST backend, e.g. `http://localhost:3000/api/`.
    pub api_base_url: String,

    /// Part size in bytes.
    pub chunk_size: u64,

    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,

    /// Which files a batch accepts.
    pub limits: UploadLimits,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/".into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            limits: UploadLimits::default(),
        }
    }
}

impl UploaderConfig {
    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults; so does a file that fails to
    /// parse, with a warning.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no uploader config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config.normalized()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse uploader config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    fn normalized(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        self
    }
}

/// Acceptance rules for files dropped into a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Maximum number of sessions in one batch.
    pub max_files: usize,
    pub max_file_size: u64,
    pub min_file_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 100 * 1024 * 1024,
            min_file_size: 1024,
        }
    }
}

impl UploadLimits {
    /// Checks one file, given how many sessions the batch already holds.
    pub fn check(&self, file: &dyn FileSource, queued: usize) -> Result<(), RejectReason> {
        if queued >= self.max_files {
            return Err(RejectReason::TooManyFiles {
                max: self.max_files,
            });
        }
        validate_object_name(file.name()).map_err(|e| RejectReason::InvalidName(e.to_string()))?;
        let size = file.len();
        if size > self.max_file_size {
            return Err(RejectReason::TooLarge {
                size,
                max: self.max_file_size,
            });
        }
        if size < self.min_file_size {
            return Err(RejectReason::TooSmall {
                size,
                min: self.min_file_size,
            });
        }
        Ok(())
    }
}
