use serde::{Deserialize, Serialize};

/// Lifecycle state of a single file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Paused,
    Completed,
    Failed,
}

impl UploadStatus {
    /// Capitalized label shown next to a file row.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Uploading => "Uploading",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// Returns `true` if `run_all` picks this session up.
    pub fn is_runnable(self) -> bool {
        matches!(self, Self::Pending | Self::Paused)
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A file previously attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_link: String,
}
