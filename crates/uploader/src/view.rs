//! Read-only views handed to the presentation layer.

use casefile_protocol::UploadStatus;

use crate::types::SessionId;

/// Snapshot of one upload row.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub id: SessionId,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
    pub completed_parts: u32,
    pub total_parts: u32,
    /// Share of parts acknowledged, in `[0, 1]`.
    pub progress: f64,
    /// A pause was asked for but the in-flight part has not returned yet.
    pub pause_requested: bool,
    /// Last error message, set while `Failed`.
    pub error: Option<String>,
}

impl SessionView {
    /// Progress as a whole percentage.
    pub fn percent(&self) -> u8 {
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// "Part 2 of 5".
    pub fn part_label(&self) -> String {
        format!("Part {} of {}", self.completed_parts, self.total_parts)
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size)
    }

    /// Actions the row offers in its current state.
    pub fn can_pause(&self) -> bool {
        self.status == UploadStatus::Uploading && !self.pause_requested
    }

    pub fn can_resume(&self) -> bool {
        matches!(self.status, UploadStatus::Paused | UploadStatus::Failed)
    }

    pub fn can_remove(&self) -> bool {
        self.status == UploadStatus::Pending
    }
}

/// Formats a byte count with binary units, e.g. `1.5 KB`, `12 MB`.
///
/// At most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// State of the per-document files dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilesModal {
    #[default]
    Closed,
    Open {
        document_id: i64,
        document_name: String,
    },
}

impl FilesModal {
    pub fn open(document_id: i64, document_name: impl Into<String>) -> Self {
        Self::Open {
            document_id,
            document_name: document_name.into(),
        }
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Document the dialog uploads into, if open.
    pub fn document_id(&self) -> Option<i64> {
        match self {
            Self::Open { document_id, .. } => Some(*document_id),
            Self::Closed => None,
        }
    }

    /// Dialog heading.
    pub fn title(&self) -> Option<String> {
        match self {
            Self::Open { document_name, .. } => {
                Some(format!("Files for document: {document_name}"))
            }
            Self::Closed => None,
        }
    }
}
