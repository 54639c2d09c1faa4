//! Data types for the upload flow.

use casefile_protocol::{FinalizedObject, UploadStatus};

use crate::error::RejectReason;

/// Stable identifier of an upload session within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Event emitted while sessions run.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// A session moved to a new status.
    StatusChanged {
        session: SessionId,
        status: UploadStatus,
    },
    /// A part was acknowledged by the backend.
    PartUploaded {
        session: SessionId,
        part_number: u32,
        total_parts: u32,
        progress: f64,
    },
    /// The backend assembled the object.
    Completed {
        session: SessionId,
        object: FinalizedObject,
    },
    /// The session stopped on an error.
    Failed { session: SessionId, error: String },
}

/// A file turned away by [`UploadBatch::accept`](crate::UploadBatch::accept).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
