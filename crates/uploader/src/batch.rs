//! Batch coordinator: runs upload sessions one at a time, in submission
//! order.
//!
//! At most one backend call is in flight for the whole batch. `run_all` and
//! `resume` share an async run gate; pause requests and read views only take
//! short synchronous locks, so they work while an upload is running.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use casefile_protocol::UploadStatus;
use casefile_transfer::FileSource;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{UploadLimits, UploaderConfig};
use crate::error::UploadError;
use crate::session::UploadSession;
use crate::transport::PartTransport;
use crate::types::{Rejection, SessionId, UploadEvent};
use crate::view::SessionView;

/// Outcome counts of one `run_all` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub paused: usize,
    pub failed: usize,
}

/// Ordered collection of upload sessions for one document.
pub struct UploadBatch {
    transport: Arc<dyn PartTransport>,
    chunk_size: u64,
    sessions: RwLock<Vec<Arc<UploadSession>>>,
    run_gate: tokio::sync::Mutex<()>,
    /// Set once the event receiver has been taken; nothing is queued before.
    events_tx: Option<mpsc::UnboundedSender<UploadEvent>>,
}

impl UploadBatch {
    /// Creates an empty batch that uploads through `transport`.
    pub fn new(transport: Arc<dyn PartTransport>, chunk_size: u64) -> Self {
        Self {
            transport,
            chunk_size,
            sessions: RwLock::new(Vec::new()),
            run_gate: tokio::sync::Mutex::new(()),
            events_tx: None,
        }
    }

    /// Creates an empty batch using the configured chunk size.
    pub fn from_config(transport: Arc<dyn PartTransport>, config: &UploaderConfig) -> Self {
        Self::new(transport, config.chunk_size)
    }

    /// Opens the event channel and returns its receiver. Can only be called
    /// once.
    ///
    /// Sessions already in the batch publish on it from now on.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        if self.events_tx.is_some() {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        for session in self.read().iter() {
            session.attach_events(tx.clone());
        }
        self.events_tx = Some(tx);
        Some(rx)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<UploadSession>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<UploadSession>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn session(&self, index: usize) -> Result<Arc<UploadSession>, UploadError> {
        self.read()
            .get(index)
            .cloned()
            .ok_or(UploadError::NoSuchSession(index))
    }

    fn find(&self, id: SessionId) -> Option<Arc<UploadSession>> {
        self.read().iter().find(|s| s.id() == id).cloned()
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Appends one pending session per file, in order.
    ///
    /// All or nothing: if any file cannot be split into addressable parts,
    /// no session is added and that file is returned as rejected.
    pub fn submit<I>(&self, files: I) -> Result<Vec<SessionId>, Rejection>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        let sessions = files
            .into_iter()
            .map(|file| self.new_session(file))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.push(sessions))
    }

    /// Submits the files that pass `limits` and returns the rest.
    pub fn accept<I>(&self, files: I, limits: &UploadLimits) -> Vec<Rejection>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        let mut queued = self.len();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for file in files {
            let session = limits
                .check(file.as_ref(), queued)
                .map_err(|reason| Rejection {
                    name: file.name().to_string(),
                    reason,
                })
                .and_then(|()| self.new_session(file));
            match session {
                Ok(session) => {
                    queued += 1;
                    accepted.push(session);
                }
                Err(rejection) => {
                    info!(file = %rejection.name, reason = %rejection.reason, "file rejected");
                    rejected.push(rejection);
                }
            }
        }
        self.push(accepted);
        rejected
    }

    fn new_session(&self, file: Arc<dyn FileSource>) -> Result<UploadSession, Rejection> {
        let name = file.name().to_string();
        let session = UploadSession::new(file, self.chunk_size)
            .map_err(|reason| Rejection { name, reason })?;
        if let Some(tx) = &self.events_tx {
            session.attach_events(tx.clone());
        }
        Ok(session)
    }

    fn push(&self, new: Vec<UploadSession>) -> Vec<SessionId> {
        let mut sessions = self.write();
        new.into_iter()
            .map(|session| {
                let id = session.id();
                debug!(
                    session = %id,
                    file = %session.file().name(),
                    parts = session.total_parts(),
                    "file submitted"
                );
                sessions.push(Arc::new(session));
                id
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Starts every `Pending` or `Paused` session, strictly in batch order.
    ///
    /// Each session's `start` returns before the next one begins. A failed
    /// session does not stop the pass; it stays `Failed` until resumed.
    pub async fn run_all(&self) -> RunSummary {
        let _gate = self.run_gate.lock().await;

        let queued: Vec<SessionId> = self
            .read()
            .iter()
            .filter(|s| s.status().is_runnable())
            .map(|s| s.id())
            .collect();
        info!(sessions = queued.len(), "running batch");

        let mut summary = RunSummary::default();
        for id in queued {
            let Some(session) = self.find(id) else {
                debug!(session = %id, "session removed before its turn");
                continue;
            };
            if !session.status().is_runnable() {
                continue;
            }
            match session.start(self.transport.as_ref()).await {
                Ok(UploadStatus::Completed) => summary.completed += 1,
                Ok(UploadStatus::Paused) => summary.paused += 1,
                Ok(UploadStatus::Failed) => summary.failed += 1,
                Ok(_) => {}
                Err(e) => warn!(session = %id, error = %e, "session could not start"),
            }
        }

        info!(
            completed = summary.completed,
            paused = summary.paused,
            failed = summary.failed,
            "batch pass finished"
        );
        summary
    }

    /// Resumes a paused session or retries a failed one.
    ///
    /// Waits for a running `run_all` pass to finish first.
    pub async fn resume(&self, index: usize) -> Result<UploadStatus, UploadError> {
        let session = self.session(index)?;
        let _gate = self.run_gate.lock().await;
        session.start(self.transport.as_ref()).await
    }

    /// Asks the session at `index` to pause at its next check point.
    pub fn pause(&self, index: usize) -> Result<(), UploadError> {
        self.session(index)?.pause()
    }

    /// Pauses every uploading session. Returns how many were asked to pause.
    pub fn pause_all(&self) -> usize {
        self.read()
            .iter()
            .filter(|s| s.status() == UploadStatus::Uploading)
            .filter(|s| s.pause().is_ok())
            .count()
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Drops a session that has not started yet.
    pub fn remove(&self, index: usize) -> Result<(), UploadError> {
        let mut sessions = self.write();
        let session = sessions
            .get(index)
            .ok_or(UploadError::NoSuchSession(index))?;
        session.ensure_removable()?;
        let removed = sessions.remove(index);
        debug!(session = %removed.id(), "session removed");
        Ok(())
    }

    /// Discards every session. Rejected while anything is uploading.
    pub fn clear(&self) -> Result<(), UploadError> {
        let Ok(_gate) = self.run_gate.try_lock() else {
            return Err(UploadError::InvalidOperation {
                op: "clear",
                status: UploadStatus::Uploading,
            });
        };
        let mut sessions = self.write();
        if sessions
            .iter()
            .any(|s| s.status() == UploadStatus::Uploading)
        {
            return Err(UploadError::InvalidOperation {
                op: "clear",
                status: UploadStatus::Uploading,
            });
        }
        debug!(sessions = sessions.len(), "batch cleared");
        sessions.clear();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns `true` while a `run_all` pass or a resume is in progress.
    pub fn is_running(&self) -> bool {
        self.run_gate.try_lock().is_err()
    }

    /// Returns `true` when every session has completed.
    pub fn all_completed(&self) -> bool {
        self.read()
            .iter()
            .all(|s| s.status() == UploadStatus::Completed)
    }

    /// Mean of per-session progress; 0 for an empty batch.
    pub fn progress(&self) -> f64 {
        let sessions = self.read();
        if sessions.is_empty() {
            return 0.0;
        }
        sessions.iter().map(|s| s.progress()).sum::<f64>() / sessions.len() as f64
    }

    /// Read-only views of every session, in batch order.
    pub fn snapshot(&self) -> Vec<SessionView> {
        self.read().iter().map(|s| s.view()).collect()
    }

    /// View of the session at `index`.
    pub fn view(&self, index: usize) -> Option<SessionView> {
        self.read().get(index).map(|s| s.view())
    }

    /// Position of a session in the batch.
    pub fn index_of(&self, id: SessionId) -> Option<usize> {
        self.read().iter().position(|s| s.id() == id)
    }
}
