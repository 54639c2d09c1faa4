//! Per-file upload state machine.
//!
//! ```text
//! Pending ──start──▶ Uploading ──▶ Completed
//!                      │  ▲  │
//!               pause  ▼  │  ▼  transport error
//!                   Paused  Failed
//!                      └─start─┘ (resume / retry)
//! ```
//!
//! The cursor (`next_part_number`) only moves forward when the backend
//! acknowledges a part, so pausing or failing never discards finished work
//! and resume and retry are the same call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use casefile_protocol::{FinalizedObject, UploadStatus};
use casefile_transfer::{FilePart, FileSource, part_count};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::{RejectReason, UploadError};
use crate::transport::{PartResult, PartTransport};
use crate::types::{SessionId, UploadEvent};
use crate::view::SessionView;

/// One file's upload lifecycle.
pub struct UploadSession {
    id: SessionId,
    file: Arc<dyn FileSource>,
    chunk_size: u64,
    total_parts: u32,
    pause_requested: AtomicBool,
    events: OnceLock<UnboundedSender<UploadEvent>>,
    inner: Mutex<SessionInner>,
}

struct SessionInner {
    status: UploadStatus,
    upload_id: Option<String>,
    next_part_number: u32,
    /// Acknowledged parts; entry `i` answers part `i + 1`.
    manifest: Vec<PartResult>,
    last_error: Option<UploadError>,
    finalized: Option<FinalizedObject>,
}

impl UploadSession {
    /// Creates a pending session for `file`, split into `chunk_size` parts.
    ///
    /// Fails if the file needs more parts than a part number can address.
    pub fn new(file: Arc<dyn FileSource>, chunk_size: u64) -> Result<Self, RejectReason> {
        let parts = part_count(file.len(), chunk_size);
        let total_parts = u32::try_from(parts).map_err(|_| RejectReason::TooManyParts {
            parts,
            max: u64::from(u32::MAX),
        })?;
        Ok(Self {
            id: SessionId::new(),
            file,
            chunk_size,
            total_parts,
            pause_requested: AtomicBool::new(false),
            events: OnceLock::new(),
            inner: Mutex::new(SessionInner {
                status: UploadStatus::Pending,
                upload_id: None,
                next_part_number: 1,
                manifest: Vec::new(),
                last_error: None,
                finalized: None,
            }),
        })
    }

    /// Publishes progress and status changes on `events`.
    pub fn with_events(self, events: UnboundedSender<UploadEvent>) -> Self {
        self.attach_events(events);
        self
    }

    /// Attaches an event sender after construction. The first one wins.
    pub(crate) fn attach_events(&self, events: UnboundedSender<UploadEvent>) {
        let _ = self.events.set(events);
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Runs the upload from the current cursor until it completes, pauses or
    /// fails, and returns the status it settled in.
    ///
    /// Valid from `Pending`, `Paused` and `Failed`; a `Completed` session is
    /// left untouched. Transport failures are recorded on the session, so
    /// the only error returned is [`UploadError::InvalidOperation`] when the
    /// session is already uploading.
    pub async fn start(&self, transport: &dyn PartTransport) -> Result<UploadStatus, UploadError> {
        let upload_id = {
            let mut s = self.lock();
            match s.status {
                UploadStatus::Completed => {
                    debug!(session = %self.id, "start on completed session ignored");
                    return Ok(UploadStatus::Completed);
                }
                UploadStatus::Uploading => {
                    return Err(UploadError::InvalidOperation {
                        op: "start",
                        status: s.status,
                    });
                }
                UploadStatus::Pending | UploadStatus::Paused | UploadStatus::Failed => {}
            }
            s.status = UploadStatus::Uploading;
            s.last_error = None;
            self.pause_requested.store(false, Ordering::SeqCst);
            s.upload_id.clone()
        };
        self.emit(UploadEvent::StatusChanged {
            session: self.id,
            status: UploadStatus::Uploading,
        });

        let name = self.file.name();
        let upload_id = match upload_id {
            Some(id) => {
                debug!(session = %self.id, upload_id = %id, "resuming upload");
                id
            }
            None => match transport.start_upload(name).await {
                Ok(id) => {
                    info!(session = %self.id, file = %name, upload_id = %id, "upload started");
                    self.lock().upload_id = Some(id.clone());
                    id
                }
                Err(e) => return Ok(self.fail(UploadError::Start(e))),
            },
        };

        loop {
            let part_number = self.lock().next_part_number;
            if part_number > self.total_parts {
                break;
            }
            if self.is_pause_requested() {
                return Ok(self.settle_paused());
            }

            let Some(part) = FilePart::nth(self.file.len(), self.chunk_size, part_number) else {
                break;
            };
            let data = match self.file.read_part(part).await {
                Ok(data) => data,
                Err(e) => {
                    return Ok(self.fail(UploadError::Read {
                        part_number,
                        message: e.to_string(),
                    }));
                }
            };

            let result = transport
                .upload_part(name, &upload_id, part_number, data)
                .await;

            let ack = match result {
                Ok(ack) => ack,
                Err(source) => {
                    return Ok(self.fail(UploadError::Part {
                        part_number,
                        source,
                    }));
                }
            };
            // A pause that arrived while the part was in flight drops its
            // acknowledgment; the part is sent again on resume.
            if self.is_pause_requested() {
                return Ok(self.settle_paused());
            }
            if let Err(e) = validate_ack(part_number, &ack) {
                return Ok(self.fail(e));
            }

            let progress = {
                let mut s = self.lock();
                s.manifest.push(ack);
                s.next_part_number += 1;
                progress_of(UploadStatus::Uploading, s.next_part_number, self.total_parts)
            };
            debug!(
                session = %self.id,
                part = part_number,
                total = self.total_parts,
                "part acknowledged"
            );
            self.emit(UploadEvent::PartUploaded {
                session: self.id,
                part_number,
                total_parts: self.total_parts,
                progress,
            });
        }

        if self.is_pause_requested() {
            return Ok(self.settle_paused());
        }

        let manifest = self.lock().manifest.clone();
        match transport.complete_upload(name, &upload_id, &manifest).await {
            Ok(object) => {
                {
                    let mut s = self.lock();
                    s.status = UploadStatus::Completed;
                    s.finalized = Some(object.clone());
                }
                self.pause_requested.store(false, Ordering::SeqCst);
                info!(session = %self.id, file = %name, parts = manifest.len(), "upload completed");
                self.emit(UploadEvent::StatusChanged {
                    session: self.id,
                    status: UploadStatus::Completed,
                });
                self.emit(UploadEvent::Completed {
                    session: self.id,
                    object,
                });
                Ok(UploadStatus::Completed)
            }
            Err(e) => Ok(self.fail(UploadError::Complete(e))),
        }
    }

    /// Asks a running upload to stop at its next check point.
    ///
    /// Cooperative: a part already in flight finishes first.
    pub fn pause(&self) -> Result<(), UploadError> {
        let s = self.lock();
        if s.status != UploadStatus::Uploading {
            return Err(UploadError::InvalidOperation {
                op: "pause",
                status: s.status,
            });
        }
        self.pause_requested.store(true, Ordering::SeqCst);
        debug!(session = %self.id, part = s.next_part_number, "pause requested");
        Ok(())
    }

    /// Checks that the session may be dropped from its batch.
    pub fn ensure_removable(&self) -> Result<(), UploadError> {
        let status = self.status();
        if status != UploadStatus::Pending {
            return Err(UploadError::InvalidOperation {
                op: "remove",
                status,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn settle_paused(&self) -> UploadStatus {
        let next = {
            let mut s = self.lock();
            s.status = UploadStatus::Paused;
            s.next_part_number
        };
        info!(session = %self.id, next_part = next, "upload paused");
        self.emit(UploadEvent::StatusChanged {
            session: self.id,
            status: UploadStatus::Paused,
        });
        UploadStatus::Paused
    }

    fn fail(&self, error: UploadError) -> UploadStatus {
        let message = error.user_message();
        warn!(session = %self.id, file = %self.file.name(), error = %error, "upload failed");
        {
            let mut s = self.lock();
            s.status = UploadStatus::Failed;
            s.last_error = Some(error);
        }
        self.pause_requested.store(false, Ordering::SeqCst);
        self.emit(UploadEvent::StatusChanged {
            session: self.id,
            status: UploadStatus::Failed,
        });
        self.emit(UploadEvent::Failed {
            session: self.id,
            error: message,
        });
        UploadStatus::Failed
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = self.events.get() {
            let _ = tx.send(event);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn file(&self) -> &Arc<dyn FileSource> {
        &self.file
    }

    pub fn status(&self) -> UploadStatus {
        self.lock().status
    }

    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    /// First part the backend has not acknowledged yet.
    pub fn next_part_number(&self) -> u32 {
        self.lock().next_part_number
    }

    pub fn upload_id(&self) -> Option<String> {
        self.lock().upload_id.clone()
    }

    /// Acknowledged parts in part order.
    pub fn manifest(&self) -> Vec<PartResult> {
        self.lock().manifest.clone()
    }

    pub fn last_error(&self) -> Option<UploadError> {
        self.lock().last_error.clone()
    }

    /// Object metadata returned on completion.
    pub fn finalized(&self) -> Option<FinalizedObject> {
        self.lock().finalized.clone()
    }

    pub fn is_pause_requested(&self) -> bool {
        self.pause_requested.load(Ordering::SeqCst)
    }

    /// Share of parts acknowledged, in `[0, 1]`; 1 once completed.
    pub fn progress(&self) -> f64 {
        let s = self.lock();
        progress_of(s.status, s.next_part_number, self.total_parts)
    }

    /// Read-only snapshot for display.
    pub fn view(&self) -> SessionView {
        let s = self.lock();
        SessionView {
            id: self.id,
            name: self.file.name().to_string(),
            size: self.file.len(),
            status: s.status,
            completed_parts: s.next_part_number.saturating_sub(1),
            total_parts: self.total_parts,
            progress: progress_of(s.status, s.next_part_number, self.total_parts),
            pause_requested: self.is_pause_requested(),
            error: s.last_error.as_ref().map(UploadError::user_message),
        }
    }
}

fn progress_of(status: UploadStatus, next_part_number: u32, total_parts: u32) -> f64 {
    if status == UploadStatus::Completed {
        return 1.0;
    }
    if total_parts == 0 {
        return 0.0;
    }
    f64::from(next_part_number - 1) / f64::from(total_parts)
}

fn validate_ack(part_number: u32, ack: &PartResult) -> Result<(), UploadError> {
    if ack.part_number != part_number {
        return Err(UploadError::Validation {
            part_number,
            reason: format!("acknowledged as part {}", ack.part_number),
        });
    }
    if ack.etag.trim().is_empty() {
        return Err(UploadError::Validation {
            part_number,
            reason: "missing ETag".into(),
        });
    }
    Ok(())
}
