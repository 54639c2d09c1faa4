//! Scripted transport shared by the session and batch tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use casefile_protocol::FinalizedObject;
use casefile_transfer::{FilePart, FileSource, TransferError};
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::transport::{PartResult, PartTransport};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Start(String),
    Part {
        name: String,
        upload_id: String,
        part_number: u32,
        len: usize,
    },
    Complete {
        name: String,
        upload_id: String,
        parts: Vec<u32>,
    },
}

/// A backend call that can be held until released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldPoint {
    Start,
    Part(u32),
    Complete,
}

/// Mock backend that records requests and fails on demand.
#[derive(Default)]
pub(crate) struct MockTransport {
    calls: Mutex<Vec<Call>>,
    start_failures: Mutex<usize>,
    complete_failures: Mutex<usize>,
    part_failures: Mutex<HashMap<u32, usize>>,
    empty_etag_part: Mutex<Option<u32>>,
    held: Mutex<Option<HoldPoint>>,
    uploads_started: Mutex<usize>,
    /// Signalled when the held call reaches the backend.
    pub arrived: Notify,
    /// Lets the held call return.
    pub release: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_start(&self, times: usize) {
        *self.start_failures.lock().unwrap() = times;
    }

    pub fn fail_complete(&self, times: usize) {
        *self.complete_failures.lock().unwrap() = times;
    }

    pub fn fail_part(&self, part_number: u32, times: usize) {
        self.part_failures
            .lock()
            .unwrap()
            .insert(part_number, times);
    }

    pub fn empty_etag_on(&self, part_number: u32) {
        *self.empty_etag_part.lock().unwrap() = Some(part_number);
    }

    /// Blocks the next upload of `part_number` until `release` is notified.
    pub fn hold_part(&self, part_number: u32) {
        *self.held.lock().unwrap() = Some(HoldPoint::Part(part_number));
    }

    /// Blocks the next `start_upload` until `release` is notified.
    pub fn hold_start(&self) {
        *self.held.lock().unwrap() = Some(HoldPoint::Start);
    }

    /// Blocks the next `complete_upload` until `release` is notified.
    pub fn hold_complete(&self) {
        *self.held.lock().unwrap() = Some(HoldPoint::Complete);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Part numbers sent so far, in order.
    pub fn parts_sent(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Part { part_number, .. } => Some(part_number),
                _ => None,
            })
            .collect()
    }

    pub fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count()
    }

    pub fn complete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Complete { .. }))
            .count()
    }

    async fn wait_if_held(&self, point: HoldPoint) {
        let hold = {
            let mut held = self.held.lock().unwrap();
            if *held == Some(point) {
                held.take();
                true
            } else {
                false
            }
        };
        if hold {
            self.arrived.notify_one();
            self.release.notified().await;
        }
    }

    fn take_failure(counter: &Mutex<usize>) -> bool {
        let mut remaining = counter.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

impl PartTransport for MockTransport {
    fn start_upload<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + 'a>> {
        self.calls.lock().unwrap().push(Call::Start(name.to_string()));
        Box::pin(async move {
            self.wait_if_held(HoldPoint::Start).await;
            if Self::take_failure(&self.start_failures) {
                return Err(TransportError::Status {
                    status: 503,
                    message: "storage unavailable".into(),
                });
            }
            let mut started = self.uploads_started.lock().unwrap();
            *started += 1;
            Ok(format!("upload-{started}"))
        })
    }

    fn upload_part<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<PartResult, TransportError>> + Send + 'a>> {
        self.calls.lock().unwrap().push(Call::Part {
            name: name.to_string(),
            upload_id: upload_id.to_string(),
            part_number,
            len: data.len(),
        });
        Box::pin(async move {
            self.wait_if_held(HoldPoint::Part(part_number)).await;

            let fail = {
                let mut failures = self.part_failures.lock().unwrap();
                match failures.get_mut(&part_number) {
                    Some(n) if *n > 0 => {
                        *n -= 1;
                        true
                    }
                    _ => false,
                }
            };
            if fail {
                return Err(TransportError::Request("connection reset".into()));
            }

            let empty = *self.empty_etag_part.lock().unwrap() == Some(part_number);
            Ok(PartResult {
                part_number,
                etag: if empty {
                    String::new()
                } else {
                    format!("etag-{part_number}")
                },
            })
        })
    }

    fn complete_upload<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        parts: &'a [PartResult],
    ) -> Pin<Box<dyn Future<Output = Result<FinalizedObject, TransportError>> + Send + 'a>> {
        self.calls.lock().unwrap().push(Call::Complete {
            name: name.to_string(),
            upload_id: upload_id.to_string(),
            parts: parts.iter().map(|p| p.part_number).collect(),
        });
        Box::pin(async move {
            self.wait_if_held(HoldPoint::Complete).await;
            if Self::take_failure(&self.complete_failures) {
                return Err(TransportError::Status {
                    status: 400,
                    message: "part list out of order".into(),
                });
            }
            Ok(FinalizedObject {
                name: Some(name.to_string()),
                ..FinalizedObject::default()
            })
        })
    }
}

/// Source that reports any length without backing storage; parts read as
/// zeroes.
pub(crate) struct SizedFile {
    pub name: String,
    pub len: u64,
}

impl FileSource for SizedFile {
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
        Box::pin(async move { Ok(vec![0u8; part.len() as usize]) })
    }
}
