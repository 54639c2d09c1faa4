//! [`PartTransport`] over the backend's `upload/*` endpoints.

use std::future::Future;
use std::pin::Pin;

use casefile_protocol::{
    CompleteUploadRequest, CompletedPart, FinalizedObject, StartUploadRequest,
    StartUploadResponse, UploadPartResponse,
};
use casefile_uploader::{PartResult, PartTransport, TransportError};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::{ApiClient, check_status, read_json};
use crate::error::ApiError;

const START_PATH: &str = "upload/start";
const PART_PATH: &str = "upload/part";
const COMPLETE_PATH: &str = "upload/complete";

/// Uploads parts into one document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ApiClient,
    document_id: Option<i64>,
}

impl HttpTransport {
    /// Creates a transport whose completed objects are attached to
    /// `document_id`.
    pub fn new(client: ApiClient, document_id: i64) -> Self {
        Self {
            client,
            document_id: Some(document_id),
        }
    }

    /// Creates a transport that completes uploads without a document.
    pub fn detached(client: ApiClient) -> Self {
        Self {
            client,
            document_id: None,
        }
    }

    async fn start(&self, name: &str) -> Result<String, ApiError> {
        let url = self.client.url(START_PATH)?;
        let body = StartUploadRequest {
            name: name.to_string(),
        };
        let response = self.client.http().post(url).json(&body).send().await?;
        let response = check_status(response).await?;
        let parsed: StartUploadResponse = read_json(response).await?;

        let upload_id = parsed
            .upload_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("missing uploadId".into()))?;
        debug!(file = %name, upload_id = %upload_id, "upload started");
        Ok(upload_id)
    }

    async fn part(
        &self,
        name: &str,
        upload_id: &str,
        part_number: u32,
        data: Vec<u8>,
    ) -> Result<PartResult, ApiError> {
        let url = self.client.url(PART_PATH)?;
        let len = data.len();
        let file = Part::bytes(data)
            .file_name(name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", file)
            .text("objectName", name.to_string())
            .text("uploadId", upload_id.to_string())
            .text("partNumber", part_number.to_string());

        let response = self.client.http().post(url).multipart(form).send().await?;
        let response = check_status(response).await?;
        let parsed: UploadPartResponse = read_json(response).await?;

        let etag = parsed
            .etag
            .filter(|etag| !etag.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse(format!("missing ETag for part {part_number}")))?;
        debug!(file = %name, part = part_number, bytes = len, "part stored");
        Ok(PartResult { part_number, etag })
    }

    async fn complete(
        &self,
        name: &str,
        upload_id: &str,
        parts: &[PartResult],
    ) -> Result<FinalizedObject, ApiError> {
        let url = self.client.url(COMPLETE_PATH)?;
        let body = CompleteUploadRequest {
            object_name: name.to_string(),
            upload_id: upload_id.to_string(),
            parts: parts.iter().map(CompletedPart::from).collect(),
            document_id: self.document_id,
        };
        let response = self.client.http().post(url).json(&body).send().await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(FinalizedObject::default());
        }
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        // Some backends answer with a bare status string.
        if !value.is_object() {
            return Ok(FinalizedObject::default());
        }
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

impl PartTransport for HttpTransport {
    fn start_upload<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + 'a>> {
        Box::pin(async move { self.start(name).await.map_err(TransportError::from) })
    }

    fn upload_part<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<PartResult, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.part(name, upload_id, part_number, data)
                .await
                .map_err(TransportError::from)
        })
    }

    fn complete_upload<'a>(
        &'a self,
        name: &'a str,
        upload_id: &'a str,
        parts: &'a [PartResult],
    ) -> Pin<Box<dyn Future<Output = Result<FinalizedObject, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.complete(name, upload_id, parts)
                .await
                .map_err(TransportError::from)
        })
    }
}
