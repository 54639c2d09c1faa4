//! Read access to a document's attached files.

use casefile_protocol::{DocumentFile, DocumentFilesResponse};

use crate::client::{ApiClient, check_status, read_json};
use crate::error::ApiError;

/// Client for `GET /document/{id}`.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: ApiClient,
}

impl DocumentClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the document record, including its file list.
    pub async fn document(&self, document_id: i64) -> Result<DocumentFilesResponse, ApiError> {
        let url = self.client.url(&format!("document/{document_id}"))?;
        let response = self.client.http().get(url).send().await?;
        let response = check_status(response).await?;
        read_json(response).await
    }

    /// Lists the files already attached to a document.
    pub async fn files(&self, document_id: i64) -> Result<Vec<DocumentFile>, ApiError> {
        let document = self.document(document_id).await?;
        tracing::debug!(document_id, files = document.files.len(), "document files loaded");
        Ok(document.files)
    }
}
