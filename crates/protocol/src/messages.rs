use serde::{Deserialize, Serialize};

use crate::types::DocumentFile;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Opens a multipart upload (`POST /upload/start`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartUploadRequest {
    pub name: String,
}

/// One entry of the part manifest sent on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    #[serde(rename = "ETag")]
    pub etag: String,
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
}

/// Finalizes a multipart upload (`POST /upload/complete`).
///
/// `parts` must be ordered by strictly increasing `part_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub object_name: String,
    pub upload_id: String,
    pub parts: Vec<CompletedPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response to `POST /upload/start`.
///
/// `upload_id` is optional on the wire so a malformed response can be
/// reported as such instead of as a JSON error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
}

/// Response to `POST /upload/part`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPartResponse {
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Metadata of the object assembled by `POST /upload/complete`.
///
/// The backend's shape beyond a few well-known fields is not fixed, so the
/// rest is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_link: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response to `GET /document/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFilesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<DocumentFile>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_part_uses_backend_casing() {
        let part = CompletedPart {
            etag: "\"abc\"".into(),
            part_number: 3,
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["ETag"], "\"abc\"");
        assert_eq!(json["PartNumber"], 3);
    }

    #[test]
    fn complete_request_omits_missing_document() {
        let req = CompleteUploadRequest {
            object_name: "report.pdf".into(),
            upload_id: "u1".into(),
            parts: Vec::new(),
            document_id: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("objectName"));
        assert!(json.contains("uploadId"));
        assert!(!json.contains("documentId"));
    }

    #[test]
    fn start_response_tolerates_missing_id() {
        let resp: StartUploadResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.upload_id.is_none());

        let resp: StartUploadResponse = serde_json::from_str(r#"{"uploadId":"u-9"}"#).unwrap();
        assert_eq!(resp.upload_id.as_deref(), Some("u-9"));
    }

    #[test]
    fn part_response_reads_etag() {
        let resp: UploadPartResponse = serde_json::from_str(r#"{"ETag":"\"d41d8\""}"#).unwrap();
        assert_eq!(resp.etag.as_deref(), Some("\"d41d8\""));
    }

    #[test]
    fn finalized_object_keeps_unknown_fields() {
        let json = r#"{"id":5,"name":"a.bin","bucket":"docs","size":12}"#;
        let obj: FinalizedObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.id, Some(5));
        assert_eq!(obj.name.as_deref(), Some("a.bin"));
        assert_eq!(obj.extra["bucket"], "docs");
        assert_eq!(obj.extra["size"], 12);
    }

    #[test]
    fn document_files_default_empty() {
        let resp: DocumentFilesResponse = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert!(resp.files.is_empty());
    }
}
