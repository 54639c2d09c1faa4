fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use casefile_protocol::{
        ApiErrorBody, CompleteUploadRequest, DocumentFilesResponse, FinalizedObject,
        StartUploadRequest, StartUploadResponse, UploadPartResponse,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture, re-serializes it and compares the JSON values.
    ///
    /// Field order does not matter; names and values must match exactly.
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  backend: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    // --- Upload endpoints ---

    #[test]
    fn fixture_start_upload_request() {
        let req = roundtrip_test::<StartUploadRequest>("start_upload_request.json");
        assert_eq!(req.name, "Lease Agreement 2024.pdf");
    }

    #[test]
    fn fixture_start_upload_response() {
        let resp = roundtrip_test::<StartUploadResponse>("start_upload_response.json");
        assert!(resp.upload_id.is_some());
    }

    #[test]
    fn fixture_upload_part_response() {
        let resp = roundtrip_test::<UploadPartResponse>("upload_part_response.json");
        assert_eq!(
            resp.etag.as_deref(),
            Some("\"5d41402abc4b2a76b9719d911017c592\"")
        );
    }

    #[test]
    fn fixture_complete_upload_request() {
        let req = roundtrip_test::<CompleteUploadRequest>("complete_upload_request.json");
        let numbers: Vec<u32> = req.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(req.document_id, Some(42));
    }

    #[test]
    fn fixture_finalized_object_keeps_unknown_fields() {
        let object = roundtrip_test::<FinalizedObject>("finalized_object.json");
        assert_eq!(object.id, Some(318));
        assert_eq!(object.extra.get("size"), Some(&serde_json::json!(12582912)));
        assert!(!object.extra.contains_key("fileLink"));
    }

    // --- Documents and errors ---

    #[test]
    fn fixture_document_files_response() {
        let resp = roundtrip_test::<DocumentFilesResponse>("document_files_response.json");
        assert_eq!(resp.files.len(), 2);
        assert_eq!(resp.files[1].content_type, "text/plain");
    }

    #[test]
    fn fixture_api_error() {
        let body = roundtrip_test::<ApiErrorBody>("api_error.json");
        assert_eq!(body.message, "Upload not found or already completed");
    }

    // --- Lenient decoding of incomplete responses ---

    #[test]
    fn part_response_without_etag() {
        let resp: UploadPartResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.etag.is_none());
    }

    #[test]
    fn start_response_without_upload_id() {
        let resp: StartUploadResponse =
            serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(resp.upload_id.is_none());
    }

    #[test]
    fn complete_request_without_document_omits_field() {
        let mut fixture = load_fixture("complete_upload_request.json");
        fixture
            .as_object_mut()
            .unwrap()
            .remove("documentId");
        let req: CompleteUploadRequest = serde_json::from_value(fixture).unwrap();
        assert!(req.document_id.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("documentId").is_none());
    }
}
