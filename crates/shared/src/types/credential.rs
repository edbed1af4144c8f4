//! Credential payloads exchanged between the API and its clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUploadRequest {
    /// Original filename, used as the object key.
    pub filename: String,
    /// MIME type the file will be uploaded with.
    pub ftype: String,
}

/// Signed form-post target for a direct browser-style upload.
///
/// The client submits every entry of `fields` as a form field, followed by
/// the file itself in a part named `file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredential {
    /// URL to POST the multipart form to.
    pub signed_url: String,
    /// Form fields required by the storage provider (policy, signature, ...).
    pub fields: BTreeMap<String, String>,
}

/// Signed GET URL for a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadCredential {
    /// Time-limited URL the object can be fetched from.
    pub signed_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_credential_wire_format() {
        let credential = UploadCredential {
            signed_url: "http://localhost:4566/photos".to_string(),
            fields: BTreeMap::from([("key".to_string(), "photo.jpg".to_string())]),
        };

        let value = serde_json::to_value(&credential).unwrap();
        assert_eq!(
            value,
            json!({
                "signedUrl": "http://localhost:4566/photos",
                "fields": { "key": "photo.jpg" }
            })
        );
    }

    #[test]
    fn test_download_credential_wire_format() {
        let value: DownloadCredential =
            serde_json::from_value(json!({ "signedUrl": "https://example.com/a" })).unwrap();
        assert_eq!(value.signed_url, "https://example.com/a");
    }
}
