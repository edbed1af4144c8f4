//! HTTP client for the credential endpoints.

use imgdrop_shared::{DownloadCredential, IssueUploadRequest, ObjectKey, UploadCredential};
use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;

/// Client for `POST /file` and `GET /file/{key}`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { http, base_url })
    }

    /// The underlying HTTP client, also used for direct uploads.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Request a form-post credential for uploading `filename`.
    pub async fn request_upload_credential(
        &self,
        filename: &str,
        ftype: &str,
    ) -> Result<UploadCredential, ClientError> {
        let body = IssueUploadRequest {
            filename: filename.to_string(),
            ftype: ftype.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint(&["file"])?)
            .json(&body)
            .send()
            .await?;

        decode(response).await
    }

    /// Request a signed download URL for `key`.
    pub async fn request_download_credential(
        &self,
        key: &ObjectKey,
    ) -> Result<DownloadCredential, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["file", key.as_str()])?)
            .send()
            .await?;

        decode(response).await
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
