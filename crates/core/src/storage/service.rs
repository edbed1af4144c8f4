//! Credential issuer implementation using Apache OpenDAL.

use std::time::Duration;

use chrono::Utc;
use imgdrop_shared::{DownloadCredential, ObjectKey, UploadCredential};
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, warn};

use super::config::StorageConfig;
use super::endpoint::rewrite_to_localhost;
use super::error::StorageError;
use super::key::normalize_key;
use super::post_policy::presign_post;

/// Result of an existence check against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectPresence {
    /// The object exists.
    Found,
    /// The store reported no object under the key.
    NotFound,
}

/// Issues time-limited upload and download credentials for one bucket.
///
/// Holds a single storage operator; cheap to share behind an `Arc` and safe
/// for concurrent use.
pub struct CredentialIssuer {
    operator: Operator,
    config: StorageConfig,
}

impl CredentialIssuer {
    /// Create a new issuer from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operator cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config)?;
        Ok(Self { operator, config })
    }

    /// Create the OpenDAL S3 operator.
    ///
    /// Credentials come from the config only; ambient AWS config files and
    /// instance metadata are never consulted.
    fn create_operator(config: &StorageConfig) -> Result<Operator, StorageError> {
        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .access_key_id(&config.credentials.access_key_id)
            .secret_access_key(&config.credentials.secret_access_key)
            .disable_config_load()
            .disable_ec2_metadata();

        if let Some(token) = &config.credentials.session_token {
            builder = builder.session_token(token);
        }

        // Emulators only speak path-style; AWS prefers virtual-hosted buckets.
        builder = match &config.endpoint {
            Some(endpoint) => builder.endpoint(endpoint),
            None => builder.enable_virtual_host_style(),
        };

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }

    /// Issue a form-post credential for uploading `key`.
    ///
    /// The signed policy limits the upload to `max_file_size` bytes and a
    /// `Content-Type` starting with the configured prefix. The key is
    /// normalized first; the normalized form is the one returned in `fields`.
    /// Nothing is written to the store until the client performs the POST.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot name an object or the policy cannot
    /// be signed with the configured settings.
    pub fn issue_upload_credential(
        &self,
        key: &ObjectKey,
        content_type: &str,
    ) -> Result<UploadCredential, StorageError> {
        let key = normalize_key(key)?;
        let fields = presign_post(&self.config, &key, content_type, Utc::now())?;
        let signed_url = self.finalize_url(self.config.post_url())?;

        debug!(key = %key, content_type, "Upload credential issued");

        Ok(UploadCredential { signed_url, fields })
    }

    /// Issue a signed GET URL for `key`, preferring its variant when stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot name an object or presigning fails.
    pub async fn issue_download_credential(
        &self,
        key: &ObjectKey,
    ) -> Result<DownloadCredential, StorageError> {
        self.config.credentials.ensure_complete()?;
        let key = normalize_key(key)?;
        let target = self.resolve_download_key(&key).await;
        let signed_url = self.presign_download(&target).await?;

        debug!(key = %key, target = %target, "Download credential issued");

        Ok(DownloadCredential { signed_url })
    }

    /// Pick the key a download should target: `<key><suffix>` if that
    /// variant exists, `key` otherwise.
    ///
    /// Lookup failures are logged and treated as "variant absent".
    pub async fn resolve_download_key(&self, key: &ObjectKey) -> ObjectKey {
        let variant = key.variant(&self.config.variant_suffix);

        match self.object_presence(&variant).await {
            Ok(ObjectPresence::Found) => variant,
            Ok(ObjectPresence::NotFound) => key.clone(),
            Err(e) => {
                warn!(error = %e, variant = %variant, "Variant lookup failed, using original key");
                key.clone()
            }
        }
    }

    /// Check whether an object exists.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    pub async fn object_presence(&self, key: &ObjectKey) -> Result<ObjectPresence, StorageError> {
        match self.operator.stat(key.as_str()).await {
            Ok(_) => Ok(ObjectPresence::Found),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ObjectPresence::NotFound),
            Err(e) => Err(StorageError::from_opendal(key.as_str(), e)),
        }
    }

    /// Presign a GET for exactly `key`, without variant resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_download(&self, key: &ObjectKey) -> Result<String, StorageError> {
        let ttl = Duration::from_secs(self.config.download_ttl_secs);

        let presigned = self
            .operator
            .presign_read(key.as_str(), ttl)
            .await
            .map_err(|e| StorageError::from_opendal(key.as_str(), e))?;

        self.finalize_url(presigned.uri().to_string())
    }

    fn finalize_url(&self, url: String) -> Result<String, StorageError> {
        if self.config.uses_custom_endpoint() {
            rewrite_to_localhost(&url)
        } else {
            Ok(url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AccessKeys;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn keys() -> AccessKeys {
        AccessKeys::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
    }

    fn emulator_issuer(server: &MockServer) -> CredentialIssuer {
        let config =
            StorageConfig::new("us-east-1", "photos", keys()).with_endpoint(Some(server.uri()));
        CredentialIssuer::from_config(config).expect("should create issuer")
    }

    fn port_of(server: &MockServer) -> u16 {
        server.address().port()
    }

    #[test]
    fn test_upload_credential_virtual_hosted() {
        let config = StorageConfig::new("eu-west-1", "photos", keys());
        let issuer = CredentialIssuer::from_config(config).expect("should create issuer");

        let credential = issuer
            .issue_upload_credential(&ObjectKey::new("photo.jpg"), "image/jpeg")
            .unwrap();

        assert_eq!(credential.signed_url, "https://photos.s3.eu-west-1.amazonaws.com/");
        assert_eq!(credential.fields["key"], "photo.jpg");
        assert!(credential.fields.contains_key("Policy"));
        assert!(credential.fields.contains_key("X-Amz-Signature"));
    }

    #[tokio::test]
    async fn test_upload_credential_rewritten_for_emulator() {
        let server = MockServer::start().await;
        let issuer = emulator_issuer(&server);

        let credential = issuer
            .issue_upload_credential(&ObjectKey::new("photo.jpg"), "image/jpeg")
            .unwrap();

        assert_eq!(
            credential.signed_url,
            format!("http://localhost:{}/photos", port_of(&server))
        );
    }

    #[tokio::test]
    async fn test_download_prefers_existing_variant() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/photos/photo.jpg.webp"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/webp"))
            .mount(&server)
            .await;
        let issuer = emulator_issuer(&server);

        let credential = issuer
            .issue_download_credential(&ObjectKey::new("photo.jpg"))
            .await
            .unwrap();

        let prefix = format!("http://localhost:{}/photos/photo.jpg.webp?", port_of(&server));
        assert!(
            credential.signed_url.starts_with(&prefix),
            "unexpected url: {}",
            credential.signed_url
        );
        assert!(credential.signed_url.contains("X-Amz-Expires=3600"));
    }

    #[tokio::test]
    async fn test_download_falls_back_when_variant_missing() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/photos/photo.jpg.webp"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let issuer = emulator_issuer(&server);

        assert_eq!(
            issuer
                .object_presence(&ObjectKey::new("photo.jpg.webp"))
                .await
                .unwrap(),
            ObjectPresence::NotFound
        );

        let credential = issuer
            .issue_download_credential(&ObjectKey::new("photo.jpg"))
            .await
            .unwrap();

        let prefix = format!("http://localhost:{}/photos/photo.jpg?", port_of(&server));
        assert!(
            credential.signed_url.starts_with(&prefix),
            "unexpected url: {}",
            credential.signed_url
        );
    }

    #[tokio::test]
    async fn test_variant_lookup_failure_falls_back_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let issuer = emulator_issuer(&server);

        let key = ObjectKey::new("cat.png");
        assert!(issuer.object_presence(&key.variant(".webp")).await.is_err());
        assert_eq!(issuer.resolve_download_key(&key).await, key);
    }

    #[tokio::test]
    async fn test_upload_and_download_address_the_same_object() {
        let server = MockServer::start().await;
        let issuer = emulator_issuer(&server);

        for raw in ["a//b.jpg", "/a/b.jpg", " a/b.jpg"] {
            let upload = issuer
                .issue_upload_credential(&ObjectKey::new(raw), "image/jpeg")
                .unwrap();
            assert_eq!(upload.fields["key"], "a/b.jpg");

            let download = issuer
                .issue_download_credential(&ObjectKey::new(raw))
                .await
                .unwrap();
            let prefix = format!("http://localhost:{}/photos/a/b.jpg?", port_of(&server));
            assert!(
                download.signed_url.starts_with(&prefix),
                "unexpected url for {raw:?}: {}",
                download.signed_url
            );
        }
    }

    #[tokio::test]
    async fn test_directory_keys_are_rejected() {
        let server = MockServer::start().await;
        let issuer = emulator_issuer(&server);

        assert!(matches!(
            issuer.issue_upload_credential(&ObjectKey::new("dir/"), "image/jpeg"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            issuer.issue_download_credential(&ObjectKey::new("dir/")).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_access_keys_fail_both_credentials() {
        let server = MockServer::start().await;
        let config = StorageConfig::new("eu-west-1", "photos", AccessKeys::new("", ""))
            .with_endpoint(Some(server.uri()));
        let issuer = CredentialIssuer::from_config(config).expect("should create issuer");
        let key = ObjectKey::new("photo.jpg");

        assert!(matches!(
            issuer.issue_upload_credential(&key, "image/jpeg"),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            issuer.issue_download_credential(&key).await,
            Err(StorageError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_download_without_endpoint_is_not_rewritten() {
        let config = StorageConfig::new("eu-west-1", "photos", keys());
        let issuer = CredentialIssuer::from_config(config).expect("should create issuer");

        let url = issuer
            .presign_download(&ObjectKey::new("photo.jpg"))
            .await
            .unwrap();

        assert!(url.starts_with("https://"), "unexpected url: {url}");
        assert!(!url.contains("localhost"));
        assert!(url.contains("photo.jpg"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }
}
