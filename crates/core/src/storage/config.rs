//! Storage configuration types.

use std::fmt;

use imgdrop_shared::StorageSettings;

use super::error::StorageError;

/// Static access keys used to sign credentials.
#[derive(Clone)]
pub struct AccessKeys {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary (STS) credentials.
    pub session_token: Option<String>,
}

impl AccessKeys {
    /// Create long-lived access keys.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Fail unless both the access key ID and the secret are set.
    pub fn ensure_complete(&self) -> Result<(), StorageError> {
        if self.access_key_id.trim().is_empty() {
            return Err(StorageError::configuration("access key ID is not set"));
        }
        if self.secret_access_key.is_empty() {
            return Err(StorageError::configuration("secret access key is not set"));
        }
        Ok(())
    }
}

impl fmt::Debug for AccessKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Credential issuer configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Custom endpoint (storage emulator). Enables path-style addressing and
    /// rewriting of returned URLs to `localhost`.
    pub endpoint: Option<String>,
    /// Signing credentials.
    pub credentials: AccessKeys,
    /// Maximum upload size in bytes, enforced by the signed policy.
    pub max_file_size: u64,
    /// Upload credential lifetime in seconds.
    pub upload_ttl_secs: u64,
    /// Download credential lifetime in seconds.
    pub download_ttl_secs: u64,
    /// Required prefix of the uploaded `Content-Type`.
    pub content_type_prefix: String,
    /// Suffix of the preferred variant of an object.
    pub variant_suffix: String,
}

impl StorageConfig {
    /// Default max file size: 5MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
    /// Default upload TTL: 1 hour.
    pub const DEFAULT_UPLOAD_TTL: u64 = 3600;
    /// Default download TTL: 1 hour.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 3600;
    /// Only images may be uploaded.
    pub const DEFAULT_CONTENT_TYPE_PREFIX: &'static str = "image/";
    /// Compressed variants are stored next to the original as `<key>.webp`.
    pub const DEFAULT_VARIANT_SUFFIX: &'static str = ".webp";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(region: impl Into<String>, bucket: impl Into<String>, credentials: AccessKeys) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            endpoint: None,
            credentials,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            upload_ttl_secs: Self::DEFAULT_UPLOAD_TTL,
            download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
            content_type_prefix: Self::DEFAULT_CONTENT_TYPE_PREFIX.to_string(),
            variant_suffix: Self::DEFAULT_VARIANT_SUFFIX.to_string(),
        }
    }

    /// Build the config from loaded application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let mut credentials =
            AccessKeys::new(&settings.access_key_id, &settings.secret_access_key);
        if let Some(token) = settings.session_token() {
            credentials = credentials.with_session_token(token);
        }

        Self::new(&settings.region, &settings.bucket, credentials)
            .with_endpoint(settings.endpoint())
    }

    /// Set a custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Option<impl Into<String>>) -> Self {
        self.endpoint = endpoint.map(Into::into);
        self
    }

    /// Set upload credential TTL.
    #[must_use]
    pub fn with_upload_ttl(mut self, secs: u64) -> Self {
        self.upload_ttl_secs = secs;
        self
    }

    /// Whether a custom endpoint is configured.
    #[must_use]
    pub fn uses_custom_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Form-post target for uploads.
    ///
    /// Path-style (`{endpoint}/{bucket}`) with a custom endpoint, virtual-hosted
    /// otherwise.
    #[must_use]
    pub fn post_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AccessKeys {
        AccessKeys::new("AKIDEXAMPLE", "secret")
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new("us-east-1", "photos", keys());
        assert_eq!(config.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.upload_ttl_secs, 3600);
        assert_eq!(config.download_ttl_secs, 3600);
        assert_eq!(config.content_type_prefix, "image/");
        assert_eq!(config.variant_suffix, ".webp");
        assert!(!config.uses_custom_endpoint());
    }

    #[test]
    fn test_post_url_virtual_hosted() {
        let config = StorageConfig::new("eu-west-1", "photos", keys());
        assert_eq!(config.post_url(), "https://photos.s3.eu-west-1.amazonaws.com/");
    }

    #[test]
    fn test_post_url_path_style() {
        let config = StorageConfig::new("us-east-1", "photos", keys())
            .with_endpoint(Some("http://localstack:4566/"));
        assert!(config.uses_custom_endpoint());
        assert_eq!(config.post_url(), "http://localstack:4566/photos");
    }

    #[test]
    fn test_access_keys_must_be_complete() {
        assert!(keys().ensure_complete().is_ok());
        assert!(matches!(
            AccessKeys::new("", "secret").ensure_complete(),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            AccessKeys::new("AKIDEXAMPLE", "").ensure_complete(),
            Err(StorageError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings {
            region: "us-east-1".into(),
            bucket: "photos".into(),
            endpoint: Some(String::new()),
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "secret".into(),
            session_token: Some("token".into()),
        };

        let config = StorageConfig::from_settings(&settings);
        assert_eq!(config.endpoint, None);
        assert_eq!(config.credentials.session_token.as_deref(), Some("token"));
    }
}
