//! Storage error types.

use imgdrop_shared::AppError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Presign operation not supported by provider.
    #[error("presign operation not supported by storage provider")]
    PresignNotSupported,

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Policy signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The object key cannot address an object in the store.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// A URL returned by the provider could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Convert an OpenDAL error raised while operating on `key`.
    pub(crate) fn from_opendal(key: &str, err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: key.to_string(),
            },
            opendal::ErrorKind::Unsupported => Self::PresignNotSupported,
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::InvalidKey(_) => Self::Validation(err.to_string()),
            StorageError::PresignNotSupported
            | StorageError::Configuration(_)
            | StorageError::Signing(_) => Self::Configuration(err.to_string()),
            StorageError::Operation(_) => Self::ExternalService(err.to_string()),
            StorageError::InvalidUrl(_) => Self::Internal(err.to_string()),
        }
    }
}
