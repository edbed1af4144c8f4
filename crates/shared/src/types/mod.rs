//! Common types used across the application.

pub mod credential;
pub mod key;

pub use credential::{DownloadCredential, IssueUploadRequest, UploadCredential};
pub use key::ObjectKey;
