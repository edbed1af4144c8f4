//! Client side of the direct-upload workflow.
//!
//! - `api` - Talks to the credential endpoints
//! - `upload` - Upload form state machine with progress reporting
//! - `display` - Resolves a key to a signed URL and renders it

pub mod api;
pub mod display;
pub mod error;
pub mod upload;

pub use api::ApiClient;
pub use display::ImageView;
pub use error::ClientError;
pub use upload::{SelectedFile, UploadError, UploadForm, UploadState};
