//! Upload form: select a file, fetch a credential, POST straight to storage.
//!
//! One attempt walks through
//!
//! ```text
//! Idle ─select─▶ FileSelected ─submit─▶ RequestingCredential ─▶ Uploading(0..=100)
//!   ▲                                                              │
//!   └──────────────── reset ◀──── Succeeded | Failed ◀─────────────┘
//! ```
//!
//! State changes are published on a `watch` channel so a UI can render
//! progress while `submit` is awaited.

use std::path::Path;

use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use imgdrop_shared::{ObjectKey, UploadCredential};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;

/// Shown when submitting with nothing selected.
pub const NO_FILE_MESSAGE: &str = "Please select a file first";
/// Shown for every failed attempt, whatever the cause.
pub const UPLOAD_FAILED_MESSAGE: &str = "File upload failed";
/// Shown after the store accepted the upload.
pub const UPLOAD_SUCCEEDED_MESSAGE: &str = "File uploaded successfully";

/// Name of the form part carrying the file. Must come after all policy fields.
const FILE_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name, used as the object key.
    pub name: String,
    /// MIME type sent to the store.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Create a file from in-memory contents.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, content_type, bytes))
    }
}

/// Where the current attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Nothing selected.
    Idle,
    /// A file is selected and ready to submit.
    FileSelected,
    /// Waiting for the API to issue a credential.
    RequestingCredential,
    /// Bytes are being sent to the store.
    Uploading {
        /// Share of the file handed to the transport, 0 to 100.
        percent: u8,
    },
    /// The store answered 204.
    Succeeded {
        /// Key the file was stored under.
        key: ObjectKey,
    },
    /// Any other outcome.
    Failed,
}

/// Why an attempt failed.
#[derive(Debug, Error)]
pub enum UploadError {
    /// `submit` was called with nothing selected.
    #[error("no file selected")]
    NoFileSelected,

    /// The API did not issue a credential.
    #[error("could not obtain an upload credential: {0}")]
    Credential(#[source] ClientError),

    /// The upload request itself failed.
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with something other than 204.
    #[error("storage rejected the upload with status {0}")]
    Rejected(u16),
}

impl UploadError {
    /// The message shown to the user. Every failure cause maps to the same text.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoFileSelected => NO_FILE_MESSAGE,
            Self::Credential(_) | Self::Transport(_) | Self::Rejected(_) => UPLOAD_FAILED_MESSAGE,
        }
    }
}

/// Single-file upload form.
pub struct UploadForm {
    api: ApiClient,
    file: Option<SelectedFile>,
    message: Option<&'static str>,
    state: watch::Sender<UploadState>,
}

impl UploadForm {
    /// Create an idle form.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            file: None,
            message: None,
            state: watch::Sender::new(UploadState::Idle),
        }
    }

    /// Watch state changes, including upload progress.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Message for the user after the last submit, if any.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Select a file. Starts a new attempt if the previous one finished.
    pub fn select(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.message = None;
        self.state.send_replace(UploadState::FileSelected);
    }

    /// Drop the selection and return to `Idle`.
    pub fn reset(&mut self) {
        self.file = None;
        self.message = None;
        self.state.send_replace(UploadState::Idle);
    }

    /// Request a credential and upload the selected file.
    ///
    /// Returns the object key on success. There is no retry; call `submit`
    /// again to resubmit.
    pub async fn submit(&mut self) -> Result<ObjectKey, UploadError> {
        let Some(file) = self.file.clone() else {
            self.message = Some(NO_FILE_MESSAGE);
            return Err(UploadError::NoFileSelected);
        };

        self.state.send_replace(UploadState::RequestingCredential);
        let outcome = self.upload(&file).await;

        match &outcome {
            Ok(key) => {
                info!(key = %key, size = file.bytes.len(), "Upload succeeded");
                self.message = Some(UPLOAD_SUCCEEDED_MESSAGE);
                self.state
                    .send_replace(UploadState::Succeeded { key: key.clone() });
            }
            Err(e) => {
                warn!(error = %e, file = %file.name, "Upload failed");
                self.message = Some(e.user_message());
                self.state.send_replace(UploadState::Failed);
            }
        }

        outcome
    }

    async fn upload(&self, file: &SelectedFile) -> Result<ObjectKey, UploadError> {
        let credential = self
            .api
            .request_upload_credential(&file.name, &file.content_type)
            .await
            .map_err(UploadError::Credential)?;

        self.state.send_replace(UploadState::Uploading { percent: 0 });
        let form = build_form(&credential, file, self.state.clone())?;

        let response = self
            .api
            .http()
            .post(&credential.signed_url)
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(stored_key(&credential, file)),
            status => Err(UploadError::Rejected(status.as_u16())),
        }
    }
}

/// The key the credential was signed for, which may differ from the file name
/// after normalization.
fn stored_key(credential: &UploadCredential, file: &SelectedFile) -> ObjectKey {
    credential
        .fields
        .get("key")
        .map_or_else(|| ObjectKey::new(file.name.clone()), |key| ObjectKey::new(key.clone()))
}

/// Policy fields in credential order, then the file as the last part.
fn build_form(
    credential: &UploadCredential,
    file: &SelectedFile,
    state: watch::Sender<UploadState>,
) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for (name, value) in &credential.fields {
        form = form.text(name.clone(), value.clone());
    }

    let body = reqwest::Body::wrap_stream(progress_stream(file.bytes.clone(), state));
    let mut part =
        Part::stream_with_length(body, file.bytes.len() as u64).file_name(file.name.clone());
    if !file.content_type.is_empty() {
        part = part.mime_str(&file.content_type)?;
    }

    Ok(form.part(FILE_FIELD, part))
}

/// Stream `bytes` in chunks, publishing `Uploading` progress as each chunk
/// is handed to the transport.
fn progress_stream(
    bytes: Bytes,
    state: watch::Sender<UploadState>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let total = bytes.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(total)))
        .collect();

    let mut sent = 0;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        state.send_replace(UploadState::Uploading {
            percent: percent(sent, total),
        });
        Ok(chunk)
    })
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let value = (sent as u128 * 100) / total as u128;
    u8::try_from(value.min(100)).unwrap_or(100)
}
