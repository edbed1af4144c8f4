//! Credential issuance for direct-to-storage uploads using Apache OpenDAL.
//!
//! The backend never sees file bytes. It signs credentials and the client
//! talks to the object store directly:
//!
//! ```text
//! ┌────────┐  POST /file         ┌──────────────────┐
//! │ client │ ──────────────────▶ │ CredentialIssuer │  policy + SigV4 signature
//! │        │ ◀────────────────── │                  │
//! │        │  multipart POST     └──────────────────┘
//! │        │ ──────────────────▶ object store (enforces size / type)
//! │        │  GET /file/{key}    ┌──────────────────┐
//! │        │ ──────────────────▶ │ CredentialIssuer │  stat(<key>.webp)
//! │        │ ◀────────────────── │                  │  op.presign_read(...)
//! └────────┘                     └──────────────────┘
//! ```

mod config;
mod endpoint;
mod error;
mod key;
mod post_policy;
mod service;

pub use config::{AccessKeys, StorageConfig};
pub use endpoint::{LOCAL_HOST, rewrite_to_localhost};
pub use error::StorageError;
pub use key::normalize_key;
pub use post_policy::{ALGORITHM, PolicyCondition, PostPolicy, presign_post, signing_key};
pub use service::{CredentialIssuer, ObjectPresence};
