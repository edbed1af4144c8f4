//! Shared wire types, errors, and configuration for imgdrop.
//!
//! This crate provides common types used across all other crates:
//! - Object keys and the credential payloads exchanged over HTTP
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ServerConfig, StorageSettings};
pub use error::AppError;
pub use types::{DownloadCredential, IssueUploadRequest, ObjectKey, UploadCredential};
