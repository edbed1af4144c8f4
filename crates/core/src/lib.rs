//! Core credential issuance for imgdrop.
//!
//! This crate turns object keys into time-limited storage credentials. It has
//! no web dependencies; the API crate exposes it over HTTP.
//!
//! # Modules
//!
//! - `storage` - Presigned upload policies and download URLs

pub mod storage;
