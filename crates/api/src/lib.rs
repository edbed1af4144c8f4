//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Credential issuance routes (`/file`)
//! - Health check
//! - Request tracing and CORS for browser clients

pub mod routes;

use axum::Router;
use imgdrop_core::storage::CredentialIssuer;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential issuer bound to the configured bucket.
    pub issuer: Arc<CredentialIssuer>,
}

impl AppState {
    /// Wrap an issuer for sharing between handlers.
    #[must_use]
    pub fn new(issuer: CredentialIssuer) -> Self {
        Self {
            issuer: Arc::new(issuer),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
