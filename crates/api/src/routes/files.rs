//! Upload and download credential routes.
//!
//! Both routes are stateless: they sign and return. File bytes go straight
//! from the client to the object store.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use imgdrop_shared::{AppError, IssueUploadRequest, ObjectKey};
use tracing::{error, info};

use super::error_response;
use crate::AppState;

/// Creates the file credential routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/file", post(issue_upload_credential))
        .route("/file/{object_key}", get(issue_download_credential))
}

/// POST `/file` - Issue a form-post credential for a direct upload.
///
/// `filename` becomes the object key after path normalization; `ftype` is
/// pinned in the policy.
async fn issue_upload_credential(
    State(state): State<AppState>,
    Json(payload): Json<IssueUploadRequest>,
) -> impl IntoResponse {
    let key = ObjectKey::new(payload.filename);

    match state.issuer.issue_upload_credential(&key, &payload.ftype) {
        Ok(credential) => {
            info!(key = %key, ftype = %payload.ftype, "Upload credential issued");
            (StatusCode::OK, Json(credential)).into_response()
        }
        Err(e) => {
            error!(error = %e, key = %key, "Failed to issue upload credential");
            error_response(&AppError::from(e))
        }
    }
}

/// GET `/file/{object_key}` - Issue a signed download URL.
async fn issue_download_credential(
    State(state): State<AppState>,
    Path(object_key): Path<String>,
) -> impl IntoResponse {
    let key = ObjectKey::new(object_key);

    match state.issuer.issue_download_credential(&key).await {
        Ok(credential) => {
            info!(key = %key, "Download credential issued");
            (StatusCode::OK, Json(credential)).into_response()
        }
        Err(e) => {
            error!(error = %e, key = %key, "Failed to issue download credential");
            error_response(&AppError::from(e))
        }
    }
}
