//! imgdrop API Server
//!
//! Issues upload and download credentials for the configured bucket.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgdrop_api::{AppState, create_router};
use imgdrop_core::storage::{CredentialIssuer, StorageConfig};
use imgdrop_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgdrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Create credential issuer
    let storage_config = StorageConfig::from_settings(&config.storage);
    info!(
        bucket = %storage_config.bucket,
        region = %storage_config.region,
        endpoint = storage_config.endpoint.as_deref().unwrap_or("aws"),
        "Storage configured"
    );
    let issuer = CredentialIssuer::from_config(storage_config)?;

    // Create router
    let app = create_router(AppState::new(issuer));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
