//! imgdrop command-line client
//!
//! Uploads an image straight to storage using a credential from the API, and
//! shows stored images through signed download URLs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgdrop_client::{ApiClient, ImageView, SelectedFile, UploadForm, UploadState};
use imgdrop_shared::ObjectKey;

#[derive(Debug, Parser)]
#[command(name = "imgdrop", version, about = "Direct-to-storage image uploads")]
struct Cli {
    /// Base URL of the imgdrop API.
    #[arg(long, env = "IMGDROP_API_ENDPOINT", default_value = "http://localhost:8080")]
    api: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image file.
    Upload {
        /// File to upload; its name becomes the object key.
        path: PathBuf,
        /// Show the image after a successful upload.
        #[arg(long)]
        show: bool,
    },
    /// Print a signed URL for a stored image.
    Show {
        /// Object key (the uploaded file name).
        key: String,
        /// Also write an HTML page displaying the image.
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgdrop=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api)?;

    match cli.command {
        Command::Upload { path, show } => {
            let Some(key) = upload(&api, &path).await? else {
                std::process::exit(1);
            };
            if show {
                display(&api, &key, None).await?;
            }
        }
        Command::Show { key, html } => display(&api, &ObjectKey::new(key), html).await?,
    }

    Ok(())
}

/// Runs one upload attempt, printing progress. `None` means it failed.
async fn upload(api: &ApiClient, path: &Path) -> anyhow::Result<Option<ObjectKey>> {
    let file = SelectedFile::from_path(path).await?;
    debug!(name = %file.name, content_type = %file.content_type, size = file.bytes.len(), "File selected");

    let mut form = UploadForm::new(api.clone());
    form.select(file);

    let mut progress = form.subscribe();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            if let UploadState::Uploading { percent } = *progress.borrow_and_update() {
                eprint!("\rUploading... {percent:>3}%");
            }
        }
    });

    let outcome = form.submit().await;
    let message = form.message().unwrap_or_default();
    drop(form);
    printer.await.ok();
    eprintln!();

    match outcome {
        Ok(key) => {
            println!("{message}: {key}");
            Ok(Some(key))
        }
        Err(_) => {
            eprintln!("{message}");
            Ok(None)
        }
    }
}

async fn display(api: &ApiClient, key: &ObjectKey, html: Option<PathBuf>) -> anyhow::Result<()> {
    let view = ImageView::fetch(api, key).await?;
    debug!(key = %view.key(), url = %view.signed_url(), "Download credential received");
    println!("{}", view.render_text());

    if let Some(path) = html {
        tokio::fs::write(&path, view.render_html()?)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
