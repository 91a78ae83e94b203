//! DisPlan Board Server
//!
//! Reference service backing the board editor's stores over HTTP.
//!
//! ## Routes
//!
//! - `GET /health`
//! - `GET|PUT /boards/{id}/state`: full canvas snapshot
//! - `GET|POST /boards/{id}/comments`: comment list, create `{x, y, text, authorEmail}`
//! - `GET /boards/{id}/comments/ws`: WebSocket streaming each new comment as JSON

mod app;
mod config;

use app::AppState;
use config::ServerConfig;
use displan_core::{FileStorage, MemoryStorage};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "displan_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let state = match &config.data_dir {
        Some(dir) => {
            let storage = Arc::new(FileStorage::new(dir.clone())?);
            info!("Storing boards under {}", storage.base_path().display());
            AppState::new(storage.clone(), storage)
        }
        None => {
            info!("No DISPLAN_DATA_DIR set, boards are kept in memory");
            let storage = Arc::new(MemoryStorage::new());
            AppState::new(storage.clone(), storage)
        }
    };

    let app = app::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("DisPlan board server listening on {}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
