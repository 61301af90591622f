//! Server Binary - Document endpoint for the video library
//!
//! Wires up:
//! - Filesystem storage under `DATA_DIR`
//! - HTTP inbound adapter serving `GET`/`POST /api/db`

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vidshelf::adapters::local::{http, DocumentEndpoint, FsStorage};
use vidshelf::config::AppConfig;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Adapter
    let storage = Arc::new(FsStorage::new(&config.data_dir));

    // 2. HTTP Layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let endpoint = DocumentEndpoint::new(storage, config.db_key.clone());
    let app = http::router(endpoint)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // 3. Start Server
    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%address, error = %e, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    tracing::info!(
        %address,
        data_dir = %config.data_dir.display(),
        key = %config.db_key,
        "Serving library document"
    );
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}
