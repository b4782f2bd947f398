pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::shared::config;
use crate::shared::context::AppContext;
use crate::shared::data::{
    DocumentStore, LocalObjectStorage, MemoryDocumentStore, SqliteDocumentStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;

    let store: Arc<dyn DocumentStore> = if config.database.in_memory {
        tracing::warn!("Using in-memory document store, data is lost on shutdown");
        Arc::new(MemoryDocumentStore::new())
    } else {
        let db_path = config::get_database_path(&config);
        shared::data::db::initialize_database(Some(&db_path.to_string_lossy()))
            .await
            .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;
        Arc::new(SqliteDocumentStore::new(
            shared::data::db::get_connection().clone(),
        ))
    };

    let media_root = config::get_storage_root(&config);
    std::fs::create_dir_all(&media_root)?;
    let storage = LocalObjectStorage::new(&media_root, config.storage.public_url.clone());

    let ctx = AppContext::new(
        store,
        Arc::new(storage),
        config.listing.to_listing_config(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(ctx, &config.storage.public_url, media_root)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
