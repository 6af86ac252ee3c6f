use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info, warn};

use coursegrid::catalog::{self, Catalog, Normalizer};
use coursegrid::config::AppConfig;
use coursegrid::selection::{
    MemorySnapshotStore, SelectionStore, SnapshotStore, SqliteSnapshotStore,
};
use coursegrid::server;
use coursegrid::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path =
        std::env::var("COURSEGRID_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = match AppConfig::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            info!("No config at {config_path} ({e}); using defaults");
            AppConfig::default()
        }
    };

    // The one-shot catalog load. A failure is survivable: everything
    // downstream operates on an empty catalog.
    let normalizer = Normalizer::new(config.priority_fields.clone());
    let client = reqwest::Client::new();
    let catalog = match catalog::load_catalog(&client, &config.catalog_source, &normalizer).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Catalog load failed: {e}; continuing with an empty catalog");
            Catalog::empty()
        }
    };

    let snapshot_store: Box<dyn SnapshotStore> =
        match SqliteSnapshotStore::open(&config.snapshot_path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("Snapshot storage unavailable ({e}); selections will not persist");
                Box::new(MemorySnapshotStore::default())
            }
        };
    let selection = SelectionStore::restore(
        snapshot_store,
        Duration::days(config.snapshot_ttl_days),
        &config.base_terms,
    );

    let address = format!("{}:{}", config.address, config.port);
    let state = Arc::new(AppState::new(catalog, selection, config));
    let router = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {address}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
