//! Engine binary for the Headcount RSVP service.
//!
//! This is the main entry point that wires together the hot and cold
//! stores, the NATS change listener, and the Observer API. It loads
//! configuration, initializes all subsystems, and consumes change events
//! until shutdown.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `headcount-config.yaml`
//! 3. Build the hot store (`Dragonfly` or in-memory)
//! 4. Connect the archive and run migrations; rebuild if configured
//! 5. Connect to NATS
//! 6. Open the upload blob store
//! 7. Start the Observer API server
//! 8. Consume change events until the stream closes or `Ctrl-C`

mod config;
mod error;
mod listener;
mod publish;

use std::path::Path;
use std::sync::Arc;

use headcount_core::{BlobStore, ResponseStore, SummaryStore, fold_summary};
use headcount_db::{
    DragonflyPool, DragonflySummaryStore, FsBlobStore, MemoryStore, PostgresPool, ResponseArchive,
};
use headcount_observer::{AppState, spawn_observer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ServiceConfig, StoreBackend};
use crate::error::EngineError;
use crate::listener::{ChangeDispatcher, ChangeListener};
use crate::publish::NatsChangePublisher;

/// Application entry point for the engine.
///
/// Initializes all subsystems and consumes change events. Returns an
/// error code on failure.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("headcount-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        observer_port = config.observer.port,
        backend = ?config.store.backend,
        rebuild_on_start = config.store.rebuild_on_start,
        "Configuration loaded"
    );

    // 3. Build the hot store.
    let (summaries, responses): (Arc<dyn SummaryStore>, Arc<dyn ResponseStore>) =
        match config.store.backend {
            StoreBackend::Dragonfly => {
                let pool = DragonflyPool::connect(&config.infrastructure.dragonfly_url)
                    .await
                    .map_err(EngineError::from)?;
                let summary_store: Arc<dyn SummaryStore> =
                    Arc::new(DragonflySummaryStore::new(pool.clone()));
                (summary_store, Arc::new(pool))
            }
            StoreBackend::Memory => {
                warn!("using the in-memory store; state is lost on restart");
                let store = Arc::new(MemoryStore::new());
                let summary_store: Arc<dyn SummaryStore> = store.clone();
                (summary_store, store)
            }
        };
    info!("Hot store ready");

    // 4. Connect the archive and rebuild if configured.
    let archive_pool = match &config.infrastructure.postgres_url {
        Some(url) => {
            let pg = PostgresPool::connect_url(url)
                .await
                .map_err(EngineError::from)?;
            pg.run_migrations().await.map_err(EngineError::from)?;
            Some(pg)
        }
        None => {
            info!("no postgres_url configured, archive disabled");
            None
        }
    };

    if config.store.rebuild_on_start {
        if let Some(pg) = &archive_pool {
            rebuild_summary(pg, summaries.as_ref()).await?;
        } else {
            warn!("rebuild_on_start set but the archive is disabled, skipping");
        }
    }

    // 5. Connect to NATS.
    let change_listener = ChangeListener::connect(&config.infrastructure.nats_url).await?;
    let publisher = Arc::new(NatsChangePublisher::new(change_listener.client()));

    // 6. Open the upload blob store.
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.uploads.blob_root));

    // 7. Start the Observer API server.
    let state = Arc::new(AppState::new(
        Arc::clone(&summaries),
        responses,
        publisher,
    ));
    let _observer_handle = spawn_observer(config.observer.port, Arc::clone(&state))
        .await
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(port = config.observer.port, "Observer API server started");

    // 8. Consume change events.
    let subscriber = change_listener.subscribe().await?;
    let dispatcher = ChangeDispatcher::new(summaries, blobs, archive_pool, state);

    tokio::select! {
        () = dispatcher.run(subscriber) => {
            info!("change stream closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("headcount-engine shutdown complete");
    Ok(())
}

/// Load the service configuration from `headcount-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides apply either way.
fn load_config() -> Result<ServiceConfig, EngineError> {
    let config_path = Path::new("headcount-config.yaml");
    if config_path.exists() {
        let config = ServiceConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        let mut config = ServiceConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// Rebuild the aggregate from the archive and replace the live document.
async fn rebuild_summary(
    pg: &PostgresPool,
    summaries: &dyn SummaryStore,
) -> Result<(), EngineError> {
    let archive = ResponseArchive::new(pg.pool());
    let records = archive.fetch_all().await.map_err(EngineError::from)?;
    let rebuilt = fold_summary(&records);
    summaries
        .replace(&rebuilt)
        .await
        .map_err(EngineError::from)?;
    info!(
        responses = records.len(),
        attendee_count = rebuilt.attendee_count,
        "aggregate rebuilt from archive"
    );
    Ok(())
}
