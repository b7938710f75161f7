use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timeline_quiz_core::{
    create_mailing_system, create_snapshot_writer, firearms, load_catalog, load_config,
    validate_config, HttpMailingList, ItemCatalog, MailingList, MailingListHandle,
    SnapshotStorage, SqliteSnapshotStorage,
};
use timeline_quiz_server::{api::create_router, sessions::run_idle_eviction, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for queued snapshot writes
const SNAPSHOT_BUFFER_SIZE: usize = 1000;

/// Buffer size for mailing-list subscriptions
const MAILING_BUFFER_SIZE: usize = 100;

/// How often idle sessions are swept from memory
const EVICTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TIMELINE_QUIZ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!("Database path: {:?}", config.database.path);

    // Load items
    let catalog: ItemCatalog = match &config.quiz.items_path {
        Some(path) => load_catalog(path)
            .with_context(|| format!("Failed to load items from {:?}", path))?,
        None => {
            info!("No items file configured, using built-in items");
            firearms()
        }
    };
    info!("Loaded {} quiz items", catalog.len());

    // Snapshot storage, written in the background
    let sqlite: Arc<dyn SnapshotStorage> = Arc::new(
        SqliteSnapshotStorage::new(&config.database.path)
            .context("Failed to create snapshot storage")?,
    );
    let (storage, snapshot_writer) = create_snapshot_writer(sqlite, SNAPSHOT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(snapshot_writer.run());
    info!("Snapshot storage initialized");

    // Mailing list, if configured
    let (mailing, worker_handle) = match &config.mailing_list {
        Some(mailing_config) => {
            let list: Arc<dyn MailingList> = Arc::new(
                HttpMailingList::new(mailing_config).context("Failed to create mailing list")?,
            );
            info!("Mailing list enabled ({})", list.name());
            let (handle, worker) = create_mailing_system(list, MAILING_BUFFER_SIZE);
            (handle, Some(tokio::spawn(worker.run())))
        }
        None => {
            info!("No mailing list configured");
            (MailingListHandle::disabled(), None)
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(catalog),
        Arc::new(storage),
        mailing,
    ));

    // Sweep idle sessions in the background
    let idle_timeout = Duration::from_secs(u64::from(config.server.session_idle_minutes) * 60);
    let eviction_handle = tokio::spawn(run_idle_eviction(
        Arc::clone(&state),
        idle_timeout,
        EVICTION_SWEEP_INTERVAL.min(idle_timeout),
    ));
    info!(
        "Idle sessions are evicted after {} minutes",
        config.server.session_idle_minutes
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Once serve returns and the sweeper is gone, every session, queue handle
    // and mailing handle is dropped, so both background tasks drain and exit.
    info!("Server shutting down...");

    eviction_handle.abort();
    let _ = eviction_handle.await;

    let _ = writer_handle.await;
    info!("Snapshot writer stopped");

    if let Some(worker_handle) = worker_handle {
        let _ = worker_handle.await;
        info!("Mailing list worker stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
