//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, worker spawning, and Axum server lifecycle.

use crate::config::{Config, DatabaseConfig, StorageBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::persistence::{MemoryStore, PgLinkRepository, PgStatsRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::geoip::{GeoLookup, MaxMindLookup};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;

type Repositories = (Arc<dyn LinkRepository>, Arc<dyn StatsRepository>);

/// Connects to PostgreSQL, applies migrations, and builds the repositories.
async fn postgres_repositories(db: &DatabaseConfig) -> Result<Repositories> {
    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout)
        .idle_timeout(db.idle_timeout)
        .max_lifetime(db.max_lifetime)
        .connect(&db.url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let stats: Arc<dyn StatsRepository> = Arc::new(PgStatsRepository::new(pool));
    Ok((links, stats))
}

fn memory_repositories() -> Repositories {
    tracing::warn!("Using in-memory storage; data is lost on restart");
    let store = Arc::new(MemoryStore::new());
    let links: Arc<dyn LinkRepository> = store.clone();
    let stats: Arc<dyn StatsRepository> = store;
    (links, stats)
}

/// Opens the GeoIP database, or returns `None` so clicks are located as `Unknown`.
fn geo_lookup(path: Option<&Path>) -> Option<Arc<dyn GeoLookup>> {
    let path = path?;
    match MaxMindLookup::open(path) {
        Ok(lookup) => {
            tracing::info!(path = %path.display(), "GeoIP database loaded");
            Some(Arc::new(lookup))
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "GeoIP disabled, locations will be Unknown");
            None
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link and click storage (PostgreSQL with migrations, or in-memory)
/// - Optional GeoIP database
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (links, stats) = match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(db)) => postgres_repositories(db).await?,
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("DATABASE_URL is required when STORAGE=postgres")
        }
        (StorageBackend::Memory, _) => memory_repositories(),
    };

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let geo = geo_lookup(config.geoip_db_path.as_deref());

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        stats.clone(),
        links.clone(),
        geo,
    ));
    tracing::info!("Click worker started");

    let state = AppState::new(
        links,
        stats,
        config.allocator,
        &config.base_url,
        click_tx,
        config.behind_proxy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Dropping the router closed the click channel; let the worker drain it.
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Click worker terminated abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
