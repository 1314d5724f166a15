//! Server lifecycle: build the executor, serve the router, shut down.
//!
//! 1. Build the executor for the configured backend (the Postgres pool
//!    connects lazily)
//! 2. Probe the database in the background and log the result
//! 3. Serve the API until Ctrl-C or SIGTERM
//! 4. Drain in-flight requests, then close the pool

use std::net::SocketAddr;
use std::sync::Arc;

use cadeira_api::{ApiConfig, build_router};
use cadeira_store::{CadeiraStore, MemoryExecutor, PgExecutor, QueryExecutor};
use tracing::{error, info, warn};

use crate::config::{Backend, Settings};

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    info!("cadeirad starting");

    // ── Executor ───────────────────────────────────────────────
    let pool = match &settings.backend {
        Backend::Postgres(pg) => Some(PgExecutor::connect_lazy(pg)),
        Backend::Memory => None,
    };
    let executor: Arc<dyn QueryExecutor> = match &pool {
        Some(pool) => Arc::new(pool.clone()),
        None => {
            info!("serving from in-memory table");
            Arc::new(MemoryExecutor::new())
        }
    };
    let store = CadeiraStore::new(executor);

    // Reported but never fatal: requests fail with 500 until the database is up.
    let ping_store = store.clone();
    tokio::spawn(async move {
        match ping_store.ping().await {
            Ok(now) => info!(%now, "database connected"),
            Err(e) => error!(error = %e, "database connection check failed"),
        }
    });

    // ── API server ─────────────────────────────────────────────
    let router = build_router(store, &ApiConfig { cors: settings.cors });
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, cors = settings.cors, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("cadeirad stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
