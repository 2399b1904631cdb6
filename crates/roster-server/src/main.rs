#![doc = include_str!("../README.md")]

mod server;

use std::sync::Arc;

use clap::Parser;
use roster_core::dispatch::WorkerPool;
use tokio::net::TcpListener;
use tokio::signal;

use server::config::{CliArgs, ServerConfig};
use server::service::{self, AppState};
use server::{store, telemetry};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    telemetry::init();

    let repo = store::connect(&config).await?;

    // The one process-wide pool: built here, injected into the handlers,
    // torn down after the listener drains.
    let pool = Arc::new(WorkerPool::new(config.num_workers, config.queue_capacity));

    let state = AppState {
        pool: Arc::clone(&pool),
        repo: Arc::new(repo),
        config: config.clone(),
    };
    let app = service::router(state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.shutdown().await;
    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting roster service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting roster service on {} with {} workers",
            config.server_addr,
            config.num_workers
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
