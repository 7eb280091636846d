//! Bucket Audit - periodic object-storage encryption audit
//!
//! Runs the audit loop in the background and serves its latest report over HTTP.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bucket_audit::api::{create_router, AppState};
use bucket_audit::audit::Auditor;
use bucket_audit::storage::InventoryFactory;
use bucket_audit::{spawn_audit_task, Config};

/// Main entry point for the audit service.
///
/// # Startup Sequence
/// 1. Parse configuration from flags and environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Build the auditor with its client and region caches
/// 4. Start background audit task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    info!("Starting bucket audit service");
    info!(
        "Configuration loaded: interval={}s, region={}, inventory={}, client_cache={}/{}s, region_cache={}/{}s, port={}",
        config.audit_interval,
        config.default_region,
        config.inventory_path.display(),
        config.client_cache_max_entries,
        config.client_cache_ttl,
        config.region_cache_max_entries,
        config.region_cache_ttl,
        config.server_port
    );

    let factory = Arc::new(InventoryFactory::from_path(
        &config.inventory_path,
        &config.default_region,
    ));
    let state = AppState::new(Auditor::from_config(factory, &config));
    info!("Auditor initialized");

    let audit_handle = spawn_audit_task(
        state.auditor.clone(),
        state.latest.clone(),
        config.audit_interval,
    );
    info!("Background audit task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(audit_handle))
        .await
        .context("server terminated unexpectedly")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over the level flags.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directives()));
    let registry = tracing_subscriber::registry().with(filter);

    match &config.log_to_file {
        Some(path) => {
            println!("logging to {}", path.display());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => registry.with(fmt::layer()).init(),
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the audit task and allows graceful shutdown.
async fn shutdown_signal(audit_handle: tokio::task::JoinHandle<()>) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    audit_handle.abort();
    warn!("Audit task aborted");
}
