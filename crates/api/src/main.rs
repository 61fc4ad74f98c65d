//! Credit API - credit approval scoring service
//!
//! Loads the trained model artifacts once at startup and serves
//! predictions over HTTP.

use anyhow::Result;
use credit_api::{api, config};
use scoring_lib::{ArtifactStore, InferenceDispatcher, ServiceLogger, ServiceMetrics};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting credit-api");

    let config = config::ApiConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        artifact_dir = %config.artifact_dir.display(),
        "Service configured"
    );

    // Artifacts are read once; the store is immutable from here on
    let store = Arc::new(ArtifactStore::load(&config.artifact_dir));

    let metrics = ServiceMetrics::new();
    metrics.set_artifacts(&store);

    let logger = ServiceLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &store);

    let app_state = Arc::new(api::AppState::new(
        InferenceDispatcher::new(store),
        metrics,
        logger.clone(),
    ));

    api::serve(&config.bind_addr(), app_state, shutdown_signal()).await?;

    logger.log_shutdown("signal received");
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
