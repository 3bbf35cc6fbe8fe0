//! checkin-gateway server entry point.
//!
//! Opens the registrant store once, optionally seeds it, and starts the
//! Axum HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use checkin_gateway::app_state::AppState;
use checkin_gateway::config::{CheckinConfig, LogFormat};
use checkin_gateway::service::provisioning::{self, ProvisioningService};
use checkin_gateway::service::CheckinService;
use checkin_gateway::store::RegistrantStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = CheckinConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        store = %config.store_backend,
        "starting checkin-gateway"
    );

    // Open the store once for the life of the process
    let store = checkin_gateway::open_store(&config)
        .await
        .context("opening registrant store")?;

    if let Some(seed_file) = &config.seed_file {
        seed(&config, Arc::clone(&store), seed_file).await?;
    }

    let app_state = AppState::new(CheckinService::new(store));
    let app = checkin_gateway::build_app(
        app_state,
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Provisions the registrants listed in `seed_file` and writes the token
/// export next to the configured path.
async fn seed(
    config: &CheckinConfig,
    store: Arc<dyn RegistrantStore>,
    seed_file: &std::path::Path,
) -> anyhow::Result<()> {
    let entries = provisioning::load_seed_file(seed_file).await?;
    let report = ProvisioningService::new(store).seed(&entries).await;
    let rows = provisioning::export_tokens(&config.public_base_url, &report.created);
    provisioning::write_export(&config.seed_export_path, &rows).await?;
    if !report.failed.is_empty() {
        tracing::warn!(failed = report.failed.len(), "some seed entries were not provisioned");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
