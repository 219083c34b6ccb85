//! mc-router Sync Agent
//!
//! Polls a server list API and keeps mc-router's routes in sync with it.
//!
//! # Usage
//! ```bash
//! # Continuous sync every 30 seconds
//! mc-router-sync --mc-router-host http://mc-router:8000 \
//!     --server-list-api http://api.example.com/servers
//!
//! # Authenticated server list, single pass (CronJob mode)
//! API_KEY=... mc-router-sync --mc-router-host http://mc-router:8000 \
//!     --server-list-api https://api.example.com/servers --auth-type apikey --once
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mc_router_sync::auth::{Authenticator, NoneAuth};
use mc_router_sync::config::{Args, LogFormat, SyncConfig};
use mc_router_sync::{build_authenticator, health, McRouterClient, Reconciler, ServerListClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse()
        .into_config()
        .context("Invalid configuration")?;

    init_logging(&config);

    info!(
        mc_router_host = %config.mc_router_host,
        server_list_api = %config.server_list_api,
        auth_type = %config.auth_type,
        interval_secs = config.sync_interval.as_secs(),
        dry_run = config.dry_run,
        "Starting mc-router sync agent"
    );

    let reconciler = build_reconciler(&config)?;

    if config.once {
        let report = reconciler.reconcile().await?;
        info!(
            diffs = report.diffs,
            adds = report.adds,
            deletes = report.deletes,
            dry_run = report.dry_run,
            "Single reconciliation pass complete"
        );
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.health_addr)
        .await
        .with_context(|| format!("Failed to bind health server on {}", config.health_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let health_server = tokio::spawn(health::serve(listener, shutdown_rx.clone()));

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    reconciler.start(shutdown_rx).await;

    match health_server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Health server failed"),
        Err(e) => error!(error = %e, "Health server task panicked"),
    }

    info!("mc-router sync agent stopped");
    Ok(())
}

fn build_reconciler(config: &SyncConfig) -> Result<Reconciler> {
    let auth = build_authenticator(config.auth_type, &config.api_key)
        .context("Failed to build authenticator")?;

    let router_auth: Arc<dyn Authenticator> = if config.mc_router_auth {
        auth.clone()
    } else {
        Arc::new(NoneAuth)
    };

    let server_list = ServerListClient::with_options(
        config.server_list_api.as_str(),
        auth,
        config.request_timeout,
    )
    .context("Failed to create server list client")?;

    let mc_router = McRouterClient::with_options(
        config.mc_router_host.as_str(),
        router_auth,
        config.request_timeout,
    )
    .context("Failed to create mc-router client")?;

    Ok(Reconciler::new(Arc::new(server_list), Arc::new(mc_router), config.sync_interval)
        .dry_run(config.dry_run))
}

fn init_logging(config: &SyncConfig) {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
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
