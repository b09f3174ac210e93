use anyhow::{Context, Result};
use clap::Parser;
use roomtemp::api::{create_app, COLLECT_ENDPOINT};
use roomtemp::cli::Opts;
use roomtemp::config::load_config;
use roomtemp::refresh::Refresher;
use roomtemp::store::EntityStore;
use roomtemp::upstream::StatusClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomtemp=info,tower_http=info".into()),
        )
        .init();

    info!("roomtemp starting...");

    let mut config = load_config(&opts.config)?;
    config.apply_env_overrides();
    opts.apply(&mut config);
    config.validate().context("invalid configuration")?;

    if config.filter.include_entities.is_empty() {
        warn!("No include_entities configured, the report will stay empty");
    }

    info!(
        includes = config.filter.include_entities.len(),
        excludes = config.filter.exclude_entities.len(),
        ttl_secs = config.cache.ttl_seconds,
        interval_secs = config.refresh.interval_seconds,
        "Configuration loaded"
    );

    let store = Arc::new(EntityStore::new(config.cache.ttl()));

    let client = StatusClient::new(
        config.upstream.status_url.clone(),
        config.upstream.auth_token.clone(),
    )
    .context("Failed to build upstream HTTP client")?;
    info!(status_url = %client.status_url(), "Upstream status client ready");

    // Start background refresh
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = Refresher::new(
        Arc::new(client),
        Arc::clone(&store),
        config.filter.clone(),
        config.refresh.interval(),
    );
    let refresh_status = refresher.status_handle();
    let refresh_handle = refresher.start(shutdown_rx);

    // Start HTTP server
    let router = create_app(Arc::clone(&store));
    let listen_addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!(addr = %listen_addr, endpoint = COLLECT_ENDPOINT, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Graceful shutdown
    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh_handle.await {
        warn!(error = %e, "Refresh task ended abnormally");
    }
    {
        let status = refresh_status.read().unwrap_or_else(|e| e.into_inner());
        info!(
            refresh_count = status.refresh_count,
            error_count = status.error_count,
            last_refresh = ?status.last_refresh,
            last_error = ?status.last_error,
            "Refresh summary"
        );
    }
    info!("roomtemp stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl_c signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
