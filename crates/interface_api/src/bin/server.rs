//! Billing API server binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, default configuration
//! cargo run --bin billing-api
//!
//! # PostgreSQL store
//! API_DATABASE_URL=postgres://... API_JWT_SECRET=... cargo run --bin billing-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret shared with the identity provider
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string; unset means in-memory
//! * `API_LOG_LEVEL` - trace, debug, info, warn or error (default: info)
//! * `API_TIMEZONE` - business timezone (default: America/Sao_Paulo)
//! * `API_CURRENCY` - BRL, USD or EUR (default: BRL)
//! * `API_GRACE_DAYS` / `API_APPROACHING_WINDOW` - banner windows (default: 5 / 4)
//! * `API_POLL_INTERVAL_SECS` - pending verification poll (default: 15)

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{create_pool, ensure_schema, DatabaseConfig};
use interface_api::{
    config::ApiConfig, create_router, monitor::PendingVerificationMonitor, AppState, Stores,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting billing API server"
    );

    let stores = open_stores(&config).await?;
    let poll_interval = config.poll_interval();
    let addr: SocketAddr = config.server_addr().parse()?;

    let state = AppState::new(config, stores)?;
    let monitor = PendingVerificationMonitor::spawn(state.subscription.clone(), poll_interval);
    let state = state.with_notifications(monitor.subscribe());

    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor.shutdown().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// PostgreSQL when a database URL is configured, in-memory otherwise
async fn open_stores(config: &ApiConfig) -> anyhow::Result<Stores> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("API_DATABASE_URL not set; using the in-memory store");
        return Ok(Stores::in_memory());
    };

    tracing::info!("Connecting to database...");
    let pool = create_pool(DatabaseConfig::new(url))
        .await
        .context("database connection failed")?;
    ensure_schema(&pool)
        .await
        .context("entity_records schema setup failed")?;
    tracing::info!("Database ready");

    Ok(Stores::postgres(pool))
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
