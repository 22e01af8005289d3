//! Rent Ledger - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rent-ledger-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_INVOICE_DUE_DAY=5 cargo run --bin rent-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string (falls back to `DATABASE_URL`)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_INVOICE_DUE_DAY` - Day of month rent falls due (default: 5)
//! * `API_MAX_MONTHS_ADVANCE` - Months one payment may walk through (default: 1200)
//! * `API_MAX_PAYMENT` - Largest single payment accepted (default: 100000000)
//! * `API_RECEIPT_SENDER` - Receipt prefix (default: Rent Ledger)
//! * `API_CURRENCY_LABEL` - Currency label on receipts (default: KES)
//! * `API_TIMEZONE` - IANA timezone, e.g. Africa/Nairobi (default: UTC)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_billing::LedgerPorts;
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore, PostgresNotificationLog,
    PostgresPropertyAdapter,
};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        due_day = config.invoice_due_day,
        timezone = %config.timezone.0,
        "Starting Rent Ledger API Server"
    );

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()).min_connections(2))
        .await
        .context("connecting to database")?;
    run_migrations(&pool).await.context("applying migrations")?;

    let store = Arc::new(PostgresLedgerStore::new(pool.clone()));
    let ports = LedgerPorts {
        property: Arc::new(PostgresPropertyAdapter::new(pool.clone())),
        periods: store.clone(),
        payments: store,
        notifications: Arc::new(PostgresNotificationLog::new(pool)),
    };

    let state = AppState::new(ports, config.clone()).context("invalid billing configuration")?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse().context("parsing server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads `API_*` configuration, accepting a bare `DATABASE_URL` as well
fn load_config() -> anyhow::Result<ApiConfig> {
    let mut config = ApiConfig::from_env().context("loading API_* configuration")?;
    if std::env::var("API_DATABASE_URL").is_err() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
    }
    Ok(config)
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
