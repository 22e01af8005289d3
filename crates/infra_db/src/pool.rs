//! Database connection pool management
//!
//! Pool construction for PostgreSQL using SQLx, and the bundled schema
//! migrations.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::DatabaseError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Configuration options for the database connection pool
///
/// # Example
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("postgres://localhost/rent_ledger")
///     .max_connections(20)
///     .min_connections(5)
///     .connect_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_connections, 20);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a free connection
    pub connect_timeout: Duration,
    /// Age at which a connection is recycled
    pub max_lifetime: Duration,
    /// Inactivity before an idle connection is closed
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a configuration for `url` with default pool sizing
    ///
    /// # Arguments
    ///
    /// * `url` - PostgreSQL connection string (e.g., "postgres://ledger:secret@db/rent_ledger")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60), // 30 minutes
            idle_timeout: Duration::from_secs(10 * 60), // 10 minutes
        }
    }

    /// Caps the pool size
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum connection count (default: 10)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets how many connections stay open while idle
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum connection count (default: 2)
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets how long an allocation waits for a connection
    ///
    /// # Arguments
    ///
    /// * `timeout` - Acquire timeout (default: 30s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the age at which connections are recycled
    ///
    /// # Arguments
    ///
    /// * `lifetime` - Maximum connection age (default: 30 min)
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Sets how long an unused connection is kept
    ///
    /// # Arguments
    ///
    /// * `timeout` - Idle period before closing (default: 10 min)
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("postgres://localhost/rent_ledger")
    }
}

/// Creates a database connection pool with the given configuration
///
/// The server builds one pool at start-up and shares it between the
/// property, ledger and notification adapters.
///
/// # Arguments
///
/// * `config` - Pool sizing and connection string
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the pool cannot be created
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Database pool created");
    Ok(pool)
}

/// Creates a connection pool from a URL string with default settings
///
/// # Arguments
///
/// * `url` - PostgreSQL connection string
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the pool cannot be created
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, DatabaseError> {
    create_pool(DatabaseConfig::new(url)).await
}

/// Applies the schema migrations bundled with this crate
///
/// Already-applied migrations are skipped, so this runs on every start-up.
///
/// # Arguments
///
/// * `pool` - Pool connected to the ledger database
///
/// # Errors
///
/// Returns `DatabaseError::MigrationFailed` if a migration fails to apply
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    // Migrations are embedded at compile time from ./migrations
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
