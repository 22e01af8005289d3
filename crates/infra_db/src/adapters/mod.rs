//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and repository row types
//! - Reports database failures as `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresLedgerStore, PostgresNotificationLog, PostgresPropertyAdapter};
//! use domain_billing::LedgerPorts;
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresLedgerStore::new(pool.clone()));
//! let ports = LedgerPorts {
//!     property: Arc::new(PostgresPropertyAdapter::new(pool.clone())),
//!     periods: store.clone(),
//!     payments: store,
//!     notifications: Arc::new(PostgresNotificationLog::new(pool)),
//! };
//! ```

pub mod property;
pub mod billing;
pub mod notification;

pub use property::PostgresPropertyAdapter;
pub use billing::PostgresLedgerStore;
pub use notification::PostgresNotificationLog;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` against the pool and reports the outcome
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };

    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}
