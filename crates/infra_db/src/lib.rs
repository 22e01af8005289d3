//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the rent ledger using SQLx.
//!
//! # Architecture
//!
//! - `repositories`: SQL and row types, one repository per schema area
//! - `adapters`: domain port implementations built on the repositories
//! - `pool`: connection pool construction and migrations
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresLedgerStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/rent_ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PostgresLedgerStore, PostgresNotificationLog, PostgresPropertyAdapter};
