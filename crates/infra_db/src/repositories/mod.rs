//! Repository implementations for domain entities
//!
//! Each repository owns the SQL for one area of the schema and speaks in
//! plain row types; mapping to domain models happens in the adapters.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` rows), so
//! the crate builds without a live database.

pub mod property;
pub mod billing;
pub mod notification;

pub use property::PropertyRepository;
pub use billing::BillingRepository;
pub use notification::NotificationRepository;
