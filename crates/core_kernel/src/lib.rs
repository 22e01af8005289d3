//! Core Kernel - Foundational types and utilities for the rent ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Integer currency amounts
//! - Billing-month calendar arithmetic (month rollover, period bounds, due dates)
//! - Strongly-typed identifiers
//! - Port error and health-check types shared by every adapter

pub mod amount;
pub mod calendar;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use amount::Amount;
pub use calendar::{BillingMonth, CalendarError, Timezone};
pub use identifiers::{
    UnitId, TenantId, OccupancyId, BillingPeriodId, PaymentId, NotificationId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
