//! Billing Domain - Rent Ledger Engine
//!
//! This crate turns incoming rent payments into settled billing periods.
//!
//! # Components
//!
//! - **Billing Period Registry**: one period per unit per month, opened on
//!   first reference with the unit's rent at that time
//! - **Settlement Calculator**: derives `pending` / `partially_paid` / `paid`
//!   and the outstanding balance from confirmed payments
//! - **Payment Allocator**: spreads a lump sum over consecutive months,
//!   skipping settled ones, and sends a receipt
//! - **Ledger Reporter**: read-only yearly view of a unit and the
//!   cross-unit transactions list
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{AllocationRequest, BillingConfig, PaymentAllocator};
//!
//! let allocator = PaymentAllocator::new(ports, BillingConfig::default());
//! let results = allocator
//!     .allocate(AllocationRequest::new(unit_id, tenant_id, Amount::new(7000), start))
//!     .await?;
//!
//! for r in &results {
//!     println!("{}-{:02}: {} ({})", r.year, r.month, r.applied, r.status);
//! }
//! ```

pub mod allocator;
pub mod config;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod notification;
pub mod payment;
pub mod period;
pub mod ports;
pub mod receipt;
pub mod registry;
pub mod settlement;

pub use allocator::{AllocationRequest, AllocationResult, PaymentAllocator, ReversalOutcome};
pub use config::BillingConfig;
pub use error::BillingError;
pub use ledger::{LedgerPayment, LedgerReporter, MonthLedger, MonthState, TransactionEntry, UnitLedger};
pub use notification::{Notification, NotificationChannel, NotificationKind, NotificationStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use period::{BillingPeriod, PeriodStatus};
pub use ports::{LedgerPorts, NotificationSink, PaymentStore, PeriodStore};
pub use registry::BillingPeriodRegistry;
pub use settlement::{Settlement, SettlementCalculator};
