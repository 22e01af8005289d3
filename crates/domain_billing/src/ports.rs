//! Billing Domain Ports
//!
//! Storage and delivery seams of the rent ledger:
//!
//! - [`PeriodStore`]: billing period persistence, idempotent on (unit, month)
//! - [`PaymentStore`]: payment records and confirmed-sum queries
//! - [`NotificationSink`]: best-effort outbound messages
//!
//! [`LedgerPorts`] bundles them together with the property registry so the
//! services can be wired from a single value.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use core_kernel::{
    Amount, BillingPeriodId, DomainPort, HealthCheckable, PaymentId, PortError, UnitId,
};
use domain_property::PropertyPort;

use crate::notification::Notification;
use crate::payment::{Payment, PaymentStatus};
use crate::period::{BillingPeriod, PeriodStatus};

/// Persistence port for billing periods
#[async_trait]
pub trait PeriodStore: DomainPort + HealthCheckable {
    /// Looks up the period covering exactly `[period_start, period_end]`
    async fn find_period(
        &self,
        unit_id: UnitId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<BillingPeriod>, PortError>;

    /// Retrieves a period by id
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if no such period exists
    async fn get_period(&self, id: BillingPeriodId) -> Result<BillingPeriod, PortError>;

    /// Persists a period
    ///
    /// Idempotent on (unit, period_start, period_end): if a period for the
    /// same span already exists, that row is returned and `period` is dropped.
    async fn insert_period(&self, period: &BillingPeriod) -> Result<BillingPeriod, PortError>;

    /// Overwrites the cached settlement status
    async fn update_status(&self, id: BillingPeriodId, status: PeriodStatus) -> Result<(), PortError>;

    /// Periods of a unit starting in `year`, ordered by period_start
    async fn list_periods(&self, unit_id: UnitId, year: i32) -> Result<Vec<BillingPeriod>, PortError>;
}

/// Persistence port for payments
#[async_trait]
pub trait PaymentStore: DomainPort + HealthCheckable {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// Sum of confirmed payments against a period; zero if there are none
    async fn sum_confirmed(&self, period_id: BillingPeriodId) -> Result<Amount, PortError>;

    /// Confirmed payments against a period, oldest first
    async fn list_confirmed(&self, period_id: BillingPeriodId) -> Result<Vec<Payment>, PortError>;

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    async fn set_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        notes: Option<String>,
    ) -> Result<(), PortError>;

    /// Everything ever confirmed for a unit, across all periods
    async fn total_confirmed_for_unit(&self, unit_id: UnitId) -> Result<Amount, PortError>;

    /// Most recent payments of any status across all units, newest first
    async fn recent_payments(&self, limit: u32) -> Result<Vec<Payment>, PortError>;
}

/// Outbound notification delivery
#[async_trait]
pub trait NotificationSink: DomainPort {
    async fn send(&self, notification: &Notification) -> Result<(), PortError>;
}

/// The adapters a rent ledger runs against
#[derive(Clone)]
pub struct LedgerPorts {
    pub property: Arc<dyn PropertyPort>,
    pub periods: Arc<dyn PeriodStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub notifications: Arc<dyn NotificationSink>,
}

/// In-memory adapters for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::{Datelike, Utc};
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};
    use domain_property::mock::MockPropertyPort;

    use crate::notification::NotificationStatus;

    fn healthy(adapter_id: &str) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("Mock adapter always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }

    #[derive(Debug, Default)]
    struct Tables {
        periods: HashMap<BillingPeriodId, BillingPeriod>,
        payments: Vec<Payment>,
    }

    /// In-memory period and payment storage
    ///
    /// Implements both [`PeriodStore`] and [`PaymentStore`]; clones share
    /// the same tables.
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryLedgerStore {
        tables: Arc<RwLock<Tables>>,
    }

    impl InMemoryLedgerStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of periods across all units
        pub async fn period_count(&self) -> usize {
            self.tables.read().await.periods.len()
        }

        /// Every payment ever recorded, confirmed or not, in insertion order
        pub async fn all_payments(&self) -> Vec<Payment> {
            self.tables.read().await.payments.clone()
        }
    }

    impl DomainPort for InMemoryLedgerStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryLedgerStore {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-ledger-store")
        }
    }

    #[async_trait]
    impl PeriodStore for InMemoryLedgerStore {
        async fn find_period(
            &self,
            unit_id: UnitId,
            period_start: NaiveDate,
            period_end: NaiveDate,
        ) -> Result<Option<BillingPeriod>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .periods
                .values()
                .find(|p| p.unit_id == unit_id && p.period_start == period_start && p.period_end == period_end)
                .cloned())
        }

        async fn get_period(&self, id: BillingPeriodId) -> Result<BillingPeriod, PortError> {
            self.tables
                .read()
                .await
                .periods
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("BillingPeriod", id))
        }

        async fn insert_period(&self, period: &BillingPeriod) -> Result<BillingPeriod, PortError> {
            let mut tables = self.tables.write().await;
            if let Some(existing) = tables.periods.values().find(|p| {
                p.unit_id == period.unit_id
                    && p.period_start == period.period_start
                    && p.period_end == period.period_end
            }) {
                return Ok(existing.clone());
            }
            tables.periods.insert(period.id, period.clone());
            Ok(period.clone())
        }

        async fn update_status(&self, id: BillingPeriodId, status: PeriodStatus) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            let period = tables
                .periods
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("BillingPeriod", id))?;
            period.status = status;
            Ok(())
        }

        async fn list_periods(&self, unit_id: UnitId, year: i32) -> Result<Vec<BillingPeriod>, PortError> {
            let mut periods: Vec<BillingPeriod> = self
                .tables
                .read()
                .await
                .periods
                .values()
                .filter(|p| p.unit_id == unit_id && p.period_start.year() == year)
                .cloned()
                .collect();
            periods.sort_by_key(|p| p.period_start);
            Ok(periods)
        }
    }

    #[async_trait]
    impl PaymentStore for InMemoryLedgerStore {
        async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            if !tables.periods.contains_key(&payment.period_id) {
                return Err(PortError::not_found("BillingPeriod", payment.period_id));
            }
            tables.payments.push(payment.clone());
            Ok(())
        }

        async fn sum_confirmed(&self, period_id: BillingPeriodId) -> Result<Amount, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .payments
                .iter()
                .filter(|p| p.period_id == period_id && p.is_confirmed())
                .map(|p| p.amount)
                .sum())
        }

        async fn list_confirmed(&self, period_id: BillingPeriodId) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .payments
                .iter()
                .filter(|p| p.period_id == period_id && p.is_confirmed())
                .cloned()
                .collect())
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.tables
                .read()
                .await
                .payments
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn set_status(
            &self,
            id: PaymentId,
            status: PaymentStatus,
            notes: Option<String>,
        ) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            let payment = tables
                .payments
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| PortError::not_found("Payment", id))?;
            payment.status = status;
            payment.notes = notes;
            Ok(())
        }

        async fn total_confirmed_for_unit(&self, unit_id: UnitId) -> Result<Amount, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .payments
                .iter()
                .filter(|p| p.unit_id == unit_id && p.is_confirmed())
                .map(|p| p.amount)
                .sum())
        }

        async fn recent_payments(&self, limit: u32) -> Result<Vec<Payment>, PortError> {
            let mut payments = self.tables.read().await.payments.clone();
            payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at).then_with(|| b.id.cmp(&a.id)));
            payments.truncate(limit as usize);
            Ok(payments)
        }
    }

    /// Notification sink that keeps what it was given
    ///
    /// A failing sink rejects every message with a connection error.
    #[derive(Debug, Default, Clone)]
    pub struct RecordingNotificationSink {
        sent: Arc<RwLock<Vec<Notification>>>,
        fail: bool,
    }

    impl RecordingNotificationSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// A sink whose every delivery fails
        pub fn failing() -> Self {
            Self {
                sent: Arc::default(),
                fail: true,
            }
        }

        /// Messages delivered so far
        pub async fn sent(&self) -> Vec<Notification> {
            self.sent.read().await.clone()
        }
    }

    impl DomainPort for RecordingNotificationSink {}

    #[async_trait]
    impl NotificationSink for RecordingNotificationSink {
        async fn send(&self, notification: &Notification) -> Result<(), PortError> {
            if self.fail {
                return Err(PortError::connection("SMS gateway unreachable"));
            }
            let mut delivered = notification.clone();
            delivered.status = NotificationStatus::Sent;
            self.sent.write().await.push(delivered);
            Ok(())
        }
    }

    /// Mock adapters wired together
    #[derive(Debug, Clone, Default)]
    pub struct MockLedger {
        pub property: MockPropertyPort,
        pub store: InMemoryLedgerStore,
        pub notifications: RecordingNotificationSink,
    }

    impl MockLedger {
        pub fn new() -> Self {
            Self::default()
        }

        /// Same adapters, but every notification fails
        pub fn with_failing_notifications() -> Self {
            Self {
                notifications: RecordingNotificationSink::failing(),
                ..Self::default()
            }
        }

        pub fn ports(&self) -> LedgerPorts {
            LedgerPorts {
                property: Arc::new(self.property.clone()),
                periods: Arc::new(self.store.clone()),
                payments: Arc::new(self.store.clone()),
                notifications: Arc::new(self.notifications.clone()),
            }
        }
    }
}
