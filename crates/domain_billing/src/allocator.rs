//! Payment Allocator
//!
//! Splits a lump sum across consecutive billing periods of one unit:
//!
//! 1. Start at the requested month.
//! 2. Skip months whose period is already settled.
//! 3. Apply `min(remaining, balance)` to the first unsettled month, record a
//!    confirmed payment tagged with that month, refresh the period status.
//! 4. Move to the next month while money remains.
//!
//! Months are always settled in chronological order. A sum larger than all
//! outstanding balances keeps opening future periods until it is used up, as
//! long as it fits within `max_months_advance` months. A sum that does not fit
//! is rejected before anything is written.
//!
//! # Example
//!
//! ```rust,ignore
//! let allocator = PaymentAllocator::new(ports, BillingConfig::default());
//! let results = allocator
//!     .allocate(AllocationRequest::new(unit_id, tenant_id, Amount::new(7000), BillingMonth::new(2024, 1)?))
//!     .await?;
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{Amount, BillingMonth, BillingPeriodId, PaymentId, PortError, TenantId, UnitId};
use domain_property::{PropertyPort, Unit};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::locks::UnitLocks;
use crate::notification::Notification;
use crate::payment::{Payment, PaymentMethod};
use crate::period::{BillingPeriod, PeriodStatus};
use crate::ports::{LedgerPorts, NotificationSink, PaymentStore, PeriodStore};
use crate::receipt::Receipt;
use crate::registry::{load_unit, BillingPeriodRegistry};
use crate::settlement::{Settlement, SettlementCalculator};

/// A lump-sum payment to spread over a unit's billing periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub unit_id: UnitId,
    pub payer_id: TenantId,
    pub method: PaymentMethod,
    pub amount: Amount,
    /// First month to consider
    pub start: BillingMonth,
    pub tx_ref: Option<String>,
    pub msisdn: Option<String>,
}

impl AllocationRequest {
    /// A cash payment with no reference
    pub fn new(unit_id: UnitId, payer_id: TenantId, amount: Amount, start: BillingMonth) -> Self {
        Self {
            unit_id,
            payer_id,
            method: PaymentMethod::Cash,
            amount,
            start,
            tx_ref: None,
            msisdn: None,
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_reference(mut self, tx_ref: impl Into<String>) -> Self {
        self.tx_ref = Some(tx_ref.into());
        self
    }

    pub fn with_msisdn(mut self, msisdn: impl Into<String>) -> Self {
        self.msisdn = Some(msisdn.into());
        self
    }
}

/// What one allocation did to one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub year: i32,
    pub month: u32,
    pub applied: Amount,
    /// Period status after the amount was applied
    pub status: PeriodStatus,
    /// Outstanding balance after the amount was applied
    pub balance: Amount,
    pub period_id: BillingPeriodId,
}

impl AllocationResult {
    fn new(month: BillingMonth, applied: Amount, period: &BillingPeriod, settlement: &Settlement) -> Self {
        Self {
            year: month.year(),
            month: month.month(),
            applied,
            status: settlement.status,
            balance: settlement.balance,
            period_id: period.id,
        }
    }
}

/// Result of reversing a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalOutcome {
    pub payment: Payment,
    /// Owning period with its refreshed status
    pub period: BillingPeriod,
    pub settlement: Settlement,
}

/// Applies payments to billing periods
pub struct PaymentAllocator {
    property: Arc<dyn PropertyPort>,
    periods: Arc<dyn PeriodStore>,
    payments: Arc<dyn PaymentStore>,
    notifications: Arc<dyn NotificationSink>,
    registry: BillingPeriodRegistry,
    settlement: SettlementCalculator,
    config: BillingConfig,
    locks: UnitLocks,
}

impl PaymentAllocator {
    /// Creates an allocator over the given adapters
    ///
    /// `config` is expected to have passed `BillingConfig::validate`.
    pub fn new(ports: LedgerPorts, config: BillingConfig) -> Self {
        let registry = BillingPeriodRegistry::new(
            Arc::clone(&ports.periods),
            Arc::clone(&ports.property),
            config.due_day,
        );
        let settlement = SettlementCalculator::new(Arc::clone(&ports.periods), Arc::clone(&ports.payments));

        Self {
            property: ports.property,
            periods: ports.periods,
            payments: ports.payments,
            notifications: ports.notifications,
            registry,
            settlement,
            config,
            locks: UnitLocks::new(),
        }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Allocates a payment across the unit's billing periods
    ///
    /// Returns one result per period that received money, in chronological
    /// order. A receipt is sent afterwards; failing to send it does not
    /// affect the allocation.
    ///
    /// # Errors
    ///
    /// Checked before anything is written, in this order:
    /// - `Validation` if the amount is not positive or exceeds `max_payment`
    /// - `UnitNotFound` if the unit does not exist
    /// - `PayerNotAssigned` if the payer has no active occupancy of the unit
    /// - `Validation` if the sum cannot be absorbed within
    ///   `max_months_advance` months of the start month
    #[instrument(
        skip(self, request),
        fields(unit_id = %request.unit_id, payer_id = %request.payer_id, amount = %request.amount, start = %request.start)
    )]
    pub async fn allocate(&self, request: AllocationRequest) -> Result<Vec<AllocationResult>, BillingError> {
        if !request.amount.is_positive() {
            return Err(BillingError::validation(format!(
                "Payment amount must be positive, got {}",
                request.amount
            )));
        }
        if request.amount > self.config.max_payment {
            return Err(BillingError::validation(format!(
                "Payment amount {} exceeds the maximum of {}",
                request.amount, self.config.max_payment
            )));
        }
        let unit = load_unit(self.property.as_ref(), request.unit_id).await?;
        if !self.property.has_active_occupancy(unit.id, request.payer_id).await? {
            return Err(BillingError::PayerNotAssigned {
                unit: unit.id,
                payer: request.payer_id,
            });
        }

        let _guard = self.locks.acquire(unit.id).await;
        self.ensure_absorbable(&unit, &request).await?;

        let mut remaining = request.amount;
        let mut cursor = request.start;
        let mut visited: u32 = 0;
        let mut allocations = Vec::new();

        while remaining.is_positive() {
            if visited >= self.config.max_months_advance {
                warn!(visited, remaining = %remaining, "Allocation ceiling reached");
                return Err(BillingError::AllocationLimitExceeded {
                    start: request.start,
                    months: self.config.max_months_advance,
                });
            }
            visited += 1;

            let period = self.registry.get_or_create(unit.id, cursor).await?;
            let due_here = self.settlement.settlement(&period).await?.balance;
            if due_here.is_zero() {
                debug!(month = %cursor, "Period already settled");
                cursor = cursor.next()?;
                continue;
            }

            let applied = remaining.min(due_here);
            let payment = Payment::confirmed(period.id, unit.id, cursor, applied, request.method)
                .with_payer(request.payer_id)
                .with_reference(request.tx_ref.clone())
                .with_msisdn(request.msisdn.clone());
            self.payments.insert_payment(&payment).await?;

            let (period, settlement) = self.settlement.recompute(period).await?;
            debug!(
                month = %cursor,
                payment_id = %payment.id,
                applied = %applied,
                status = %settlement.status,
                balance = %settlement.balance,
                "Applied payment to period"
            );
            allocations.push(AllocationResult::new(cursor, applied, &period, &settlement));

            remaining -= applied;
            if remaining.is_positive() {
                cursor = cursor.next()?;
            }
        }

        info!(periods = allocations.len(), last_month = %cursor, "Payment allocated");

        self.send_receipt(&unit, &request, &allocations).await;
        Ok(allocations)
    }

    /// Reverses a confirmed payment and refreshes its period
    ///
    /// # Errors
    ///
    /// - `Validation` if `reason` is blank or the payment is already reversed
    /// - `PaymentNotFound` if there is no such payment
    #[instrument(skip(self))]
    pub async fn reverse(&self, payment_id: PaymentId, reason: &str) -> Result<ReversalOutcome, BillingError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BillingError::validation("A reversal reason is required"));
        }

        let unit_id = self.load_payment(payment_id).await?.unit_id;
        let _guard = self.locks.acquire(unit_id).await;

        // Re-read under the lock; a concurrent reversal may have won.
        let mut payment = self.load_payment(payment_id).await?;
        payment.reverse(reason)?;
        self.payments
            .set_status(payment.id, payment.status, payment.notes.clone())
            .await?;

        let period = self.periods.get_period(payment.period_id).await.map_err(|e| match e {
            PortError::NotFound { .. } => BillingError::PeriodNotFound(payment.period_id),
            other => BillingError::Port(other),
        })?;
        let (period, settlement) = self.settlement.recompute(period).await?;

        info!(
            period_id = %period.id,
            amount = %payment.amount,
            status = %settlement.status,
            "Payment reversed"
        );
        Ok(ReversalOutcome { payment, period, settlement })
    }

    /// Walks the months the allocation would visit without writing anything
    ///
    /// Unbilled months count at the unit's current rent, which is what the
    /// registry will bill them at while the unit lock is held.
    async fn ensure_absorbable(&self, unit: &Unit, request: &AllocationRequest) -> Result<(), BillingError> {
        let mut capacity = Amount::zero();
        let mut cursor = request.start;

        for visited in 1..=self.config.max_months_advance {
            let open = match self.registry.find(unit.id, cursor).await? {
                Some(period) => self.settlement.settlement(&period).await?.balance,
                None => unit.monthly_rent,
            };
            capacity = match capacity.checked_add(open) {
                Some(capacity) => capacity,
                None => return Ok(()),
            };
            if capacity >= request.amount {
                return Ok(());
            }
            if visited < self.config.max_months_advance {
                cursor = cursor.next()?;
            }
        }

        warn!(capacity = %capacity, "Payment exceeds what the month ceiling can absorb");
        Err(BillingError::validation(format!(
            "Payment amount {} exceeds the {} outstanding over {} months from {}",
            request.amount, capacity, self.config.max_months_advance, request.start
        )))
    }

    async fn load_payment(&self, payment_id: PaymentId) -> Result<Payment, BillingError> {
        self.payments.get_payment(payment_id).await.map_err(|e| match e {
            PortError::NotFound { .. } => BillingError::PaymentNotFound(payment_id),
            other => BillingError::Port(other),
        })
    }

    async fn send_receipt(&self, unit: &Unit, request: &AllocationRequest, allocations: &[AllocationResult]) {
        let payer_name = match self.property.get_tenant(request.payer_id).await {
            Ok(tenant) => tenant.full_name,
            Err(e) => {
                warn!(error = %e, "Could not load payer for receipt");
                request.payer_id.to_string()
            }
        };
        let issued_at = self.config.timezone.format_local(Utc::now());

        let message = Receipt {
            sender: &self.config.receipt_sender,
            currency_label: &self.config.currency_label,
            unit_number: unit.number,
            payer_name: &payer_name,
            allocations,
            tx_ref: request.tx_ref.as_deref(),
            issued_at: &issued_at,
        }
        .render();

        let notification = Notification::receipt(request.payer_id, unit.id, message);
        if let Err(e) = self.notifications.send(&notification).await {
            warn!(error = %e, notification_id = %notification.id, "Receipt notification failed");
        }
    }
}
