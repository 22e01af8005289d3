//! Settlement of billing periods
//!
//! A period's status is a projection over its confirmed payments:
//!
//! | confirmed sum          | status           |
//! |------------------------|------------------|
//! | `0`                    | `pending`        |
//! | `0 < sum < amount_due` | `partially_paid` |
//! | `sum >= amount_due`    | `paid`           |
//!
//! The remaining balance is `max(amount_due - sum, 0)`. Overpayment shows up
//! as `paid` with a zero balance; the excess is not carried as credit.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use core_kernel::Amount;

use crate::error::BillingError;
use crate::payment::Payment;
use crate::period::{BillingPeriod, PeriodStatus};
use crate::ports::{PaymentStore, PeriodStore};

/// Settlement state of one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub amount_due: Amount,
    pub paid: Amount,
    pub balance: Amount,
    pub status: PeriodStatus,
}

impl Settlement {
    /// Settlement of a period owing `amount_due` after `paid` has been confirmed
    pub fn of(amount_due: Amount, paid: Amount) -> Self {
        let status = if paid >= amount_due {
            PeriodStatus::Paid
        } else if paid.is_positive() {
            PeriodStatus::PartiallyPaid
        } else {
            PeriodStatus::Pending
        };

        Self {
            amount_due,
            paid,
            balance: amount_due.balance_after(paid),
            status,
        }
    }

    /// Settlement from a set of payments; only confirmed ones count
    pub fn from_payments<'a>(amount_due: Amount, payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let paid = payments
            .into_iter()
            .filter(|p| p.is_confirmed())
            .map(|p| p.amount)
            .sum();
        Self::of(amount_due, paid)
    }

    pub fn is_settled(&self) -> bool {
        self.balance.is_zero()
    }
}

/// Derives period status from the payment store
#[derive(Clone)]
pub struct SettlementCalculator {
    periods: Arc<dyn PeriodStore>,
    payments: Arc<dyn PaymentStore>,
}

impl SettlementCalculator {
    pub fn new(periods: Arc<dyn PeriodStore>, payments: Arc<dyn PaymentStore>) -> Self {
        Self { periods, payments }
    }

    /// Current settlement of `period`, read-only
    pub async fn settlement(&self, period: &BillingPeriod) -> Result<Settlement, BillingError> {
        let paid = self.payments.sum_confirmed(period.id).await?;
        Ok(Settlement::of(period.amount_due, paid))
    }

    /// Re-derives the period's status and stores it if it changed
    ///
    /// Safe to call any number of times; the result depends only on the
    /// confirmed payments.
    pub async fn recompute(&self, mut period: BillingPeriod) -> Result<(BillingPeriod, Settlement), BillingError> {
        let settlement = self.settlement(&period).await?;
        if settlement.status != period.status {
            debug!(
                period_id = %period.id,
                from = %period.status,
                to = %settlement.status,
                "Period status changed"
            );
            self.periods.update_status(period.id, settlement.status).await?;
            period.status = settlement.status;
        }
        Ok((period, settlement))
    }
}
