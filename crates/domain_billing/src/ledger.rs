//! Ledger Reporter
//!
//! Read-only, month-by-month view of a unit's rent for one year. Months
//! that were never billed report the unit's current rent as outstanding;
//! reporting never opens a period.
//!
//! The reporter also serves the cross-unit transactions list: recent
//! payments labelled with unit number and payer name.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use core_kernel::{Amount, BillingMonth, BillingPeriodId, PaymentId, PortError, TenantId, UnitId};
use domain_property::PropertyPort;

use crate::error::BillingError;
use crate::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::period::PeriodStatus;
use crate::ports::{LedgerPorts, PaymentStore, PeriodStore};
use crate::registry::load_unit;
use crate::settlement::Settlement;

/// Reported state of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthState {
    /// No billing period exists for the month
    NotPaid,
    Pending,
    PartiallyPaid,
    Paid,
}

impl From<PeriodStatus> for MonthState {
    fn from(status: PeriodStatus) -> Self {
        match status {
            PeriodStatus::Pending => MonthState::Pending,
            PeriodStatus::PartiallyPaid => MonthState::PartiallyPaid,
            PeriodStatus::Paid => MonthState::Paid,
        }
    }
}

/// A confirmed payment as shown on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPayment {
    pub payment_id: PaymentId,
    pub payer_id: Option<TenantId>,
    pub amount: Amount,
    pub method: PaymentMethod,
    pub tx_ref: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl From<Payment> for LedgerPayment {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.id,
            payer_id: payment.payer_id,
            amount: payment.amount,
            method: payment.method,
            tx_ref: payment.tx_ref,
            paid_at: payment.paid_at,
        }
    }
}

/// One month of a unit ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLedger {
    pub year: i32,
    pub month: u32,
    pub state: MonthState,
    pub period_id: Option<BillingPeriodId>,
    pub due_date: Option<NaiveDate>,
    pub amount_due: Amount,
    pub paid: Amount,
    pub balance: Amount,
    pub payments: Vec<LedgerPayment>,
}

/// A unit's rent ledger for one calendar year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLedger {
    pub unit_id: UnitId,
    pub unit_number: i32,
    pub year: i32,
    /// January to December
    pub months: Vec<MonthLedger>,
    pub total_due: Amount,
    pub total_paid: Amount,
    pub total_balance: Amount,
}

/// One line of the transactions list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub payment_id: PaymentId,
    pub unit_id: UnitId,
    /// `None` if the unit can no longer be loaded
    pub unit_number: Option<i32>,
    pub payer_id: Option<TenantId>,
    pub payer_name: Option<String>,
    pub method: PaymentMethod,
    pub amount: Amount,
    pub status: PaymentStatus,
    pub year: i32,
    pub month: u32,
    pub paid_at: DateTime<Utc>,
    pub tx_ref: Option<String>,
}

#[derive(Clone)]
pub struct LedgerReporter {
    property: Arc<dyn PropertyPort>,
    periods: Arc<dyn PeriodStore>,
    payments: Arc<dyn PaymentStore>,
}

impl LedgerReporter {
    pub fn new(ports: &LedgerPorts) -> Self {
        Self {
            property: Arc::clone(&ports.property),
            periods: Arc::clone(&ports.periods),
            payments: Arc::clone(&ports.payments),
        }
    }

    /// Twelve-month ledger of `unit_id` for `year`
    ///
    /// # Errors
    ///
    /// `UnitNotFound` if the unit does not exist; `Calendar` if `year` is
    /// out of range
    #[instrument(skip(self))]
    pub async fn unit_year(&self, unit_id: UnitId, year: i32) -> Result<UnitLedger, BillingError> {
        let months = BillingMonth::months_of_year(year)?;
        let unit = load_unit(self.property.as_ref(), unit_id).await?;

        let mut by_month = HashMap::new();
        for period in self.periods.list_periods(unit_id, year).await? {
            by_month.insert(period.month()?, period);
        }

        let mut rows = Vec::with_capacity(months.len());
        for month in months {
            let row = match by_month.remove(&month) {
                Some(period) => {
                    let payments = self.payments.list_confirmed(period.id).await?;
                    let settlement = Settlement::from_payments(period.amount_due, &payments);
                    MonthLedger {
                        year: month.year(),
                        month: month.month(),
                        state: settlement.status.into(),
                        period_id: Some(period.id),
                        due_date: Some(period.due_date),
                        amount_due: settlement.amount_due,
                        paid: settlement.paid,
                        balance: settlement.balance,
                        payments: payments.into_iter().map(LedgerPayment::from).collect(),
                    }
                }
                None => MonthLedger {
                    year: month.year(),
                    month: month.month(),
                    state: MonthState::NotPaid,
                    period_id: None,
                    due_date: None,
                    amount_due: unit.monthly_rent,
                    paid: Amount::zero(),
                    balance: unit.monthly_rent,
                    payments: Vec::new(),
                },
            };
            rows.push(row);
        }

        Ok(UnitLedger {
            unit_id,
            unit_number: unit.number,
            year,
            total_due: total(&rows, "total_due", |m| m.amount_due)?,
            total_paid: total(&rows, "total_paid", |m| m.paid)?,
            total_balance: total(&rows, "total_balance", |m| m.balance)?,
            months: rows,
        })
    }

    /// Sum of every confirmed payment ever received for a unit
    pub async fn total_received(&self, unit_id: UnitId) -> Result<Amount, BillingError> {
        load_unit(self.property.as_ref(), unit_id).await?;
        Ok(self.payments.total_confirmed_for_unit(unit_id).await?)
    }

    /// The `limit` most recent payments across all units, newest first
    ///
    /// Reversed payments are listed with their status. Unit numbers and payer
    /// names are looked up once per distinct unit and payer.
    #[instrument(skip(self))]
    pub async fn transactions(&self, limit: u32) -> Result<Vec<TransactionEntry>, BillingError> {
        let payments = self.payments.recent_payments(limit).await?;

        let mut unit_numbers: HashMap<UnitId, Option<i32>> = HashMap::new();
        let mut payer_names: HashMap<TenantId, Option<String>> = HashMap::new();
        let mut entries = Vec::with_capacity(payments.len());

        for payment in payments {
            if !unit_numbers.contains_key(&payment.unit_id) {
                let number = found_or_none(self.property.get_unit(payment.unit_id).await)?.map(|u| u.number);
                unit_numbers.insert(payment.unit_id, number);
            }
            let payer_name = match payment.payer_id {
                Some(payer_id) => {
                    if !payer_names.contains_key(&payer_id) {
                        let name = found_or_none(self.property.get_tenant(payer_id).await)?.map(|t| t.full_name);
                        payer_names.insert(payer_id, name);
                    }
                    payer_names.get(&payer_id).cloned().flatten()
                }
                None => None,
            };

            entries.push(TransactionEntry {
                payment_id: payment.id,
                unit_id: payment.unit_id,
                unit_number: unit_numbers.get(&payment.unit_id).copied().flatten(),
                payer_id: payment.payer_id,
                payer_name,
                method: payment.method,
                amount: payment.amount,
                status: payment.status,
                year: payment.target.year(),
                month: payment.target.month(),
                paid_at: payment.paid_at,
                tx_ref: payment.tx_ref,
            });
        }
        Ok(entries)
    }
}

/// A missing row becomes `None`; any other failure is propagated
fn found_or_none<T>(result: Result<T, PortError>) -> Result<Option<T>, BillingError> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn total(rows: &[MonthLedger], what: &'static str, field: fn(&MonthLedger) -> Amount) -> Result<Amount, BillingError> {
    Amount::checked_sum(rows.iter().map(field)).ok_or(BillingError::AmountOverflow(what))
}
