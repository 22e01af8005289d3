//! PostgreSQL Ledger Store
//!
//! Implements `PeriodStore` and `PaymentStore` on top of `BillingRepository`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    Amount, BillingMonth, BillingPeriodId, DomainPort, HealthCheckResult, HealthCheckable, PaymentId, PortError,
    TenantId, UnitId,
};
use domain_billing::{
    BillingPeriod, Payment, PaymentMethod, PaymentStatus, PaymentStore, PeriodStatus, PeriodStore,
};

use crate::error::DatabaseError;
use crate::repositories::billing::{
    BillingRepository, PaymentMethod as DbPaymentMethod, PaymentRow, PaymentStatus as DbPaymentStatus,
    PeriodRow, PeriodStatus as DbPeriodStatus,
};

/// PostgreSQL-backed billing period and payment storage
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresLedgerStore {}

#[async_trait]
impl HealthCheckable for PostgresLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-ledger-store").await
    }
}

#[async_trait]
impl PeriodStore for PostgresLedgerStore {
    async fn find_period(
        &self,
        unit_id: UnitId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<BillingPeriod>, PortError> {
        let row = self
            .repository
            .find_period(*unit_id.as_uuid(), period_start, period_end)
            .await?;
        Ok(row.map(row_to_period))
    }

    async fn get_period(&self, id: BillingPeriodId) -> Result<BillingPeriod, PortError> {
        let row = self.repository.get_period(*id.as_uuid()).await?;
        Ok(row_to_period(row))
    }

    #[instrument(skip(self, period), fields(unit_id = %period.unit_id, period_start = %period.period_start))]
    async fn insert_period(&self, period: &BillingPeriod) -> Result<BillingPeriod, PortError> {
        let row = self.repository.insert_period(&period_to_row(period)).await?;
        if row.period_id != *period.id.as_uuid() {
            debug!("Period already existed");
        }
        Ok(row_to_period(row))
    }

    async fn update_status(&self, id: BillingPeriodId, status: PeriodStatus) -> Result<(), PortError> {
        Ok(self
            .repository
            .update_status(*id.as_uuid(), period_status_to_db(status))
            .await?)
    }

    async fn list_periods(&self, unit_id: UnitId, year: i32) -> Result<Vec<BillingPeriod>, PortError> {
        let first = BillingMonth::new(year, 1).map_err(|e| PortError::validation(e.to_string()))?;
        let from = first.period_start();
        let until = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .ok_or_else(|| PortError::validation(format!("Year out of range: {}", year)))?;

        let rows = self.repository.list_periods(*unit_id.as_uuid(), from, until).await?;
        Ok(rows.into_iter().map(row_to_period).collect())
    }
}

#[async_trait]
impl PaymentStore for PostgresLedgerStore {
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, amount = %payment.amount))]
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError> {
        Ok(self.repository.insert_payment(&payment_to_row(payment)).await?)
    }

    async fn sum_confirmed(&self, period_id: BillingPeriodId) -> Result<Amount, PortError> {
        let sum = self.repository.sum_confirmed(*period_id.as_uuid()).await?;
        Ok(Amount::new(sum))
    }

    async fn list_confirmed(&self, period_id: BillingPeriodId) -> Result<Vec<Payment>, PortError> {
        let rows = self.repository.list_confirmed(*period_id.as_uuid()).await?;
        rows.into_iter()
            .map(|row| row_to_payment(row).map_err(PortError::from))
            .collect()
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row = self.repository.get_payment(*id.as_uuid()).await?;
        Ok(row_to_payment(row)?)
    }

    #[instrument(skip(self, notes), fields(payment_id = %id, status = %status))]
    async fn set_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        notes: Option<String>,
    ) -> Result<(), PortError> {
        Ok(self
            .repository
            .set_payment_status(*id.as_uuid(), payment_status_to_db(status), notes.as_deref())
            .await?)
    }

    async fn total_confirmed_for_unit(&self, unit_id: UnitId) -> Result<Amount, PortError> {
        let sum = self.repository.total_confirmed_for_unit(*unit_id.as_uuid()).await?;
        Ok(Amount::new(sum))
    }

    #[instrument(skip(self))]
    async fn recent_payments(&self, limit: u32) -> Result<Vec<Payment>, PortError> {
        let rows = self.repository.recent_payments(i64::from(limit)).await?;
        rows.into_iter()
            .map(|row| row_to_payment(row).map_err(PortError::from))
            .collect()
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn period_status_to_db(status: PeriodStatus) -> DbPeriodStatus {
    match status {
        PeriodStatus::Pending => DbPeriodStatus::Pending,
        PeriodStatus::PartiallyPaid => DbPeriodStatus::PartiallyPaid,
        PeriodStatus::Paid => DbPeriodStatus::Paid,
    }
}

fn period_status_from_db(status: DbPeriodStatus) -> PeriodStatus {
    match status {
        DbPeriodStatus::Pending => PeriodStatus::Pending,
        DbPeriodStatus::PartiallyPaid => PeriodStatus::PartiallyPaid,
        DbPeriodStatus::Paid => PeriodStatus::Paid,
    }
}

fn payment_status_to_db(status: PaymentStatus) -> DbPaymentStatus {
    match status {
        PaymentStatus::Confirmed => DbPaymentStatus::Confirmed,
        PaymentStatus::Reversed => DbPaymentStatus::Reversed,
    }
}

fn row_to_period(row: PeriodRow) -> BillingPeriod {
    BillingPeriod {
        id: BillingPeriodId::from_uuid(row.period_id),
        unit_id: UnitId::from_uuid(row.unit_id),
        period_start: row.period_start,
        period_end: row.period_end,
        amount_due: Amount::new(row.amount_due),
        due_date: row.due_date,
        status: period_status_from_db(row.status),
        created_at: row.created_at,
    }
}

fn period_to_row(period: &BillingPeriod) -> PeriodRow {
    PeriodRow {
        period_id: *period.id.as_uuid(),
        unit_id: *period.unit_id.as_uuid(),
        period_start: period.period_start,
        period_end: period.period_end,
        amount_due: period.amount_due.value(),
        due_date: period.due_date,
        status: period_status_to_db(period.status),
        created_at: period.created_at,
    }
}

fn row_to_payment(row: PaymentRow) -> Result<Payment, DatabaseError> {
    let month = u32::try_from(row.target_month)
        .map_err(|_| DatabaseError::corrupt(format!("target_month {}", row.target_month)))?;
    let target = BillingMonth::new(row.target_year, month)
        .map_err(|e| DatabaseError::corrupt(format!("payment {}: {}", row.payment_id, e)))?;

    Ok(Payment {
        id: PaymentId::from_uuid(row.payment_id),
        period_id: BillingPeriodId::from_uuid(row.period_id),
        unit_id: UnitId::from_uuid(row.unit_id),
        payer_id: row.payer_id.map(TenantId::from_uuid),
        method: match row.method {
            DbPaymentMethod::Cash => PaymentMethod::Cash,
            DbPaymentMethod::MobileMoney => PaymentMethod::MobileMoney,
        },
        amount: Amount::new(row.amount),
        tx_ref: row.tx_ref,
        msisdn: row.msisdn,
        target,
        paid_at: row.paid_at,
        status: match row.status {
            DbPaymentStatus::Confirmed => PaymentStatus::Confirmed,
            DbPaymentStatus::Reversed => PaymentStatus::Reversed,
        },
        notes: row.notes,
    })
}

fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        payment_id: *payment.id.as_uuid(),
        period_id: *payment.period_id.as_uuid(),
        unit_id: *payment.unit_id.as_uuid(),
        payer_id: payment.payer_id.map(|id| *id.as_uuid()),
        method: match payment.method {
            PaymentMethod::Cash => DbPaymentMethod::Cash,
            PaymentMethod::MobileMoney => DbPaymentMethod::MobileMoney,
        },
        amount: payment.amount.value(),
        tx_ref: payment.tx_ref.clone(),
        msisdn: payment.msisdn.clone(),
        target_year: payment.target.year(),
        target_month: payment.target.month() as i32,
        paid_at: payment.paid_at,
        status: payment_status_to_db(payment.status),
        notes: payment.notes.clone(),
    }
}
