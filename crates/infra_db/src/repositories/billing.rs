//! Billing repository implementation
//!
//! Database access for billing periods and payments. Period creation relies
//! on the `(unit_id, period_start, period_end)` unique constraint: the insert
//! is `ON CONFLICT DO NOTHING` followed by a re-select, so concurrent
//! creators all end up with the same row.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for billing periods and payments
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_period(
        &self,
        unit_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<PeriodRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PeriodRow>(
            r#"
            SELECT period_id, unit_id, period_start, period_end, amount_due, due_date, status, created_at
            FROM billing_periods
            WHERE unit_id = $1 AND period_start = $2 AND period_end = $3
            "#,
        )
        .bind(unit_id)
        .bind(period_start)
        .bind(period_end)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_period(&self, period_id: Uuid) -> Result<PeriodRow, DatabaseError> {
        sqlx::query_as::<_, PeriodRow>(
            r#"
            SELECT period_id, unit_id, period_start, period_end, amount_due, due_date, status, created_at
            FROM billing_periods
            WHERE period_id = $1
            "#,
        )
        .bind(period_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("BillingPeriod", period_id))
    }

    /// Inserts a period unless one already covers the same span, and returns
    /// whichever row is stored
    pub async fn insert_period(&self, period: &PeriodRow) -> Result<PeriodRow, DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO billing_periods (
                period_id, unit_id, period_start, period_end, amount_due, due_date, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT ON CONSTRAINT billing_periods_unit_span_uniq DO NOTHING
            "#,
        )
        .bind(period.period_id)
        .bind(period.unit_id)
        .bind(period.period_start)
        .bind(period.period_end)
        .bind(period.amount_due)
        .bind(period.due_date)
        .bind(period.status)
        .bind(period.created_at)
        .execute(&self.pool)
        .await?;

        self.find_period(period.unit_id, period.period_start, period.period_end)
            .await?
            .ok_or_else(|| DatabaseError::not_found("BillingPeriod", period.period_id))
    }

    pub async fn update_status(&self, period_id: Uuid, status: PeriodStatus) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE billing_periods SET status = $2 WHERE period_id = $1")
            .bind(period_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("BillingPeriod", period_id));
        }
        Ok(())
    }

    /// Periods of a unit whose start falls in `[from, until)`
    pub async fn list_periods(
        &self,
        unit_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<PeriodRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PeriodRow>(
            r#"
            SELECT period_id, unit_id, period_start, period_end, amount_due, due_date, status, created_at
            FROM billing_periods
            WHERE unit_id = $1 AND period_start >= $2 AND period_start < $3
            ORDER BY period_start
            "#,
        )
        .bind(unit_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_payment(&self, payment: &PaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, period_id, unit_id, payer_id, method, amount, tx_ref, msisdn,
                target_year, target_month, paid_at, status, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(payment.payment_id)
        .bind(payment.period_id)
        .bind(payment.unit_id)
        .bind(payment.payer_id)
        .bind(payment.method)
        .bind(payment.amount)
        .bind(&payment.tx_ref)
        .bind(&payment.msisdn)
        .bind(payment.target_year)
        .bind(payment.target_month)
        .bind(payment.paid_at)
        .bind(payment.status)
        .bind(&payment.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn sum_confirmed(&self, period_id: Uuid) -> Result<i64, DatabaseError> {
        let sum = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(amount), 0)::BIGINT
            FROM payments
            WHERE period_id = $1 AND status = 'confirmed'
            "#,
        )
        .bind(period_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }

    pub async fn list_confirmed(&self, period_id: Uuid) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, period_id, unit_id, payer_id, method, amount, tx_ref, msisdn,
                   target_year, target_month, paid_at, status, notes
            FROM payments
            WHERE period_id = $1 AND status = 'confirmed'
            ORDER BY paid_at, payment_id
            "#,
        )
        .bind(period_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentRow, DatabaseError> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, period_id, unit_id, payer_id, method, amount, tx_ref, msisdn,
                   target_year, target_month, paid_at, status, notes
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))
    }

    pub async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE payments SET status = $2, notes = $3 WHERE payment_id = $1")
            .bind(payment_id)
            .bind(status)
            .bind(notes)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", payment_id));
        }
        Ok(())
    }

    pub async fn total_confirmed_for_unit(&self, unit_id: Uuid) -> Result<i64, DatabaseError> {
        let sum = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(amount), 0)::BIGINT
            FROM payments
            WHERE unit_id = $1 AND status = 'confirmed'
            "#,
        )
        .bind(unit_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }

    pub async fn recent_payments(&self, limit: i64) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, period_id, unit_id, payer_id, method, amount, tx_ref, msisdn,
                   target_year, target_month, paid_at, status, notes
            FROM payments
            ORDER BY paid_at DESC, payment_id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "period_status", rename_all = "snake_case")]
pub enum PeriodStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Confirmed,
    Reversed,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodRow {
    pub period_id: Uuid,
    pub unit_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub amount_due: i64,
    pub due_date: NaiveDate,
    pub status: PeriodStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub period_id: Uuid,
    pub unit_id: Uuid,
    pub payer_id: Option<Uuid>,
    pub method: PaymentMethod,
    pub amount: i64,
    pub tx_ref: Option<String>,
    pub msisdn: Option<String>,
    pub target_year: i32,
    pub target_month: i32,
    pub paid_at: DateTime<Utc>,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}
