//! Property repository implementation
//!
//! Database access for units, tenants, and occupancies.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the unit / tenant / occupancy registry
#[derive(Debug, Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_unit(&self, unit_id: Uuid) -> Result<UnitRow, DatabaseError> {
        sqlx::query_as::<_, UnitRow>(
            r#"
            SELECT unit_id, number, category, monthly_rent, is_active, created_at
            FROM units
            WHERE unit_id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Unit", unit_id))
    }

    pub async fn list_units(&self) -> Result<Vec<UnitRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UnitRow>(
            r#"
            SELECT unit_id, number, category, monthly_rent, is_active, created_at
            FROM units
            ORDER BY number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_unit(&self, unit: &UnitRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO units (unit_id, number, category, monthly_rent, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(unit.unit_id)
        .bind(unit.number)
        .bind(unit.category)
        .bind(unit.monthly_rent)
        .bind(unit.is_active)
        .bind(unit.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<TenantRow, DatabaseError> {
        sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT tenant_id, full_name, phone, email, is_active, created_at
            FROM tenants
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Tenant", tenant_id))
    }

    pub async fn insert_tenant(&self, tenant: &TenantRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO tenants (tenant_id, full_name, phone, email, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant.tenant_id)
        .bind(&tenant.full_name)
        .bind(&tenant.phone)
        .bind(&tenant.email)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deactivates a tenant and ends all their active occupancies atomically
    pub async fn deactivate_tenant(&self, tenant_id: Uuid, end_date: NaiveDate) -> Result<TenantRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let tenant = sqlx::query_as::<_, TenantRow>(
            r#"
            UPDATE tenants SET is_active = FALSE
            WHERE tenant_id = $1
            RETURNING tenant_id, full_name, phone, email, is_active, created_at
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Tenant", tenant_id))?;

        sqlx::query(
            r#"
            UPDATE occupancies SET status = 'ended', end_date = GREATEST($2, start_date)
            WHERE tenant_id = $1 AND status = 'active'
            "#,
        )
        .bind(tenant_id)
        .bind(end_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(tenant)
    }

    pub async fn has_active_occupancy(&self, unit_id: Uuid, tenant_id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM occupancies
                WHERE unit_id = $1 AND tenant_id = $2 AND status = 'active'
            )
            "#,
        )
        .bind(unit_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn active_tenants(&self, unit_id: Uuid) -> Result<Vec<TenantRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT t.tenant_id, t.full_name, t.phone, t.email, t.is_active, t.created_at
            FROM tenants t
            JOIN occupancies o ON o.tenant_id = t.tenant_id
            WHERE o.unit_id = $1 AND o.status = 'active'
            ORDER BY o.start_date, t.full_name
            "#,
        )
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One row per occupancy joined with its tenant and unit, plus one row
    /// with NULL occupancy columns for each tenant never assigned
    pub async fn tenant_roster(&self) -> Result<Vec<RosterRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT t.tenant_id, t.full_name, t.phone, t.email, t.is_active, t.created_at,
                   o.occupancy_id, o.status AS occupancy_status, o.start_date, o.end_date,
                   o.created_at AS occupancy_created_at, u.unit_id, u.number AS unit_number
            FROM tenants t
            LEFT JOIN occupancies o ON o.tenant_id = t.tenant_id
            LEFT JOIN units u ON u.unit_id = o.unit_id
            ORDER BY t.full_name, t.tenant_id, o.start_date NULLS FIRST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_occupancy(&self, occupancy: &OccupancyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO occupancies (occupancy_id, unit_id, tenant_id, status, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(occupancy.occupancy_id)
        .bind(occupancy.unit_id)
        .bind(occupancy.tenant_id)
        .bind(occupancy.status)
        .bind(occupancy.start_date)
        .bind(occupancy.end_date)
        .bind(occupancy.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn active_occupancy(&self, unit_id: Uuid, tenant_id: Uuid) -> Result<OccupancyRow, DatabaseError> {
        sqlx::query_as::<_, OccupancyRow>(
            r#"
            SELECT occupancy_id, unit_id, tenant_id, status, start_date, end_date, created_at
            FROM occupancies
            WHERE unit_id = $1 AND tenant_id = $2 AND status = 'active'
            "#,
        )
        .bind(unit_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Occupancy", format!("{}/{}", unit_id, tenant_id)))
    }

    pub async fn end_occupancy(&self, occupancy_id: Uuid, end_date: NaiveDate) -> Result<OccupancyRow, DatabaseError> {
        sqlx::query_as::<_, OccupancyRow>(
            r#"
            UPDATE occupancies SET status = 'ended', end_date = $2
            WHERE occupancy_id = $1 AND status = 'active'
            RETURNING occupancy_id, unit_id, tenant_id, status, start_date, end_date, created_at
            "#,
        )
        .bind(occupancy_id)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Occupancy", occupancy_id))
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "unit_category", rename_all = "snake_case")]
pub enum UnitCategory {
    Bedsitter,
    Single,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "occupancy_status", rename_all = "snake_case")]
pub enum OccupancyStatus {
    Active,
    Ended,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnitRow {
    pub unit_id: Uuid,
    pub number: i32,
    pub category: UnitCategory,
    pub monthly_rent: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TenantRow {
    pub tenant_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OccupancyRow {
    pub occupancy_id: Uuid,
    pub unit_id: Uuid,
    pub tenant_id: Uuid,
    pub status: OccupancyStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RosterRow {
    pub tenant_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub occupancy_id: Option<Uuid>,
    pub occupancy_status: Option<OccupancyStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub occupancy_created_at: Option<DateTime<Utc>>,
    pub unit_id: Option<Uuid>,
    pub unit_number: Option<i32>,
}
