//! PostgreSQL Property Adapter
//!
//! Implements `PropertyPort` on top of `PropertyRepository`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{Amount, DomainPort, HealthCheckResult, HealthCheckable, OccupancyId, PortError, TenantId, UnitId};
use domain_property::{
    CreateTenantRequest, CreateUnitRequest, Occupancy, OccupancyStatus, PropertyError, PropertyPort, RosterEntry,
    Tenant, Unit, UnitCategory,
};

use crate::error::DatabaseError;
use crate::repositories::property::{
    OccupancyRow, OccupancyStatus as DbOccupancyStatus, PropertyRepository, RosterRow, TenantRow,
    UnitCategory as DbUnitCategory, UnitRow,
};

/// PostgreSQL-backed implementation of the PropertyPort trait
#[derive(Debug, Clone)]
pub struct PostgresPropertyAdapter {
    repository: PropertyRepository,
    pool: PgPool,
}

impl PostgresPropertyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PropertyRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &PropertyRepository {
        &self.repository
    }
}

impl DomainPort for PostgresPropertyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPropertyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-property-adapter").await
    }
}

#[async_trait]
impl PropertyPort for PostgresPropertyAdapter {
    #[instrument(skip(self), fields(unit_id = %id))]
    async fn get_unit(&self, id: UnitId) -> Result<Unit, PortError> {
        let row = self.repository.get_unit(*id.as_uuid()).await?;
        Ok(row_to_unit(row))
    }

    #[instrument(skip(self))]
    async fn list_units(&self) -> Result<Vec<Unit>, PortError> {
        let rows = self.repository.list_units().await?;
        debug!(count = rows.len(), "Listed units");
        Ok(rows.into_iter().map(row_to_unit).collect())
    }

    #[instrument(skip(self, request), fields(number = request.number))]
    async fn create_unit(&self, request: CreateUnitRequest) -> Result<Unit, PortError> {
        let number = request.number;
        let unit = request.into_unit()?;
        match self.repository.insert_unit(&unit_to_row(&unit)).await {
            Ok(()) => Ok(unit),
            Err(DatabaseError::DuplicateEntry(_)) => Err(PropertyError::DuplicateUnitNumber(number).into()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(tenant_id = %id))]
    async fn get_tenant(&self, id: TenantId) -> Result<Tenant, PortError> {
        let row = self.repository.get_tenant(*id.as_uuid()).await?;
        Ok(row_to_tenant(row))
    }

    #[instrument(skip(self, request))]
    async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, PortError> {
        let tenant = request.into_tenant()?;
        self.repository.insert_tenant(&tenant_to_row(&tenant)).await?;
        Ok(tenant)
    }

    #[instrument(skip(self), fields(tenant_id = %id))]
    async fn deactivate_tenant(&self, id: TenantId, end_date: NaiveDate) -> Result<Tenant, PortError> {
        let row = self.repository.deactivate_tenant(*id.as_uuid(), end_date).await?;
        Ok(row_to_tenant(row))
    }

    async fn has_active_occupancy(&self, unit_id: UnitId, tenant_id: TenantId) -> Result<bool, PortError> {
        Ok(self
            .repository
            .has_active_occupancy(*unit_id.as_uuid(), *tenant_id.as_uuid())
            .await?)
    }

    async fn active_tenants(&self, unit_id: UnitId) -> Result<Vec<Tenant>, PortError> {
        let rows = self.repository.active_tenants(*unit_id.as_uuid()).await?;
        Ok(rows.into_iter().map(row_to_tenant).collect())
    }

    #[instrument(skip(self))]
    async fn tenant_roster(&self) -> Result<Vec<RosterEntry>, PortError> {
        let rows = self.repository.tenant_roster().await?;
        debug!(count = rows.len(), "Loaded tenant roster");
        Ok(rows.into_iter().map(row_to_roster_entry).collect())
    }

    #[instrument(skip(self), fields(unit_id = %unit_id, tenant_id = %tenant_id))]
    async fn assign_tenant(
        &self,
        unit_id: UnitId,
        tenant_id: TenantId,
        start_date: NaiveDate,
    ) -> Result<Occupancy, PortError> {
        // surface missing rows as NotFound rather than a foreign key violation
        self.repository.get_unit(*unit_id.as_uuid()).await?;
        self.repository.get_tenant(*tenant_id.as_uuid()).await?;

        let occupancy = Occupancy::start(unit_id, tenant_id, start_date);
        match self.repository.insert_occupancy(&occupancy_to_row(&occupancy)).await {
            Ok(()) => Ok(occupancy),
            Err(DatabaseError::DuplicateEntry(_)) => Err(PropertyError::AlreadyAssigned.into()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(unit_id = %unit_id, tenant_id = %tenant_id))]
    async fn end_occupancy(
        &self,
        unit_id: UnitId,
        tenant_id: TenantId,
        end_date: NaiveDate,
    ) -> Result<Occupancy, PortError> {
        let mut occupancy = row_to_occupancy(
            self.repository
                .active_occupancy(*unit_id.as_uuid(), *tenant_id.as_uuid())
                .await?,
        );
        occupancy.end(end_date)?;
        let row = self
            .repository
            .end_occupancy(*occupancy.id.as_uuid(), end_date)
            .await?;
        Ok(row_to_occupancy(row))
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn row_to_unit(row: UnitRow) -> Unit {
    Unit {
        id: UnitId::from_uuid(row.unit_id),
        number: row.number,
        category: match row.category {
            DbUnitCategory::Bedsitter => UnitCategory::Bedsitter,
            DbUnitCategory::Single => UnitCategory::Single,
            DbUnitCategory::Other => UnitCategory::Other,
        },
        monthly_rent: Amount::new(row.monthly_rent),
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn unit_to_row(unit: &Unit) -> UnitRow {
    UnitRow {
        unit_id: *unit.id.as_uuid(),
        number: unit.number,
        category: match unit.category {
            UnitCategory::Bedsitter => DbUnitCategory::Bedsitter,
            UnitCategory::Single => DbUnitCategory::Single,
            UnitCategory::Other => DbUnitCategory::Other,
        },
        monthly_rent: unit.monthly_rent.value(),
        is_active: unit.is_active,
        created_at: unit.created_at,
    }
}

fn row_to_tenant(row: TenantRow) -> Tenant {
    Tenant {
        id: TenantId::from_uuid(row.tenant_id),
        full_name: row.full_name,
        phone: row.phone,
        email: row.email,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn tenant_to_row(tenant: &Tenant) -> TenantRow {
    TenantRow {
        tenant_id: *tenant.id.as_uuid(),
        full_name: tenant.full_name.clone(),
        phone: tenant.phone.clone(),
        email: tenant.email.clone(),
        is_active: tenant.is_active,
        created_at: tenant.created_at,
    }
}

fn row_to_occupancy(row: OccupancyRow) -> Occupancy {
    Occupancy {
        id: OccupancyId::from_uuid(row.occupancy_id),
        unit_id: UnitId::from_uuid(row.unit_id),
        tenant_id: TenantId::from_uuid(row.tenant_id),
        status: match row.status {
            DbOccupancyStatus::Active => OccupancyStatus::Active,
            DbOccupancyStatus::Ended => OccupancyStatus::Ended,
        },
        start_date: row.start_date,
        end_date: row.end_date,
        created_at: row.created_at,
    }
}

fn row_to_roster_entry(row: RosterRow) -> RosterEntry {
    let tenant = Tenant {
        id: TenantId::from_uuid(row.tenant_id),
        full_name: row.full_name,
        phone: row.phone,
        email: row.email,
        is_active: row.is_active,
        created_at: row.created_at,
    };

    let (Some(occupancy_id), Some(status), Some(start_date), Some(created_at), Some(unit_id), Some(number)) = (
        row.occupancy_id,
        row.occupancy_status,
        row.start_date,
        row.occupancy_created_at,
        row.unit_id,
        row.unit_number,
    ) else {
        return RosterEntry::unassigned(tenant);
    };

    let occupancy = row_to_occupancy(OccupancyRow {
        occupancy_id,
        unit_id,
        tenant_id: row.tenant_id,
        status,
        start_date,
        end_date: row.end_date,
        created_at,
    });
    RosterEntry::assigned(tenant, number, &occupancy)
}

fn occupancy_to_row(occupancy: &Occupancy) -> OccupancyRow {
    OccupancyRow {
        occupancy_id: *occupancy.id.as_uuid(),
        unit_id: *occupancy.unit_id.as_uuid(),
        tenant_id: *occupancy.tenant_id.as_uuid(),
        status: match occupancy.status {
            OccupancyStatus::Active => DbOccupancyStatus::Active,
            OccupancyStatus::Ended => DbOccupancyStatus::Ended,
        },
        start_date: occupancy.start_date,
        end_date: occupancy.end_date,
        created_at: occupancy.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_row_round_trip() {
        let unit = Unit::new(8, UnitCategory::Single, Amount::new(3000)).unwrap();
        let back = row_to_unit(unit_to_row(&unit));
        assert_eq!(back, unit);
    }

    #[test]
    fn test_roster_row_without_occupancy_is_unassigned() {
        let tenant = Tenant::new("Jane Wanjiku", "+254712345678", None).unwrap();
        let row = RosterRow {
            tenant_id: *tenant.id.as_uuid(),
            full_name: tenant.full_name.clone(),
            phone: tenant.phone.clone(),
            email: None,
            is_active: true,
            created_at: tenant.created_at,
            occupancy_id: None,
            occupancy_status: None,
            start_date: None,
            end_date: None,
            occupancy_created_at: None,
            unit_id: None,
            unit_number: None,
        };

        let entry = row_to_roster_entry(row);
        assert_eq!(entry.status, domain_property::RosterStatus::Unassigned);
        assert_eq!(entry.tenant, tenant);
    }

    #[test]
    fn test_occupancy_row_keeps_status() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut occupancy = Occupancy::start(UnitId::new_v7(), TenantId::new_v7(), start);
        occupancy.end(start).unwrap();

        let row = occupancy_to_row(&occupancy);
        assert_eq!(row.status, DbOccupancyStatus::Ended);
        assert_eq!(row_to_occupancy(row).end_date, Some(start));
    }
}
