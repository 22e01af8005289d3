//! Property Domain Ports
//!
//! The `PropertyPort` trait is everything the rent ledger needs from the
//! unit/tenant registry:
//!
//! - unit lookup (for the rent amount frozen into new billing periods)
//! - the payer-to-unit assignment check run before any money is recorded
//! - the registry writes the API exposes
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_property::PropertyPort;
//! use std::sync::Arc;
//!
//! let property: Arc<dyn PropertyPort> = Arc::new(PostgresPropertyAdapter::new(pool));
//! if !property.has_active_occupancy(unit_id, tenant_id).await? {
//!     // reject the payment
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, HealthCheckable, PortError, TenantId, UnitId};

use crate::occupancy::Occupancy;
use crate::roster::RosterEntry;
use crate::tenant::{CreateTenantRequest, Tenant};
use crate::unit::{CreateUnitRequest, Unit};

/// Port for the unit / tenant / occupancy registry
#[async_trait]
pub trait PropertyPort: DomainPort + HealthCheckable {
    /// Retrieves a unit by id
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if no such unit exists
    async fn get_unit(&self, id: UnitId) -> Result<Unit, PortError>;

    /// Lists all units ordered by number
    async fn list_units(&self) -> Result<Vec<Unit>, PortError>;

    /// Registers a unit; unit numbers are unique
    async fn create_unit(&self, request: CreateUnitRequest) -> Result<Unit, PortError>;

    /// Retrieves a tenant by id
    async fn get_tenant(&self, id: TenantId) -> Result<Tenant, PortError>;

    /// Registers a tenant
    async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, PortError>;

    /// Marks a tenant inactive and ends every occupancy they hold
    async fn deactivate_tenant(&self, id: TenantId, end_date: NaiveDate) -> Result<Tenant, PortError>;

    /// Returns true if `tenant_id` holds an active occupancy of `unit_id`
    async fn has_active_occupancy(&self, unit_id: UnitId, tenant_id: TenantId) -> Result<bool, PortError>;

    /// Tenants currently assigned to a unit
    async fn active_tenants(&self, unit_id: UnitId) -> Result<Vec<Tenant>, PortError>;

    /// Every tenant with their occupancy history, in roster order
    ///
    /// One entry per occupancy, active or ended, plus one `unassigned` entry
    /// for each tenant who never held an occupancy.
    async fn tenant_roster(&self) -> Result<Vec<RosterEntry>, PortError>;

    /// Assigns a tenant to a unit
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the tenant is already actively assigned
    async fn assign_tenant(
        &self,
        unit_id: UnitId,
        tenant_id: TenantId,
        start_date: NaiveDate,
    ) -> Result<Occupancy, PortError>;

    /// Ends the tenant's active occupancy of the unit
    async fn end_occupancy(
        &self,
        unit_id: UnitId,
        tenant_id: TenantId,
        end_date: NaiveDate,
    ) -> Result<Occupancy, PortError>;
}

/// Mock implementation of PropertyPort for testing
///
/// Stores the registry in memory; useful for exercising the ledger without
/// a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use core_kernel::{AdapterHealth, HealthCheckResult, OccupancyId};
    use crate::error::PropertyError;

    #[derive(Debug, Default)]
    struct Registry {
        units: HashMap<UnitId, Unit>,
        tenants: HashMap<TenantId, Tenant>,
        occupancies: HashMap<OccupancyId, Occupancy>,
    }

    /// In-memory mock implementation of PropertyPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPropertyPort {
        registry: Arc<RwLock<Registry>>,
    }

    impl MockPropertyPort {
        /// Creates a new, empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a fully built unit
        pub async fn insert_unit(&self, unit: Unit) {
            self.registry.write().await.units.insert(unit.id, unit);
        }

        /// Inserts a fully built tenant
        pub async fn insert_tenant(&self, tenant: Tenant) {
            self.registry.write().await.tenants.insert(tenant.id, tenant);
        }

        /// Changes a unit's current rent in place
        pub async fn set_rent(&self, unit_id: UnitId, rent: core_kernel::Amount) -> Result<(), PortError> {
            let mut registry = self.registry.write().await;
            let unit = registry
                .units
                .get_mut(&unit_id)
                .ok_or_else(|| PortError::not_found("Unit", unit_id))?;
            unit.change_rent(rent)?;
            Ok(())
        }
    }

    impl DomainPort for MockPropertyPort {}

    #[async_trait]
    impl HealthCheckable for MockPropertyPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-property-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PropertyPort for MockPropertyPort {
        async fn get_unit(&self, id: UnitId) -> Result<Unit, PortError> {
            self.registry
                .read()
                .await
                .units
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Unit", id))
        }

        async fn list_units(&self) -> Result<Vec<Unit>, PortError> {
            let mut units: Vec<Unit> = self.registry.read().await.units.values().cloned().collect();
            units.sort_by_key(|u| u.number);
            Ok(units)
        }

        async fn create_unit(&self, request: CreateUnitRequest) -> Result<Unit, PortError> {
            let mut registry = self.registry.write().await;
            if registry.units.values().any(|u| u.number == request.number) {
                return Err(PropertyError::DuplicateUnitNumber(request.number).into());
            }
            let unit = request.into_unit()?;
            registry.units.insert(unit.id, unit.clone());
            Ok(unit)
        }

        async fn get_tenant(&self, id: TenantId) -> Result<Tenant, PortError> {
            self.registry
                .read()
                .await
                .tenants
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Tenant", id))
        }

        async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, PortError> {
            let tenant = request.into_tenant()?;
            self.registry.write().await.tenants.insert(tenant.id, tenant.clone());
            Ok(tenant)
        }

        async fn deactivate_tenant(&self, id: TenantId, end_date: NaiveDate) -> Result<Tenant, PortError> {
            let mut registry = self.registry.write().await;
            for occupancy in registry.occupancies.values_mut() {
                if occupancy.tenant_id == id && occupancy.is_active() {
                    occupancy.end(end_date)?;
                }
            }
            let tenant = registry
                .tenants
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Tenant", id))?;
            tenant.deactivate();
            Ok(tenant.clone())
        }

        async fn has_active_occupancy(&self, unit_id: UnitId, tenant_id: TenantId) -> Result<bool, PortError> {
            Ok(self
                .registry
                .read()
                .await
                .occupancies
                .values()
                .any(|o| o.unit_id == unit_id && o.tenant_id == tenant_id && o.is_active()))
        }

        async fn active_tenants(&self, unit_id: UnitId) -> Result<Vec<Tenant>, PortError> {
            let registry = self.registry.read().await;
            Ok(registry
                .occupancies
                .values()
                .filter(|o| o.unit_id == unit_id && o.is_active())
                .filter_map(|o| registry.tenants.get(&o.tenant_id).cloned())
                .collect())
        }

        async fn tenant_roster(&self) -> Result<Vec<RosterEntry>, PortError> {
            let registry = self.registry.read().await;
            let mut roster = Vec::new();
            for tenant in registry.tenants.values() {
                let mut assigned = registry
                    .occupancies
                    .values()
                    .filter(|o| o.tenant_id == tenant.id)
                    .filter_map(|o| {
                        let unit = registry.units.get(&o.unit_id)?;
                        Some(RosterEntry::assigned(tenant.clone(), unit.number, o))
                    })
                    .peekable();
                if assigned.peek().is_none() {
                    roster.push(RosterEntry::unassigned(tenant.clone()));
                } else {
                    roster.extend(assigned);
                }
            }
            roster.sort_by(RosterEntry::roster_order);
            Ok(roster)
        }

        async fn assign_tenant(
            &self,
            unit_id: UnitId,
            tenant_id: TenantId,
            start_date: NaiveDate,
        ) -> Result<Occupancy, PortError> {
            let mut registry = self.registry.write().await;
            if !registry.units.contains_key(&unit_id) {
                return Err(PortError::not_found("Unit", unit_id));
            }
            if !registry.tenants.contains_key(&tenant_id) {
                return Err(PortError::not_found("Tenant", tenant_id));
            }
            if registry
                .occupancies
                .values()
                .any(|o| o.unit_id == unit_id && o.tenant_id == tenant_id && o.is_active())
            {
                return Err(PropertyError::AlreadyAssigned.into());
            }
            let occupancy = Occupancy::start(unit_id, tenant_id, start_date);
            registry.occupancies.insert(occupancy.id, occupancy.clone());
            Ok(occupancy)
        }

        async fn end_occupancy(
            &self,
            unit_id: UnitId,
            tenant_id: TenantId,
            end_date: NaiveDate,
        ) -> Result<Occupancy, PortError> {
            let mut registry = self.registry.write().await;
            let occupancy = registry
                .occupancies
                .values_mut()
                .find(|o| o.unit_id == unit_id && o.tenant_id == tenant_id && o.is_active())
                .ok_or_else(|| PortError::not_found("Occupancy", format!("{}/{}", unit_id, tenant_id)))?;
            occupancy.end(end_date)?;
            Ok(occupancy.clone())
        }
    }
}
