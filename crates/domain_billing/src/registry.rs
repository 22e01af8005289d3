//! Billing Period Registry
//!
//! Guarantees one billing period per unit per month. Periods are created on
//! first reference with the unit's rent at that moment.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{BillingMonth, PortError, UnitId};
use domain_property::{PropertyPort, Unit};

use crate::error::BillingError;
use crate::period::BillingPeriod;
use crate::ports::PeriodStore;

#[derive(Clone)]
pub struct BillingPeriodRegistry {
    periods: Arc<dyn PeriodStore>,
    property: Arc<dyn PropertyPort>,
    due_day: u32,
}

impl BillingPeriodRegistry {
    pub fn new(periods: Arc<dyn PeriodStore>, property: Arc<dyn PropertyPort>, due_day: u32) -> Self {
        Self { periods, property, due_day }
    }

    /// Returns the period of `unit_id` for `month`, creating it if needed
    ///
    /// An existing period is returned untouched, even if the unit's rent has
    /// since changed.
    ///
    /// # Errors
    ///
    /// `BillingError::UnitNotFound` if the period has to be created and the
    /// unit does not exist
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, unit_id: UnitId, month: BillingMonth) -> Result<BillingPeriod, BillingError> {
        if let Some(existing) = self.find(unit_id, month).await? {
            return Ok(existing);
        }

        let unit = load_unit(self.property.as_ref(), unit_id).await?;
        let period = BillingPeriod::open(unit_id, month, unit.monthly_rent, self.due_day);
        let stored = self.periods.insert_period(&period).await?;

        if stored.id == period.id {
            info!(
                period_id = %stored.id,
                amount_due = %stored.amount_due,
                due_date = %stored.due_date,
                "Opened billing period"
            );
        }
        Ok(stored)
    }

    /// Looks up the period of `unit_id` for `month` without creating it
    pub async fn find(&self, unit_id: UnitId, month: BillingMonth) -> Result<Option<BillingPeriod>, BillingError> {
        Ok(self
            .periods
            .find_period(unit_id, month.period_start(), month.period_end())
            .await?)
    }
}

/// Loads a unit, reporting a missing one as `UnitNotFound`
pub(crate) async fn load_unit(property: &dyn PropertyPort, unit_id: UnitId) -> Result<Unit, BillingError> {
    property.get_unit(unit_id).await.map_err(|e| match e {
        PortError::NotFound { .. } => BillingError::UnitNotFound(unit_id),
        other => BillingError::Port(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodStatus;
    use crate::ports::mock::InMemoryLedgerStore;
    use chrono::NaiveDate;
    use core_kernel::Amount;
    use domain_property::mock::MockPropertyPort;
    use domain_property::UnitCategory;

    async fn setup() -> (BillingPeriodRegistry, InMemoryLedgerStore, MockPropertyPort, UnitId) {
        let property = MockPropertyPort::new();
        let unit = Unit::new(1, UnitCategory::Bedsitter, Amount::new(3500)).unwrap();
        let unit_id = unit.id;
        property.insert_unit(unit).await;

        let store = InMemoryLedgerStore::new();
        let registry = BillingPeriodRegistry::new(Arc::new(store.clone()), Arc::new(property.clone()), 5);
        (registry, store, property, unit_id)
    }

    #[tokio::test]
    async fn test_creates_period_from_current_rent() {
        let (registry, _, _, unit_id) = setup().await;
        let month = BillingMonth::new(2024, 2).unwrap();

        let period = registry.get_or_create(unit_id, month).await.unwrap();
        assert_eq!(period.amount_due, Amount::new(3500));
        assert_eq!(period.status, PeriodStatus::Pending);
        assert_eq!(period.period_end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(period.due_date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let (registry, store, property, unit_id) = setup().await;
        let month = BillingMonth::new(2024, 1).unwrap();

        let first = registry.get_or_create(unit_id, month).await.unwrap();
        property.set_rent(unit_id, Amount::new(4000)).await.unwrap();
        let second = registry.get_or_create(unit_id, month).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.amount_due, Amount::new(3500));
        assert_eq!(store.period_count().await, 1);

        let next = registry.get_or_create(unit_id, month.next().unwrap()).await.unwrap();
        assert_eq!(next.amount_due, Amount::new(4000));
    }

    #[tokio::test]
    async fn test_unknown_unit() {
        let (registry, store, _, _) = setup().await;
        let result = registry
            .get_or_create(UnitId::new_v7(), BillingMonth::new(2024, 1).unwrap())
            .await;

        assert!(matches!(result, Err(BillingError::UnitNotFound(_))));
        assert_eq!(store.period_count().await, 0);
    }

    #[tokio::test]
    async fn test_find_never_creates() {
        let (registry, store, _, unit_id) = setup().await;
        let found = registry.find(unit_id, BillingMonth::new(2024, 1).unwrap()).await.unwrap();
        assert!(found.is_none());
        assert_eq!(store.period_count().await, 0);
    }
}
