//! Tenant roster
//!
//! Every tenant alongside each unit they have ever been assigned to. A
//! tenant with several occupancies appears once per occupancy; a tenant who
//! was never assigned appears once as `unassigned`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use core_kernel::UnitId;

use crate::occupancy::{Occupancy, OccupancyStatus};
use crate::tenant::Tenant;

/// Where a roster line stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    Active,
    Ended,
    /// The tenant has never held an occupancy
    Unassigned,
}

impl From<OccupancyStatus> for RosterStatus {
    fn from(status: OccupancyStatus) -> Self {
        match status {
            OccupancyStatus::Active => RosterStatus::Active,
            OccupancyStatus::Ended => RosterStatus::Ended,
        }
    }
}

/// One line of the tenant roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub status: RosterStatus,
    pub unit_id: Option<UnitId>,
    pub unit_number: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RosterEntry {
    /// Line for one occupancy of `unit_number`
    pub fn assigned(tenant: Tenant, unit_number: i32, occupancy: &Occupancy) -> Self {
        Self {
            tenant,
            status: occupancy.status.into(),
            unit_id: Some(occupancy.unit_id),
            unit_number: Some(unit_number),
            start_date: Some(occupancy.start_date),
            end_date: occupancy.end_date,
        }
    }

    /// Line for a tenant with no occupancy history
    pub fn unassigned(tenant: Tenant) -> Self {
        Self {
            tenant,
            status: RosterStatus::Unassigned,
            unit_id: None,
            unit_number: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Roster order: by tenant name, then tenant, then start date
    pub fn roster_order(&self, other: &Self) -> Ordering {
        self.tenant
            .full_name
            .cmp(&other.tenant.full_name)
            .then_with(|| self.tenant.id.as_uuid().cmp(other.tenant.id.as_uuid()))
            .then_with(|| self.start_date.cmp(&other.start_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigned_line_follows_occupancy() {
        let tenant = Tenant::new("Jane Wanjiku", "+254712345678", None).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let mut occupancy = Occupancy::start(UnitId::new_v7(), tenant.id, start);
        occupancy.end(end).unwrap();

        let entry = RosterEntry::assigned(tenant, 4, &occupancy);
        assert_eq!(entry.status, RosterStatus::Ended);
        assert_eq!(entry.unit_number, Some(4));
        assert_eq!(entry.end_date, Some(end));
    }

    #[test]
    fn test_unassigned_line_serializes_flat() {
        let tenant = Tenant::new("Otieno Ochieng", "+254722000111", None).unwrap();
        let json = serde_json::to_value(RosterEntry::unassigned(tenant)).unwrap();

        assert_eq!(json["full_name"], "Otieno Ochieng");
        assert_eq!(json["status"], "unassigned");
        assert!(json["unit_number"].is_null());
    }
}
