//! Occupancy - the assignment of a tenant to a unit

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{OccupancyId, TenantId, UnitId};
use crate::error::PropertyError;

/// Occupancy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    /// Tenant currently lives in (and pays for) the unit
    Active,
    /// Tenant has moved out
    Ended,
}

impl OccupancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyStatus::Active => "active",
            OccupancyStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccupancyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OccupancyStatus::Active),
            "ended" => Ok(OccupancyStatus::Ended),
            other => Err(format!("unknown occupancy status: {}", other)),
        }
    }
}

/// A tenant's assignment to a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub id: OccupancyId,
    pub unit_id: UnitId,
    pub tenant_id: TenantId,
    pub status: OccupancyStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Occupancy {
    /// Starts a new active occupancy
    pub fn start(unit_id: UnitId, tenant_id: TenantId, start_date: NaiveDate) -> Self {
        Self {
            id: OccupancyId::new_v7(),
            unit_id,
            tenant_id,
            status: OccupancyStatus::Active,
            start_date,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OccupancyStatus::Active
    }

    /// Ends the occupancy on `end_date`
    pub fn end(&mut self, end_date: NaiveDate) -> Result<(), PropertyError> {
        if !self.is_active() {
            return Err(PropertyError::NoActiveOccupancy);
        }
        self.status = OccupancyStatus::Ended;
        self.end_date = Some(end_date);
        Ok(())
    }
}
