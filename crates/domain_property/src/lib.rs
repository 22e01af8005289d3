//! Property Domain - Units, Tenants, and Occupancies
//!
//! This crate models the registry the rent ledger bills against:
//!
//! - **Unit**: a rentable house with a unique number and a monthly rent
//! - **Tenant**: a person who pays rent
//! - **Occupancy**: the assignment of a tenant to a unit; only tenants with
//!   an *active* occupancy may pay rent for that unit
//!
//! The ledger reaches the registry exclusively through [`PropertyPort`], so
//! the registry can be backed by PostgreSQL (`infra_db`) or by the in-memory
//! mock used in tests.

pub mod unit;
pub mod tenant;
pub mod occupancy;
pub mod roster;
pub mod ports;
pub mod error;

pub use unit::{Unit, UnitCategory, CreateUnitRequest, MAX_MONTHLY_RENT};
pub use tenant::{Tenant, CreateTenantRequest};
pub use occupancy::{Occupancy, OccupancyStatus};
pub use roster::{RosterEntry, RosterStatus};
pub use ports::PropertyPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock;
pub use error::PropertyError;
