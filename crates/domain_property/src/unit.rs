//! Rental units

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Amount, UnitId};
use crate::error::PropertyError;

/// Kind of rental unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    /// Single room with a kitchenette
    Bedsitter,
    /// Single room
    Single,
    /// Anything else
    Other,
}

impl UnitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Bedsitter => "bedsitter",
            UnitCategory::Single => "single",
            UnitCategory::Other => "other",
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitCategory {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedsitter" => Ok(UnitCategory::Bedsitter),
            "single" => Ok(UnitCategory::Single),
            "other" => Ok(UnitCategory::Other),
            other => Err(PropertyError::UnknownCategory(other.to_string())),
        }
    }
}

/// Largest monthly rent a unit may carry
pub const MAX_MONTHLY_RENT: i64 = 10_000_000;

fn check_rent(monthly_rent: Amount) -> Result<(), PropertyError> {
    if monthly_rent.is_positive() && monthly_rent.value() <= MAX_MONTHLY_RENT {
        Ok(())
    } else {
        Err(PropertyError::InvalidRent(monthly_rent.value()))
    }
}

/// A rentable unit
///
/// `monthly_rent` is the *current* rent. Billing periods copy it when they
/// are created, so changing it never rewrites months already billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Human-facing house number, unique across the registry
    pub number: i32,
    pub category: UnitCategory,
    pub monthly_rent: Amount,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Unit {
    /// Creates a new active unit
    pub fn new(number: i32, category: UnitCategory, monthly_rent: Amount) -> Result<Self, PropertyError> {
        if number <= 0 {
            return Err(PropertyError::InvalidUnitNumber(number));
        }
        check_rent(monthly_rent)?;

        Ok(Self {
            id: UnitId::new_v7(),
            number,
            category,
            monthly_rent,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// Changes the rent charged for months billed from now on
    pub fn change_rent(&mut self, monthly_rent: Amount) -> Result<(), PropertyError> {
        check_rent(monthly_rent)?;
        self.monthly_rent = monthly_rent;
        Ok(())
    }
}

/// Request for registering a unit
#[derive(Debug, Clone)]
pub struct CreateUnitRequest {
    pub number: i32,
    pub category: UnitCategory,
    pub monthly_rent: Amount,
}

impl CreateUnitRequest {
    /// Builds the unit this request describes
    pub fn into_unit(self) -> Result<Unit, PropertyError> {
        Unit::new(self.number, self.category, self.monthly_rent)
    }
}
