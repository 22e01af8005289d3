//! Property domain errors

use thiserror::Error;
use core_kernel::PortError;

/// Errors that can occur in the property domain
#[derive(Debug, Error)]
pub enum PropertyError {
    /// Rent must be positive and at most `MAX_MONTHLY_RENT`
    #[error("Invalid monthly rent: {0}")]
    InvalidRent(i64),

    /// Unit numbers are positive and unique
    #[error("Invalid unit number: {0}")]
    InvalidUnitNumber(i32),

    /// A unit with this number is already registered
    #[error("Unit number {0} already exists")]
    DuplicateUnitNumber(i32),

    /// Tenant name is missing or too long
    #[error("Invalid tenant name: {0}")]
    InvalidName(String),

    /// Phone number is not in international format
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Email address is malformed
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Unknown category string
    #[error("Unknown unit category: {0}")]
    UnknownCategory(String),

    /// Tenant already holds an active occupancy of this unit
    #[error("Tenant is already assigned to this unit")]
    AlreadyAssigned,

    /// Occupancy cannot be ended because none is active
    #[error("No active occupancy to end")]
    NoActiveOccupancy,
}

impl From<PropertyError> for PortError {
    fn from(error: PropertyError) -> Self {
        match error {
            PropertyError::DuplicateUnitNumber(_) | PropertyError::AlreadyAssigned => {
                PortError::conflict(error.to_string())
            }
            PropertyError::NoActiveOccupancy => PortError::not_found("Occupancy", "active"),
            other => PortError::validation(other.to_string()),
        }
    }
}
