//! Billing domain errors

use thiserror::Error;

use core_kernel::{BillingMonth, BillingPeriodId, CalendarError, CoreError, PaymentId, PortError, TenantId, UnitId};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Input rejected before anything was recorded
    #[error("Validation error: {0}")]
    Validation(String),

    /// The payer holds no active occupancy of the unit
    #[error("Tenant {payer} is not assigned to unit {unit}")]
    PayerNotAssigned { unit: UnitId, payer: TenantId },

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Billing period not found: {0}")]
    PeriodNotFound(BillingPeriodId),

    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// The allocator walked past its month ceiling without exhausting the sum
    #[error("Allocation starting at {start} visited more than {months} months")]
    AllocationLimitExceeded { start: BillingMonth, months: u32 },

    /// A total over stored amounts does not fit in an `Amount`
    #[error("Amount overflow computing {0}")]
    AmountOverflow(&'static str),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// True for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_)
                | BillingError::PayerNotAssigned { .. }
                | BillingError::Calendar(_)
                | BillingError::Port(PortError::Validation { .. })
                | BillingError::Core(CoreError::Validation(_))
        )
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            BillingError::UnitNotFound(_)
            | BillingError::PeriodNotFound(_)
            | BillingError::PaymentNotFound(_) => true,
            BillingError::Port(e) => e.is_not_found(),
            BillingError::Core(CoreError::NotFound(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unit = UnitId::new_v7();
        let payer = TenantId::new_v7();

        assert!(BillingError::PayerNotAssigned { unit, payer }.is_validation());
        assert!(BillingError::validation("amount must be positive").is_validation());
        assert!(BillingError::UnitNotFound(unit).is_not_found());
        assert!(BillingError::from(PortError::not_found("Payment", "x")).is_not_found());
        assert!(!BillingError::from(PortError::internal("boom")).is_validation());
        assert!(!BillingError::from(PortError::internal("boom")).is_not_found());
        assert!(!BillingError::AmountOverflow("total_due").is_validation());
    }

    #[test]
    fn test_payer_not_assigned_message() {
        let unit = UnitId::new_v7();
        let payer = TenantId::new_v7();
        let message = BillingError::PayerNotAssigned { unit, payer }.to_string();
        assert!(message.contains(&unit.to_string()));
        assert!(message.contains(&payer.to_string()));
    }
}
