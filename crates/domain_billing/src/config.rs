//! Billing engine settings

use serde::{Deserialize, Serialize};

use core_kernel::calendar::validate_due_day;
use core_kernel::{Amount, CoreError, Timezone};

/// Settings shared by the registry, allocator and reporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Day of month rent falls due; clamped to the month's last day
    pub due_day: u32,
    /// Upper bound on months one allocation may walk through
    pub max_months_advance: u32,
    /// Largest single payment the allocator accepts
    pub max_payment: Amount,
    /// Prefix of the receipt text
    pub receipt_sender: String,
    /// Currency label printed on receipts
    pub currency_label: String,
    pub timezone: Timezone,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            due_day: 5,
            max_months_advance: 1200,
            max_payment: Amount::new(100_000_000),
            receipt_sender: "Rent Ledger".to_string(),
            currency_label: "KES".to_string(),
            timezone: Timezone::default(),
        }
    }
}

impl BillingConfig {
    /// Checks the settings are usable
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_due_day(self.due_day)?;
        if self.max_months_advance == 0 {
            return Err(CoreError::configuration("max_months_advance must be at least 1"));
        }
        if !self.max_payment.is_positive() {
            return Err(CoreError::configuration("max_payment must be positive"));
        }
        if self.receipt_sender.trim().is_empty() {
            return Err(CoreError::configuration("receipt_sender must not be empty"));
        }
        Ok(())
    }

    pub fn with_due_day(mut self, due_day: u32) -> Self {
        self.due_day = due_day;
        self
    }

    pub fn with_max_months_advance(mut self, months: u32) -> Self {
        self.max_months_advance = months;
        self
    }

    pub fn with_max_payment(mut self, max_payment: Amount) -> Self {
        self.max_payment = max_payment;
        self
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }
}
