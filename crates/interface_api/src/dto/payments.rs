//! Payment DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::{AllocationResult, PaymentMethod};

fn default_method() -> PaymentMethod {
    PaymentMethod::Cash
}

#[derive(Debug, Deserialize, Validate)]
pub struct AllocatePaymentRequest {
    pub unit_id: Uuid,
    /// The paying tenant
    pub tenant_id: Uuid,
    #[serde(default = "default_method")]
    pub method: PaymentMethod,
    /// Larger sums are split by the caller; the allocator applies its own
    /// `max_payment` on top
    #[validate(range(min = 1, max = 100_000_000))]
    pub amount: i64,
    /// Defaults to the current month when both are absent
    pub start_year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub start_month: Option<u32>,
    #[validate(length(min = 1, max = 64))]
    pub tx_ref: Option<String>,
    #[validate(length(min = 9, max = 20))]
    pub msisdn: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub allocations: Vec<AllocationResult>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReversePaymentRequest {
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
}

/// Query string for the transactions list
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TransactionsQuery {
    /// Defaults to 100
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u32>,
}

impl TransactionsQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(100)
    }
}
