//! Property-Based Test Generators
//!
//! Proptest strategies for ledger inputs, plus `fake`-backed tenant data.

use fake::faker::name::en::Name;
use fake::{Dummy, Fake, Faker};
use proptest::prelude::*;

use core_kernel::{Amount, BillingMonth};
use domain_property::Tenant;

/// Strategy for positive payment amounts up to a few months of rent
pub fn payment_amount_strategy() -> impl Strategy<Value = Amount> {
    (1i64..15_000).prop_map(Amount::new)
}

/// Strategy for plausible monthly rents
pub fn rent_strategy() -> impl Strategy<Value = Amount> {
    (500i64..50_000).prop_map(Amount::new)
}

/// Strategy for billing months between 2000 and 2099
pub fn billing_month_strategy() -> impl Strategy<Value = BillingMonth> {
    (2000i32..2100, 1u32..=12).prop_map(|(year, month)| {
        BillingMonth::new(year, month).expect("strategy produces valid months")
    })
}

/// Strategy for a sequence of (amount, start month) payments within one year
pub fn payment_plan_strategy(year: i32) -> impl Strategy<Value = Vec<(Amount, BillingMonth)>> {
    prop::collection::vec(
        (payment_amount_strategy(), 1u32..=12).prop_map(move |(amount, month)| {
            (amount, BillingMonth::new(year, month).expect("strategy produces valid months"))
        }),
        1..10,
    )
}

/// Random tenant details
#[derive(Debug, Clone, Dummy)]
pub struct TenantSeed {
    #[dummy(faker = "Name()")]
    pub full_name: String,
    /// Kenyan mobile subscriber number without the leading 7
    #[dummy(faker = "10_000_000..99_999_999")]
    pub subscriber: u32,
}

impl TenantSeed {
    pub fn phone(&self) -> String {
        format!("+2547{:08}", self.subscriber)
    }

    pub fn into_tenant(self) -> Tenant {
        let phone = self.phone();
        Tenant::new(self.full_name, phone, None).expect("generated tenant is valid")
    }
}

/// A random valid tenant
pub fn fake_tenant() -> Tenant {
    Faker.fake::<TenantSeed>().into_tenant()
}
