//! Pre-built Test Fixtures
//!
//! Predictable seed data and a fully wired in-memory ledger for tests that
//! exercise the allocator or the API without a database.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::sync::Arc;

use core_kernel::{Amount, BillingMonth};
use domain_billing::ports::mock::MockLedger;
use domain_billing::{BillingConfig, LedgerReporter, PaymentAllocator};
use domain_property::{Tenant, Unit, UnitCategory};

/// Standard monthly rent of a bedsitter
pub const BEDSITTER_RENT: i64 = 3500;
/// Standard monthly rent of a single room
pub const SINGLE_RENT: i64 = 3000;

/// Houses 1-6 are bedsitters, 7-10 are singles
pub static SEED_UNITS: Lazy<Vec<(i32, UnitCategory, i64)>> = Lazy::new(|| {
    (1..=10)
        .map(|number| {
            if number <= 6 {
                (number, UnitCategory::Bedsitter, BEDSITTER_RENT)
            } else {
                (number, UnitCategory::Single, SINGLE_RENT)
            }
        })
        .collect()
});

/// Fixture for calendar test data
pub struct MonthFixtures;

impl MonthFixtures {
    pub fn jan_2024() -> BillingMonth {
        Self::month(2024, 1)
    }

    /// Leap-year February
    pub fn feb_2024() -> BillingMonth {
        Self::month(2024, 2)
    }

    pub fn dec_2024() -> BillingMonth {
        Self::month(2024, 12)
    }

    /// Panics on an invalid month; test use only
    pub fn month(year: i32, month: u32) -> BillingMonth {
        BillingMonth::new(year, month).expect("valid fixture month")
    }

    /// Default occupancy start date
    pub fn move_in() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 1).expect("valid fixture date")
    }
}

/// Builds the ten seed units
pub fn seed_units() -> Vec<Unit> {
    SEED_UNITS
        .iter()
        .map(|&(number, category, rent)| Unit::new(number, category, Amount::new(rent)).expect("valid seed unit"))
        .collect()
}

/// An in-memory ledger with one unit and one assigned tenant
pub struct LedgerFixture {
    pub ledger: MockLedger,
    pub allocator: Arc<PaymentAllocator>,
    pub reporter: Arc<LedgerReporter>,
    pub unit: Unit,
    pub tenant: Tenant,
}

impl LedgerFixture {
    /// Unit 1, a bedsitter at the standard rent, with Jane Wanjiku assigned
    pub async fn new() -> Self {
        Self::with(MockLedger::new(), BillingConfig::default()).await
    }

    /// Same as `new`, but receipts always fail to send
    pub async fn with_failing_notifications() -> Self {
        Self::with(MockLedger::with_failing_notifications(), BillingConfig::default()).await
    }

    pub async fn with(ledger: MockLedger, config: BillingConfig) -> Self {
        let unit = Unit::new(1, UnitCategory::Bedsitter, Amount::new(BEDSITTER_RENT)).expect("valid fixture unit");
        let tenant = Tenant::new("Jane Wanjiku", "+254712345678", None).expect("valid fixture tenant");

        ledger.property.insert_unit(unit.clone()).await;
        ledger.property.insert_tenant(tenant.clone()).await;
        domain_property::PropertyPort::assign_tenant(&ledger.property, unit.id, tenant.id, MonthFixtures::move_in())
            .await
            .expect("fixture assignment");

        let ports = ledger.ports();
        Self {
            allocator: Arc::new(PaymentAllocator::new(ports.clone(), config)),
            reporter: Arc::new(LedgerReporter::new(&ports)),
            ledger,
            unit,
            tenant,
        }
    }
}
