//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use core_kernel::{Amount, BillingMonth, TenantId, UnitId};
use domain_billing::{AllocationRequest, PaymentMethod};
use domain_property::{Tenant, Unit, UnitCategory};

use crate::fixtures::{MonthFixtures, BEDSITTER_RENT};

/// Builder for units
pub struct UnitBuilder {
    number: i32,
    category: UnitCategory,
    rent: i64,
}

impl Default for UnitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self {
            number: 1,
            category: UnitCategory::Bedsitter,
            rent: BEDSITTER_RENT,
        }
    }

    pub fn number(mut self, number: i32) -> Self {
        self.number = number;
        self
    }

    pub fn category(mut self, category: UnitCategory) -> Self {
        self.category = category;
        self
    }

    pub fn rent(mut self, rent: i64) -> Self {
        self.rent = rent;
        self
    }

    pub fn build(self) -> Unit {
        Unit::new(self.number, self.category, Amount::new(self.rent)).expect("UnitBuilder produced an invalid unit")
    }
}

/// Builder for tenants
pub struct TenantBuilder {
    full_name: String,
    phone: String,
    email: Option<String>,
}

impl Default for TenantBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantBuilder {
    pub fn new() -> Self {
        Self {
            full_name: "Jane Wanjiku".to_string(),
            phone: "+254712345678".to_string(),
            email: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn build(self) -> Tenant {
        Tenant::new(self.full_name, self.phone, self.email).expect("TenantBuilder produced an invalid tenant")
    }
}

/// Builder for allocation requests
pub struct AllocationRequestBuilder {
    unit_id: UnitId,
    payer_id: TenantId,
    amount: i64,
    start: BillingMonth,
    method: PaymentMethod,
    tx_ref: Option<String>,
}

impl AllocationRequestBuilder {
    /// One month of bedsitter rent from January 2024, in cash
    pub fn new(unit_id: UnitId, payer_id: TenantId) -> Self {
        Self {
            unit_id,
            payer_id,
            amount: BEDSITTER_RENT,
            start: MonthFixtures::jan_2024(),
            method: PaymentMethod::Cash,
            tx_ref: None,
        }
    }

    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    pub fn start(mut self, year: i32, month: u32) -> Self {
        self.start = MonthFixtures::month(year, month);
        self
    }

    /// Mobile money with a transaction code
    pub fn mpesa(mut self, tx_ref: impl Into<String>) -> Self {
        self.method = PaymentMethod::MobileMoney;
        self.tx_ref = Some(tx_ref.into());
        self
    }

    pub fn build(self) -> AllocationRequest {
        let request = AllocationRequest::new(self.unit_id, self.payer_id, Amount::new(self.amount), self.start)
            .with_method(self.method);
        match self.tx_ref {
            Some(tx_ref) => request.with_reference(tx_ref),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let unit = UnitBuilder::new().number(9).category(UnitCategory::Single).rent(3000).build();
        assert_eq!(unit.number, 9);
        assert_eq!(unit.monthly_rent, Amount::new(3000));

        let tenant = TenantBuilder::new().name("Otieno").phone("+254 722 000 111").build();
        assert_eq!(tenant.phone, "+254722000111");

        let request = AllocationRequestBuilder::new(unit.id, tenant.id)
            .amount(7000)
            .start(2024, 3)
            .mpesa("QAB12CD34E")
            .build();
        assert_eq!(request.method, PaymentMethod::MobileMoney);
        assert_eq!(request.start, MonthFixtures::month(2024, 3));
        assert_eq!(request.tx_ref.as_deref(), Some("QAB12CD34E"));
    }
}
