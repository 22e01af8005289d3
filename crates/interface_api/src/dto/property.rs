//! Unit and tenant DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use core_kernel::Amount;
use domain_property::{CreateTenantRequest, CreateUnitRequest, UnitCategory};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUnitBody {
    #[validate(range(min = 1))]
    pub number: i32,
    pub category: UnitCategory,
    /// Capped at `domain_property::MAX_MONTHLY_RENT`
    #[validate(range(min = 1, max = 10_000_000))]
    pub monthly_rent: i64,
}

impl From<CreateUnitBody> for CreateUnitRequest {
    fn from(body: CreateUnitBody) -> Self {
        CreateUnitRequest {
            number: body.number,
            category: body.category,
            monthly_rent: Amount::new(body.monthly_rent),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantBody {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 9, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
}

impl From<CreateTenantBody> for CreateTenantRequest {
    fn from(body: CreateTenantBody) -> Self {
        CreateTenantRequest {
            full_name: body.full_name,
            phone: body.phone,
            email: body.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignTenantBody {
    pub tenant_id: Uuid,
    /// Defaults to today in the ledger's timezone
    pub start_date: Option<NaiveDate>,
}

/// Query string for ending an occupancy or deactivating a tenant
#[derive(Debug, Default, Deserialize)]
pub struct EndDateQuery {
    pub end_date: Option<NaiveDate>,
}
