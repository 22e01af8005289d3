//! Request handlers

pub mod health;
pub mod ledger;
pub mod payments;
pub mod tenants;
pub mod units;
