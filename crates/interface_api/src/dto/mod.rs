//! Request and response bodies

pub mod payments;
pub mod property;
