//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! rent ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Seed data and a ready-wired in-memory ledger
//! - `builders`: Builder patterns for test data construction
//! - `database`: PostgreSQL test container management
//! - `assertions`: Allocation and settlement invariants as assertions
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
