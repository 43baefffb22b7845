//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims service test suite.
//!
//! # Modules
//!
//! - `fixtures`: Tokens, payloads and identifiers used across tests
//! - `builders`: Builder for persisted claim records
//! - `database`: PostgreSQL testcontainer with the service schema applied
//! - `assertions`: JSON response assertions
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
