//! Repository implementations for domain entities
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! types. Each one implements the port trait its domain crate defines.

pub mod claims;

pub use claims::{ClaimRow, PostgresClaimRepository};
