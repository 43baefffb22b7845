//! Claims Domain
//!
//! A claim is submitted once with a payer, an amount and a list of procedure
//! codes, and is read back any number of times. This crate owns the claim
//! record, the submission rules, and the port through which claims are
//! persisted.
//!
//! # Claim Lifecycle
//!
//! ```text
//! payload -> parse_new_claim -> NewClaim -> ClaimPort::create -> Claim (status "submitted")
//! ```

pub mod claim;
pub mod validation;
pub mod ports;
pub mod error;

pub use claim::{Claim, NewClaim, ProcedureCode, INITIAL_STATUS, MAX_AMOUNT};
pub use validation::parse_new_claim;
pub use ports::ClaimPort;
pub use error::ClaimError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockClaimPort;
