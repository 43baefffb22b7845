//! Strongly-typed identifiers for domain entities
//!
//! Claim identifiers are generated by the store (a `BIGSERIAL` column), so the
//! newtype wraps the integer key rather than a client-generated UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identifier of a persisted claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(i64);

impl ClaimId {
    /// Wraps a store-generated key
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying key
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClaimId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| CoreError::validation(format!("'{}' is not a claim identifier", s)))
    }
}

impl From<i64> for ClaimId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ClaimId> for i64 {
    fn from(id: ClaimId) -> i64 {
        id.0
    }
}
