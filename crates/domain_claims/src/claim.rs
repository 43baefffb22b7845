//! Claim record

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use crate::error::ClaimError;

/// Status every claim carries when it is first persisted
pub const INITIAL_STATUS: &str = "submitted";

/// Largest amount a `NUMERIC(10,2)` column can hold
pub const MAX_AMOUNT: Decimal = dec!(99999999.99);

/// Billable procedure code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProcedureCode {
    P1,
    P2,
    P3,
}

impl ProcedureCode {
    pub const ALL: [ProcedureCode; 3] = [ProcedureCode::P1, ProcedureCode::P2, ProcedureCode::P3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureCode::P1 => "P1",
            ProcedureCode::P2 => "P2",
            ProcedureCode::P3 => "P3",
        }
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcedureCode {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P1" => Ok(ProcedureCode::P1),
            "P2" => Ok(ProcedureCode::P2),
            "P3" => Ok(ProcedureCode::P3),
            other => Err(ClaimError::UnknownProcedureCode(other.to_string())),
        }
    }
}

/// A validated claim submission that has not been persisted yet
///
/// Construction enforces the invariants of a persisted claim: a non-empty
/// payer, a non-negative amount with two fractional digits that fits the
/// column, and at least one procedure code.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    payer: String,
    amount: Decimal,
    procedure_codes: Vec<ProcedureCode>,
}

impl NewClaim {
    pub fn new(
        payer: impl Into<String>,
        amount: Decimal,
        procedure_codes: Vec<ProcedureCode>,
    ) -> Result<Self, ClaimError> {
        let payer = payer.into();
        if payer.trim().is_empty() {
            return Err(ClaimError::invalid("payer", "must not be empty"));
        }
        if amount < Decimal::ZERO {
            return Err(ClaimError::invalid("amount", "must not be negative"));
        }
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        if amount > MAX_AMOUNT {
            return Err(ClaimError::invalid("amount", format!("must not exceed {}", MAX_AMOUNT)));
        }
        if procedure_codes.is_empty() {
            return Err(ClaimError::invalid("procedure_codes", "must not be empty"));
        }

        Ok(Self {
            payer,
            amount,
            procedure_codes,
        })
    }

    pub fn payer(&self) -> &str {
        &self.payer
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn procedure_codes(&self) -> &[ProcedureCode] {
        &self.procedure_codes
    }

    /// Builds the persisted record the store would return for this submission
    pub fn into_claim(self, id: ClaimId, now: DateTime<Utc>) -> Claim {
        Claim {
            id,
            payer: self.payer,
            amount: self.amount,
            procedure_codes: self.procedure_codes,
            status: INITIAL_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Store-generated identifier
    pub id: ClaimId,
    /// Paying party
    pub payer: String,
    /// Billed amount, two fractional digits
    pub amount: Decimal,
    /// Billed procedures, in submission order
    pub procedure_codes: Vec<ProcedureCode>,
    /// Processing status
    pub status: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}
