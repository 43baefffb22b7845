//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{Claim, ProcedureCode, INITIAL_STATUS};

/// Builder for persisted claim records
pub struct TestClaimBuilder {
    id: ClaimId,
    payer: String,
    amount: Decimal,
    procedure_codes: Vec<ProcedureCode>,
    status: String,
    created_at: DateTime<Utc>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a new builder with a random payer and default values
    pub fn new() -> Self {
        Self {
            id: ClaimId::new(1),
            payer: CompanyName().fake(),
            amount: dec!(250.00),
            procedure_codes: vec![ProcedureCode::P1],
            status: INITIAL_STATUS.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        }
    }

    /// Sets the claim ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = ClaimId::new(id);
        self
    }

    /// Sets the payer
    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = payer.into();
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the procedure codes
    pub fn with_codes(mut self, codes: Vec<ProcedureCode>) -> Self {
        self.procedure_codes = codes;
        self
    }

    /// Sets a status other than the initial one, as downstream processing would
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        Claim {
            id: self.id,
            payer: self.payer,
            amount: self.amount,
            procedure_codes: self.procedure_codes,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
