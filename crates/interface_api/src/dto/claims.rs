//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_claims::{Claim, ProcedureCode};

/// A stored claim as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: i64,
    pub payer: String,
    /// Serialized as a decimal string, e.g. `"120.50"`
    pub amount: Decimal,
    pub procedure_codes: Vec<ProcedureCode>,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.value(),
            payer: claim.payer,
            amount: claim.amount,
            procedure_codes: claim.procedure_codes,
            status: claim.status,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::ClaimId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_claim_response_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let claim = Claim {
            id: ClaimId::new(7),
            payer: "Acme".to_string(),
            amount: dec!(120.50),
            procedure_codes: vec![ProcedureCode::P1, ProcedureCode::P2],
            status: "submitted".to_string(),
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(ClaimResponse::from(claim)).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["amount"], "120.50");
        assert_eq!(json["procedure_codes"], serde_json::json!(["P1", "P2"]));
        assert_eq!(json["createdAt"], "2024-03-01T12:00:00Z");
        assert!(json.get("created_at").is_none());
    }
}
