//! Comprehensive tests for domain_claims

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

use core_kernel::ClaimId;

use domain_claims::{parse_new_claim, ClaimError, ClaimPort, MockClaimPort, NewClaim, ProcedureCode};

// ============================================================================
// Submission Validation Properties
// ============================================================================

fn code_strategy() -> impl Strategy<Value = ProcedureCode> {
    prop::sample::select(ProcedureCode::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_valid_payloads_parse(
        payer in "[A-Za-z][A-Za-z ]{0,30}",
        cents in 0i64..9_999_999_999i64,
        codes in prop::collection::vec(code_strategy(), 1..6),
    ) {
        let amount = Decimal::new(cents, 2);
        let code_names: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        let payload = json!({
            "payer": payer,
            "amount": amount.to_string(),
            "procedure_codes": code_names,
        });

        let claim = parse_new_claim(&payload).unwrap();
        prop_assert_eq!(claim.payer(), payer.as_str());
        prop_assert_eq!(claim.amount(), amount);
        prop_assert_eq!(claim.procedure_codes(), codes.as_slice());
    }

    #[test]
    fn prop_negative_amounts_rejected(cents in 1i64..1_000_000i64) {
        let payload = json!({
            "payer": "Acme",
            "amount": Decimal::new(-cents, 2).to_string(),
            "procedure_codes": ["P1"],
        });

        let is_amount_error = matches!(
            parse_new_claim(&payload),
            Err(ClaimError::InvalidField { field: "amount", .. })
        );
        prop_assert!(is_amount_error);
    }

    #[test]
    fn prop_missing_field_always_rejected(drop_index in 0usize..3) {
        let mut payload = json!({
            "payer": "Acme",
            "amount": 10,
            "procedure_codes": ["P2"],
        });
        let field = ["payer", "amount", "procedure_codes"][drop_index];
        payload.as_object_mut().unwrap().remove(field);

        prop_assert_eq!(parse_new_claim(&payload).unwrap_err(), ClaimError::MissingField(field));
    }
}

// ============================================================================
// Port Tests
// ============================================================================

mod port_tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_and_status_agree() {
        let port = MockClaimPort::new();
        let payload = json!({"payer": "Acme", "amount": 120.50, "procedure_codes": ["P1", "P2"]});
        let created = port.create(parse_new_claim(&payload).unwrap()).await.unwrap();

        let fetched = port.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, created.status);
        assert_eq!(fetched.amount.to_string(), "120.50");
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let port = MockClaimPort::new();
        port.create(NewClaim::new("Acme", Decimal::ONE, vec![ProcedureCode::P3]).unwrap())
            .await
            .unwrap();

        assert!(port.find_by_id(ClaimId::new(999_999)).await.unwrap().is_none());
    }
}
