//! Property-Based Test Generators
//!
//! Proptest strategies for claim submissions, both valid ones and ones that
//! break exactly one rule.

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use domain_claims::ProcedureCode;

/// Strategy for a single known procedure code
pub fn procedure_code_strategy() -> impl Strategy<Value = ProcedureCode> {
    prop::sample::select(ProcedureCode::ALL.to_vec())
}

/// Strategy for a non-empty list of known codes, duplicates allowed
pub fn procedure_codes_strategy() -> impl Strategy<Value = Vec<ProcedureCode>> {
    prop::collection::vec(procedure_code_strategy(), 1..5)
}

/// Strategy for payer names with at least one visible character
pub fn payer_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 &.-]{0,40}"
}

/// Strategy for amounts in the storable range, two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=9_999_999_999i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for valid submission payloads
///
/// Amounts are sent as strings so that the expected stored value is exact.
pub fn valid_payload_strategy() -> impl Strategy<Value = (Value, String, Decimal, Vec<ProcedureCode>)> {
    (payer_strategy(), amount_strategy(), procedure_codes_strategy()).prop_map(
        |(payer, amount, codes)| {
            let names: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
            let payload = json!({
                "payer": payer,
                "amount": amount.to_string(),
                "procedure_codes": names,
            });
            (payload, payer, amount, codes)
        },
    )
}

/// Strategy for payloads that violate exactly one validation rule
pub fn invalid_payload_strategy() -> impl Strategy<Value = Value> {
    let base = || json!({"payer": "Acme", "amount": 10, "procedure_codes": ["P1"]});
    prop_oneof![
        prop::sample::select(vec!["payer", "amount", "procedure_codes"]).prop_map(move |field| {
            let mut payload = base();
            if let Some(object) = payload.as_object_mut() {
                object.remove(field);
            }
            payload
        }),
        (1i64..1_000_000i64).prop_map(move |cents| {
            let mut payload = base();
            payload["amount"] = json!(Decimal::new(-cents, 2).to_string());
            payload
        }),
        "[Q-Z][0-9]".prop_map(move |code| {
            let mut payload = base();
            payload["procedure_codes"] = json!([code]);
            payload
        }),
        Just(json!({"payer": "Acme", "amount": 10, "procedure_codes": []})),
        Just(json!({"payer": "   ", "amount": 10, "procedure_codes": ["P1"]})),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::parse_new_claim;

    proptest! {
        #[test]
        fn prop_valid_payloads_are_accepted((payload, _, amount, _) in valid_payload_strategy()) {
            let claim = parse_new_claim(&payload).unwrap();
            prop_assert_eq!(claim.amount(), amount);
        }

        #[test]
        fn prop_invalid_payloads_are_rejected(payload in invalid_payload_strategy()) {
            prop_assert!(parse_new_claim(&payload).is_err());
        }
    }
}
