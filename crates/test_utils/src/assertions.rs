//! Custom Test Assertions
//!
//! Assertion helpers for the JSON bodies the claims API returns, with failure
//! messages that print the whole body.

use serde_json::Value;

/// Asserts that a body is exactly `{"error": expected}`, optionally with `details`
pub fn assert_error_body(body: &Value, expected: &str) {
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(expected),
        "Unexpected error body: {}",
        body
    );

    let extra: Vec<&String> = body
        .as_object()
        .map(|o| o.keys().filter(|k| *k != "error" && *k != "details").collect())
        .unwrap_or_default();
    assert!(extra.is_empty(), "Error body has extra keys {:?}: {}", extra, body);
}

/// Asserts that a body is a full claim record matching the submission
pub fn assert_claim_body(body: &Value, payer: &str, amount: &str, codes: &[&str]) {
    assert!(
        body.get("id").and_then(Value::as_i64).is_some(),
        "Claim body has no integer id: {}",
        body
    );
    assert_eq!(body["payer"], payer, "payer mismatch in {}", body);
    assert_eq!(body["amount"], amount, "amount mismatch in {}", body);
    assert_eq!(body["procedure_codes"], serde_json::json!(codes), "codes mismatch in {}", body);
    assert_eq!(body["status"], "submitted", "status mismatch in {}", body);

    for key in ["createdAt", "updatedAt"] {
        let stamp = body.get(key).and_then(Value::as_str).unwrap_or_default();
        assert!(
            chrono::DateTime::parse_from_rfc3339(stamp).is_ok(),
            "{} is not an RFC 3339 timestamp in {}",
            key,
            body
        );
    }
}

/// Asserts that a status body carries exactly `status`
pub fn assert_status_body(body: &Value, expected: &str) {
    assert_eq!(body, &serde_json::json!({ "status": expected }), "Unexpected status body");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_with_details() {
        assert_error_body(
            &json!({"error": "Invalid input data", "details": "amount: must be a number"}),
            "Invalid input data",
        );
    }

    #[test]
    #[should_panic(expected = "extra keys")]
    fn test_error_body_rejects_extra_keys() {
        assert_error_body(&json!({"error": "Claim not found", "stack": "..."}), "Claim not found");
    }

    #[test]
    fn test_claim_body() {
        assert_claim_body(
            &json!({
                "id": 1,
                "payer": "Acme",
                "amount": "120.50",
                "procedure_codes": ["P1"],
                "status": "submitted",
                "createdAt": "2024-01-01T09:30:00Z",
                "updatedAt": "2024-01-01T09:30:00Z"
            }),
            "Acme",
            "120.50",
            &["P1"],
        );
    }
}
