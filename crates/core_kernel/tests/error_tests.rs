//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::{ClaimId, PortError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    let CoreError::Validation(msg) = error;
    assert_eq!(msg, "Invalid input");
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_claim_id_parse_error_is_validation() {
    let error = "not-a-number".parse::<ClaimId>().unwrap_err();

    assert!(matches!(error, CoreError::Validation(_)));
    assert!(error.to_string().contains("not-a-number"));
}

#[test]
fn test_port_error_display() {
    let error = PortError::conflict("duplicate key");
    assert_eq!(error.to_string(), "Conflict: duplicate key");

    let error = PortError::validation("amount must be non-negative");
    assert!(error.to_string().starts_with("Validation error"));
}
