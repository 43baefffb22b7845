//! Property tests for claim identifiers

use core_kernel::{ClaimId, CoreError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn display_then_parse_is_identity(raw in any::<i64>()) {
        let id = ClaimId::new(raw);
        let parsed: ClaimId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn alphabetic_input_is_rejected(raw in "[a-zA-Z][a-zA-Z0-9-]{0,12}") {
        let err = raw.parse::<ClaimId>().unwrap_err();
        prop_assert!(matches!(err, CoreError::Validation(_)));
    }
}

#[test]
fn i64_conversions() {
    let id: ClaimId = 12.into();
    assert_eq!(i64::from(id), 12);
    assert_eq!(id.value(), 12);
}

#[test]
fn ordering_follows_key() {
    assert!(ClaimId::new(1) < ClaimId::new(2));
}
