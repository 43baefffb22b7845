//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the claims service. These fixtures are
//! designed to be consistent and predictable for unit and API tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use core_kernel::ClaimId;

/// Secret used to sign tokens in tests
pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use";

/// Fixture for bearer tokens
pub struct TokenFixtures;

impl TokenFixtures {
    /// A valid token for `user-1`, expiring in an hour
    pub fn valid(secret: &str) -> String {
        Self::for_subject("user-1", secret)
    }

    /// A valid token for the given subject
    pub fn for_subject(subject: &str, secret: &str) -> String {
        let now = Utc::now();
        Self::sign(
            &json!({
                "sub": subject,
                "roles": ["claims:submit"],
                "iat": now.timestamp(),
                "exp": (now + Duration::hours(1)).timestamp(),
            }),
            secret,
        )
    }

    /// A correctly signed token whose validity window ended two minutes ago
    pub fn expired(secret: &str) -> String {
        let now = Utc::now();
        Self::sign(
            &json!({
                "sub": "user-1",
                "iat": (now - Duration::hours(2)).timestamp(),
                "exp": (now - Duration::minutes(2)).timestamp(),
            }),
            secret,
        )
    }

    /// A well-formed token signed with a different secret
    pub fn wrong_secret() -> String {
        Self::valid("some-other-secret")
    }

    /// A string that is not a JWT at all
    pub fn malformed() -> &'static str {
        "not-a-jwt"
    }

    /// Formats an Authorization header value
    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    fn sign(claims: &Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HS256 signing with a byte secret cannot fail")
    }
}

/// Fixture for claim submission payloads
pub struct PayloadFixtures;

impl PayloadFixtures {
    /// The canonical valid submission
    pub fn valid() -> Value {
        json!({
            "payer": "Acme",
            "amount": 120.50,
            "procedure_codes": ["P1", "P2"]
        })
    }

    /// The canonical submission with one field removed
    pub fn without(field: &str) -> Value {
        let mut payload = Self::valid();
        if let Some(object) = payload.as_object_mut() {
            object.remove(field);
        }
        payload
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// An identifier no test ever creates
    pub fn unknown_claim_id() -> ClaimId {
        ClaimId::new(999_999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_have_three_segments() {
        assert_eq!(TokenFixtures::valid(TEST_JWT_SECRET).split('.').count(), 3);
        assert_eq!(TokenFixtures::expired(TEST_JWT_SECRET).split('.').count(), 3);
    }

    #[test]
    fn test_payload_without_field() {
        let payload = PayloadFixtures::without("amount");
        assert!(payload.get("amount").is_none());
        assert_eq!(payload["payer"], "Acme");
    }
}
