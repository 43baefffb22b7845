//! Bearer token authentication
//!
//! Tokens are HS256 JWTs signed with the configured secret. Expiry and `nbf`
//! are checked with zero leeway; a token without `exp` never expires. The
//! audience is not checked.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Caller identity decoded from a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Legacy user ID claim, a string or a number
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub id: Option<String>,
    /// User's roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Identity {
    /// Subject for log fields, falling back to the `id` claim
    pub fn user_id(&self) -> &str {
        self.sub
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unknown")
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

/// Auth errors
///
/// The display text is what clients see; `reason` is what logs and metrics see.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Missing,
    #[error("Invalid token")]
    Invalid(String),
    #[error("Token expired")]
    Expired,
    #[error("Authentication error")]
    Internal(String),
}

impl AuthError {
    /// Short label for `auth_failures_total`
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::Invalid(_) => "invalid",
            AuthError::Expired => "expired",
            AuthError::Internal(_) => "error",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::Invalid(err.to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

/// Extracts the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Missing)
}

/// Creates a signed token
///
/// # Arguments
///
/// * `subject` - User identifier
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn issue_token(
    subject: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let identity = Identity {
        sub: Some(subject.to_string()),
        id: None,
        roles,
        exp: Some(exp.timestamp()),
        iat: Some(now.timestamp()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &identity,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Validates a token and returns the caller identity
pub fn validate_token(token: &str, secret: &str) -> Result<Identity, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Identity>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_issue_and_validate() {
        let token = issue_token("user-7", vec!["claims:submit".to_string()], SECRET, 60).unwrap();
        let identity = validate_token(&token, SECRET).unwrap();

        assert_eq!(identity.user_id(), "user-7");
        assert_eq!(identity.roles, vec!["claims:submit".to_string()]);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = issue_token("user-7", vec![], SECRET, 60).unwrap();
        let err = validate_token(&token, "other").unwrap_err();

        assert_eq!(err.reason(), "invalid");
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(validate_token("abc.def.ghi", SECRET).unwrap_err().reason(), "invalid");
        assert_eq!(validate_token("not-a-jwt", SECRET).unwrap_err().reason(), "invalid");
    }

    #[test]
    fn test_expired_token() {
        let past = Utc::now() - Duration::minutes(5);
        let identity = Identity {
            sub: Some("user-7".to_string()),
            id: None,
            roles: vec![],
            exp: Some(past.timestamp()),
            iat: Some((past - Duration::hours(1)).timestamp()),
        };
        let token = encode(
            &Header::default(),
            &identity,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = validate_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(err.reason(), "expired");
    }

    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_audience_is_ignored() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = sign(serde_json::json!({"sub": "u", "exp": exp, "aud": "claims-api"}));

        let identity = validate_token(&token, SECRET).unwrap();
        assert_eq!(identity.user_id(), "u");
    }

    #[test]
    fn test_not_yet_valid_token_is_invalid() {
        let later = (Utc::now() + Duration::hours(1)).timestamp();
        let token = sign(serde_json::json!({"sub": "u", "exp": later, "nbf": later}));

        let err = validate_token(&token, SECRET).unwrap_err();
        assert_eq!(err.reason(), "invalid");
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn test_user_id_falls_back_to_id_claim() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let numeric = validate_token(&sign(serde_json::json!({"id": 42, "exp": exp})), SECRET).unwrap();
        assert_eq!(numeric.user_id(), "42");

        let text = validate_token(&sign(serde_json::json!({"id": "u-9", "exp": exp})), SECRET).unwrap();
        assert_eq!(text.user_id(), "u-9");

        let both = validate_token(&sign(serde_json::json!({"sub": "s", "id": "i"})), SECRET).unwrap();
        assert_eq!(both.user_id(), "s");

        let neither = validate_token(&sign(serde_json::json!({"roles": []})), SECRET).unwrap();
        assert_eq!(neither.user_id(), "unknown");
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::Missing)));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AuthError::Missing)));
        assert!(matches!(bearer_token(Some("Bearer ")), Err(AuthError::Missing)));
    }
}
