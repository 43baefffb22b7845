//! API middleware

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::{bearer_token, validate_token, AuthError, Identity};
use crate::error::ApiError;
use crate::logging::ACCESS_TARGET;
use crate::security::PanicMessage;
use crate::telemetry::{AUTH_FAILURES_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use crate::AppState;

/// Source address of the TCP peer, `unknown` when the server was not started
/// with connect info
pub fn client_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Authentication middleware
///
/// Validates the bearer token and inserts the caller's [`Identity`] into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_addr(&request);
    let path = request.uri().path().to_string();

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let result = bearer_token(header).and_then(|token| validate_token(token, &state.config.jwt_secret));

    match result {
        Ok(identity) => {
            debug!(user_id = identity.user_id(), %path, "User authenticated successfully");
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            match &err {
                AuthError::Missing => {
                    warn!(%ip, %path, reason = err.reason(), "Authentication failed: No token provided")
                }
                AuthError::Expired => {
                    warn!(%ip, %path, reason = err.reason(), "Authentication failed: Token expired")
                }
                AuthError::Invalid(detail) => {
                    warn!(%ip, %path, reason = err.reason(), error = %detail, "Authentication failed: Invalid token")
                }
                AuthError::Internal(detail) => {
                    error!(%ip, %path, reason = err.reason(), error = %detail, "Authentication error")
                }
            }
            state
                .metrics
                .increment(AUTH_FAILURES_TOTAL, &[("reason", err.reason())]);
            Err(err.into())
        }
    }
}

/// Records `http_request_duration_seconds` and `http_requests_total`
///
/// The `route` label is the matched route template so that path parameters do
/// not explode label cardinality.
pub async fn http_metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let labels = [
        ("method", method.as_str()),
        ("route", route.as_str()),
        ("status_code", status.as_str()),
    ];
    state.metrics.increment(HTTP_REQUESTS_TOTAL, &labels);
    state
        .metrics
        .observe(HTTP_REQUEST_DURATION, &labels, started.elapsed().as_secs_f64());

    response
}

/// Bodies larger than this are not buffered for the console record
const LOGGED_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Body fields replaced before a request body is logged
const REDACTED_FIELDS: [&str; 2] = ["password", "creditCard"];

/// Renders a request body for the development console record
///
/// JSON objects have sensitive fields replaced; anything that is not JSON
/// logs as `{}`.
pub fn redacted_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(mut fields)) => {
            for name in REDACTED_FIELDS {
                if let Some(value) = fields.get_mut(name) {
                    *value = Value::String("[REDACTED]".to_string());
                }
            }
            Value::Object(fields).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => "{}".to_string(),
    }
}

/// Access logging
///
/// Every response gets a console record; responses with status >= 400 are also
/// written to the access sink. Outside production the console record carries
/// the redacted request body. A caught handler panic is logged at error level.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let ip = client_addr(&request);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let production = state.config.is_production();
    let declared_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let (request, body) = match declared_length {
        Some(length) if !production && length <= LOGGED_BODY_LIMIT => {
            let (parts, body) = request.into_parts();
            let bytes: Bytes = match axum::body::to_bytes(body, LOGGED_BODY_LIMIT).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(%method, %uri, %ip, error = %err, "Failed to read request body");
                    return ApiError::invalid_input(err.to_string()).into_response();
                }
            };
            let body = redacted_body(&bytes);
            (Request::from_parts(parts, Body::from(bytes)), body)
        }
        _ => (request, "{}".to_string()),
    };

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Some(PanicMessage(message)) = response.extensions().get::<PanicMessage>() {
        error!(%method, %uri, %ip, error = %message, "Error processing request: {}", message);
    }

    if production {
        info!(%ip, %method, %uri, status, latency_ms, "{} - {} {} {}", ip, method, uri, status);
    } else {
        info!(%method, %uri, status, latency_ms, "{} {} {} - {}", method, uri, status, body);
    }

    if status >= 400 {
        info!(
            target: ACCESS_TARGET,
            remote_addr = %ip,
            %method,
            %uri,
            status,
            latency_ms,
            user_agent = %user_agent,
            "{} {} {}",
            method,
            uri,
            status
        );
    }

    response
}

/// Identity attached by [`auth_middleware`], if any
pub fn user_id(identity: Option<&Identity>) -> &str {
    identity.map(Identity::user_id).unwrap_or("anonymous")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_body_masks_sensitive_fields() {
        let body = br#"{"payer":"Acme","password":"hunter2","creditCard":"4111"}"#;
        let logged: Value = serde_json::from_str(&redacted_body(body)).unwrap();

        assert_eq!(logged["payer"], "Acme");
        assert_eq!(logged["password"], "[REDACTED]");
        assert_eq!(logged["creditCard"], "[REDACTED]");
    }

    #[test]
    fn test_redacted_body_without_json() {
        assert_eq!(redacted_body(b""), "{}");
        assert_eq!(redacted_body(b"not json"), "{}");
        assert_eq!(redacted_body(b"[1,2]"), "[1,2]");
    }

    #[test]
    fn test_user_id_defaults_to_anonymous() {
        assert_eq!(user_id(None), "anonymous");
    }
}
