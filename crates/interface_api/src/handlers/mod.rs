//! Request handlers

pub mod claims;
pub mod health;
pub mod metrics;

use axum::{extract::Request, response::IntoResponse};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::client_addr;

/// Fallback for requests no route matched
pub async fn route_not_found(request: Request) -> impl IntoResponse {
    warn!(
        ip = %client_addr(&request),
        "Route not found: {} {}",
        request.method(),
        request.uri()
    );
    ApiError::not_found("Route not found")
}
