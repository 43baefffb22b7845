//! HTTP API Layer
//!
//! This crate provides the REST API for the claims service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claim submission and lookup, health, metrics scrape
//! - **Middleware**: access logging, rate limiting, security headers, CORS,
//!   panic recovery, HTTP metrics, bearer authentication
//! - **Telemetry**: Prometheus recorder behind `core_kernel::MetricsRecorder`
//! - **Error Handling**: `{"error": ...}` bodies for every failure
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(Arc::new(repo), Arc::new(PrometheusMetrics::new()?), config);
//! let app = create_router(state);
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod security;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::MetricsRecorder;
use domain_claims::ClaimPort;

use crate::config::ApiConfig;
use crate::handlers::{claims, health, metrics, route_not_found};
use crate::middleware::{auth_middleware, http_metrics_middleware, request_logging_middleware};
use crate::security::{catch_panic_layer, cors_layer, rate_limit_middleware, security_headers, RateLimiter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<dyn ClaimPort>,
    pub metrics: Arc<dyn MetricsRecorder>,
    pub config: Arc<ApiConfig>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates the state; the rate limiter is sized from `config`
    pub fn new(
        claims: Arc<dyn ClaimPort>,
        metrics: Arc<dyn MetricsRecorder>,
        config: ApiConfig,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_config(&config));
        Self {
            claims,
            metrics,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

/// Creates the main API router
///
/// Layers, outermost first: tracing span, request id, access log, rate limit,
/// security headers, CORS, HTTP metrics, panic recovery. Everything under
/// `/claims` is additionally behind bearer authentication, including paths
/// and methods no handler serves. Unserved methods answer like unknown routes.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check).fallback(route_not_found))
        .route("/metrics", get(metrics::metrics_endpoint).fallback(route_not_found));

    // `/status/:id` is a static segment and wins over `/:id`
    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).fallback(route_not_found))
        .route("/status/:id", get(claims::get_claim_status).fallback(route_not_found))
        .route("/:id", get(claims::get_claim).fallback(route_not_found))
        .fallback(route_not_found)
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/claims", claims_routes)
        .fallback(route_not_found)
        .layer(catch_panic_layer(state.config.is_production()))
        .layer(axum_middleware::from_fn_with_state(state.clone(), http_metrics_middleware))
        .layer(cors_layer(&state.config))
        .layer(axum_middleware::from_fn(security_headers))
        .layer(axum_middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), request_logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
