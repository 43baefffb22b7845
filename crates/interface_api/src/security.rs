//! Perimeter middleware
//!
//! Fixed-window rate limiting per source address, security response headers,
//! CORS and the panic responder.

use std::any::Any;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::{ApiError, ErrorResponse};
use crate::logging::panic_message;
use crate::middleware::client_addr;
use crate::AppState;

/// Entries are swept once the table grows past this many source addresses
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Result of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window ends
    pub reset_after: Duration,
}

impl RateLimitDecision {
    fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Fixed-window request counter keyed by source address
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Counts a request from `key` now
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Counts a request from `key` at `now`
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        if self.windows.len() > SWEEP_THRESHOLD {
            self.windows
                .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        }

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window { started: now, hits: 0 });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window { started: now, hits: 0 };
        }

        let allowed = entry.hits < self.max;
        if allowed {
            entry.hits += 1;
        }

        RateLimitDecision {
            allowed,
            limit: self.max,
            remaining: self.max.saturating_sub(entry.hits),
            reset_after: self.window.saturating_sub(now.saturating_duration_since(entry.started)),
        }
    }

    /// Number of tracked source addresses
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

fn apply_rate_limit_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static("ratelimit-reset"),
        HeaderValue::from(decision.reset_secs()),
    );
}

/// Rejects requests over the per-address quota with 429
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let addr = client_addr(&request);
    let decision = state.rate_limiter.check(&addr);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(ip = %addr, "Rate limit exceeded for IP: {}", addr);
        let mut response = ApiError::TooManyRequests.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        response
    };

    apply_rate_limit_headers(&mut response, &decision);
    response
}

const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';script-src 'self' 'unsafe-inline';style-src 'self' 'unsafe-inline';\
         img-src 'self' data:;base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';object-src 'none';script-src-attr 'none';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Adds the hardening headers a handler has not already set
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for &(name, value) in SECURITY_HEADERS {
        let name = HeaderName::from_static(name);
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    response
}

/// CORS policy: any origin unless one is configured
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = match config.cors_origin.as_deref() {
        None | Some("*") => AllowOrigin::any(),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin, allowing any");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Message of a panic caught by [`catch_panic_layer`], attached to the response
#[derive(Debug, Clone)]
pub struct PanicMessage(pub String);

/// Turns a handler panic into a 500, hiding the message in production
pub fn catch_panic_layer(
    production: bool,
) -> CatchPanicLayer<impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone> {
    CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| {
        let message = panic_message(payload.as_ref());
        let error = if production {
            "Internal Server Error".to_string()
        } else {
            message.clone()
        };

        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error,
                details: None,
            }),
        )
            .into_response();
        response.extensions_mut().insert(PanicMessage(message));
        response
    })
}
