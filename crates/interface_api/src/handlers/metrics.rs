//! Prometheus scrape endpoint

use axum::{extract::State, http::header, response::IntoResponse};

use crate::AppState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders every metric in text exposition format
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], state.metrics.render())
}
