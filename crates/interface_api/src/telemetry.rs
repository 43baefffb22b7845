//! Prometheus metrics
//!
//! Metric names, bucket layouts and claim outcome labels, plus the
//! Prometheus-backed [`MetricsRecorder`]. The recorder is built, not installed:
//! each call runs against it through `metrics::with_local_recorder`, so several
//! instances can coexist in one process.

use metrics::Label;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use core_kernel::{MetricLabels, MetricsRecorder};

pub const CLAIMS_TOTAL: &str = "claims_total";
pub const CLAIM_PROCESSING_DURATION: &str = "claim_processing_duration_seconds";
pub const DB_QUERY_DURATION: &str = "db_query_duration_seconds";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const AUTH_FAILURES_TOTAL: &str = "auth_failures_total";
pub const UP: &str = "up";

pub const CLAIM_PROCESSING_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0, 10.0];
pub const DB_QUERY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 2.0];
pub const HTTP_REQUEST_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0];

/// Terminal result of a claim handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Invalid,
    Created,
    NotFound,
    Success,
    Error,
}

impl ClaimOutcome {
    /// Label on `claims_total`
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimOutcome::Invalid => "invalid",
            ClaimOutcome::Created => "created",
            ClaimOutcome::NotFound => "not_found",
            ClaimOutcome::Success => "success",
            ClaimOutcome::Error => "error",
        }
    }

    /// Label on `claim_processing_duration_seconds`, where a creation counts
    /// as a success
    pub fn duration_label(self) -> &'static str {
        match self {
            ClaimOutcome::Created => "success",
            other => other.as_str(),
        }
    }
}

/// Prometheus-backed recorder with process metrics refreshed on render
pub struct PrometheusMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    process: metrics_process::Collector,
}

impl PrometheusMetrics {
    /// Builds the recorder with the histogram buckets above and sets `up` to 1
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(CLAIM_PROCESSING_DURATION.to_string()),
                CLAIM_PROCESSING_BUCKETS,
            )?
            .set_buckets_for_metric(Matcher::Full(DB_QUERY_DURATION.to_string()), DB_QUERY_BUCKETS)?
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
                HTTP_REQUEST_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();
        let process = metrics_process::Collector::default();

        let metrics = Self {
            recorder,
            handle,
            process,
        };
        metrics.describe();
        metrics.set_gauge(UP, &[], 1.0);
        Ok(metrics)
    }

    fn describe(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::describe_counter!(CLAIMS_TOTAL, "Total number of claims processed");
            metrics::describe_histogram!(
                CLAIM_PROCESSING_DURATION,
                metrics::Unit::Seconds,
                "Duration of claim processing in seconds"
            );
            metrics::describe_histogram!(
                DB_QUERY_DURATION,
                metrics::Unit::Seconds,
                "Duration of database queries in seconds"
            );
            metrics::describe_histogram!(
                HTTP_REQUEST_DURATION,
                metrics::Unit::Seconds,
                "Duration of HTTP requests in seconds"
            );
            metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
            metrics::describe_counter!(AUTH_FAILURES_TOTAL, "Rejected bearer credentials by reason");
            metrics::describe_gauge!(UP, "1 while the service is running");
            self.process.describe();
        });
    }
}

fn to_labels(labels: &MetricLabels<'_>) -> Vec<Label> {
    labels
        .iter()
        .map(|(key, value)| Label::new(*key, value.to_string()))
        .collect()
}

impl MetricsRecorder for PrometheusMetrics {
    fn increment(&self, name: &'static str, labels: &MetricLabels<'_>) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(name, to_labels(labels)).increment(1);
        });
    }

    fn observe(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::histogram!(name, to_labels(labels)).record(value);
        });
    }

    fn set_gauge(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::gauge!(name, to_labels(labels)).set(value);
        });
    }

    fn render(&self) -> String {
        metrics::with_local_recorder(&self.recorder, || self.process.collect());
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_counts_as_success_in_histogram() {
        assert_eq!(ClaimOutcome::Created.as_str(), "created");
        assert_eq!(ClaimOutcome::Created.duration_label(), "success");
        assert_eq!(ClaimOutcome::NotFound.duration_label(), "not_found");
    }

    #[test]
    fn test_render_includes_recorded_series() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.increment(CLAIMS_TOTAL, &[("status", "created")]);
        metrics.observe(DB_QUERY_DURATION, &[("operation", "create"), ("table", "claim")], 0.02);

        let text = metrics.render();
        assert!(text.contains("claims_total{status=\"created\"} 1"));
        assert!(text.contains("db_query_duration_seconds_bucket{operation=\"create\",table=\"claim\",le=\"0.05\"} 1"));
        assert!(text.contains("up 1"));
    }

    #[test]
    fn test_instances_are_independent() {
        let first = PrometheusMetrics::new().unwrap();
        let second = PrometheusMetrics::new().unwrap();
        first.increment(CLAIMS_TOTAL, &[("status", "invalid")]);

        assert!(first.render().contains("claims_total{status=\"invalid\"} 1"));
        assert!(!second.render().contains("claims_total{status=\"invalid\"}"));
    }
}
