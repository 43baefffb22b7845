//! Label-based metrics capability
//!
//! Request handlers never touch a process-wide registry directly. They receive
//! an `Arc<dyn MetricsRecorder>` and report through three operations keyed by
//! metric name and a list of label pairs. The production implementation is
//! backed by Prometheus (see `interface_api::telemetry`); tests substitute
//! [`mock::InMemoryRecorder`].
//!
//! # Example
//!
//! ```rust
//! use core_kernel::MetricsRecorder;
//!
//! fn record_created(metrics: &dyn MetricsRecorder) {
//!     metrics.increment("claims_total", &[("status", "created")]);
//!     metrics.observe("claim_processing_duration_seconds", &[("status", "success")], 0.012);
//! }
//! ```

/// Label pairs attached to a single observation
pub type MetricLabels<'a> = [(&'static str, &'a str)];

/// Capability for recording counters, histograms and gauges
///
/// Implementations must tolerate concurrent calls from many requests
/// without losing updates.
pub trait MetricsRecorder: Send + Sync + 'static {
    /// Adds one to the counter identified by `name` and `labels`
    fn increment(&self, name: &'static str, labels: &MetricLabels<'_>);

    /// Records `value` into the histogram identified by `name` and `labels`
    fn observe(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64);

    /// Sets the gauge identified by `name` and `labels` to `value`
    fn set_gauge(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64);

    /// Renders the current state in Prometheus text exposition format
    fn render(&self) -> String;
}

/// In-memory recorder for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::fmt::Write;
    use std::sync::Mutex;

    type SeriesKey = (String, Vec<(String, String)>);

    #[derive(Debug, Default)]
    struct Series {
        counters: BTreeMap<SeriesKey, u64>,
        histograms: BTreeMap<SeriesKey, Vec<f64>>,
        gauges: BTreeMap<SeriesKey, f64>,
    }

    /// Recorder that keeps every observation in memory
    ///
    /// Label order does not matter when querying: labels are sorted by name
    /// before they are stored.
    #[derive(Debug, Default)]
    pub struct InMemoryRecorder {
        series: Mutex<Series>,
    }

    fn key(name: &str, labels: &MetricLabels<'_>) -> SeriesKey {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        (name.to_string(), labels)
    }

    impl InMemoryRecorder {
        /// Creates an empty recorder
        pub fn new() -> Self {
            Self::default()
        }

        fn with_series<R>(&self, f: impl FnOnce(&mut Series) -> R) -> R {
            let mut guard = self.series.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut guard)
        }

        /// Returns the value of one counter series
        pub fn counter(&self, name: &str, labels: &MetricLabels<'_>) -> u64 {
            self.with_series(|s| s.counters.get(&key(name, labels)).copied().unwrap_or(0))
        }

        /// Returns the sum of a counter across all label sets
        pub fn counter_total(&self, name: &str) -> u64 {
            self.with_series(|s| {
                s.counters
                    .iter()
                    .filter(|((n, _), _)| n == name)
                    .map(|(_, v)| *v)
                    .sum()
            })
        }

        /// Returns every value recorded into one histogram series
        pub fn observations(&self, name: &str, labels: &MetricLabels<'_>) -> Vec<f64> {
            self.with_series(|s| s.histograms.get(&key(name, labels)).cloned().unwrap_or_default())
        }

        /// Returns the number of observations of a histogram across all label sets
        pub fn observation_count(&self, name: &str) -> usize {
            self.with_series(|s| {
                s.histograms
                    .iter()
                    .filter(|((n, _), _)| n == name)
                    .map(|(_, v)| v.len())
                    .sum()
            })
        }

        /// Returns the value of one gauge series
        pub fn gauge(&self, name: &str, labels: &MetricLabels<'_>) -> Option<f64> {
            self.with_series(|s| s.gauges.get(&key(name, labels)).copied())
        }
    }

    fn format_labels(labels: &[(String, String)]) -> String {
        if labels.is_empty() {
            return String::new();
        }
        let inner: Vec<String> = labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect();
        format!("{{{}}}", inner.join(","))
    }

    impl MetricsRecorder for InMemoryRecorder {
        fn increment(&self, name: &'static str, labels: &MetricLabels<'_>) {
            self.with_series(|s| *s.counters.entry(key(name, labels)).or_insert(0) += 1);
        }

        fn observe(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64) {
            self.with_series(|s| s.histograms.entry(key(name, labels)).or_default().push(value));
        }

        fn set_gauge(&self, name: &'static str, labels: &MetricLabels<'_>, value: f64) {
            self.with_series(|s| {
                s.gauges.insert(key(name, labels), value);
            });
        }

        fn render(&self) -> String {
            self.with_series(|s| {
                let mut out = String::new();
                for ((name, labels), value) in &s.counters {
                    let _ = writeln!(out, "{}{} {}", name, format_labels(labels), value);
                }
                for ((name, labels), values) in &s.histograms {
                    let sum: f64 = values.iter().sum();
                    let labels = format_labels(labels);
                    let _ = writeln!(out, "{}_sum{} {}", name, labels, sum);
                    let _ = writeln!(out, "{}_count{} {}", name, labels, values.len());
                }
                for ((name, labels), value) in &s.gauges {
                    let _ = writeln!(out, "{}{} {}", name, format_labels(labels), value);
                }
                out
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::Arc;

        #[test]
        fn test_counter_ignores_label_order() {
            let recorder = InMemoryRecorder::new();
            recorder.increment("requests", &[("method", "GET"), ("route", "/health")]);
            recorder.increment("requests", &[("route", "/health"), ("method", "GET")]);

            assert_eq!(recorder.counter("requests", &[("method", "GET"), ("route", "/health")]), 2);
            assert_eq!(recorder.counter_total("requests"), 2);
        }

        #[test]
        fn test_histogram_keeps_values() {
            let recorder = InMemoryRecorder::new();
            recorder.observe("latency", &[("status", "success")], 0.25);
            recorder.observe("latency", &[("status", "error")], 1.5);

            assert_eq!(recorder.observations("latency", &[("status", "success")]), vec![0.25]);
            assert_eq!(recorder.observation_count("latency"), 2);
        }

        #[test]
        fn test_render_lists_series() {
            let recorder = InMemoryRecorder::new();
            recorder.increment("claims_total", &[("status", "created")]);
            recorder.set_gauge("up", &[], 1.0);

            let text = recorder.render();
            assert!(text.contains("claims_total{status=\"created\"} 1"));
            assert!(text.contains("up 1"));
        }

        #[test]
        fn test_concurrent_increments_are_not_lost() {
            let recorder = Arc::new(InMemoryRecorder::new());
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let recorder = Arc::clone(&recorder);
                    std::thread::spawn(move || {
                        for _ in 0..1000 {
                            recorder.increment("hits", &[]);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(recorder.counter("hits", &[]), 8000);
        }
    }
}
