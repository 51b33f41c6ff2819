//! Prometheus metrics for upstream latency and page traffic.
//!
//! This module provides metrics for:
//! - CMS request latency and failures, by operation
//! - Rendered pages, by page
//! - Events created through the submission form

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::debug;

// === Metric Name Constants ===

/// CMS request latency metric name.
pub const METRIC_CMS_REQUEST_LATENCY: &str = "cms_request_latency_ms";
/// CMS request failures counter metric name.
pub const METRIC_CMS_REQUESTS_FAILED: &str = "cms_requests_failed_total";
/// Rendered pages counter metric name.
pub const METRIC_PAGES_RENDERED: &str = "pages_rendered_total";
/// Created events counter metric name.
pub const METRIC_EVENTS_CREATED: &str = "events_created_total";

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_CMS_REQUEST_LATENCY,
        "CMS request latency in milliseconds"
    );
    describe_counter!(
        METRIC_CMS_REQUESTS_FAILED,
        "Total number of failed CMS requests"
    );
    describe_counter!(METRIC_PAGES_RENDERED, "Total number of HTML pages rendered");
    describe_counter!(
        METRIC_EVENTS_CREATED,
        "Total number of events created through the form"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder, once per process.
///
/// Later calls return the handle from the first successful install.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PROMETHEUS
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            init_metrics();
            Ok(handle)
        })
        .cloned()
}

/// Record CMS request latency.
pub fn record_cms_latency(start: Instant, operation: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_CMS_REQUEST_LATENCY, "operation" => operation).record(latency_ms);
}

/// Increment failed CMS requests counter.
pub fn inc_cms_requests_failed(operation: &'static str) {
    counter!(METRIC_CMS_REQUESTS_FAILED, "operation" => operation).increment(1);
}

/// Increment rendered pages counter.
pub fn inc_pages_rendered(page: &'static str) {
    counter!(METRIC_PAGES_RENDERED, "page" => page).increment(1);
}

/// Increment created events counter.
pub fn inc_events_created() {
    counter!(METRIC_EVENTS_CREATED).increment(1);
}

/// RAII guard for timing CMS requests.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    operation: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_cms_latency(self.start, self.operation);
    }
}

/// Create a latency timer for a CMS request.
pub fn timer_cms_request(operation: &'static str) -> LatencyTimer {
    LatencyTimer::new(operation)
}
