//! Prometheus metrics collection for gemini-relay
//!
//! Tracks requests per route and status, model call outcomes and latency,
//! and upload volume. Exposed via `GET /metrics` when enabled in config.

use axum::http::StatusCode;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Result of one model call, as a metrics label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    Success,
    Failure,
}

impl ModelOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelOutcome::Success => "success",
            ModelOutcome::Failure => "failure",
        }
    }
}

/// Label used for requests that matched no route
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Metrics collector for gemini-relay
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    requests_total: IntCounterVec,
    model_calls_total: IntCounterVec,
    model_call_duration: Histogram,
    upload_bytes_total: IntCounter,
}

impl Metrics {
    /// Register all metrics with a fresh registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Route labels come from the static route table, never raw request paths.
        let requests_total = IntCounterVec::new(
            Opts::new(
                "gemini_relay_requests_total",
                "Total HTTP requests by matched route and status code",
            ),
            &["route", "status"],
        )?;

        let model_calls_total = IntCounterVec::new(
            Opts::new(
                "gemini_relay_model_calls_total",
                "Total model calls by outcome",
            ),
            &["outcome"],
        )?;

        let model_call_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gemini_relay_model_call_duration_seconds",
                "Model call latency in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;

        let upload_bytes_total = IntCounter::new(
            "gemini_relay_upload_bytes_total",
            "Total bytes received through upload endpoints",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(model_calls_total.clone()))?;
        registry.register(Box::new(model_call_duration.clone()))?;
        registry.register(Box::new(upload_bytes_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            model_calls_total,
            model_call_duration,
            upload_bytes_total,
        })
    }

    pub fn record_request(&self, route: &str, status: StatusCode) {
        self.requests_total
            .with_label_values(&[route, status.as_str()])
            .inc();
    }

    pub fn record_model_call(&self, outcome: ModelOutcome, elapsed: Duration) {
        self.model_calls_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.model_call_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_upload(&self, bytes: u64) {
        self.upload_bytes_total.inc_by(bytes);
    }

    /// Render all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("Failed to encode metrics: {}", e))?;

        String::from_utf8(buffer).map_err(|e| format!("Metrics output is not valid UTF-8: {}", e))
    }
}
