//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the timeline quiz server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Session and quiz outcome metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "timeline_quiz_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("timeline_quiz_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "timeline_quiz_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Quiz Metrics
// =============================================================================

/// Sessions held in memory.
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "timeline_quiz_sessions_active",
        "Number of quiz sessions held in memory",
    )
    .unwrap()
});

/// Completed attempts by tier.
pub static QUIZ_COMPLETIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "timeline_quiz_completions_total",
            "Total completed quiz attempts",
        ),
        &["tier"],
    )
    .unwrap()
});

/// Result unlocks by subscription choice.
pub static UNLOCKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("timeline_quiz_unlocks_total", "Total result unlocks"),
        &["subscribed"],
    )
    .unwrap()
});

/// Opted-in subscriptions that could not be queued.
pub static SUBSCRIPTIONS_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "timeline_quiz_subscriptions_dropped_total",
        "Opted-in subscription requests that were not queued",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Quiz
    registry.register(Box::new(SESSIONS_ACTIVE.clone())).unwrap();
    registry
        .register(Box::new(QUIZ_COMPLETIONS_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(UNLOCKS_TOTAL.clone())).unwrap();
    registry
        .register(Box::new(SUBSCRIPTIONS_DROPPED_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static SESSION_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/sessions/[^/]+").unwrap());

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = SESSION_SEGMENT.replace_all(&result, "/sessions/{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{n}$1");
    result.to_string()
}
