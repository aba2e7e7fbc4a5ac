//! Prometheus metrics for batch conversion.
//!
//! Collectors are process-wide statics. Register them on a registry with
//! [`all_metrics`].

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Items
// =============================================================================

/// Items processed by outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("prism_conversions_total", "Total items processed"),
        &["result"], // "converted", "failed", "skipped"
    )
    .unwrap()
});

/// Per-item conversion time in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "prism_conversion_duration_seconds",
            "Duration of a single item conversion",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0]),
        &["category"], // "images", "media"
    )
    .unwrap()
});

/// Items currently being converted.
pub static CONVERSIONS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "prism_conversions_in_flight",
        "Items currently being converted",
    )
    .unwrap()
});

// =============================================================================
// Runs
// =============================================================================

/// Finished runs by terminal outcome.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("prism_runs_total", "Total batch runs finished"),
        &["outcome"], // "success", "cancelled", "completed_with_errors"
    )
    .unwrap()
});

/// Returns all metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSIONS_IN_FLIGHT.clone()),
        Box::new(RUNS_TOTAL.clone()),
    ]
}
