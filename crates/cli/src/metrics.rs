//! Prometheus text exposition for a finished run.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};

/// Encode all core metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in prism_core::metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::metrics::{CONVERSIONS_IN_FLIGHT, CONVERSIONS_TOTAL, RUNS_TOTAL};

    #[test]
    fn test_encode_contains_core_metrics() {
        // Only touched label sets are exported
        CONVERSIONS_TOTAL.with_label_values(&["converted"]).inc();
        RUNS_TOTAL.with_label_values(&["success"]).inc();
        CONVERSIONS_IN_FLIGHT.set(0);

        let output = encode_metrics().unwrap();
        assert!(output.contains("prism_conversions_total"));
        assert!(output.contains("prism_runs_total"));
        assert!(output.contains("prism_conversions_in_flight"));
    }

    #[test]
    fn test_encode_twice() {
        // A fresh registry per call, so repeated encoding never double-registers
        assert!(encode_metrics().is_ok());
        assert!(encode_metrics().is_ok());
    }
}
