//! Prometheus metrics for the backend layer
//!
//! Defines metrics for:
//! - Fixture cache lookups by provider, kind and result
//! - Fixture file load duration
//! - Backend operations by provider, kind, operation and status

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    /// Registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Fixture cache lookups by provider, kind and result (hit/miss)
    pub static ref FIXTURE_CACHE_LOOKUPS: IntCounterVec = IntCounterVec::new(
        Opts::new("occi_fixture_cache_lookups_total", "Total fixture cache lookups"),
        &["provider", "kind", "result"]
    )
    .expect("Failed to create FIXTURE_CACHE_LOOKUPS metric");

    /// Duration of fixture loads from disk
    pub static ref FIXTURE_LOAD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "occi_fixture_load_duration_seconds",
            "Fixture file load duration in seconds"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    )
    .expect("Failed to create FIXTURE_LOAD_DURATION metric");

    /// Backend operations by provider, kind, operation and status
    pub static ref BACKEND_OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("occi_backend_operations_total", "Total backend operations"),
        &["provider", "kind", "operation", "status"]
    )
    .expect("Failed to create BACKEND_OPERATIONS metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(FIXTURE_CACHE_LOOKUPS.clone()))?;
    REGISTRY.register(Box::new(FIXTURE_LOAD_DURATION.clone()))?;
    REGISTRY.register(Box::new(BACKEND_OPERATIONS.clone()))?;
    Ok(())
}

/// Text exposition of the registry
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
