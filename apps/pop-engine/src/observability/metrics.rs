//! Prometheus metrics for the PoP engine.
//!
//! Covers volatility aggregation, estimator runs, and the HTTP surface.
//!
//! # Example
//!
//! ```ignore
//! use pop_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! // Record one estimate
//! record_pop_estimate("simulated", 500_000, 0.042);
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Latency buckets from 1ms to 10s
            latency_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Volatility Metrics
// ============================================================================

/// Record the outcome of one leg's volatility lookup.
///
/// # Arguments
///
/// * `outcome` - `"resolved"` or a skip label (e.g., `"non_positive_premium"`)
pub fn record_volatility_leg(outcome: &str) {
    counter!(
        "pop_volatility_legs_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a completed aggregation.
///
/// # Arguments
///
/// * `average` - Aggregate volatility
/// * `valid_count` - Distinct keys that resolved
pub fn record_aggregate_volatility(average: f64, valid_count: usize) {
    histogram!("pop_aggregate_volatility").record(average);
    histogram!("pop_aggregate_valid_legs").record(valid_count as f64);
}

/// Record a position with no usable volatility.
pub fn record_no_usable_volatility() {
    counter!("pop_no_usable_volatility_total").increment(1);
}

// ============================================================================
// Estimator Metrics
// ============================================================================

/// Record one PoP estimate.
///
/// # Arguments
///
/// * `status` - Outcome status (e.g., `"simulated"`, `"no_usable_volatility_data"`)
/// * `trials` - Trials simulated (0 when skipped)
/// * `duration_seconds` - Wall time of the estimate in seconds
pub fn record_pop_estimate(status: &str, trials: u64, duration_seconds: f64) {
    counter!(
        "pop_estimates_total",
        "status" => status.to_string()
    )
    .increment(1);

    counter!("pop_trials_total").increment(trials);

    histogram!(
        "pop_estimate_seconds",
        "status" => status.to_string()
    )
    .record(duration_seconds);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request.
///
/// # Arguments
///
/// * `route` - Route path (e.g., "/pop")
/// * `status_code` - Response status code
/// * `duration_seconds` - Handler time in seconds
pub fn record_http_request(route: &str, status_code: u16, duration_seconds: f64) {
    counter!(
        "pop_http_requests_total",
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "pop_http_request_seconds",
        "route" => route.to_string()
    )
    .record(duration_seconds);
}

// ============================================================================
// Tests
// ============================================================================
