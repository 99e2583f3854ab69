//! Observability module for metrics.
//!
//! Prometheus export plus the recording helpers used by the estimator and
//! the HTTP adapter. Log output is set up in [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_aggregate_volatility, record_http_request,
    record_no_usable_volatility, record_pop_estimate, record_volatility_leg,
};
