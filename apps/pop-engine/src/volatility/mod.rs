//! Volatility for a position.
//!
//! - [`VolatilitySource`]: one sigma per leg (premium-implied or quoted)
//! - [`aggregate_volatility`]: averages the per-leg estimates
//! - [`AggregationObserver`]: receives per-leg diagnostics

mod aggregator;
mod observer;
mod source;

pub use aggregator::{AggregateError, AggregateVolatility, SkipReason, aggregate_volatility};
pub use observer::{AggregationObserver, MetricsObserver, NoopObserver, TracingObserver};
pub use source::{ImpliedFromPremium, QuotedVolatility, VolatilityError, VolatilitySource};
