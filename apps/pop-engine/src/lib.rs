// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! PoP Engine - Rust Core Library
//!
//! Probability-of-profit estimation for multi-leg option positions.
//!
//! # Pipeline
//!
//! 1. **Volatility**: each leg's premium is inverted through Black-Scholes to
//!    an implied volatility; the distinct strike/type estimates are averaged.
//! 2. **Simulation**: terminal prices are drawn from a log-normal model at that
//!    volatility and the position's expiry payoff is evaluated per trial.
//! 3. **Result**: the share of trials with non-negative P&L, in percent.
//!
//! # Layers
//!
//! - **Domain**: positions, legs, and expiry payoff
//! - **Pricing**: Black-Scholes and the implied volatility solver
//! - **Volatility**: per-leg sources and aggregation
//! - **Simulation**: the Monte Carlo estimator
//! - **Infrastructure**: the HTTP adapter

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Core
// =============================================================================

/// Positions, legs, and expiry payoff.
pub mod domain;

/// Black-Scholes pricing and implied volatility.
pub mod pricing;

/// Per-leg volatility sources and aggregation.
pub mod volatility;

/// Monte Carlo probability-of-profit simulation.
pub mod simulation;

/// Estimator errors.
pub mod error;

// =============================================================================
// Ambient
// =============================================================================

/// YAML configuration with environment interpolation.
pub mod config;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

/// HTTP adapter.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{Config, SimulationConfig, UnrecognizedLegPolicy};
pub use domain::{OptionLeg, OptionType, Position, TransactionType};
pub use error::PopError;
pub use infrastructure::http::{AppState, create_router};
pub use pricing::{IvSolver, OptionKind, solve_iv};
pub use simulation::{PopEstimator, PopOutcome, PopStatus};
pub use volatility::{ImpliedFromPremium, QuotedVolatility, VolatilitySource};
