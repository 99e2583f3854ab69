//! Monte Carlo probability-of-profit simulation.
//!
//! - [`simulate_terminal_price`]: log-normal terminal price for one draw
//! - [`run_trials`] / [`run_partitioned`]: the trial loop, single stream or
//!   split across seeded workers
//! - [`PopEstimator`]: end-to-end estimate for a [`crate::domain::Position`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pop_engine::config::SimulationConfig;
//! use pop_engine::domain::{OptionLeg, Position};
//! use pop_engine::pricing::OptionKind;
//! use pop_engine::simulation::PopEstimator;
//! use pop_engine::volatility::ImpliedFromPremium;
//!
//! let position = Position::from_days(
//!     22913.15,
//!     8.0,
//!     365.0,
//!     0.065,
//!     vec![OptionLeg::buy(OptionKind::Call, 22950.0, 154.7, 75)],
//! );
//! let estimator = PopEstimator::new(
//!     SimulationConfig::default().with_trials(10_000),
//!     Arc::new(ImpliedFromPremium::default()),
//! );
//!
//! let outcome = estimator.estimate(&position).unwrap();
//! assert!((0.0..=100.0).contains(&outcome.pop()));
//! ```

mod estimator;
mod path;
mod result;
mod trials;

pub use estimator::PopEstimator;
pub use path::{TerminalPriceModel, simulate_terminal_price};
pub use result::{PopOutcome, PopStatus, SimulationResult, round_to_cents};
pub use trials::{
    TrialChunk, WORKER_SEED_STRIDE, configure_thread_pool, partition_trials, run_partitioned,
    run_trials, worker_seed,
};
