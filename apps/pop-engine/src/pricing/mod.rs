//! Options pricing.
//!
//! This module provides:
//! - Closed-form Black-Scholes price and vega
//! - Implied volatility computation (Newton-Raphson)
//!
//! # Example
//!
//! ```
//! use pop_engine::pricing::{IvSolver, OptionKind, price};
//!
//! let premium = price(100.0, 100.0, 0.5, 0.05, 0.25, OptionKind::Call);
//! let iv = IvSolver::default().solve(premium, 100.0, 100.0, 0.5, 0.05, OptionKind::Call);
//! assert!(iv.is_ok());
//! ```

mod black_scholes;
mod iv;

pub use black_scholes::{OptionKind, intrinsic_value, norm_cdf, norm_pdf, price, vega};
pub use iv::{IvError, IvSolution, IvSolver, IvSolverConfig, solve_iv};
