//! Implied Volatility Solver
//!
//! Converts one observed premium into one implied volatility by running
//! Newton-Raphson over the Black-Scholes price. Every step recomputes price
//! and vega at the current sigma; the step is clamped into
//! `[min_vol, max_vol]`, and the solve fails as soon as vega becomes too small
//! to divide by.

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
#![allow(clippy::many_single_char_names)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::black_scholes::{self, OptionKind};

// ============================================================================
// Error Types
// ============================================================================

/// Errors from IV computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IvError {
    /// Invalid input parameters.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message.
        message: String,
    },

    /// Vega fell below the configured floor, so the Newton step is undefined.
    #[error("Vega too small at iteration {iteration} (vega: {vega:.3e}, sigma: {sigma:.6})")]
    NumericalInstability {
        /// Iteration at which vega collapsed.
        iteration: u32,
        /// Vega observed at that iteration.
        vega: f64,
        /// Sigma at that iteration.
        sigma: f64,
    },

    /// Convergence failed after max iterations.
    #[error(
        "IV solver failed to converge after {iterations} iterations (last error: {last_error:.6})"
    )]
    ConvergenceFailure {
        /// Number of iterations attempted.
        iterations: u32,
        /// Last absolute price error.
        last_error: f64,
    },
}

impl IvError {
    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::NumericalInstability { .. } => "numerical_instability",
            Self::ConvergenceFailure { .. } => "convergence_failure",
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for IV solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvSolverConfig {
    /// Starting sigma for the first Newton step.
    pub initial_guess: f64,
    /// Maximum iterations for Newton-Raphson.
    pub max_iterations: u32,
    /// Convergence tolerance (absolute price error).
    pub tolerance: f64,
    /// Minimum volatility bound.
    pub min_vol: f64,
    /// Maximum volatility bound (5.0 = 500%).
    pub max_vol: f64,
    /// Vega below this aborts the solve.
    pub min_vega: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.2,
            max_iterations: 100,
            tolerance: 1e-8,
            min_vol: 1e-6,
            max_vol: 5.0,
            min_vega: 1e-6,
        }
    }
}

/// A converged solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvSolution {
    /// Implied volatility (annualized).
    pub iv: f64,
    /// Newton iterations taken before the price matched.
    pub iterations: u32,
}

// ============================================================================
// IV Solver
// ============================================================================

/// Implied Volatility Solver.
///
/// Stateless apart from its configuration, so one instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct IvSolver {
    config: IvSolverConfig,
}

impl IvSolver {
    /// Create a new IV solver with the given configuration.
    #[must_use]
    pub const fn new(config: IvSolverConfig) -> Self {
        Self { config }
    }

    /// Compute implied volatility.
    ///
    /// # Arguments
    ///
    /// * `market_price` - Observed market price of the option
    /// * `s` - Current underlying price
    /// * `k` - Strike price
    /// * `t` - Time to expiration (years)
    /// * `r` - Risk-free rate (annualized)
    /// * `kind` - Option type (Call or Put)
    ///
    /// # Errors
    ///
    /// Returns an error if inputs are invalid, vega collapses, or the solver
    /// fails to converge.
    pub fn solve(
        &self,
        market_price: f64,
        s: f64,
        k: f64,
        t: f64,
        r: f64,
        kind: OptionKind,
    ) -> Result<f64, IvError> {
        self.solve_detailed(market_price, s, k, t, r, kind)
            .map(|solution| solution.iv)
    }

    /// Compute implied volatility and report the iterations used.
    ///
    /// # Errors
    ///
    /// Same as [`IvSolver::solve`].
    pub fn solve_detailed(
        &self,
        market_price: f64,
        s: f64,
        k: f64,
        t: f64,
        r: f64,
        kind: OptionKind,
    ) -> Result<IvSolution, IvError> {
        Self::validate_inputs(market_price, s, k, t, r)?;

        let config = &self.config;
        let mut sigma = config.initial_guess;

        for iteration in 0..config.max_iterations {
            let price = black_scholes::price(s, k, t, r, sigma, kind);
            let vega = black_scholes::vega(s, k, t, r, sigma);

            if vega < config.min_vega {
                return Err(IvError::NumericalInstability {
                    iteration,
                    vega,
                    sigma,
                });
            }

            let error = price - market_price;
            if error.abs() < config.tolerance {
                return Ok(IvSolution {
                    iv: sigma,
                    iterations: iteration,
                });
            }

            sigma = (sigma - error / vega).clamp(config.min_vol, config.max_vol);
        }

        Err(IvError::ConvergenceFailure {
            iterations: config.max_iterations,
            last_error: (black_scholes::price(s, k, t, r, sigma, kind) - market_price).abs(),
        })
    }

    /// Validate input parameters.
    fn validate_inputs(market_price: f64, s: f64, k: f64, t: f64, r: f64) -> Result<(), IvError> {
        if !(market_price.is_finite() && market_price > 0.0) {
            return Err(IvError::InvalidInput {
                message: format!("Market price must be positive, got: {market_price}"),
            });
        }
        if !(s.is_finite() && s > 0.0) {
            return Err(IvError::InvalidInput {
                message: format!("Spot price must be positive, got: {s}"),
            });
        }
        if !(k.is_finite() && k > 0.0) {
            return Err(IvError::InvalidInput {
                message: format!("Strike price must be positive, got: {k}"),
            });
        }
        if !(t.is_finite() && t > 0.0) {
            return Err(IvError::InvalidInput {
                message: format!("Time to expiration must be positive, got: {t}"),
            });
        }
        if !r.is_finite() {
            return Err(IvError::InvalidInput {
                message: format!("Risk-free rate must be finite, got: {r}"),
            });
        }
        Ok(())
    }
}

/// Solve implied volatility with the default solver configuration.
///
/// # Errors
///
/// See [`IvSolver::solve`].
pub fn solve_iv(
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    market_price: f64,
    kind: OptionKind,
) -> Result<f64, IvError> {
    IvSolver::default().solve(market_price, s, k, t, r, kind)
}

// ============================================================================
// Tests
// ============================================================================
