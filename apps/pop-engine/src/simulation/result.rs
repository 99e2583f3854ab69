//! Estimator outputs.

use serde::{Deserialize, Serialize};

use crate::volatility::AggregateVolatility;

/// Counts from one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Trials with non-negative P&L.
    pub profitable: u64,
    /// Trials run.
    pub trials: u64,
    /// Seed the run started from.
    pub seed: u64,
    /// Worker chunks the trials were split into.
    pub workers: usize,
}

impl SimulationResult {
    /// Share of profitable trials in `[0, 1]`.
    #[must_use]
    pub fn profitable_fraction(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.profitable as f64 / self.trials as f64
    }

    /// Profitable share as a percentage rounded to two decimals.
    #[must_use]
    pub fn pop_percent(&self) -> f64 {
        round_to_cents(self.profitable_fraction() * 100.0)
    }
}

/// Whether the estimate is backed by a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopStatus {
    /// Trials were run.
    Simulated,
    /// No leg produced a volatility; the PoP is reported as zero.
    NoUsableVolatilityData,
}

impl PopStatus {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::NoUsableVolatilityData => "no_usable_volatility_data",
        }
    }
}

/// Probability of profit plus the data behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct PopOutcome {
    pop: f64,
    status: PopStatus,
    volatility: Option<AggregateVolatility>,
    simulation: Option<SimulationResult>,
}

impl PopOutcome {
    /// Outcome of a completed simulation.
    #[must_use]
    pub fn simulated(volatility: AggregateVolatility, simulation: SimulationResult) -> Self {
        Self {
            pop: simulation.pop_percent(),
            status: PopStatus::Simulated,
            volatility: Some(volatility),
            simulation: Some(simulation),
        }
    }

    /// Outcome when no volatility could be established.
    #[must_use]
    pub const fn no_usable_volatility() -> Self {
        Self {
            pop: 0.0,
            status: PopStatus::NoUsableVolatilityData,
            volatility: None,
            simulation: None,
        }
    }

    /// Probability of profit in percent, two decimals.
    #[must_use]
    pub const fn pop(&self) -> f64 {
        self.pop
    }

    /// Validity signal.
    #[must_use]
    pub const fn status(&self) -> PopStatus {
        self.status
    }

    /// Aggregate volatility, when one was established.
    #[must_use]
    pub const fn volatility(&self) -> Option<&AggregateVolatility> {
        self.volatility.as_ref()
    }

    /// Simulation counts, when trials were run.
    #[must_use]
    pub const fn simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }
}

/// Round to two decimal places.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
