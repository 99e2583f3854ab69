//! Monte Carlo simulation configuration.

use serde::{Deserialize, Serialize};

/// What to do with a leg whose option type or direction is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedLegPolicy {
    /// Price the rest of the position; the leg contributes nothing.
    #[default]
    Ignore,
    /// Refuse the whole position.
    Reject,
}

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of simulated terminal prices.
    #[serde(default = "default_trials")]
    pub trials: u64,
    /// Seed for reproducibility (None = seeded from the thread RNG).
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
    /// Independently seeded chunks the trials are split into.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Rayon pool size (0 = rayon default).
    #[serde(default)]
    pub max_threads: usize,
    /// Handling of unrecognised legs.
    #[serde(default)]
    pub unrecognized_legs: UnrecognizedLegPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            seed: default_seed(),
            workers: default_workers(),
            max_threads: 0,
            unrecognized_legs: UnrecognizedLegPolicy::default(),
        }
    }
}

impl SimulationConfig {
    /// Same configuration with a different trial count.
    #[must_use]
    pub const fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Same configuration with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Same configuration with a different worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Same configuration with a different unrecognised-leg policy.
    #[must_use]
    pub const fn with_unrecognized_legs(mut self, policy: UnrecognizedLegPolicy) -> Self {
        self.unrecognized_legs = policy;
        self
    }
}

const fn default_trials() -> u64 {
    500_000
}

#[allow(clippy::unnecessary_wraps)]
const fn default_seed() -> Option<u64> {
    Some(12345)
}

const fn default_workers() -> usize {
    1
}
