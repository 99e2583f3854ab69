//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::simulation::{PopOutcome, PopStatus};

/// Response from `POST /pop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopResponse {
    /// Probability of profit in percent, two decimals.
    pub pop: f64,
    /// Whether the value is backed by a simulation.
    pub status: PopStatus,
    /// Aggregate implied volatility, when one was established.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_iv: Option<f64>,
    /// Distinct strike/type keys that resolved a volatility.
    pub resolved_legs: usize,
    /// Legs skipped during aggregation.
    pub skipped_legs: usize,
}

impl From<&PopOutcome> for PopResponse {
    fn from(outcome: &PopOutcome) -> Self {
        let volatility = outcome.volatility();
        Self {
            pop: outcome.pop(),
            status: outcome.status(),
            average_iv: volatility.map(|v| v.average()),
            resolved_legs: volatility.map_or(0, |v| v.valid_count()),
            skipped_legs: volatility.map_or(0, |v| v.skipped_count()),
        }
    }
}

/// Response from `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Always `running`.
    pub status: String,
    /// Default volatility source.
    pub volatility_source: String,
    /// Trials per estimate.
    pub trials: u64,
    /// Worker chunks per estimate.
    pub workers: usize,
    /// Service version.
    pub version: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Error without a code.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    /// Attach a machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
