//! Market conventions used to build a position from a request.

use serde::{Deserialize, Serialize};

/// Pricing conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized).
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Day count used to convert days to expiry into years.
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            days_per_year: default_days_per_year(),
        }
    }
}

const fn default_risk_free_rate() -> f64 {
    0.065
}

const fn default_days_per_year() -> f64 {
    365.0
}
