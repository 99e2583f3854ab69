//! Terminal price under geometric Brownian motion.
//!
//! `S_T = S_0 * exp(z * sigma * sqrt(T) - 0.5 * sigma^2 * T)` with `z` a
//! standard normal draw. The drift term carries no risk-free rate, so the
//! expected terminal price equals spot.

/// Log-normal terminal price model with the per-trial constants precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalPriceModel {
    spot: f64,
    diffusion: f64,
    drift: f64,
}

impl TerminalPriceModel {
    /// Build the model for one position.
    #[must_use]
    pub fn new(spot: f64, volatility: f64, time_to_expiry: f64) -> Self {
        Self {
            spot,
            diffusion: volatility * time_to_expiry.sqrt(),
            drift: -0.5 * volatility * volatility * time_to_expiry,
        }
    }

    /// Terminal price for one standard normal draw.
    #[inline]
    #[must_use]
    pub fn terminal_price(&self, z: f64) -> f64 {
        self.spot * (z * self.diffusion + self.drift).exp()
    }
}

/// Terminal price for a single draw `z`.
#[must_use]
pub fn simulate_terminal_price(spot: f64, volatility: f64, time_to_expiry: f64, z: f64) -> f64 {
    TerminalPriceModel::new(spot, volatility, time_to_expiry).terminal_price(z)
}
