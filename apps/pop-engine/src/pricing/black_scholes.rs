//! Closed-form Black-Scholes pricing.
//!
//! Price and vega for a single European option, plus the standard normal
//! helpers they are built from. Everything here is a pure function of
//! `(s, k, t, r, sigma)`; there is no dividend term.

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
// Financial formulas use standard notation where mul_add() obscures meaning
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use std::f64::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};

/// Option kind used by the pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionKind {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionKind {
    /// Exchange code for this kind (`CE` / `PE`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }

    /// Returns true for calls.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }
}

/// Standard normal CDF (cumulative distribution function).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal PDF (probability density function).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter.
fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Payoff of the option if exercised at spot `s`.
#[must_use]
pub fn intrinsic_value(s: f64, k: f64, kind: OptionKind) -> f64 {
    match kind {
        OptionKind::Call => (s - k).max(0.0),
        OptionKind::Put => (k - s).max(0.0),
    }
}

/// Black-Scholes price for either call or put.
///
/// At or after expiry (`t <= 0`) the option is worth its intrinsic value.
/// With no volatility the price collapses to the discounted forward payoff.
#[must_use]
pub fn price(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionKind) -> f64 {
    if t <= 0.0 {
        return intrinsic_value(s, k, kind);
    }

    let discount = (-r * t).exp();

    if sigma <= 0.0 {
        return match kind {
            OptionKind::Call => (s - k * discount).max(0.0),
            OptionKind::Put => (k * discount - s).max(0.0),
        };
    }

    let d1_val = d1(s, k, t, r, sigma);
    let d2_val = d1_val - sigma * t.sqrt();

    match kind {
        OptionKind::Call => s * norm_cdf(d1_val) - k * discount * norm_cdf(d2_val),
        OptionKind::Put => k * discount * norm_cdf(-d2_val) - s * norm_cdf(-d1_val),
    }
}

/// Black-Scholes vega (same for calls and puts).
///
/// Returns zero at or after expiry, where price no longer depends on sigma.
#[must_use]
pub fn vega(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if t <= 0.0 || sigma <= 0.0 {
        return 0.0;
    }

    let d1_val = d1(s, k, t, r, sigma);
    s * t.sqrt() * norm_pdf(d1_val)
}
