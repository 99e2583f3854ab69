//! Per-leg volatility sources.
//!
//! The aggregator asks a [`VolatilitySource`] for one sigma per leg. The
//! canonical source solves it from the leg premium; a quoted source looks it
//! up in a snapshot taken from an external quote service.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{OptionLeg, PricingContext, VolatilityKey};
use crate::pricing::{IvError, IvSolver, OptionKind};

/// Errors from a volatility source for a single leg.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolatilityError {
    /// The IV solver rejected or failed on the leg.
    #[error(transparent)]
    Solver(#[from] IvError),

    /// The quote snapshot has no entry for the leg.
    #[error("No quoted volatility for {key}")]
    NotQuoted {
        /// Requested key.
        key: VolatilityKey,
    },
}

impl VolatilityError {
    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Solver(err) => err.label(),
            Self::NotQuoted { .. } => "not_quoted",
        }
    }
}

/// Supplies one volatility per option leg.
pub trait VolatilitySource: Send + Sync {
    /// Name reported in logs and by the status endpoint.
    fn name(&self) -> &'static str;

    /// Volatility for `leg`, already known to be of the given `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if no volatility can be produced for this leg.
    fn leg_volatility(
        &self,
        context: &PricingContext,
        leg: &OptionLeg,
        kind: OptionKind,
    ) -> Result<f64, VolatilityError>;
}

// ============================================================================
// Premium-implied
// ============================================================================

/// Solves each leg's implied volatility from its premium.
#[derive(Debug, Clone, Default)]
pub struct ImpliedFromPremium {
    solver: IvSolver,
}

impl ImpliedFromPremium {
    /// Create a source backed by the given solver.
    #[must_use]
    pub const fn new(solver: IvSolver) -> Self {
        Self { solver }
    }
}

impl VolatilitySource for ImpliedFromPremium {
    fn name(&self) -> &'static str {
        "implied_from_premium"
    }

    fn leg_volatility(
        &self,
        context: &PricingContext,
        leg: &OptionLeg,
        kind: OptionKind,
    ) -> Result<f64, VolatilityError> {
        let iv = self.solver.solve(
            leg.premium(),
            context.spot,
            leg.strike(),
            context.time_to_expiry,
            context.risk_free_rate,
            kind,
        )?;
        Ok(iv)
    }
}

// ============================================================================
// Quoted
// ============================================================================

/// Pre-computed volatilities from a quote snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotedVolatility {
    quotes: HashMap<VolatilityKey, f64>,
}

impl QuotedVolatility {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a quote.
    #[must_use]
    pub fn with_quote(mut self, strike: f64, kind: OptionKind, iv: f64) -> Self {
        self.insert(VolatilityKey::new(strike, kind), iv);
        self
    }

    /// Add or replace a quote.
    pub fn insert(&mut self, key: VolatilityKey, iv: f64) {
        self.quotes.insert(key, iv);
    }

    /// Number of quoted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<(VolatilityKey, f64)> for QuotedVolatility {
    fn from_iter<I: IntoIterator<Item = (VolatilityKey, f64)>>(iter: I) -> Self {
        Self {
            quotes: iter.into_iter().collect(),
        }
    }
}

impl VolatilitySource for QuotedVolatility {
    fn name(&self) -> &'static str {
        "quoted"
    }

    fn leg_volatility(
        &self,
        _context: &PricingContext,
        leg: &OptionLeg,
        kind: OptionKind,
    ) -> Result<f64, VolatilityError> {
        let key = VolatilityKey::new(leg.strike(), kind);
        self.quotes
            .get(&key)
            .copied()
            .ok_or(VolatilityError::NotQuoted { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::price;

    fn context() -> PricingContext {
        PricingContext {
            spot: 100.0,
            time_to_expiry: 0.5,
            risk_free_rate: 0.05,
        }
    }

    #[test]
    fn implied_source_recovers_premium_volatility() {
        let premium = price(100.0, 105.0, 0.5, 0.05, 0.3, OptionKind::Call);
        let leg = OptionLeg::buy(OptionKind::Call, 105.0, premium, 1);

        let iv = match ImpliedFromPremium::default().leg_volatility(&context(), &leg, OptionKind::Call) {
            Ok(iv) => iv,
            Err(e) => panic!("premium-implied volatility should resolve: {e}"),
        };

        assert!((iv - 0.3).abs() < 1e-6);
    }

    #[test]
    fn implied_source_surfaces_solver_errors() {
        let leg = OptionLeg::buy(OptionKind::Put, 95.0, -1.0, 1);
        let result = ImpliedFromPremium::default().leg_volatility(&context(), &leg, OptionKind::Put);

        match result {
            Err(err @ VolatilityError::Solver(IvError::InvalidInput { .. })) => {
                assert_eq!(err.label(), "invalid_input");
            }
            other => panic!("expected solver InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn quoted_source_looks_up_by_strike_and_kind() {
        let source = QuotedVolatility::new()
            .with_quote(100.0, OptionKind::Call, 0.18)
            .with_quote(100.0, OptionKind::Put, 0.21);
        let call = OptionLeg::sell(OptionKind::Call, 100.0, 3.0, 1);
        let put = OptionLeg::sell(OptionKind::Put, 100.0, 3.0, 1);

        assert_eq!(source.len(), 2);
        assert_eq!(source.leg_volatility(&context(), &call, OptionKind::Call), Ok(0.18));
        assert_eq!(source.leg_volatility(&context(), &put, OptionKind::Put), Ok(0.21));
    }

    #[test]
    fn quoted_source_reports_missing_key() {
        let source: QuotedVolatility = [(VolatilityKey::new(100.0, OptionKind::Call), 0.2)]
            .into_iter()
            .collect();
        let leg = OptionLeg::buy(OptionKind::Call, 110.0, 1.0, 1);

        let result = source.leg_volatility(&context(), &leg, OptionKind::Call);

        match result {
            Err(err @ VolatilityError::NotQuoted { .. }) => {
                assert_eq!(err.label(), "not_quoted");
                assert_eq!(err.to_string(), "No quoted volatility for 110_CE");
            }
            other => panic!("expected NotQuoted, got {other:?}"),
        }
    }
}
