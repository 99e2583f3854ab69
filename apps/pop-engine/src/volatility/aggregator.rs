//! Position-level volatility aggregation.
//!
//! Every usable leg contributes one estimate keyed by strike and kind; the
//! position's volatility is the plain mean of those estimates. Legs that cannot
//! be resolved are skipped and reported to the observer, never propagated.

use std::collections::BTreeMap;

use thiserror::Error;

use super::observer::AggregationObserver;
use super::source::{VolatilityError, VolatilitySource};
use crate::domain::{OptionLeg, PricingContext, VolatilityKey};

/// Why a leg did not contribute to the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Premium was zero, negative, or not a number.
    NonPositivePremium {
        /// Leg premium.
        premium: f64,
    },
    /// Option type or direction was not recognised.
    UnrecognizedLeg {
        /// Wire field name (`optionType` or `transactionType`).
        field: &'static str,
        /// Raw value received.
        raw: String,
    },
    /// The volatility source failed for this leg.
    Source(VolatilityError),
    /// The source returned zero, a negative, or a non-finite volatility.
    InvalidVolatility {
        /// Returned value.
        iv: f64,
    },
}

impl SkipReason {
    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NonPositivePremium { .. } => "non_positive_premium",
            Self::UnrecognizedLeg { .. } => "unrecognized_leg",
            Self::Source(err) => err.label(),
            Self::InvalidVolatility { .. } => "invalid_volatility",
        }
    }
}

/// Aggregated volatility of a position.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateVolatility {
    average: f64,
    estimates: BTreeMap<VolatilityKey, f64>,
    skipped: usize,
}

impl AggregateVolatility {
    /// Mean of the per-key estimates.
    #[must_use]
    pub const fn average(&self) -> f64 {
        self.average
    }

    /// Number of distinct keys that resolved.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.estimates.len()
    }

    /// Number of legs skipped.
    #[must_use]
    pub const fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Per-key estimates in key order.
    #[must_use]
    pub const fn estimates(&self) -> &BTreeMap<VolatilityKey, f64> {
        &self.estimates
    }
}

/// Aggregation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// No leg produced a usable volatility.
    #[error("No usable volatility data ({skipped} of {legs} legs skipped)")]
    NoUsableVolatilityData {
        /// Legs in the position.
        legs: usize,
        /// Legs skipped.
        skipped: usize,
    },
}

/// Resolve each leg's volatility from `source` and average the results.
///
/// When two legs share a [`VolatilityKey`], the later leg's estimate replaces
/// the earlier one.
///
/// # Errors
///
/// Returns [`AggregateError::NoUsableVolatilityData`] if no leg resolved.
pub fn aggregate_volatility(
    context: &PricingContext,
    legs: &[OptionLeg],
    source: &dyn VolatilitySource,
    observer: &dyn AggregationObserver,
) -> Result<AggregateVolatility, AggregateError> {
    let mut estimates = BTreeMap::new();
    let mut skipped = 0;

    for (index, leg) in legs.iter().enumerate() {
        match resolve_leg(context, leg, source) {
            Ok((key, iv)) => {
                observer.leg_resolved(index, key, iv);
                estimates.insert(key, iv);
            }
            Err(reason) => {
                observer.leg_skipped(index, leg, &reason);
                skipped += 1;
            }
        }
    }

    if estimates.is_empty() {
        observer.no_usable_data(legs.len(), skipped);
        return Err(AggregateError::NoUsableVolatilityData {
            legs: legs.len(),
            skipped,
        });
    }

    let sum: f64 = estimates.values().sum();
    let aggregate = AggregateVolatility {
        average: sum / estimates.len() as f64,
        estimates,
        skipped,
    };

    observer.aggregated(&aggregate);
    Ok(aggregate)
}

fn resolve_leg(
    context: &PricingContext,
    leg: &OptionLeg,
    source: &dyn VolatilitySource,
) -> Result<(VolatilityKey, f64), SkipReason> {
    if leg.premium().is_nan() || leg.premium() <= 0.0 {
        return Err(SkipReason::NonPositivePremium {
            premium: leg.premium(),
        });
    }

    // A leg with no payoff must not move the volatility either
    if let Some((field, raw)) = leg.unrecognized_field() {
        return Err(SkipReason::UnrecognizedLeg {
            field,
            raw: raw.to_string(),
        });
    }

    let Some(key) = leg.volatility_key() else {
        return Err(SkipReason::UnrecognizedLeg {
            field: "optionType",
            raw: leg.option_type().as_str().to_string(),
        });
    };

    let iv = source
        .leg_volatility(context, leg, key.kind())
        .map_err(SkipReason::Source)?;

    if !iv.is_finite() || iv <= 0.0 {
        return Err(SkipReason::InvalidVolatility { iv });
    }

    Ok((key, iv))
}
