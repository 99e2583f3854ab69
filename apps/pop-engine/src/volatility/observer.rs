//! Aggregation observers.
//!
//! The aggregator reports what happened to each leg through an
//! [`AggregationObserver`] instead of logging directly. Observers compose as a
//! tuple, so `(TracingObserver, MetricsObserver)` reports to both.

use tracing::{debug, info, warn};

use super::aggregator::{AggregateVolatility, SkipReason};
use crate::domain::{OptionLeg, VolatilityKey};
use crate::observability::{
    record_aggregate_volatility, record_no_usable_volatility, record_volatility_leg,
};

/// Receives aggregation events. Every method defaults to doing nothing.
pub trait AggregationObserver: Send + Sync {
    /// A leg resolved to `iv` under `key`.
    fn leg_resolved(&self, index: usize, key: VolatilityKey, iv: f64) {
        let _ = (index, key, iv);
    }

    /// A leg was skipped.
    fn leg_skipped(&self, index: usize, leg: &OptionLeg, reason: &SkipReason) {
        let _ = (index, leg, reason);
    }

    /// Aggregation finished with at least one usable leg.
    fn aggregated(&self, aggregate: &AggregateVolatility) {
        let _ = aggregate;
    }

    /// No leg was usable.
    fn no_usable_data(&self, legs: usize, skipped: usize) {
        let _ = (legs, skipped);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AggregationObserver for NoopObserver {}

/// Emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AggregationObserver for TracingObserver {
    fn leg_resolved(&self, index: usize, key: VolatilityKey, iv: f64) {
        debug!(leg = index, key = %key, iv, "Resolved leg volatility");
    }

    fn leg_skipped(&self, index: usize, leg: &OptionLeg, reason: &SkipReason) {
        match reason {
            SkipReason::Source(err) => warn!(
                leg = index,
                strike = leg.strike(),
                option_type = %leg.option_type(),
                premium = leg.premium(),
                reason = reason.label(),
                error = %err,
                "Skipping leg: volatility unavailable"
            ),
            _ => debug!(
                leg = index,
                strike = leg.strike(),
                option_type = %leg.option_type(),
                premium = leg.premium(),
                reason = reason.label(),
                "Skipping leg"
            ),
        }
    }

    fn aggregated(&self, aggregate: &AggregateVolatility) {
        info!(
            average_iv = aggregate.average(),
            valid = aggregate.valid_count(),
            skipped = aggregate.skipped_count(),
            "Aggregated position volatility"
        );
    }

    fn no_usable_data(&self, legs: usize, skipped: usize) {
        warn!(legs, skipped, "No usable volatility data for position");
    }
}

/// Records Prometheus counters and histograms.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl AggregationObserver for MetricsObserver {
    fn leg_resolved(&self, _index: usize, _key: VolatilityKey, _iv: f64) {
        record_volatility_leg("resolved");
    }

    fn leg_skipped(&self, _index: usize, _leg: &OptionLeg, reason: &SkipReason) {
        record_volatility_leg(reason.label());
    }

    fn aggregated(&self, aggregate: &AggregateVolatility) {
        record_aggregate_volatility(aggregate.average(), aggregate.valid_count());
    }

    fn no_usable_data(&self, _legs: usize, _skipped: usize) {
        record_no_usable_volatility();
    }
}

impl<A, B> AggregationObserver for (A, B)
where
    A: AggregationObserver,
    B: AggregationObserver,
{
    fn leg_resolved(&self, index: usize, key: VolatilityKey, iv: f64) {
        self.0.leg_resolved(index, key, iv);
        self.1.leg_resolved(index, key, iv);
    }

    fn leg_skipped(&self, index: usize, leg: &OptionLeg, reason: &SkipReason) {
        self.0.leg_skipped(index, leg, reason);
        self.1.leg_skipped(index, leg, reason);
    }

    fn aggregated(&self, aggregate: &AggregateVolatility) {
        self.0.aggregated(aggregate);
        self.1.aggregated(aggregate);
    }

    fn no_usable_data(&self, legs: usize, skipped: usize) {
        self.0.no_usable_data(legs, skipped);
        self.1.no_usable_data(legs, skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::OptionKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        resolved: AtomicUsize,
        skipped: AtomicUsize,
        no_data: AtomicUsize,
    }

    impl AggregationObserver for Counting {
        fn leg_resolved(&self, _index: usize, _key: VolatilityKey, _iv: f64) {
            self.resolved.fetch_add(1, Ordering::Relaxed);
        }

        fn leg_skipped(&self, _index: usize, _leg: &OptionLeg, _reason: &SkipReason) {
            self.skipped.fetch_add(1, Ordering::Relaxed);
        }

        fn no_usable_data(&self, _legs: usize, _skipped: usize) {
            self.no_data.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn tuple_forwards_to_both_observers() {
        let pair = (Counting::default(), Counting::default());
        let leg = OptionLeg::buy(OptionKind::Call, 100.0, 0.0, 1);

        pair.leg_resolved(0, VolatilityKey::new(100.0, OptionKind::Call), 0.2);
        pair.leg_skipped(1, &leg, &SkipReason::NonPositivePremium { premium: 0.0 });
        pair.no_usable_data(2, 2);

        for observer in [&pair.0, &pair.1] {
            assert_eq!(observer.resolved.load(Ordering::Relaxed), 1);
            assert_eq!(observer.skipped.load(Ordering::Relaxed), 1);
            assert_eq!(observer.no_data.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn provided_observers_accept_every_event() {
        let leg = OptionLeg::buy(OptionKind::Put, 95.0, 1.0, 1);
        let key = VolatilityKey::new(95.0, OptionKind::Put);
        let reason = SkipReason::UnrecognizedLeg {
            field: "optionType",
            raw: "FUT".into(),
        };
        let observer = (NoopObserver, (TracingObserver, MetricsObserver));

        observer.leg_resolved(0, key, 0.2);
        observer.leg_skipped(0, &leg, &reason);
        observer.no_usable_data(1, 1);
    }
}
