//! Probability-of-profit estimator.
//!
//! Orchestrates one estimate: policy check, volatility aggregation, then the
//! Monte Carlo trials over log-normal terminal prices.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use super::path::TerminalPriceModel;
use super::result::{PopOutcome, SimulationResult};
use super::trials::{run_partitioned, run_trials};
use crate::config::{SimulationConfig, UnrecognizedLegPolicy};
use crate::domain::Position;
use crate::error::PopError;
use crate::observability::record_pop_estimate;
use crate::volatility::{
    AggregateVolatility, AggregationObserver, ImpliedFromPremium, TracingObserver,
    VolatilitySource, aggregate_volatility,
};

/// Monte Carlo PoP estimator.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct PopEstimator {
    config: SimulationConfig,
    source: Arc<dyn VolatilitySource>,
    observer: Arc<dyn AggregationObserver>,
}

impl std::fmt::Debug for PopEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopEstimator")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl Default for PopEstimator {
    fn default() -> Self {
        Self::new(
            SimulationConfig::default(),
            Arc::new(ImpliedFromPremium::default()),
        )
    }
}

impl PopEstimator {
    /// Create an estimator drawing volatilities from `source`.
    #[must_use]
    pub fn new(config: SimulationConfig, source: Arc<dyn VolatilitySource>) -> Self {
        Self {
            config,
            source,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the aggregation observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn AggregationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Simulation configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Name of the default volatility source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Estimate PoP with the configured source and seed.
    ///
    /// An unset seed draws a fresh one from the thread RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if spot or time to expiry is not positive, the
    /// position is rejected by the unrecognised-leg policy, or the
    /// configuration cannot run.
    pub fn estimate(&self, position: &Position) -> Result<PopOutcome, PopError> {
        self.estimate_with_source(position, self.source.as_ref())
    }

    /// Estimate PoP drawing volatilities from `source` instead of the default.
    ///
    /// # Errors
    ///
    /// Same as [`PopEstimator::estimate`].
    pub fn estimate_with_source(
        &self,
        position: &Position,
        source: &dyn VolatilitySource,
    ) -> Result<PopOutcome, PopError> {
        let started = Instant::now();
        self.check_config()?;
        Self::check_market(position)?;
        self.check_legs(position)?;

        let Some(aggregate) = self.aggregate(position, source) else {
            return Ok(Self::finish(PopOutcome::no_usable_volatility(), started));
        };

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let model = Self::model(position, &aggregate);
        let trials = self.config.trials;
        let workers = self.config.workers;

        debug!(
            trials,
            workers,
            seed,
            average_iv = aggregate.average(),
            "Running PoP simulation"
        );

        let profitable = run_partitioned(&model, position.legs(), trials, workers, seed);
        let simulation = SimulationResult {
            profitable,
            trials,
            seed,
            workers,
        };

        Ok(Self::finish(
            PopOutcome::simulated(aggregate, simulation),
            started,
        ))
    }

    /// Estimate PoP drawing every trial from `rng` on the calling thread.
    ///
    /// The configured seed and worker count are ignored; the reported seed is 0.
    ///
    /// # Errors
    ///
    /// Same as [`PopEstimator::estimate`].
    pub fn estimate_with_rng<R: Rng + ?Sized>(
        &self,
        position: &Position,
        rng: &mut R,
    ) -> Result<PopOutcome, PopError> {
        let started = Instant::now();
        self.check_config()?;
        Self::check_market(position)?;
        self.check_legs(position)?;

        let Some(aggregate) = self.aggregate(position, self.source.as_ref()) else {
            return Ok(Self::finish(PopOutcome::no_usable_volatility(), started));
        };

        let model = Self::model(position, &aggregate);
        let trials = self.config.trials;
        let profitable = run_trials(rng, &model, position.legs(), trials);
        let simulation = SimulationResult {
            profitable,
            trials,
            seed: 0,
            workers: 1,
        };

        Ok(Self::finish(
            PopOutcome::simulated(aggregate, simulation),
            started,
        ))
    }

    fn check_config(&self) -> Result<(), PopError> {
        if self.config.trials == 0 {
            return Err(PopError::InvalidConfiguration {
                message: "trials must be positive".to_string(),
            });
        }
        if self.config.workers == 0 {
            return Err(PopError::InvalidConfiguration {
                message: "workers must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn check_market(position: &Position) -> Result<(), PopError> {
        let invalid = |message: String| Err(PopError::InvalidPosition { message });

        if !(position.spot().is_finite() && position.spot() > 0.0) {
            return invalid(format!("spot must be positive, got {}", position.spot()));
        }
        if !(position.time_to_expiry().is_finite() && position.time_to_expiry() > 0.0) {
            return invalid(format!(
                "time to expiry must be positive, got {}",
                position.time_to_expiry()
            ));
        }
        if !position.risk_free_rate().is_finite() {
            return invalid(format!(
                "risk-free rate must be finite, got {}",
                position.risk_free_rate()
            ));
        }
        Ok(())
    }

        fn check_legs(&self, position: &Position) -> Result<(), PopError> {
        if self.config.unrecognized_legs == UnrecognizedLegPolicy::Ignore {
            return Ok(());
        }

        match position.first_unrecognized_leg() {
            Some((index, field, value)) => Err(PopError::UnrecognizedLeg {
                index,
                field,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn aggregate(
        &self,
        position: &Position,
        source: &dyn VolatilitySource,
    ) -> Option<AggregateVolatility> {
        aggregate_volatility(
            position.pricing_context(),
            position.legs(),
            source,
            self.observer.as_ref(),
        )
        .ok()
    }

    fn model(position: &Position, aggregate: &AggregateVolatility) -> TerminalPriceModel {
        TerminalPriceModel::new(
            position.spot(),
            aggregate.average(),
            position.time_to_expiry(),
        )
    }

    fn finish(outcome: PopOutcome, started: Instant) -> PopOutcome {
        let elapsed = started.elapsed().as_secs_f64();
        let trials = outcome.simulation().map_or(0, |s| s.trials);

        info!(
            pop = outcome.pop(),
            status = outcome.status().as_str(),
            trials,
            elapsed_ms = elapsed * 1000.0,
            "PoP estimate complete"
        );
        record_pop_estimate(outcome.status().as_str(), trials, elapsed);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptionLeg, OptionType, TransactionType};
    use crate::pricing::OptionKind;
    use crate::simulation::PopStatus;
    use crate::volatility::{NoopObserver, QuotedVolatility};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn estimator(config: SimulationConfig) -> PopEstimator {
        PopEstimator::new(config, Arc::new(ImpliedFromPremium::default()))
            .with_observer(Arc::new(NoopObserver))
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig::default().with_trials(20_000)
    }

    fn long_call() -> Position {
        Position::from_days(
            22913.15,
            8.0,
            365.0,
            0.065,
            vec![OptionLeg::buy(OptionKind::Call, 22950.0, 154.7, 75)],
        )
    }

    #[test]
    fn simulated_outcome_carries_counts() {
        let outcome = match estimator(small_config()).estimate(&long_call()) {
            Ok(outcome) => outcome,
            Err(e) => panic!("estimate should succeed: {e}"),
        };

        assert_eq!(outcome.status(), PopStatus::Simulated);
        let Some(simulation) = outcome.simulation() else {
            panic!("simulated outcome must carry counts");
        };
        assert_eq!(simulation.trials, 20_000);
        assert_eq!(simulation.seed, 12345);
        assert_eq!(simulation.workers, 1);
        assert_eq!(outcome.pop(), simulation.pop_percent());
        assert!(outcome.volatility().is_some());
    }

    #[test]
    fn estimate_with_rng_matches_seeded_single_stream() {
        let estimator = estimator(small_config());
        let position = long_call();

        let seeded = match estimator.estimate(&position) {
            Ok(outcome) => outcome.pop(),
            Err(e) => panic!("estimate should succeed: {e}"),
        };
        let mut rng = StdRng::seed_from_u64(12345);
        let injected = match estimator.estimate_with_rng(&position, &mut rng) {
            Ok(outcome) => outcome.pop(),
            Err(e) => panic!("estimate should succeed: {e}"),
        };

        assert_eq!(seeded.to_bits(), injected.to_bits());
    }

    #[test]
    fn unseeded_estimate_reports_drawn_seed() {
        let estimator = estimator(small_config().with_seed(None));

        let outcome = match estimator.estimate(&long_call()) {
            Ok(outcome) => outcome,
            Err(e) => panic!("estimate should succeed: {e}"),
        };

        assert!((0.0..=100.0).contains(&outcome.pop()));
        assert!(outcome.simulation().is_some());
    }

    #[test]
    fn quoted_source_overrides_default() {
        let estimator = estimator(small_config());
        let quotes = QuotedVolatility::new().with_quote(22950.0, OptionKind::Call, 0.5);

        let outcome = match estimator.estimate_with_source(&long_call(), &quotes) {
            Ok(outcome) => outcome,
            Err(e) => panic!("estimate should succeed: {e}"),
        };

        let Some(volatility) = outcome.volatility() else {
            panic!("quoted estimate must carry volatility");
        };
        assert_eq!(volatility.average(), 0.5);
    }

    #[test]
    fn missing_quote_means_no_usable_data() {
        let estimator = estimator(small_config());

        let outcome = match estimator.estimate_with_source(&long_call(), &QuotedVolatility::new()) {
            Ok(outcome) => outcome,
            Err(e) => panic!("estimate should succeed: {e}"),
        };

        assert_eq!(outcome.status(), PopStatus::NoUsableVolatilityData);
        assert_eq!(outcome.pop(), 0.0);
    }

    #[test]
    fn reject_policy_names_offending_leg() {
        let estimator = estimator(
            small_config().with_unrecognized_legs(UnrecognizedLegPolicy::Reject),
        );
        let position = Position::new(
            100.0,
            0.1,
            0.05,
            vec![
                OptionLeg::buy(OptionKind::Call, 100.0, 2.0, 1),
                OptionLeg::new(
                    OptionType::Unrecognized("FUT".into()),
                    TransactionType::Buy,
                    100.0,
                    2.0,
                    1,
                ),
            ],
        );

        assert_eq!(
            estimator.estimate(&position),
            Err(PopError::UnrecognizedLeg {
                index: 1,
                field: "optionType",
                value: "FUT".to_string(),
            })
        );
    }

    #[test]
    fn zero_trials_is_a_configuration_error() {
        let estimator = estimator(small_config().with_trials(0));

        assert!(matches!(
            estimator.estimate(&long_call()),
            Err(PopError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn expired_position_is_refused_before_quoted_simulation() {
        let estimator = estimator(small_config());
        let quotes = QuotedVolatility::new().with_quote(100.0, OptionKind::Call, 0.2);
        let position = Position::from_days(
            100.0,
            -5.0,
            365.0,
            0.065,
            vec![OptionLeg::sell(OptionKind::Call, 100.0, 2.0, 1)],
        );

        match estimator.estimate_with_source(&position, &quotes) {
            Err(PopError::InvalidPosition { message }) => {
                assert!(message.starts_with("time to expiry"), "{message}");
            }
            other => panic!("expected InvalidPosition, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_spot_is_refused_on_every_path() {
        let estimator = estimator(small_config());
        let position = Position::from_days(
            0.0,
            30.0,
            365.0,
            0.065,
            vec![OptionLeg::buy(OptionKind::Call, 100.0, 2.0, 1)],
        );
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            estimator.estimate(&position),
            Err(PopError::InvalidPosition { .. })
        ));
        assert!(matches!(
            estimator.estimate_with_rng(&position, &mut rng),
            Err(PopError::InvalidPosition { .. })
        ));
    }

        #[test]
    fn debug_shows_source_name() {
        let rendered = format!("{:?}", PopEstimator::default());
        assert!(rendered.contains("implied_from_premium"));
    }
}
