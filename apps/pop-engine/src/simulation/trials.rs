//! Trial loop and worker partition.
//!
//! A trial draws one standard normal, maps it to a terminal price, and counts
//! as profitable when the position's P&L there is non-negative. With more than
//! one worker the trial range is cut into contiguous chunks, each with its own
//! seeded generator, so the total depends only on `(seed, workers)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

use super::path::TerminalPriceModel;
use crate::domain::{OptionLeg, position_payoff};
use crate::error::PopError;

/// Seed offset between consecutive workers.
pub const WORKER_SEED_STRIDE: u64 = 7_919;

/// One worker's share of the trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialChunk {
    /// Worker index.
    pub index: usize,
    /// Trials this worker runs.
    pub trials: u64,
    /// Seed for this worker's generator.
    pub seed: u64,
}

/// Seed for worker `index`.
#[must_use]
pub const fn worker_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64).wrapping_mul(WORKER_SEED_STRIDE))
}

/// Split `trials` into `workers` contiguous chunks.
///
/// The first `trials % workers` chunks get one extra trial.
#[must_use]
pub fn partition_trials(trials: u64, workers: usize, seed: u64) -> Vec<TrialChunk> {
    let workers = workers.max(1);
    let base = trials / workers as u64;
    let extra = trials % workers as u64;

    (0..workers)
        .map(|index| TrialChunk {
            index,
            trials: base + u64::from((index as u64) < extra),
            seed: worker_seed(seed, index),
        })
        .collect()
}

/// Run `trials` trials from `rng` and count the profitable ones.
pub fn run_trials<R: Rng + ?Sized>(
    rng: &mut R,
    model: &TerminalPriceModel,
    legs: &[OptionLeg],
    trials: u64,
) -> u64 {
    let mut profitable = 0;
    for _ in 0..trials {
        let z: f64 = StandardNormal.sample(rng);
        if position_payoff(model.terminal_price(z), legs) >= 0.0 {
            profitable += 1;
        }
    }
    profitable
}

/// Run the trials split across `workers` seeded chunks.
///
/// A single worker runs inline as the reference stream; more workers run on
/// the rayon pool and their counts are summed after the join.
pub fn run_partitioned(
    model: &TerminalPriceModel,
    legs: &[OptionLeg],
    trials: u64,
    workers: usize,
    seed: u64,
) -> u64 {
    if workers <= 1 {
        let mut rng = StdRng::seed_from_u64(seed);
        return run_trials(&mut rng, model, legs, trials);
    }

    partition_trials(trials, workers, seed)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = StdRng::seed_from_u64(chunk.seed);
            run_trials(&mut rng, model, legs, chunk.trials)
        })
        .sum()
}

/// Size the global rayon pool.
///
/// Zero leaves rayon's default (one thread per core) in place.
///
/// # Errors
///
/// Returns error if the global pool was already built.
pub fn configure_thread_pool(max_threads: usize) -> Result<(), PopError> {
    if max_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .thread_name(|index| format!("pop-worker-{index}"))
            .build_global()
            .map_err(|e| PopError::ThreadPool {
                message: e.to_string(),
            })?;
    }
    Ok(())
}
