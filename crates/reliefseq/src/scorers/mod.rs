//! Relief-family relevance scorers.
//!
//! The controller only sees the `RelevanceScorer` trait. Three implementations
//! live here: `ReliefF` for class outcomes, `RReliefF` for continuous outcomes
//! and `ReliefSeq` for two-class count data. `factory::build_scorer` picks one
//! from the configured algorithm mode and the data set's phenotype.
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::config::{ReliefSeqConfig, WeightByDistance};
use crate::scores::ScoreSet;

pub mod factory;
pub mod relieff;
pub mod reliefseq;
pub mod rrelieff;

pub use relieff::ReliefF;
pub use reliefseq::ReliefSeq;
pub use rrelieff::RReliefF;

/// Scores every attribute still present in a data set of type `D`.
pub trait RelevanceScorer<D: ?Sized> {
    /// Neighborhood size for the next pass.
    fn set_k(&mut self, k: usize);

    fn k(&self) -> usize;

    /// One full pass: one `(score, name)` per remaining attribute.
    /// An empty result is treated as a failure by the controller.
    fn compute_scores(&mut self, data: &D) -> Result<ScoreSet>;

    /// Whether the controller should rescale this scorer's output to [0, 1].
    fn should_normalize(&self) -> bool;

    /// Advisory worker count handed down by the controller.
    fn set_worker_count(&mut self, workers: usize) -> Result<()> {
        let _ = workers;
        Ok(())
    }

    /// Human readable name for logging.
    fn name(&self) -> &str {
        "relief"
    }
}

/// Settings shared by the three scorers: neighborhood size, neighbor
/// weighting, instance sampling and the worker pool attribute scoring runs on.
pub(crate) struct ScorerCore {
    pub k: usize,
    sample_size: usize,
    seed: Option<u64>,
    weighting: WeightByDistance,
    sigma: f64,
    workers: usize,
    pub pool: rayon::ThreadPool,
}

fn build_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build scorer thread pool")
}

impl ScorerCore {
    pub fn from_config(config: &ReliefSeqConfig) -> Result<Self> {
        let workers = config.worker_count();
        Ok(Self {
            k: config.k,
            sample_size: config.number_random_samples,
            seed: config.random_seed,
            weighting: config.weight_by_distance_method,
            sigma: config.weight_by_distance_sigma,
            workers,
            pool: build_pool(workers)?,
        })
    }

    /// Resize the worker pool; a no-op when the count is unchanged.
    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        let workers = workers.max(1);
        if workers != self.workers {
            self.pool = build_pool(workers)?;
            self.workers = workers;
        }
        log::info!("Relief scorer will use {} threads", self.workers);
        Ok(())
    }

    /// Weights of `count` neighbors ordered nearest first; they sum to one.
    pub fn neighbor_weights(&self, count: usize) -> Vec<f64> {
        rank_weights(self.weighting, self.sigma, count)
    }

    /// `neighbor_weights` for every count from 0 to `k`, indexed by count.
    pub fn weight_table(&self, k: usize) -> Vec<Vec<f64>> {
        (0..=k).map(|count| self.neighbor_weights(count)).collect()
    }

    /// Instances scored in this pass, in ascending index order.
    pub fn sample_instances(&self, n: usize) -> Vec<usize> {
        if self.sample_size == 0 || self.sample_size >= n {
            return (0..n).collect();
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut picked = index::sample(&mut rng, n, self.sample_size).into_vec();
        picked.sort_unstable();
        picked
    }
}

/// Rank based neighbor weights, normalized to sum to one.
pub fn rank_weights(method: WeightByDistance, sigma: f64, count: usize) -> Vec<f64> {
    let raw: Vec<f64> = (1..=count)
        .map(|rank| {
            let rank = rank as f64;
            match method {
                WeightByDistance::Equal => 1.0,
                WeightByDistance::OneOverK => 1.0 / rank,
                WeightByDistance::Exponential => (-(rank / sigma).powi(2)).exp(),
            }
        })
        .collect();
    let total: f64 = raw.iter().sum();
    if total > 0.0 {
        raw.into_iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / count.max(1) as f64; count]
    }
}
