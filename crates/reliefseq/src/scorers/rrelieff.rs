use anyhow::Result;
use rayon::prelude::*;

use crate::config::ReliefSeqConfig;
use crate::data_handling::{Dataset, NeighborSets};
use crate::error::SelectionError;
use crate::scorers::{RelevanceScorer, ScorerCore};
use crate::scores::{ScoreSet, ScoredAttribute};
use crate::universe::AttributeUniverse;

/// Regression ReliefF (Robnik-Sikonja and Kononenko) for continuous outcomes.
///
/// Accumulates, over the k nearest neighbors of each sampled instance with
/// equal weights, the probability of a different outcome (N_dC), of a different
/// attribute value (N_dA) and of both (N_dCdA). The weight of A is
/// N_dCdA / N_dC - (N_dA - N_dCdA) / (m - N_dC).
pub struct RReliefF {
    core: ScorerCore,
    normalize: bool,
}

impl RReliefF {
    pub fn new(config: &ReliefSeqConfig) -> Result<Self> {
        Ok(Self {
            core: ScorerCore::from_config(config)?,
            normalize: config.normalize_scores,
        })
    }
}

impl RelevanceScorer<Dataset> for RReliefF {
    fn set_k(&mut self, k: usize) {
        self.core.k = k;
    }

    fn k(&self) -> usize {
        self.core.k
    }

    fn set_worker_count(&mut self, workers: usize) -> Result<()> {
        self.core.set_workers(workers)
    }

    fn compute_scores(&mut self, data: &Dataset) -> Result<ScoreSet> {
        if !data.has_continuous_phenotype() {
            return Err(SelectionError::scoring("RReliefF requires a continuous phenotype").into());
        }
        if self.core.k == 0 {
            return Err(SelectionError::scoring("RReliefF requires k >= 1").into());
        }

        let samples = self.core.sample_instances(data.instance_count());
        let m = samples.len() as f64;
        let attributes = data.active_attribute_indices();
        log::debug!(
            "RReliefF scoring {} attributes over {} sampled instances, k={}",
            attributes.len(),
            samples.len(),
            self.core.k
        );

        let k = self.core.k;
        let rank_weights = self.core.weight_table(k);
        let weights: Vec<f64> = self.core.pool.install(|| {
            let neighbors = data.neighbors(k);
            let NeighborSets::Continuous { nearest, .. } = neighbors.as_ref() else {
                return Vec::new();
            };

            let n_dc: f64 = samples
                .iter()
                .map(|&r| {
                    let near = &nearest[r];
                    near.iter()
                        .zip(&rank_weights[near.len()])
                        .map(|(&j, &wj)| data.diff_phenotype(r, j) * wj)
                        .sum::<f64>()
                })
                .sum();

            attributes
                .par_iter()
                .map(|&a| {
                    let mut n_da = 0.0;
                    let mut n_dcda = 0.0;
                    for &r in &samples {
                        let near = &nearest[r];
                        for (&j, &wj) in near.iter().zip(&rank_weights[near.len()]) {
                            let d_attr = data.diff(a, r, j);
                            n_da += d_attr * wj;
                            n_dcda += data.diff_phenotype(r, j) * d_attr * wj;
                        }
                    }
                    let agree = if n_dc > 0.0 { n_dcda / n_dc } else { 0.0 };
                    let disagree = if m - n_dc > 0.0 {
                        (n_da - n_dcda) / (m - n_dc)
                    } else {
                        0.0
                    };
                    agree - disagree
                })
                .collect()
        });

        Ok(attributes
            .iter()
            .zip(weights)
            .map(|(&a, w)| ScoredAttribute::new(w, data.attribute_name(a)))
            .collect())
    }

    fn should_normalize(&self) -> bool {
        self.normalize
    }

    fn name(&self) -> &str {
        "RReliefF"
    }
}
