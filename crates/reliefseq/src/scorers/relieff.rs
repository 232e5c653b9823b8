use std::collections::BTreeMap;

use anyhow::Result;
use rayon::prelude::*;

use crate::config::ReliefSeqConfig;
use crate::data_handling::{ClassLevel, Dataset, NeighborSets, Phenotype};
use crate::error::SelectionError;
use crate::scorers::{RelevanceScorer, ScorerCore};
use crate::scores::{ScoreSet, ScoredAttribute};
use crate::universe::AttributeUniverse;

/// ReliefF for discrete outcomes (Kononenko's multi-class extension).
///
/// For each sampled instance R the weight of attribute A drops by its average
/// difference to the k nearest hits and rises by its prior-weighted average
/// difference to the k nearest misses of every other class.
pub struct ReliefF {
    core: ScorerCore,
    normalize: bool,
}

impl ReliefF {
    pub fn new(config: &ReliefSeqConfig) -> Result<Self> {
        Ok(Self {
            core: ScorerCore::from_config(config)?,
            normalize: config.normalize_scores,
        })
    }
}

impl RelevanceScorer<Dataset> for ReliefF {
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
        let Phenotype::Classes(classes) = data.phenotype() else {
            return Err(SelectionError::scoring("ReliefF requires a discrete phenotype").into());
        };
        if self.core.k == 0 {
            return Err(SelectionError::scoring("ReliefF requires k >= 1").into());
        }
        let counts = data.class_counts();
        if counts.len() < 2 {
            return Err(SelectionError::scoring(format!(
                "ReliefF requires at least two classes, found {}",
                counts.len()
            ))
            .into());
        }

        let n = data.instance_count();
        let priors: BTreeMap<ClassLevel, f64> = counts
            .iter()
            .map(|(&level, &count)| (level, count as f64 / n as f64))
            .collect();
        let samples = self.core.sample_instances(n);
        let m = samples.len() as f64;
        let attributes = data.active_attribute_indices();
        log::debug!(
            "ReliefF scoring {} attributes over {} sampled instances, k={}",
            attributes.len(),
            samples.len(),
            self.core.k
        );

        let k = self.core.k;
        let rank_weights = self.core.weight_table(k);
        let weights: Vec<f64> = self.core.pool.install(|| {
            let neighbors = data.neighbors(k);
            let NeighborSets::Classified { hits, misses, .. } = neighbors.as_ref() else {
                return Vec::new();
            };
            attributes
                .par_iter()
                .map(|&a| {
                    let mut w = 0.0;
                    for &r in &samples {
                        let near_hits = &hits[r];
                        let hit_weights = &rank_weights[near_hits.len()];
                        let total: f64 = near_hits
                            .iter()
                            .zip(hit_weights)
                            .map(|(&j, &wj)| wj * data.diff(a, r, j))
                            .sum();
                        w -= total / m;
                        let p_r = priors[&classes[r]];
                        for (level, near_misses) in &misses[r] {
                            if near_misses.is_empty() {
                                continue;
                            }
                            let factor = priors[level] / (1.0 - p_r);
                            let total: f64 = near_misses
                                .iter()
                                .zip(&rank_weights[near_misses.len()])
                                .map(|(&j, &wj)| wj * data.diff(a, r, j))
                                .sum();
                            w += factor * total / m;
                        }
                    }
                    w
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
        "ReliefF"
    }
}
