use anyhow::Result;
use rayon::prelude::*;

use crate::config::{ReliefSeqConfig, SeqAlgorithmMode, SnrMode, TstatMode};
use crate::data_handling::{Dataset, NeighborSets};
use crate::error::SelectionError;
use crate::scorers::{RelevanceScorer, ScorerCore};
use crate::scores::{ScoreSet, ScoredAttribute};
use crate::stats::{mean_and_variance, moderated_t_statistic, signal_to_noise, students_t_cdf};
use crate::universe::AttributeUniverse;

/// Relief variant for two-class sequencing count data.
///
/// Instead of summing hit and miss differences into one weight, ReliefSeq
/// collects, per attribute, each instance's mean difference to its nearest
/// misses and to its nearest hits, then compares the two distributions with
/// a signal-to-noise ratio or a moderated t statistic. The output is on the
/// statistic's own scale and is never rescaled.
pub struct ReliefSeq {
    core: ScorerCore,
    mode: SeqAlgorithmMode,
    snr_mode: SnrMode,
    tstat_mode: TstatMode,
    s0: f64,
}

impl ReliefSeq {
    pub fn new(config: &ReliefSeqConfig) -> Result<Self> {
        Ok(Self {
            core: ScorerCore::from_config(config)?,
            mode: config.seq_algorithm_mode,
            snr_mode: config.seq_snr_mode,
            tstat_mode: config.seq_tstat_mode,
            s0: config.seq_algorithm_s0,
        })
    }

    fn statistic(&self, misses: &[f64], hits: &[f64]) -> f64 {
        match self.mode {
            SeqAlgorithmMode::Snr => match self.snr_mode {
                SnrMode::Snr => signal_to_noise(misses, hits),
                SnrMode::ReliefF => mean_and_variance(misses).0 - mean_and_variance(hits).0,
            },
            SeqAlgorithmMode::Tstat => {
                let (t, df) = moderated_t_statistic(misses, hits, self.s0);
                match self.tstat_mode {
                    TstatMode::Pval => students_t_cdf(t, df),
                    TstatMode::Abst => t.abs(),
                    TstatMode::Rawt => t,
                }
            }
        }
    }
}

impl RelevanceScorer<Dataset> for ReliefSeq {
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
        if data.has_continuous_phenotype() {
            return Err(SelectionError::scoring("ReliefSeq requires a two-class phenotype").into());
        }
        let n_classes = data.class_counts().len();
        if n_classes != 2 {
            return Err(SelectionError::scoring(format!(
                "ReliefSeq requires exactly two classes, found {}",
                n_classes
            ))
            .into());
        }
        if self.core.k == 0 {
            return Err(SelectionError::scoring("ReliefSeq requires k >= 1").into());
        }

        let samples = self.core.sample_instances(data.instance_count());
        let attributes = data.active_attribute_indices();
        log::debug!(
            "ReliefSeq ({} / {}) scoring {} attributes over {} sampled instances, k={}",
            self.mode,
            match self.mode {
                SeqAlgorithmMode::Snr => self.snr_mode.as_str(),
                SeqAlgorithmMode::Tstat => self.tstat_mode.as_str(),
            },
            attributes.len(),
            samples.len(),
            self.core.k
        );

        let k = self.core.k;
        let this = &*self;
        let weights: Vec<f64> = this.core.pool.install(|| {
            let neighbors = data.neighbors(k);
            let NeighborSets::Classified { hits, misses, .. } = neighbors.as_ref() else {
                return Vec::new();
            };
            attributes
                .par_iter()
                .map(|&a| {
                    let mut hit_diffs = Vec::with_capacity(samples.len());
                    let mut miss_diffs = Vec::with_capacity(samples.len());
                    for &r in &samples {
                        let near_hits = &hits[r];
                        if !near_hits.is_empty() {
                            let total: f64 = near_hits.iter().map(|&j| data.diff(a, r, j)).sum();
                            hit_diffs.push(total / near_hits.len() as f64);
                        }
                        // two classes: a single miss bucket
                        if let Some(near_misses) = misses[r].values().next() {
                            if !near_misses.is_empty() {
                                let total: f64 =
                                    near_misses.iter().map(|&j| data.diff(a, r, j)).sum();
                                miss_diffs.push(total / near_misses.len() as f64);
                            }
                        }
                    }
                    this.statistic(&miss_diffs, &hit_diffs)
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
        false
    }

    fn name(&self) -> &str {
        "ReliefSeq"
    }
}
