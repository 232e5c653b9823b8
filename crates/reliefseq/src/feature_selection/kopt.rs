//! Neighborhood size optimization.
//!
//! Scores the full attribute set once for each k in `begin..=end` (by `step`)
//! and keeps, per attribute, the highest score seen together with the k that
//! produced it.
use anyhow::Result;

use crate::config::ReliefSeqConfig;
use crate::error::SelectionError;
use crate::feature_selection::elimination::EliminationController;
use crate::io::ScoreArtifacts;
use crate::scores::{BestKTable, ScoreOrder, ScoreSet};
use crate::universe::AttributeUniverse;

/// The k values tried by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KoptRange {
    pub begin: usize,
    pub end: usize,
    pub step: usize,
}

impl KoptRange {
    pub fn new(begin: usize, end: usize, step: usize) -> Self {
        Self { begin, end, step }
    }

    pub fn from_config(config: &ReliefSeqConfig) -> Self {
        Self::new(config.kopt_begin, config.kopt_end, config.kopt_step)
    }

    /// Check the range against the largest neighborhood the data set supports.
    pub fn validate(&self, max_k: usize) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(SelectionError::configuration(msg).into()) };
        if self.begin < 1 {
            return fail(format!("k optimization begin must be at least 1, got {}", self.begin));
        }
        if self.step < 1 {
            return fail("k optimization step must be at least 1".to_string());
        }
        if self.begin > self.end {
            return fail(format!(
                "k optimization begin ({}) is greater than end ({})",
                self.begin, self.end
            ));
        }
        if self.end > max_k {
            return fail(format!(
                "k optimization end ({}) exceeds the largest neighborhood size the data supports ({})",
                self.end, max_k
            ));
        }
        if self.begin + self.step > self.end {
            return fail(format!(
                "k optimization range {}..={} with step {} tries fewer than two values",
                self.begin, self.end, self.step
            ));
        }
        Ok(())
    }

    pub fn values(&self) -> Vec<usize> {
        (self.begin..=self.end).step_by(self.step.max(1)).collect()
    }
}

/// Outcome of a k sweep.
#[derive(Debug, Clone)]
pub struct KoptResult {
    /// Best score per attribute, best first.
    pub scores: ScoreSet,
    /// Attribute name to the k that produced its best score.
    pub best_k: BestKTable,
    /// The k values tried, in order, each with its raw score set in name order.
    pub per_k: Vec<(usize, ScoreSet)>,
}

impl KoptResult {
    pub fn k_values(&self) -> Vec<usize> {
        self.per_k.iter().map(|(k, _)| *k).collect()
    }
}

/// Runs the k sweep through an `EliminationController`, reusing its scorer
/// and data set. No attribute is removed.
#[derive(Debug, Clone)]
pub struct KOptimizationDriver {
    range: KoptRange,
    write_each_k_scores: bool,
    write_best_k: bool,
    artifacts: Option<ScoreArtifacts>,
}

impl KOptimizationDriver {
    pub fn new(range: KoptRange) -> Self {
        Self {
            range,
            write_each_k_scores: false,
            write_best_k: false,
            artifacts: None,
        }
    }

    pub fn from_config(config: &ReliefSeqConfig) -> Self {
        Self {
            range: KoptRange::from_config(config),
            write_each_k_scores: config.write_each_k_scores,
            write_best_k: config.write_best_k,
            artifacts: None,
        }
    }

    /// Files requested by the write flags go through `artifacts`.
    pub fn with_artifacts(mut self, artifacts: ScoreArtifacts) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn range(&self) -> KoptRange {
        self.range
    }

    /// Sweep k over the configured range.
    ///
    /// # Arguments
    ///
    /// * `controller` - Supplies the scorer and the data set. The scorer's k
    ///   is left at the last value tried.
    ///
    /// # Returns
    ///
    /// The per-attribute best raw scores sorted best first, the best-k table
    /// and every pass. Each pass is put in name order before the passes are
    /// compared; scores are not rescaled. When several k tie for an attribute
    /// the smallest wins.
    pub fn run<D: AttributeUniverse + ?Sized>(
        &self,
        controller: &mut EliminationController<'_, D>,
    ) -> Result<KoptResult> {
        self.range.validate(controller.universe().max_neighborhood_size())?;

        let mut per_k: Vec<(usize, ScoreSet)> = Vec::new();
        for k in self.range.values() {
            log::info!("Optimizing k: {}", k);
            controller.universe_mut().reset_neighbor_cache();
            controller.set_k(k);
            let mut scores = controller.compute_raw_scores()?;
            scores.sort_by_order(ScoreOrder::AscendingName);

            if let Some((_, first)) = per_k.first() {
                ensure_aligned(first, &scores, k)?;
            }
            if self.write_each_k_scores {
                if let Some(artifacts) = &self.artifacts {
                    artifacts.write_k_scores(k, &scores)?;
                }
            }
            per_k.push((k, scores));
        }

        let (mut scores, best_k) = select_best(&per_k)?;
        scores.sort_by_order(ScoreOrder::DescendingScore);
        if self.write_best_k {
            if let Some(artifacts) = &self.artifacts {
                artifacts.write_best_k(&best_k)?;
            }
        }
        log::info!("k optimization finished over {} values of k", per_k.len());
        Ok(KoptResult {
            scores,
            best_k,
            per_k,
        })
    }
}

fn ensure_aligned(first: &ScoreSet, other: &ScoreSet, k: usize) -> Result<()> {
    let same = first.len() == other.len()
        && first.iter().zip(other.iter()).all(|(a, b)| a.name == b.name);
    if same {
        Ok(())
    } else {
        Err(SelectionError::scoring(format!(
            "Scores for k={} cover different attributes than the first pass",
            k
        ))
        .into())
    }
}

/// Per attribute, the highest score across passes and its k. Earlier passes
/// win ties.
fn select_best(per_k: &[(usize, ScoreSet)]) -> Result<(ScoreSet, BestKTable)> {
    let Some((first_k, first)) = per_k.first() else {
        return Err(SelectionError::scoring("k optimization produced no score passes").into());
    };
    let mut best = ScoreSet::with_capacity(first.len());
    let mut best_k = BestKTable::new();
    for (idx, attribute) in first.iter().enumerate() {
        let mut top_score = attribute.score;
        let mut top_k = *first_k;
        for (k, scores) in &per_k[1..] {
            let score = scores.as_slice()[idx].score;
            if score > top_score {
                top_score = score;
                top_k = *k;
            }
        }
        best.push(top_score, attribute.name.clone());
        best_k.insert(attribute.name.clone(), top_k);
    }
    Ok((best, best_k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(f64, &str)]) -> ScoreSet {
        pairs.iter().map(|&(s, n)| crate::scores::ScoredAttribute::new(s, n)).collect()
    }

    #[test]
    fn test_range_values() {
        assert_eq!(KoptRange::new(1, 5, 2).values(), vec![1, 3, 5]);
        assert_eq!(KoptRange::new(2, 7, 2).values(), vec![2, 4, 6]);
    }

    #[test]
    fn test_range_validation() {
        assert!(KoptRange::new(1, 5, 2).validate(10).is_ok());
        assert!(KoptRange::new(0, 5, 1).validate(10).is_err());
        assert!(KoptRange::new(6, 5, 1).validate(10).is_err());
        assert!(KoptRange::new(1, 11, 1).validate(10).is_err());
        assert!(KoptRange::new(1, 5, 0).validate(10).is_err());
        assert!(KoptRange::new(1, 5, 5).validate(10).is_err());
    }

    #[test]
    fn test_select_best_prefers_smallest_k_on_ties() {
        let per_k = vec![
            (1, set(&[(0.2, "A"), (0.5, "B")])),
            (3, set(&[(0.9, "A"), (0.5, "B")])),
        ];
        let (best, best_k) = select_best(&per_k).unwrap();
        assert_eq!(best.get("A"), Some(0.9));
        assert_eq!(best_k["A"], 3);
        assert_eq!(best_k["B"], 1);
    }
}
