//! Iterative backward elimination driven by Relief scores.
//!
//! Each round scores the remaining attributes, optionally rescales the scores
//! to [0, 1], writes them out, and removes the lowest-scoring attributes from
//! the data set, until the target attribute count is reached or no attribute
//! can be removed without undershooting it.
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::ReliefSeqConfig;
use crate::error::SelectionError;
use crate::io::ScoreArtifacts;
use crate::preprocessing::normalize_scores;
use crate::scorers::RelevanceScorer;
use crate::scores::{RemovalRecord, ScoreOrder, ScoreSet, ScoredAttribute};
use crate::universe::AttributeUniverse;

/// How many attributes a round removes before clamping to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// A fixed number per round.
    Fixed(usize),
    /// A percentage of the attributes still in play at the start of the round.
    Percent(u32),
}

impl RemovalPolicy {
    pub fn from_config(config: &ReliefSeqConfig) -> Self {
        match config.iter_remove_percent {
            Some(percent) => RemovalPolicy::Percent(percent),
            None => RemovalPolicy::Fixed(config.iter_remove_n),
        }
    }

    /// Unclamped removal count for a round starting with `working` attributes.
    pub fn count_for(&self, working: usize) -> usize {
        match *self {
            RemovalPolicy::Fixed(n) => n,
            RemovalPolicy::Percent(p) => percent_of(p, working),
        }
    }
}

/// floor(percent / 100 * count)
pub fn percent_of(percent: u32, count: usize) -> usize {
    ((percent as f64 / 100.0) * count as f64) as usize
}

/// Session state of one elimination run.
///
/// `working` never increases and never drops below `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationState {
    pub working: usize,
    pub target: usize,
    pub remove_this_iteration: usize,
    /// Kept for reporting only; no control decision reads it.
    pub remove_next_iteration: usize,
    /// 1-based.
    pub iteration: usize,
}

impl EliminationState {
    pub fn new(working: usize, target: usize) -> Self {
        Self {
            working,
            target,
            remove_this_iteration: 0,
            remove_next_iteration: 0,
            iteration: 1,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.working == self.target
    }

    /// Decide how many attributes this round removes.
    ///
    /// Clamps the policy's count so the working count lands no lower than the
    /// target. Returns `None` when fewer than one attribute can be removed.
    pub fn plan_removal(&mut self, policy: RemovalPolicy) -> Option<usize> {
        let mut count = policy.count_for(self.working);
        self.remove_next_iteration = match policy {
            RemovalPolicy::Fixed(_) => 0,
            RemovalPolicy::Percent(p) => percent_of(p, count),
        };
        if count > self.working || self.working - count < self.target {
            count = self.working - self.target;
        }
        self.remove_this_iteration = count;
        if count < 1 {
            None
        } else {
            Some(count)
        }
    }

    /// Account for `removed` attributes and move to the next round.
    pub fn record_removal(&mut self, removed: usize) {
        self.working -= removed.min(self.working - self.target);
        self.iteration += 1;
    }
}

/// Runs backward elimination over a data set with a Relief scorer.
///
/// The controller borrows the data set mutably for its whole lifetime and owns
/// the scorer. Removal is destructive; the `RemovalRecord` is the only log of
/// what was dropped.
pub struct EliminationController<'a, D: AttributeUniverse + ?Sized> {
    universe: &'a mut D,
    scorer: Box<dyn RelevanceScorer<D> + 'a>,
    policy: RemovalPolicy,
    target: usize,
    workers: usize,
    artifacts: Option<ScoreArtifacts>,
    scores: ScoreSet,
    removed: RemovalRecord,
    state: Option<EliminationState>,
}

impl<'a, D: AttributeUniverse + ?Sized> EliminationController<'a, D> {
    /// Create a controller.
    ///
    /// # Arguments
    ///
    /// * `universe` - The data set to reduce; mutated in place.
    /// * `scorer` - The relevance scorer, reused across iterations.
    /// * `config` - Run configuration; `num_target`, `iter_remove_n`,
    ///   `iter_remove_percent` and `num_threads` are read here.
    ///
    /// # Errors
    ///
    /// A `SelectionError::Configuration` when the target exceeds the number of
    /// attributes or the configuration is otherwise invalid.
    pub fn new(
        universe: &'a mut D,
        mut scorer: Box<dyn RelevanceScorer<D> + 'a>,
        config: &ReliefSeqConfig,
    ) -> Result<Self> {
        config.validate()?;
        log::info!("ReliefSeq controller initialization:");
        let initial = universe.attribute_count();

        let mut policy = RemovalPolicy::from_config(config);
        if let RemovalPolicy::Percent(p) = policy {
            log::info!("Iteratively removing {} percent", p);
        }

        let target = if config.num_target == 0 {
            policy = RemovalPolicy::Fixed(0);
            initial
        } else {
            config.num_target
        };
        if target > initial {
            return Err(SelectionError::configuration(format!(
                "num_target ({}) must be less than or equal to the number of attributes in the data set ({})",
                target, initial
            ))
            .into());
        }
        log::info!(
            "ReliefSeq will remove {} attributes on first iteration",
            policy.count_for(initial)
        );
        log::info!("ReliefSeq is removing attributes until best {} remain", target);

        let workers = config.worker_count();
        log::info!("ReliefSeq will use {} threads", workers);
        scorer.set_worker_count(workers)?;

        Ok(Self {
            universe,
            scorer,
            policy,
            target,
            workers,
            artifacts: None,
            scores: ScoreSet::new(),
            removed: RemovalRecord::new(),
            state: None,
        })
    }

    /// Write per-iteration score dumps through `artifacts`.
    pub fn with_artifacts(mut self, artifacts: ScoreArtifacts) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Run elimination until the target count is reached or no more
    /// attributes can be removed. Both endings are success.
    pub fn compute_scores(&mut self) -> Result<()> {
        let working = self.universe.attribute_count();
        if working < self.target {
            return Err(SelectionError::configuration(format!(
                "The number of attributes in the data set {} is less than the number of target attributes {}",
                working, self.target
            ))
            .into());
        }

        let mut state = EliminationState::new(working, self.target);
        while state.working >= state.target {
            let (transitions, transversions) = self.universe.transition_transversion_counts();
            let titv_ratio = if transversions > 0 {
                transitions as f64 / transversions as f64
            } else {
                transitions as f64
            };
            log::info!("-----------------------------------------------------------------------------");
            log::info!(
                "ReliefSeq algorithm...iteration: {}, working attributes: {}, target attributes: {}",
                state.iteration,
                state.working,
                state.target
            );
            log::info!(
                "Ti/Tv: transitions: {} transversions: {} ratio: {}",
                transitions,
                transversions,
                titv_ratio
            );

            log::info!("Running {}", self.scorer.name());
            let scoring_timer = Instant::now();
            self.scores = self
                .run_scoring_pass()
                .with_context(|| format!("{} failed at iteration {}", self.scorer.name(), state.iteration))?;
            log::info!(
                "{} finished in {:.2} secs",
                self.scorer.name(),
                scoring_timer.elapsed().as_secs_f64()
            );

            if state.is_converged() {
                self.scores.sort_by_order(ScoreOrder::DescendingScore);
                log::info!("ReliefSeq ran for {} iterations", state.iteration);
                self.state = Some(state);
                return Ok(());
            }

            if let Some(artifacts) = &self.artifacts {
                artifacts.write_iteration_scores(state.iteration, &self.scores)?;
            }

            let Some(count) = state.plan_removal(self.policy) else {
                log::info!(
                    "No attributes left to remove at iteration {}; stopping with {} attributes",
                    state.iteration,
                    state.working
                );
                break;
            };
            log::debug!(
                "Removal plan: this iteration {}, next iteration {}",
                state.remove_this_iteration,
                state.remove_next_iteration
            );

            log::info!("Removing the worst {} attributes", count);
            let removal_timer = Instant::now();
            let removed = self.remove_worst_attributes(count, state.iteration)?;
            state.record_removal(removed);
            log::info!(
                "Attribute removal complete in {:.2} secs",
                removal_timer.elapsed().as_secs_f64()
            );
        }

        log::info!("ReliefSeq ran for {} iterations", state.iteration);
        self.state = Some(state);
        Ok(())
    }

    /// One scorer pass without rescaling. An empty result is a scoring failure.
    pub fn compute_raw_scores(&mut self) -> Result<ScoreSet> {
        let scores = self.scorer.compute_scores(self.universe)?;
        if scores.is_empty() {
            return Err(SelectionError::scoring(format!("{}: no scores computed", self.scorer.name())).into());
        }
        Ok(scores)
    }

    /// One scorer pass, rescaled to [0, 1] when the scorer allows it.
    pub fn run_scoring_pass(&mut self) -> Result<ScoreSet> {
        let mut scores = self.compute_raw_scores()?;
        normalize_scores(&mut scores, self.scorer.should_normalize());
        Ok(scores)
    }

    /// Remove the `count` lowest-scoring attributes of the current score set,
    /// worst first. Returns how many were removed.
    fn remove_worst_attributes(&mut self, count: usize, iteration: usize) -> Result<usize> {
        self.scores.sort_by_order(ScoreOrder::AscendingScore);
        let worst: Vec<ScoredAttribute> = self.scores.iter().take(count).cloned().collect();
        for attribute in &worst {
            log::trace!("Removing: {} ({})", attribute.name, attribute.score);
            self.universe.remove_attribute(&attribute.name).map_err(|e| {
                SelectionError::mutation(format!(
                    "Could not remove worst attribute {}: {:#}",
                    attribute.name, e
                ))
            })?;
            self.removed.push(iteration, attribute);
        }
        Ok(worst.len())
    }

    /// Write the current score set as the run's final score file.
    pub fn write_attribute_scores(&self, artifacts: &ScoreArtifacts) -> Result<PathBuf> {
        artifacts.write_final_scores(&self.scores)
    }

    pub fn set_k(&mut self, k: usize) {
        self.scorer.set_k(k);
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn scores(&self) -> &ScoreSet {
        &self.scores
    }

    pub fn removed(&self) -> &RemovalRecord {
        &self.removed
    }

    /// Final state of the last `compute_scores` run.
    pub fn state(&self) -> Option<&EliminationState> {
        self.state.as_ref()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn policy(&self) -> RemovalPolicy {
        self.policy
    }

    /// Advisory worker count derived from the configuration and handed to the scorer.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    pub fn universe(&self) -> &D {
        self.universe
    }

    pub(crate) fn universe_mut(&mut self) -> &mut D {
        self.universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_clamps_to_target() {
        let mut state = EliminationState::new(20, 10);
        assert_eq!(state.plan_removal(RemovalPolicy::Fixed(20)), Some(10));
        state.record_removal(10);
        assert!(state.is_converged());
        assert_eq!(state.iteration, 2);
    }

    #[test]
    fn test_plan_stops_below_one() {
        let mut state = EliminationState::new(5, 0);
        assert_eq!(state.plan_removal(RemovalPolicy::Percent(10)), None);
        assert_eq!(state.remove_this_iteration, 0);
    }

    #[test]
    fn test_percent_uses_current_count() {
        let mut state = EliminationState::new(50, 1);
        assert_eq!(state.plan_removal(RemovalPolicy::Percent(20)), Some(10));
        assert_eq!(state.remove_next_iteration, 2);
        state.record_removal(10);
        assert_eq!(state.plan_removal(RemovalPolicy::Percent(20)), Some(8));
    }
}
