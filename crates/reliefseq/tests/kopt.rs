mod common;

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use common::{MockUniverse, TableScorer};
use reliefseq::config::ReliefSeqConfig;
use reliefseq::error::SelectionError;
use reliefseq::feature_selection::{EliminationController, KOptimizationDriver, KoptRange};
use reliefseq::io::ScoreArtifacts;
use reliefseq::scorers::RelevanceScorer;
use reliefseq::scores::ScoreSet;
use reliefseq::universe::AttributeUniverse;

fn three_attribute_scorer() -> TableScorer {
    let mut scorer = TableScorer::by_index();
    for (k, a, b, c) in [(1, 0.1, 0.9, 0.4), (3, 0.5, 0.2, 0.4), (5, 0.3, 0.9, 0.4)] {
        scorer.insert(k, "A", a);
        scorer.insert(k, "B", b);
        scorer.insert(k, "C", c);
    }
    scorer
}

fn abc() -> MockUniverse {
    MockUniverse::with_names(vec!["A".to_string(), "B".to_string(), "C".to_string()])
}

fn cfg() -> ReliefSeqConfig {
    ReliefSeqConfig {
        k: 0,
        kopt_begin: 1,
        kopt_end: 5,
        kopt_step: 2,
        num_threads: Some(1),
        ..ReliefSeqConfig::default()
    }
}

#[test]
fn test_best_score_and_k_per_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ScoreArtifacts::new(dir.path(), "kopt");
    let config = ReliefSeqConfig {
        write_best_k: true,
        write_each_k_scores: true,
        ..cfg()
    };

    let mut universe = abc();
    let result = {
        let mut controller =
            EliminationController::new(&mut universe, Box::new(three_attribute_scorer()), &config)
                .unwrap();
        KOptimizationDriver::from_config(&config)
            .with_artifacts(artifacts.clone())
            .run(&mut controller)
            .unwrap()
    };

    assert_eq!(result.k_values(), vec![1, 3, 5]);
    // best first: B 0.9, A 0.5, C 0.4
    assert_eq!(result.scores.names(), vec!["B", "A", "C"]);
    assert_eq!(result.scores.get("A"), Some(0.5));
    assert_eq!(result.scores.get("B"), Some(0.9));
    assert_eq!(result.scores.get("C"), Some(0.4));
    assert_eq!(result.best_k["A"], 3);
    // B ties between k=1 and k=5; C ties everywhere
    assert_eq!(result.best_k["B"], 1);
    assert_eq!(result.best_k["C"], 1);

    // every pass starts from a fresh neighbor cache and nothing is removed
    assert_eq!(universe.resets, 3);
    assert_eq!(universe.attribute_count(), 3);

    for k in [1, 3, 5] {
        assert!(artifacts.k_scores_path(k).exists());
    }
    let best_k = fs::read_to_string(artifacts.best_k_path()).unwrap();
    assert_eq!(best_k, "A\t3\nB\t1\nC\t1\n");
}

#[test]
fn test_no_files_without_write_flags() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ScoreArtifacts::new(dir.path(), "kopt");
    let config = cfg();
    let mut universe = abc();
    let mut controller =
        EliminationController::new(&mut universe, Box::new(three_attribute_scorer()), &config)
            .unwrap();
    KOptimizationDriver::from_config(&config)
        .with_artifacts(artifacts.clone())
        .run(&mut controller)
        .unwrap();
    assert!(!artifacts.best_k_path().exists());
    assert!(!artifacts.k_scores_path(1).exists());
}

#[test]
fn test_passes_in_different_attribute_order_are_matched_by_name() {
    let config = cfg();
    let mut scorer = three_attribute_scorer();
    // the k=3 pass comes back as C, B, A
    scorer.reverse_at = Some(3);
    let mut universe = abc();
    let mut controller = EliminationController::new(&mut universe, Box::new(scorer), &config).unwrap();
    let result = KOptimizationDriver::from_config(&config)
        .run(&mut controller)
        .unwrap();

    assert_eq!(result.best_k["A"], 3);
    assert_eq!(result.best_k["B"], 1);
    assert_eq!(result.scores.get("A"), Some(0.5));
    assert_eq!(result.scores.get("B"), Some(0.9));
    for (_, pass) in &result.per_k {
        assert_eq!(pass.names(), vec!["A", "B", "C"]);
    }
}

#[test]
fn test_pass_missing_an_attribute_is_a_scoring_failure() {
    let config = cfg();
    let mut universe = abc();
    let names = universe.names.clone();
    let scorer = ShrinkingScorer {
        inner: three_attribute_scorer(),
        names,
    };
    let mut controller = EliminationController::new(&mut universe, Box::new(scorer), &config).unwrap();
    let err = KOptimizationDriver::from_config(&config)
        .run(&mut controller)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Scoring(_))
    ));
}

/// Drops the last attribute from the data set after its first pass.
struct ShrinkingScorer {
    inner: TableScorer,
    names: Rc<RefCell<Vec<String>>>,
}

impl RelevanceScorer<MockUniverse> for ShrinkingScorer {
    fn set_k(&mut self, k: usize) {
        self.inner.set_k(k);
    }

    fn k(&self) -> usize {
        self.inner.k()
    }

    fn compute_scores(&mut self, data: &MockUniverse) -> anyhow::Result<ScoreSet> {
        let scores = self.inner.compute_scores(data)?;
        self.names.borrow_mut().pop();
        Ok(scores)
    }

    fn should_normalize(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "shrinking"
    }
}

#[test]
fn test_range_beyond_neighborhood_is_rejected() {
    let config = cfg();
    let mut universe = abc();
    universe.max_k = 4;
    let mut controller =
        EliminationController::new(&mut universe, Box::new(three_attribute_scorer()), &config)
            .unwrap();
    let err = KOptimizationDriver::from_config(&config)
        .run(&mut controller)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Configuration(_))
    ));
}

#[test]
fn test_single_value_range_is_rejected() {
    let config = cfg();
    let mut universe = abc();
    let mut controller =
        EliminationController::new(&mut universe, Box::new(three_attribute_scorer()), &config)
            .unwrap();
    let err = KOptimizationDriver::new(KoptRange::new(2, 3, 2))
        .run(&mut controller)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Configuration(_))
    ));
}
