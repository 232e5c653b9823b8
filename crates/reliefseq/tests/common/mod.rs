#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{bail, Result};
use reliefseq::scorers::RelevanceScorer;
use reliefseq::scores::ScoreSet;
use reliefseq::universe::AttributeUniverse;

/// In-memory attribute universe. The name list is shared so a test can
/// shrink it behind the controller's back.
pub struct MockUniverse {
    pub names: Rc<RefCell<Vec<String>>>,
    pub reject: Option<String>,
    pub resets: usize,
    pub max_k: usize,
}

impl MockUniverse {
    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            names: Rc::new(RefCell::new(names)),
            reject: None,
            resets: 0,
            max_k: 10,
        }
    }

    /// `a000`, `a001`, ...
    pub fn numbered(n: usize) -> Self {
        Self::with_names((0..n).map(|i| format!("a{:03}", i)).collect())
    }
}

impl AttributeUniverse for MockUniverse {
    fn attribute_count(&self) -> usize {
        self.names.borrow().len()
    }

    fn instance_count(&self) -> usize {
        20
    }

    fn attribute_names(&self) -> Vec<String> {
        self.names.borrow().clone()
    }

    fn remove_attribute(&mut self, name: &str) -> Result<()> {
        if self.reject.as_deref() == Some(name) {
            bail!("{} is locked", name);
        }
        let mut names = self.names.borrow_mut();
        match names.iter().position(|n| n == name) {
            Some(idx) => {
                names.remove(idx);
                Ok(())
            }
            None => bail!("unknown attribute {}", name),
        }
    }

    fn reset_neighbor_cache(&mut self) {
        self.resets += 1;
    }

    fn transition_transversion_counts(&self) -> (usize, usize) {
        (0, 0)
    }

    fn max_neighborhood_size(&self) -> usize {
        self.max_k
    }
}

/// Scores each attribute from a lookup table keyed by k, falling back to the
/// number embedded in its name.
pub struct TableScorer {
    pub k: usize,
    pub table: HashMap<usize, HashMap<String, f64>>,
    pub normalize: bool,
    pub empty: bool,
    pub reverse_at: Option<usize>,
    /// Last worker count handed in by the controller; 0 until then.
    pub workers: Rc<Cell<usize>>,
}

impl TableScorer {
    pub fn by_index() -> Self {
        Self {
            k: 10,
            table: HashMap::new(),
            normalize: true,
            empty: false,
            reverse_at: None,
            workers: Rc::new(Cell::new(0)),
        }
    }

    pub fn insert(&mut self, k: usize, name: &str, score: f64) {
        self.table
            .entry(k)
            .or_default()
            .insert(name.to_string(), score);
    }
}

impl RelevanceScorer<MockUniverse> for TableScorer {
    fn set_k(&mut self, k: usize) {
        self.k = k;
    }

    fn k(&self) -> usize {
        self.k
    }

    fn compute_scores(&mut self, data: &MockUniverse) -> Result<ScoreSet> {
        if self.empty {
            return Ok(ScoreSet::new());
        }
        let mut scores = ScoreSet::new();
        for name in data.attribute_names() {
            let score = match self.table.get(&self.k).and_then(|t| t.get(&name)) {
                Some(&s) => s,
                None => name[1..].parse::<f64>().unwrap_or(0.0),
            };
            scores.push(score, name);
        }
        if self.reverse_at == Some(self.k) {
            scores = scores.into_iter().rev().collect();
        }
        Ok(scores)
    }

    fn should_normalize(&self) -> bool {
        self.normalize
    }

    fn set_worker_count(&mut self, workers: usize) -> Result<()> {
        self.workers.set(workers);
        Ok(())
    }

    fn name(&self) -> &str {
        "table"
    }
}
