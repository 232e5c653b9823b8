//! Score bookkeeping shared by the controller, the k-optimization driver and the scorers.
//!
//! A `ScoreSet` is one complete scoring pass over the attributes that remain in
//! the data set. The ordering of a set is never implied: every sort names the
//! `ScoreOrder` it wants, because sorting by score where name order was meant
//! silently misaligns the per-k score vectors.
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One attribute's relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAttribute {
    pub score: f64,
    pub name: String,
}

impl ScoredAttribute {
    pub fn new(score: f64, name: impl Into<String>) -> Self {
        Self {
            score,
            name: name.into(),
        }
    }
}

/// Orderings used across the crate. Sorts are stable, so equal keys keep
/// their incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    /// Worst first; used to pick the attributes to remove.
    AscendingScore,
    /// Best first; used for reporting.
    DescendingScore,
    /// Aligns score vectors produced at different k values.
    AscendingName,
}

impl ScoreOrder {
    pub fn compare(&self, a: &ScoredAttribute, b: &ScoredAttribute) -> Ordering {
        match self {
            ScoreOrder::AscendingScore => a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal),
            ScoreOrder::DescendingScore => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
            ScoreOrder::AscendingName => a.name.cmp(&b.name),
        }
    }
}

/// Scores from one full pass, in whatever order the last caller left them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet {
    entries: Vec<ScoredAttribute>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, score: f64, name: impl Into<String>) {
        self.entries.push(ScoredAttribute::new(score, name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredAttribute> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ScoredAttribute> {
        self.entries.iter_mut()
    }

    pub fn as_slice(&self) -> &[ScoredAttribute] {
        &self.entries
    }

    pub fn sort_by_order(&mut self, order: ScoreOrder) {
        self.entries.sort_by(|a, b| order.compare(a, b));
    }

    /// Smallest and largest score, or `None` for an empty set.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let first = self.entries.first()?.score;
        Some(self.entries.iter().fold((first, first), |(lo, hi), s| {
            (lo.min(s.score), hi.max(s.score))
        }))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|s| s.score).collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|s| s.name == name).map(|s| s.score)
    }
}

impl FromIterator<ScoredAttribute> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = ScoredAttribute>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ScoreSet {
    type Item = ScoredAttribute;
    type IntoIter = std::vec::IntoIter<ScoredAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScoreSet {
    type Item = &'a ScoredAttribute;
    type IntoIter = std::slice::Iter<'a, ScoredAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// An attribute dropped by the elimination loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedAttribute {
    pub iteration: usize,
    pub score: f64,
    pub name: String,
}

/// Append-only log of removed attributes, in removal order.
#[derive(Debug, Clone, Default)]
pub struct RemovalRecord {
    entries: Vec<RemovedAttribute>,
}

impl RemovalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, iteration: usize, scored: &ScoredAttribute) {
        self.entries.push(RemovedAttribute {
            iteration,
            score: scored.score,
            name: scored.name.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RemovedAttribute> {
        self.entries.iter()
    }

    /// Number of attributes removed in each iteration, in iteration order.
    pub fn counts_per_iteration(&self) -> Vec<(usize, usize)> {
        let mut counts: Vec<(usize, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.last_mut() {
                Some((iteration, count)) if *iteration == entry.iteration => *count += 1,
                _ => counts.push((entry.iteration, 1)),
            }
        }
        counts
    }
}

/// Attribute name to the neighborhood size that maximized its score.
pub type BestKTable = BTreeMap<String, usize>;
