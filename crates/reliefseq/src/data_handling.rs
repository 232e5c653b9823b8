//! In-memory data set used by the Relief scorers.
//!
//! `Dataset` keeps every loaded attribute and masks removed ones out, the way
//! the elimination loop expects: removal is a cheap flag flip, and scorers only
//! ever walk `active_attribute_indices()`. Nearest-neighbor sets are computed
//! lazily for a given k and cached until the attribute set or k changes.
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, bail, Result};
use ndarray::Array2;
use rayon::prelude::*;

use crate::config::{NumericMetric, SnpMetric};
use crate::universe::AttributeUniverse;

pub type ClassLevel = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Genotype coded 0/1/2.
    Discrete,
    Numeric,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phenotype {
    Classes(Vec<ClassLevel>),
    Continuous(Vec<f64>),
}

impl Phenotype {
    pub fn len(&self) -> usize {
        match self {
            Phenotype::Classes(v) => v.len(),
            Phenotype::Continuous(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Nearest neighbors of every instance for one neighborhood size.
#[derive(Debug, Clone)]
pub enum NeighborSets {
    /// Per instance: the k nearest instances of the same class, and the k
    /// nearest instances of every other class.
    Classified {
        k: usize,
        hits: Vec<Vec<usize>>,
        misses: Vec<BTreeMap<ClassLevel, Vec<usize>>>,
    },
    /// Per instance: the k nearest instances regardless of outcome.
    Continuous { k: usize, nearest: Vec<Vec<usize>> },
}

impl NeighborSets {
    pub fn k(&self) -> usize {
        match self {
            NeighborSets::Classified { k, .. } => *k,
            NeighborSets::Continuous { k, .. } => *k,
        }
    }
}

#[derive(Debug)]
pub struct Dataset {
    instance_ids: Vec<String>,
    attribute_names: Vec<String>,
    name_index: HashMap<String, usize>,
    kinds: Vec<AttributeKind>,
    ranges: Vec<f64>,
    values: Array2<f64>,
    active: Vec<bool>,
    phenotype: Phenotype,
    phenotype_range: f64,
    alleles: Vec<Option<(char, char)>>,
    snp_metric: SnpMetric,
    numeric_metric: NumericMetric,
    neighbor_cache: RwLock<Option<Arc<NeighborSets>>>,
}

impl Dataset {
    /// Build a data set from a value matrix of shape (instances, attributes).
    ///
    /// Attribute kinds are inferred: a column holding only 0, 1 and 2 is a
    /// discrete genotype, anything else is numeric.
    pub fn new(
        instance_ids: Vec<String>,
        attribute_names: Vec<String>,
        values: Array2<f64>,
        phenotype: Phenotype,
    ) -> Result<Self> {
        let (n_instances, n_attributes) = values.dim();
        if instance_ids.len() != n_instances {
            bail!(
                "{} instance ids given for {} rows of values",
                instance_ids.len(),
                n_instances
            );
        }
        if attribute_names.len() != n_attributes {
            bail!(
                "{} attribute names given for {} columns of values",
                attribute_names.len(),
                n_attributes
            );
        }
        if phenotype.len() != n_instances {
            bail!(
                "{} phenotypes given for {} instances",
                phenotype.len(),
                n_instances
            );
        }
        if n_instances < 2 {
            bail!("At least two instances are required, got {}", n_instances);
        }
        if let Phenotype::Continuous(y) = &phenotype {
            if y.iter().any(|v| !v.is_finite()) {
                bail!("Continuous phenotypes must be finite");
            }
        }

        let mut name_index = HashMap::with_capacity(n_attributes);
        for (idx, name) in attribute_names.iter().enumerate() {
            if name_index.insert(name.clone(), idx).is_some() {
                bail!("Duplicate attribute name: {}", name);
            }
        }

        let kinds: Vec<AttributeKind> = values
            .columns()
            .into_iter()
            .map(|col| {
                if col.iter().all(|&v| v == 0.0 || v == 1.0 || v == 2.0) {
                    AttributeKind::Discrete
                } else {
                    AttributeKind::Numeric
                }
            })
            .collect();
        let ranges = values.columns().into_iter().map(|col| value_range(col.iter())).collect();

        let phenotype_range = match &phenotype {
            Phenotype::Continuous(y) => value_range(y.iter()),
            Phenotype::Classes(_) => 0.0,
        };

        Ok(Dataset {
            instance_ids,
            attribute_names,
            name_index,
            kinds,
            ranges,
            values,
            active: vec![true; n_attributes],
            phenotype,
            phenotype_range,
            alleles: vec![None; n_attributes],
            snp_metric: SnpMetric::GenotypeMismatch,
            numeric_metric: NumericMetric::Manhattan,
            neighbor_cache: RwLock::new(None),
        })
    }

    /// Attach allele annotations (used only for the Ti/Tv diagnostic).
    /// Names not in the data set are ignored.
    pub fn with_alleles(mut self, alleles: &HashMap<String, (char, char)>) -> Self {
        for (name, pair) in alleles {
            if let Some(&idx) = self.name_index.get(name) {
                self.alleles[idx] = Some((pair.0.to_ascii_uppercase(), pair.1.to_ascii_uppercase()));
            }
        }
        self
    }

    pub fn set_metrics(&mut self, snp_metric: SnpMetric, numeric_metric: NumericMetric) {
        self.snp_metric = snp_metric;
        self.numeric_metric = numeric_metric;
        self.reset_neighbor_cache();
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} instances, {} attributes ({} discrete, {} numeric)",
            self.instance_ids.len(),
            self.attribute_names.len(),
            self.kinds.iter().filter(|&&k| k == AttributeKind::Discrete).count(),
            self.kinds.iter().filter(|&&k| k == AttributeKind::Numeric).count()
        );
        match &self.phenotype {
            Phenotype::Classes(_) => {
                for (level, count) in self.class_counts() {
                    log::info!("Class {}: {} instances", level, count);
                }
            }
            Phenotype::Continuous(_) => {
                log::info!("Continuous phenotype, range {}", self.phenotype_range)
            }
        }
        log::info!("-------------------------------");
    }

    pub fn instance_ids(&self) -> &[String] {
        &self.instance_ids
    }

    pub fn phenotype(&self) -> &Phenotype {
        &self.phenotype
    }

    pub fn has_continuous_phenotype(&self) -> bool {
        matches!(self.phenotype, Phenotype::Continuous(_))
    }

    /// Class of instance `i`, or `None` for continuous phenotypes.
    pub fn class_of(&self, i: usize) -> Option<ClassLevel> {
        match &self.phenotype {
            Phenotype::Classes(c) => Some(c[i]),
            Phenotype::Continuous(_) => None,
        }
    }

    pub fn class_counts(&self) -> BTreeMap<ClassLevel, usize> {
        let mut counts = BTreeMap::new();
        if let Phenotype::Classes(classes) = &self.phenotype {
            for &c in classes {
                *counts.entry(c).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Column indices of the attributes still under consideration.
    pub fn active_attribute_indices(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(idx, &on)| if on { Some(idx) } else { None })
            .collect()
    }

    pub fn attribute_name(&self, attribute: usize) -> &str {
        &self.attribute_names[attribute]
    }

    pub fn attribute_kind(&self, attribute: usize) -> AttributeKind {
        self.kinds[attribute]
    }

    pub fn value(&self, instance: usize, attribute: usize) -> f64 {
        self.values[(instance, attribute)]
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Difference of one attribute between two instances, in [0, 1].
    pub fn diff(&self, attribute: usize, i: usize, j: usize) -> f64 {
        let a = self.values[(i, attribute)];
        let b = self.values[(j, attribute)];
        match self.kinds[attribute] {
            AttributeKind::Discrete => match self.snp_metric {
                SnpMetric::GenotypeMismatch => {
                    if a == b {
                        0.0
                    } else {
                        1.0
                    }
                }
                SnpMetric::AlleleMismatch => (a - b).abs() / 2.0,
            },
            AttributeKind::Numeric => {
                let range = self.ranges[attribute];
                if range > 0.0 {
                    (a - b).abs() / range
                } else {
                    0.0
                }
            }
        }
    }

    /// Range-scaled outcome difference for continuous phenotypes; class
    /// mismatch (0 or 1) otherwise.
    pub fn diff_phenotype(&self, i: usize, j: usize) -> f64 {
        match &self.phenotype {
            Phenotype::Continuous(y) => {
                if self.phenotype_range > 0.0 {
                    (y[i] - y[j]).abs() / self.phenotype_range
                } else {
                    0.0
                }
            }
            Phenotype::Classes(c) => {
                if c[i] == c[j] {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Distance between two instances over the active attributes.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let mut discrete = 0.0;
        let mut numeric = 0.0;
        for (attribute, &on) in self.active.iter().enumerate() {
            if !on {
                continue;
            }
            let d = self.diff(attribute, i, j);
            match self.kinds[attribute] {
                AttributeKind::Discrete => discrete += d,
                AttributeKind::Numeric => match self.numeric_metric {
                    NumericMetric::Manhattan => numeric += d,
                    NumericMetric::Euclidean => numeric += d * d,
                },
            }
        }
        match self.numeric_metric {
            NumericMetric::Manhattan => discrete + numeric,
            NumericMetric::Euclidean => discrete + numeric.sqrt(),
        }
    }

    /// Neighbor sets for neighborhood size `k`, computed on first use.
    ///
    /// A cached set computed for a different k is replaced. Requests for more
    /// neighbors than a class holds return every instance of that class.
    pub fn neighbors(&self, k: usize) -> Arc<NeighborSets> {
        if let Ok(guard) = self.neighbor_cache.read() {
            if let Some(cached) = guard.as_ref() {
                if cached.k() == k {
                    return Arc::clone(cached);
                }
            }
        }

        log::debug!("Computing nearest neighbors for k={}", k);
        let computed = Arc::new(self.compute_neighbors(k));
        if let Ok(mut guard) = self.neighbor_cache.write() {
            *guard = Some(Arc::clone(&computed));
        }
        computed
    }

    fn compute_neighbors(&self, k: usize) -> NeighborSets {
        let n = self.instance_ids.len();
        let ordered: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut others: Vec<(f64, usize)> =
                    (0..n).filter(|&j| j != i).map(|j| (self.distance(i, j), j)).collect();
                // stable: equal distances keep index order
                others.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                others.into_iter().map(|(_, j)| j).collect()
            })
            .collect();

        match &self.phenotype {
            Phenotype::Continuous(_) => NeighborSets::Continuous {
                k,
                nearest: ordered.into_iter().map(|o| o.into_iter().take(k).collect()).collect(),
            },
            Phenotype::Classes(classes) => {
                let mut hits = Vec::with_capacity(n);
                let mut misses = Vec::with_capacity(n);
                for (i, order) in ordered.into_iter().enumerate() {
                    let mut h = Vec::with_capacity(k);
                    let mut m: BTreeMap<ClassLevel, Vec<usize>> = BTreeMap::new();
                    for j in order {
                        if classes[j] == classes[i] {
                            if h.len() < k {
                                h.push(j);
                            }
                        } else {
                            let bucket = m.entry(classes[j]).or_default();
                            if bucket.len() < k {
                                bucket.push(j);
                            }
                        }
                    }
                    hits.push(h);
                    misses.push(m);
                }
                NeighborSets::Classified { k, hits, misses }
            }
        }
    }
}

impl AttributeUniverse for Dataset {
    fn attribute_count(&self) -> usize {
        self.active.iter().filter(|&&on| on).count()
    }

    fn instance_count(&self) -> usize {
        self.instance_ids.len()
    }

    fn attribute_names(&self) -> Vec<String> {
        self.active_attribute_indices()
            .into_iter()
            .map(|idx| self.attribute_names[idx].clone())
            .collect()
    }

    fn remove_attribute(&mut self, name: &str) -> Result<()> {
        let idx = *self
            .name_index
            .get(name)
            .ok_or_else(|| anyhow!("Unknown attribute: {}", name))?;
        if !self.active[idx] {
            bail!("Attribute already removed: {}", name);
        }
        self.active[idx] = false;
        self.reset_neighbor_cache();
        Ok(())
    }

    fn reset_neighbor_cache(&mut self) {
        let cache = self
            .neighbor_cache
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cache = None;
    }

    fn transition_transversion_counts(&self) -> (usize, usize) {
        let mut transitions = 0;
        let mut transversions = 0;
        for idx in self.active_attribute_indices() {
            if let Some((a, b)) = self.alleles[idx] {
                if a == b {
                    continue;
                }
                if matches!((a, b), ('A', 'G') | ('G', 'A') | ('C', 'T') | ('T', 'C')) {
                    transitions += 1;
                } else {
                    transversions += 1;
                }
            }
        }
        (transitions, transversions)
    }

    fn max_neighborhood_size(&self) -> usize {
        match &self.phenotype {
            Phenotype::Classes(_) => self
                .class_counts()
                .values()
                .min()
                .map(|&c| c.saturating_sub(1))
                .unwrap_or(0),
            Phenotype::Continuous(_) => self.instance_ids.len().saturating_sub(1),
        }
    }
}

fn value_range<'a, I: Iterator<Item = &'a f64>>(values: I) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    if hi > lo {
        hi - lo
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Dataset {
        let values = Array2::from_shape_vec(
            (4, 2),
            vec![
                0.0, 1.5, //
                1.0, 2.5, //
                2.0, 0.5, //
                2.0, 4.5,
            ],
        )
        .unwrap();
        Dataset::new(
            (0..4).map(|i| format!("s{}", i)).collect(),
            vec!["rs1".to_string(), "expr".to_string()],
            values,
            Phenotype::Classes(vec![0, 0, 1, 1]),
        )
        .unwrap()
    }

    #[test]
    fn test_kinds_are_inferred() {
        let ds = small();
        assert_eq!(ds.attribute_kind(0), AttributeKind::Discrete);
        assert_eq!(ds.attribute_kind(1), AttributeKind::Numeric);
    }

    #[test]
    fn test_diff_metrics() {
        let mut ds = small();
        assert_eq!(ds.diff(0, 0, 2), 1.0);
        assert!((ds.diff(1, 0, 3) - 0.75).abs() < 1e-12);
        ds.set_metrics(SnpMetric::AlleleMismatch, NumericMetric::Manhattan);
        assert_eq!(ds.diff(0, 0, 2), 1.0);
        assert_eq!(ds.diff(0, 0, 1), 0.5);
    }

    #[test]
    fn test_neighbor_cache_follows_k() {
        let ds = small();
        let first = ds.neighbors(1);
        let again = ds.neighbors(1);
        assert!(Arc::ptr_eq(&first, &again));
        let other = ds.neighbors(2);
        assert_eq!(other.k(), 2);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let values = Array2::zeros((2, 2));
        let res = Dataset::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "x".into()],
            values,
            Phenotype::Classes(vec![0, 1]),
        );
        assert!(res.is_err());
    }
}
