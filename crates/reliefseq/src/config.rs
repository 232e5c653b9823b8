use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Central configuration for a ReliefSeq run.
///
/// Every recognized option lives here with its default; the struct is built
/// once (from JSON, CLI flags or code) and handed by reference to the scorer
/// factory, the elimination controller and the k-optimization driver.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ReliefSeqConfig {
    /// Relief flavor: `relieff` (classification or regression) or `reliefseq`.
    pub algorithm_mode: AlgorithmMode,
    pub seq_algorithm_mode: SeqAlgorithmMode,
    pub seq_snr_mode: SnrMode,
    pub seq_tstat_mode: TstatMode,
    /// Fudge term added to the t-statistic denominator (0.0 <= s0 <= 1.0).
    pub seq_algorithm_s0: f64,

    /// Neighborhood size. Zero requests k optimization over the kopt range.
    pub k: usize,
    pub kopt_begin: usize,
    pub kopt_end: usize,
    pub kopt_step: usize,
    pub write_best_k: bool,
    pub write_each_k_scores: bool,

    /// Number of attributes to keep. Zero keeps all of them (single pass).
    pub num_target: usize,
    /// Attributes removed per elimination round.
    pub iter_remove_n: usize,
    /// Percentage of the working attributes removed per round; overrides `iter_remove_n`.
    pub iter_remove_percent: Option<u32>,
    /// Rescale classification/regression scores to [0, 1] after every pass.
    pub normalize_scores: bool,

    /// Instances sampled per pass (0 = all).
    pub number_random_samples: usize,
    pub random_seed: Option<u64>,
    pub snp_metric: SnpMetric,
    pub numeric_metric: NumericMetric,
    /// How the k nearest hits and misses are weighted by their distance rank.
    pub weight_by_distance_method: WeightByDistance,
    /// Width of the exponential rank weighting.
    pub weight_by_distance_sigma: f64,

    /// How the last column of the data set is read.
    pub phenotype_kind: PhenotypeKind,
    /// Attribute names (one per line) dropped before selection starts.
    pub exclusion_file: Option<PathBuf>,

    /// Advisory worker count handed to the scorer. Defaults to the available processors.
    pub num_threads: Option<usize>,

    pub out_files_prefix: String,
    pub out_dir: PathBuf,
}

impl Default for ReliefSeqConfig {
    fn default() -> Self {
        Self {
            algorithm_mode: AlgorithmMode::ReliefF,
            seq_algorithm_mode: SeqAlgorithmMode::Snr,
            seq_snr_mode: SnrMode::Snr,
            seq_tstat_mode: TstatMode::Pval,
            seq_algorithm_s0: 0.05,
            k: 10,
            kopt_begin: 1,
            kopt_end: 1,
            kopt_step: 1,
            write_best_k: false,
            write_each_k_scores: false,
            num_target: 0,
            iter_remove_n: 0,
            iter_remove_percent: None,
            normalize_scores: true,
            number_random_samples: 0,
            random_seed: None,
            snp_metric: SnpMetric::GenotypeMismatch,
            numeric_metric: NumericMetric::Manhattan,
            weight_by_distance_method: WeightByDistance::Equal,
            weight_by_distance_sigma: 2.0,
            phenotype_kind: PhenotypeKind::Auto,
            exclusion_file: None,
            num_threads: None,
            out_files_prefix: "reliefseq_default".to_string(),
            out_dir: PathBuf::from("."),
        }
    }
}

impl ReliefSeqConfig {
    /// True when the run should sweep k instead of eliminating at a fixed k.
    pub fn optimize_k(&self) -> bool {
        self.k == 0
    }

    /// Worker count passed down to the scorer thread pool.
    pub fn worker_count(&self) -> usize {
        match self.num_threads {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Checks the options that can be validated without a data set.
    ///
    /// Bounds that depend on the data (target count, maximum k) are checked by
    /// the controller and the driver.
    pub fn validate(&self) -> Result<()> {
        if let Some(percent) = self.iter_remove_percent {
            if percent > 100 {
                return Err(SelectionError::configuration(format!(
                    "iter_remove_percent must be between 0 and 100, got {}",
                    percent
                ))
                .into());
            }
        }
        if !(0.0..=1.0).contains(&self.seq_algorithm_s0) {
            return Err(SelectionError::configuration(format!(
                "seq_algorithm_s0 must be between 0.0 and 1.0, got {}",
                self.seq_algorithm_s0
            ))
            .into());
        }
        if !(self.weight_by_distance_sigma > 0.0) {
            return Err(SelectionError::configuration(format!(
                "weight_by_distance_sigma must be positive, got {}",
                self.weight_by_distance_sigma
            ))
            .into());
        }
        if self.out_files_prefix.is_empty() {
            return Err(SelectionError::configuration("out_files_prefix must not be empty").into());
        }
        Ok(())
    }
}

/// Load a configuration from a JSON file. Missing keys take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReliefSeqConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ReliefSeqConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn variants() -> &'static [&'static str] {
                &[$($text),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Unknown {}: {}. Expected one of: {}",
                        stringify!($name),
                        s,
                        $name::variants().join(", ")
                    )),
                }
            }
        }
    };
}

string_enum! {
    /// Which Relief family member scores the attributes.
    AlgorithmMode { ReliefF => "relieff", ReliefSeq => "reliefseq" }
}

string_enum! {
    /// ReliefSeq statistic.
    SeqAlgorithmMode { Snr => "snr", Tstat => "tstat" }
}

string_enum! {
    /// ReliefSeq signal-to-noise flavor.
    SnrMode { Snr => "snr", ReliefF => "relieff" }
}

string_enum! {
    /// ReliefSeq t-statistic reporting.
    TstatMode { Pval => "pval", Abst => "abst", Rawt => "rawt" }
}

string_enum! {
    /// Difference between two genotypes of a discrete attribute.
    SnpMetric { GenotypeMismatch => "gm", AlleleMismatch => "am" }
}

string_enum! {
    /// How per-attribute differences of numeric attributes add up to a distance.
    NumericMetric { Manhattan => "manhattan", Euclidean => "euclidean" }
}

string_enum! {
    /// Rank weighting of the nearest neighbors in ReliefF and RReliefF updates.
    WeightByDistance { Equal => "equal", OneOverK => "one_over_k", Exponential => "exponential" }
}

string_enum! {
    /// Phenotype interpretation. `auto` reads whole numbers as class labels.
    PhenotypeKind { Auto => "auto", Discrete => "discrete", Continuous => "continuous" }
}

impl Default for PhenotypeKind {
    fn default() -> Self {
        PhenotypeKind::Auto
    }
}
