//! IO utilities for data sets and score files.

pub mod scores;
pub mod tabular;

pub use scores::{write_best_k, write_scores, ScoreArtifacts};
pub use tabular::{
    read_allele_map, read_dataset, read_name_list, read_dataset_with_config, write_filtered_dataset,
    PhenotypeKind, TabularReaderConfig,
};
