//! reliefseq: Relief-family attribute scoring with iterative backward elimination.
//!
//! The crate provides the data set model and its tabular readers, three Relief
//! scorers (ReliefF, RReliefF and the two-class ReliefSeq), score rescaling,
//! and the two drivers built on top of them: the elimination controller that
//! repeatedly drops the worst attributes, and the k-optimization sweep.
//!
//! The drivers only see the `AttributeUniverse` and `RelevanceScorer` traits,
//! so they can run against any data set and scorer that implement them.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod feature_selection;
pub mod io;
pub mod preprocessing;
pub mod scorers;
pub mod scores;
pub mod stats;
pub mod universe;
