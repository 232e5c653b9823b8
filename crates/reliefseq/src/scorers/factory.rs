use anyhow::Result;

use crate::config::{AlgorithmMode, ReliefSeqConfig};
use crate::data_handling::Dataset;
use crate::scorers::{RReliefF, RelevanceScorer, ReliefF, ReliefSeq};

/// Build a boxed scorer for `dataset` from the configured algorithm mode.
///
/// `relieff` resolves to RReliefF when the phenotype is continuous and to
/// ReliefF otherwise; `reliefseq` always builds the sequence scorer.
pub fn build_scorer(
    config: &ReliefSeqConfig,
    dataset: &Dataset,
) -> Result<Box<dyn RelevanceScorer<Dataset>>> {
    let scorer: Box<dyn RelevanceScorer<Dataset>> = match config.algorithm_mode {
        AlgorithmMode::ReliefF => {
            if dataset.has_continuous_phenotype() {
                log::info!("Constructing Regression ReliefF...");
                Box::new(RReliefF::new(config)?)
            } else {
                log::info!("Constructing Standard ReliefF...");
                Box::new(ReliefF::new(config)?)
            }
        }
        AlgorithmMode::ReliefSeq => {
            log::info!("Constructing ReliefSeq...");
            Box::new(ReliefSeq::new(config)?)
        }
    };
    Ok(scorer)
}
