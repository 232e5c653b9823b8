use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use reliefseq::feature_selection::{exclude_attributes, EliminationController, KOptimizationDriver};
use reliefseq::io::tabular::TabularReaderConfig;
use reliefseq::io::{
    read_allele_map, read_dataset_with_config, read_name_list, write_filtered_dataset, ScoreArtifacts,
};
use reliefseq::scorers::factory::build_scorer;
use reliefseq::universe::AttributeUniverse;

use crate::select::input::RunConfig;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Name of the scorer that ran, e.g. `ReliefF` or `RReliefF`.
    pub scorer: String,
    pub scores_path: PathBuf,
    pub attributes_scored: usize,
    pub best_k_path: Option<PathBuf>,
    pub dataset_path: Option<PathBuf>,
}

/// Load the data set, then either eliminate attributes down to the target or
/// sweep k, and write the resulting score files.
pub fn run_selection(params: &RunConfig) -> Result<RunOutcome> {
    let start = Instant::now();
    let config = &params.selection;

    let mut dataset = read_dataset_with_config(&params.data, &TabularReaderConfig::from_config(config))?;
    if let Some(path) = &config.exclusion_file {
        let names = read_name_list(path)?;
        log::info!("Read {} excluded attribute names from {}", names.len(), path.display());
        exclude_attributes(&mut dataset, &names)?;
    }
    dataset.set_metrics(config.snp_metric, config.numeric_metric);
    if let Some(path) = &params.snp_alleles {
        let alleles = read_allele_map(path)?;
        log::info!("Loaded alleles for {} attributes from {}", alleles.len(), path.display());
        dataset = dataset.with_alleles(&alleles);
    }
    dataset.log_input_data_summary();

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create output directory: {}", config.out_dir.display()))?;
    let artifacts = ScoreArtifacts::from_config(config);
    let scorer = build_scorer(config, &dataset)?;

    let (scorer_name, scores_path, attributes_scored, best_k_path) = {
        let mut controller = EliminationController::new(&mut dataset, scorer, config)?
            .with_artifacts(artifacts.clone());
        let scorer_name = controller.scorer_name().to_string();

        if config.optimize_k() {
            log::info!(
                "Optimizing k over {}..={} step {}",
                config.kopt_begin,
                config.kopt_end,
                config.kopt_step
            );
            let driver = KOptimizationDriver::from_config(config).with_artifacts(artifacts.clone());
            let result = driver.run(&mut controller)?;
            let path = artifacts.write_final_scores(&result.scores)?;
            let best_k_path = config.write_best_k.then(|| artifacts.best_k_path());
            (scorer_name, path, result.scores.len(), best_k_path)
        } else {
            controller.compute_scores()?;
            log::info!(
                "Removed {} attributes; {} remain",
                controller.removed().len(),
                controller.scores().len()
            );
            let path = controller.write_attribute_scores(&artifacts)?;
            (scorer_name, path, controller.scores().len(), None)
        }
    };

    let dataset_path = match &params.out_dataset {
        Some(path) => {
            log::info!(
                "Writing {} remaining attributes to {}",
                dataset.attribute_count(),
                path.display()
            );
            write_filtered_dataset(&dataset, path)?;
            Some(path.clone())
        }
        None => None,
    };

    log::info!("ReliefSeq elapsed time: {:.2} secs", start.elapsed().as_secs_f64());
    Ok(RunOutcome {
        scorer: scorer_name,
        scores_path,
        attributes_scored,
        best_k_path,
        dataset_path,
    })
}
