use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;
use std::str::FromStr;

use reliefseq::config::{
    load_config, AlgorithmMode, NumericMetric, PhenotypeKind, ReliefSeqConfig, SeqAlgorithmMode,
    SnpMetric, SnrMode, TstatMode, WeightByDistance,
};
use reliefseq::io::tabular::validate_dataset_extension;

/// Everything one `reliefseq` invocation needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data: PathBuf,
    pub selection: ReliefSeqConfig,
    pub snp_alleles: Option<PathBuf>,
    pub out_dataset: Option<PathBuf>,
}

impl RunConfig {
    /// Start from the JSON config (or defaults) and apply command line overrides.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let data = matches
            .get_one::<PathBuf>("data")
            .cloned()
            .context("A data set path is required")?;
        validate_dataset_extension(&data)?;
        if !data.exists() {
            anyhow::bail!("Data set does not exist: {}", data.display());
        }

        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(config_path) => {
                log::info!("[ReliefSeq] Using config: {:?}", config_path);
                load_config(config_path)?
            }
            None => ReliefSeqConfig::default(),
        };

        if let Some(mode) = matches.get_one::<String>("algorithm_mode") {
            config.algorithm_mode = AlgorithmMode::from_str(mode).map_err(anyhow::Error::msg)?;
        }
        if let Some(mode) = matches.get_one::<String>("seq_algorithm_mode") {
            config.seq_algorithm_mode = SeqAlgorithmMode::from_str(mode).map_err(anyhow::Error::msg)?;
        }
        if let Some(mode) = matches.get_one::<String>("seq_snr_mode") {
            config.seq_snr_mode = SnrMode::from_str(mode).map_err(anyhow::Error::msg)?;
        }
        if let Some(mode) = matches.get_one::<String>("seq_tstat_mode") {
            config.seq_tstat_mode = TstatMode::from_str(mode).map_err(anyhow::Error::msg)?;
        }
        if let Some(&s0) = matches.get_one::<f64>("seq_algorithm_s0") {
            config.seq_algorithm_s0 = s0;
        }

        if let Some(&k) = matches.get_one::<usize>("k") {
            config.k = k;
        }
        if let Some(&begin) = matches.get_one::<usize>("kopt_begin") {
            config.kopt_begin = begin;
        }
        if let Some(&end) = matches.get_one::<usize>("kopt_end") {
            config.kopt_end = end;
        }
        if let Some(&step) = matches.get_one::<usize>("kopt_step") {
            config.kopt_step = step;
        }
        if matches.get_flag("write_best_k") {
            config.write_best_k = true;
        }
        if matches.get_flag("write_each_k_scores") {
            config.write_each_k_scores = true;
        }

        if let Some(&target) = matches.get_one::<usize>("num_target") {
            config.num_target = target;
        }
        if let Some(&n) = matches.get_one::<usize>("iter_remove_n") {
            config.iter_remove_n = n;
            config.iter_remove_percent = None;
        }
        if let Some(&percent) = matches.get_one::<u32>("iter_remove_percent") {
            config.iter_remove_percent = Some(percent);
        }
        if let Some(flag) = matches.get_one::<String>("normalize_scores") {
            config.normalize_scores = flag == "1";
        }
        if let Some(&m) = matches.get_one::<usize>("number_random_samples") {
            config.number_random_samples = m;
        }
        if let Some(&seed) = matches.get_one::<u64>("seed") {
            config.random_seed = Some(seed);
        }
        if let Some(metric) = matches.get_one::<String>("snp_metric") {
            config.snp_metric = SnpMetric::from_str(metric).map_err(anyhow::Error::msg)?;
        }
        if let Some(metric) = matches.get_one::<String>("numeric_metric") {
            config.numeric_metric = NumericMetric::from_str(metric).map_err(anyhow::Error::msg)?;
        }
        if let Some(method) = matches.get_one::<String>("weight_by_distance_method") {
            config.weight_by_distance_method =
                WeightByDistance::from_str(method).map_err(anyhow::Error::msg)?;
        }
        if let Some(&sigma) = matches.get_one::<f64>("weight_by_distance_sigma") {
            config.weight_by_distance_sigma = sigma;
        }
        if let Some(kind) = matches.get_one::<String>("phenotype_kind") {
            config.phenotype_kind = PhenotypeKind::from_str(kind).map_err(anyhow::Error::msg)?;
        }
        if let Some(path) = matches.get_one::<PathBuf>("exclusion_file") {
            config.exclusion_file = Some(path.clone());
        }
        if let Some(prefix) = matches.get_one::<String>("out_files_prefix") {
            config.out_files_prefix = prefix.clone();
        }
        if let Some(dir) = matches.get_one::<PathBuf>("out_dir") {
            config.out_dir = dir.clone();
        }
        if let Some(&threads) = matches.get_one::<usize>("threads") {
            config.num_threads = Some(threads);
        }
        config.validate()?;
        if matches.get_one::<PathBuf>("config").is_none() {
            log::debug!(
                "[ReliefSeq] No config provided; effective settings:\n{}",
                serde_json::to_string_pretty(&config).unwrap_or_default()
            );
        }

        let out_dataset = matches.get_one::<PathBuf>("out_dataset_filename").cloned();
        if let Some(path) = &out_dataset {
            validate_dataset_extension(path)?;
        }

        Ok(Self {
            data,
            selection: config,
            snp_alleles: matches.get_one::<PathBuf>("snp_alleles").cloned(),
            out_dataset,
        })
    }
}
