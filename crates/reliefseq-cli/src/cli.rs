use clap::builder::{NonEmptyStringValueParser, PossibleValuesParser};
use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

use reliefseq::config::{
    AlgorithmMode, NumericMetric, PhenotypeKind, SeqAlgorithmMode, SnpMetric, SnrMode, TstatMode,
    WeightByDistance,
};

fn choices(values: &'static [&'static str]) -> PossibleValuesParser {
    PossibleValuesParser::new(values.iter().copied())
}

/// The `reliefseq` command line.
pub fn build_cli() -> Command {
    Command::new("reliefseq")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("ReliefSeq - Relief-family attribute scoring with iterative backward elimination")
        .arg_required_else_help(true)
        .arg(
            Arg::new("data")
                .help("Path to the data set (*.tsv, *.txt, *.tab or *.csv); the last column is the phenotype")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON configuration file. Command line options override it.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("algorithm_mode")
                .short('g')
                .long("algorithm-mode")
                .help("Relief algorithm: relieff (ReliefF or RReliefF by phenotype) or reliefseq")
                .value_parser(choices(AlgorithmMode::variants())),
        )
        .arg(
            Arg::new("seq_algorithm_mode")
                .long("seq-algorithm-mode")
                .help("ReliefSeq statistic")
                .value_parser(choices(SeqAlgorithmMode::variants())),
        )
        .arg(
            Arg::new("seq_snr_mode")
                .long("seq-snr-mode")
                .help("ReliefSeq signal-to-noise flavor")
                .value_parser(choices(SnrMode::variants())),
        )
        .arg(
            Arg::new("seq_tstat_mode")
                .long("seq-tstat-mode")
                .help("ReliefSeq t statistic reported as p-value, |t| or raw t")
                .value_parser(choices(TstatMode::variants())),
        )
        .arg(
            Arg::new("seq_algorithm_s0")
                .long("seq-algorithm-s0")
                .help("Fudge term added to the t statistic denominator, in [0, 1]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("k")
                .short('k')
                .long("k-nearest-neighbors")
                .help("Neighborhood size; 0 sweeps k over the --kopt-* range instead of eliminating")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("kopt_begin")
                .long("kopt-begin")
                .help("First k of the sweep")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("kopt_end")
                .long("kopt-end")
                .help("Last k of the sweep (inclusive)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("kopt_step")
                .long("kopt-step")
                .help("Step between k values of the sweep")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("write_best_k")
                .long("write-best-k")
                .help("Write each attribute's best k after a sweep")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("write_each_k_scores")
                .long("write-each-k-scores")
                .help("Write the scores of every k of a sweep")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("num_target")
                .short('t')
                .long("num-target")
                .help("Number of attributes to keep; 0 keeps all")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("iter_remove_n")
                .short('r')
                .long("iter-remove-n")
                .help("Attributes removed per iteration")
                .value_parser(clap::value_parser!(usize))
                .conflicts_with("iter_remove_percent"),
        )
        .arg(
            Arg::new("iter_remove_percent")
                .short('p')
                .long("iter-remove-percent")
                .help("Percentage of the remaining attributes removed per iteration")
                .value_parser(clap::value_parser!(u32).range(0..=100)),
        )
        .arg(
            Arg::new("normalize_scores")
                .long("normalize-scores")
                .help("Rescale ReliefF/RReliefF scores to [0, 1] each iteration (0 or 1)")
                .value_parser(["0", "1"]),
        )
        .arg(
            Arg::new("number_random_samples")
                .short('m')
                .long("number-random-samples")
                .help("Instances sampled per scoring pass; 0 uses every instance")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Random seed for instance sampling")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("snp_metric")
                .long("snp-metric")
                .help("Genotype difference: gm (genotype mismatch) or am (allele mismatch)")
                .value_parser(choices(SnpMetric::variants())),
        )
        .arg(
            Arg::new("numeric_metric")
                .short('N')
                .long("numeric-metric")
                .help("Distance over numeric attributes")
                .value_parser(choices(NumericMetric::variants())),
        )
        .arg(
            Arg::new("weight_by_distance_method")
                .short('b')
                .long("weight-by-distance-method")
                .help("Weighting of the k neighbors by distance rank in ReliefF/RReliefF")
                .value_parser(choices(WeightByDistance::variants())),
        )
        .arg(
            Arg::new("weight_by_distance_sigma")
                .long("weight-by-distance-sigma")
                .help("Rank scale of the exponential neighbor weighting; must be positive")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("phenotype_kind")
                .long("phenotype-kind")
                .help("Read the phenotype column as classes, continuous, or decide from its values (auto)")
                .value_parser(choices(PhenotypeKind::variants())),
        )
        .arg(
            Arg::new("exclusion_file")
                .short('x')
                .long("snp-exclusion-file")
                .help("File of attribute names, one per line, removed before scoring")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("out_files_prefix")
                .short('o')
                .long("out-files-prefix")
                .help("Prefix of every score file written")
                .value_parser(NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("out_dir")
                .long("out-dir")
                .help("Directory the score files are written to")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("out_dataset_filename")
                .short('O')
                .long("out-dataset-filename")
                .help("Write the instances with the remaining attributes to this file (*.tsv, *.txt, *.tab or *.csv)")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("snp_alleles")
                .long("snp-alleles")
                .help("Tab separated attribute/allele1/allele2 file used for Ti/Tv reporting")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .help("Scorer worker threads; defaults to the available parallelism")
                .value_parser(clap::value_parser!(usize)),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
}
