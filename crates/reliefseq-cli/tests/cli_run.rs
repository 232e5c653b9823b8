use std::fs;
use std::path::Path;

use reliefseq::config::{AlgorithmMode, PhenotypeKind, WeightByDistance};
use reliefseq_cli::cli::build_cli;
use reliefseq_cli::select::input::RunConfig;
use reliefseq_cli::select::runner::run_selection;

/// Twelve instances in two classes; `gene0` follows the class, the rest do not.
fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let mut text = String::from("ID\tgene0\tgene1\tgene2\tgene3\tClass\n");
    for i in 0..12 {
        let class = i % 2;
        let signal = 5 + class * 40 + (i % 3);
        let a = (i * 7) % 11 + 3;
        let b = (i * 5) % 13 + 3;
        let c = (i * 3) % 7 + 3;
        text.push_str(&format!("s{}\t{}\t{}\t{}\t{}\t{}\n", i, signal, a, b, c, class));
    }
    let path = dir.join("counts.tsv");
    fs::write(&path, text).unwrap();
    path
}

fn params(args: &[&str]) -> anyhow::Result<RunConfig> {
    let matches = build_cli().try_get_matches_from(args)?;
    RunConfig::from_arguments(&matches)
}

#[test]
fn test_elimination_run_writes_scores_and_filtered_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let out_dir = dir.path().join("out");
    let filtered = dir.path().join("filtered.tsv");

    let params = params(&[
        "reliefseq",
        data.to_str().unwrap(),
        "-t",
        "2",
        "-r",
        "1",
        "-k",
        "2",
        "--threads",
        "1",
        "--out-dir",
        out_dir.to_str().unwrap(),
        "-o",
        "run",
        "-O",
        filtered.to_str().unwrap(),
    ])
    .unwrap();
    let outcome = run_selection(&params).unwrap();

    assert_eq!(outcome.scores_path, out_dir.join("run.reliefseq"));
    assert_eq!(outcome.attributes_scored, 2);
    let scores = fs::read_to_string(&outcome.scores_path).unwrap();
    assert_eq!(scores.lines().count(), 2);
    assert!(scores.lines().next().unwrap().ends_with("\tgene0"));
    assert!(out_dir.join("run.1.scores.dat").exists());
    assert!(out_dir.join("run.2.scores.dat").exists());
    assert!(!out_dir.join("run.3.scores.dat").exists());

    let written = fs::read_to_string(&filtered).unwrap();
    let header: Vec<&str> = written.lines().next().unwrap().split('\t').collect();
    assert_eq!(header.len(), 4);
    assert_eq!(header[0], "ID");
    assert!(header.contains(&"gene0"));
    assert_eq!(written.lines().count(), 13);
}

#[test]
fn test_k_sweep_writes_per_k_and_best_k() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let params = params(&[
        "reliefseq",
        data.to_str().unwrap(),
        "-k",
        "0",
        "--kopt-begin",
        "1",
        "--kopt-end",
        "3",
        "--write-best-k",
        "--write-each-k-scores",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "-o",
        "sweep",
    ])
    .unwrap();
    let outcome = run_selection(&params).unwrap();

    for k in 1..=3 {
        assert!(dir.path().join(format!("sweep.{}.reliefseq", k)).exists());
    }
    let best_k = fs::read_to_string(dir.path().join("sweep.bestk")).unwrap();
    assert_eq!(best_k.lines().count(), 4);
    assert_eq!(outcome.best_k_path, Some(dir.path().join("sweep.bestk")));
    assert_eq!(outcome.attributes_scored, 4);

    let scores: Vec<f64> = fs::read_to_string(&outcome.scores_path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').next().unwrap().parse().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_integer_phenotype_forced_continuous_runs_rrelieff() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let args = |kind: &'static str| {
        params(&[
            "reliefseq",
            data.to_str().unwrap(),
            "-k",
            "3",
            "--phenotype-kind",
            kind,
            "--threads",
            "1",
            "--out-dir",
            dir.path().to_str().unwrap(),
            "-o",
            kind,
        ])
        .unwrap()
    };

    let continuous = args("continuous");
    assert_eq!(continuous.selection.phenotype_kind, PhenotypeKind::Continuous);
    let outcome = run_selection(&continuous).unwrap();
    assert_eq!(outcome.scorer, "RReliefF");
    assert_eq!(outcome.attributes_scored, 4);

    let outcome = run_selection(&args("auto")).unwrap();
    assert_eq!(outcome.scorer, "ReliefF");
}

#[test]
fn test_exclusion_file_and_distance_weighting() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let exclude = dir.path().join("exclude.txt");
    fs::write(&exclude, "gene3
not_in_data
").unwrap();
    let filtered = dir.path().join("filtered.tsv");

    let params = params(&[
        "reliefseq",
        data.to_str().unwrap(),
        "-k",
        "2",
        "-x",
        exclude.to_str().unwrap(),
        "-b",
        "exponential",
        "--weight-by-distance-sigma",
        "1.5",
        "--threads",
        "1",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "-O",
        filtered.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(params.selection.weight_by_distance_method, WeightByDistance::Exponential);
    assert_eq!(params.selection.weight_by_distance_sigma, 1.5);
    assert_eq!(params.selection.exclusion_file.as_deref(), Some(exclude.as_path()));

    let outcome = run_selection(&params).unwrap();
    assert_eq!(outcome.attributes_scored, 3);
    let scores = fs::read_to_string(&outcome.scores_path).unwrap();
    assert!(!scores.contains("gene3"));
    assert!(scores.lines().next().unwrap().ends_with("\tgene0"));
    let header = fs::read_to_string(&filtered).unwrap();
    assert_eq!(header.lines().next(), Some("ID\tgene0\tgene1\tgene2\tClass"));
}

#[test]
fn test_cli_overrides_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let config = dir.path().join("run.json");
    fs::write(&config, r#"{ "k": 5, "num_target": 3, "algorithm_mode": "reliefseq" }"#).unwrap();

    let params = params(&[
        "reliefseq",
        data.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
        "-k",
        "3",
        "-p",
        "50",
    ])
    .unwrap();
    assert_eq!(params.selection.k, 3);
    assert_eq!(params.selection.num_target, 3);
    assert_eq!(params.selection.iter_remove_percent, Some(50));
    assert_eq!(params.selection.algorithm_mode, AlgorithmMode::ReliefSeq);
}

#[test]
fn test_bad_arguments_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let data = data.to_str().unwrap();

    assert!(params(&["reliefseq", data, "-p", "150"]).is_err());
    assert!(params(&["reliefseq", data, "-g", "svm"]).is_err());
    assert!(params(&["reliefseq", data, "-r", "2", "-p", "10"]).is_err());
    assert!(params(&["reliefseq", "missing.tsv"]).is_err());
    assert!(params(&["reliefseq", data, "-O", "out.json"]).is_err());
    assert!(params(&["reliefseq", data, "--phenotype-kind", "ordinal"]).is_err());
    assert!(params(&["reliefseq", data, "--weight-by-distance-sigma", "0"]).is_err());
}

#[test]
fn test_target_above_attribute_count_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let params = params(&[
        "reliefseq",
        data.to_str().unwrap(),
        "-t",
        "10",
        "--out-dir",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    assert!(run_selection(&params).is_err());
}
