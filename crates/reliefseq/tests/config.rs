use std::fs;

use reliefseq::config::{load_config, AlgorithmMode, ReliefSeqConfig, SnpMetric};
use reliefseq::error::SelectionError;

#[test]
fn test_partial_json_takes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{ "algorithm_mode": "reliefseq", "num_target": 50, "iter_remove_percent": 10, "snp_metric": "am" }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.algorithm_mode, AlgorithmMode::ReliefSeq);
    assert_eq!(config.num_target, 50);
    assert_eq!(config.iter_remove_percent, Some(10));
    assert_eq!(config.snp_metric, SnpMetric::AlleleMismatch);
    assert_eq!(config.k, 10);
    assert_eq!(config.out_files_prefix, "reliefseq_default");
    assert!(config.normalize_scores);
}

#[test]
fn test_config_serializes_back() {
    let config = ReliefSeqConfig {
        k: 0,
        kopt_end: 9,
        ..ReliefSeqConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: ReliefSeqConfig = serde_json::from_str(&json).unwrap();
    assert!(parsed.optimize_k());
    assert_eq!(parsed.kopt_end, 9);
}

#[test]
fn test_invalid_s0_is_a_configuration_error() {
    let config = ReliefSeqConfig {
        seq_algorithm_s0: 1.5,
        ..ReliefSeqConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SelectionError>(),
        Some(SelectionError::Configuration(_))
    ));
}
