//! Tests for generator configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        worker_threads = { specific = 4 }
        branch_factor = 5
        min_solution_score = 100
        random_seed = 42

        [score_weights]
        placed_session = 12
        teacher_gap = 4
    "#;

    let config = GeneratorConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.worker_threads, ThreadCount::Specific(4));
    assert_eq!(config.branch_factor, 5);
    assert_eq!(config.min_solution_score, 100);
    assert_eq!(config.min_failure_score, 0);
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.score_weights.placed_session, 12);
    assert_eq!(config.score_weights.consecutive_pair, 2);
    assert_eq!(config.score_weights.teacher_gap, 4);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        worker_threads: auto
        branch_factor: 2
        min_failure_score: -50
        score_weights:
          consecutive_pair: 1
    "#;

    let config = GeneratorConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.worker_threads, ThreadCount::Auto);
    assert_eq!(config.branch_factor, 2);
    assert_eq!(config.min_failure_score, -50);
    assert_eq!(config.random_seed, None);
    assert_eq!(config.score_weights.consecutive_pair, 1);
    assert_eq!(config.score_weights.placed_session, 10);
}

#[test]
fn test_empty_document_yields_defaults() {
    let config = GeneratorConfig::from_toml_str("").unwrap();
    assert_eq!(config, GeneratorConfig::default());
    assert_eq!(config.branch_factor, 3);
    assert_eq!(config.score_weights, ScoreWeights::default());
}

#[test]
fn test_builder() {
    let config = GeneratorConfig::new()
        .with_worker_threads(ThreadCount::Specific(8))
        .with_branch_factor(4)
        .with_min_solution_score(250)
        .with_min_failure_score(-10)
        .with_random_seed(123)
        .with_score_weights(ScoreWeights {
            placed_session: 20,
            consecutive_pair: 0,
            teacher_gap: 5,
        });

    assert_eq!(config.worker_threads, ThreadCount::Specific(8));
    assert_eq!(config.branch_factor, 4);
    assert_eq!(config.min_solution_score, 250);
    assert_eq!(config.min_failure_score, -10);
    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.score_weights.teacher_gap, 5);
}

#[test]
fn test_zero_branch_factor_is_rejected() {
    let err = GeneratorConfig::from_toml_str("branch_factor = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_zero_workers_are_rejected() {
    let config = GeneratorConfig::new().with_worker_threads(ThreadCount::Specific(0));
    assert!(config.validate().is_err());
}

#[test]
fn test_negative_weights_are_rejected() {
    let yaml = r#"
        score_weights:
          teacher_gap: -3
    "#;
    let err = GeneratorConfig::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_thread_count_resolution() {
    assert_eq!(ThreadCount::Specific(6).resolve(), 6);
    assert!(ThreadCount::Auto.resolve() >= 1);
    assert_eq!(ThreadCount::Specific(6).to_string(), "6");
    assert_eq!(ThreadCount::Auto.to_string(), "auto");
}
