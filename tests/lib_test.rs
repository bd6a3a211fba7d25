//! Tests for top-level Pipeline API

use trimstats::{EmptyGroupPolicy, Pipeline, PipelineConfig, TrimPolicy};

#[test]
fn test_pipeline_builder() {
    // Builder alone has no label column yet
    assert!(Pipeline::builder().build().is_err());
}

#[test]
fn test_pipeline_builder_chain() {
    let pipeline = Pipeline::builder()
        .label_columns(["DB", "Clients"])
        .sequence_column("Run")
        .timing_metrics(["Latency_Avg_ms"])
        .summary_metrics(["TPS", "Latency_Avg_ms"])
        .required_metrics(["TPS"])
        .trim_policy(TrimPolicy::symmetric(1))
        .empty_group_policy(EmptyGroupPolicy::Reject)
        .display_precision(2)
        .build()
        .expect("valid configuration");

    let config = pipeline.config();
    assert_eq!(config.label_columns, ["DB", "Clients"]);
    assert_eq!(config.sequence_column.as_deref(), Some("Run"));
    assert_eq!(config.summary_metrics(), ["TPS", "Latency_Avg_ms"]);
    assert_eq!(config.trim_policy.min_group_size, 2);
    assert_eq!(config.empty_group_policy, EmptyGroupPolicy::Reject);
    assert_eq!(config.display_precision, 2);
}

#[test]
fn test_label_column_appends() {
    let pipeline = Pipeline::builder()
        .label_column("DB")
        .label_column("Clients")
        .timing_metrics(["TPS"])
        .build()
        .unwrap();
    assert_eq!(pipeline.config().label_columns.len(), 2);
}

#[test]
fn test_pipeline_from_default_config() {
    let config = PipelineConfig {
        label_columns: vec!["test_type".to_string()],
        timing_metrics: vec!["db_ms".to_string()],
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::from_config(config.clone()).unwrap();
    assert_eq!(pipeline.config(), &config);
    assert_eq!(pipeline.config().trim_policy, TrimPolicy::default());
}

#[test]
fn test_run_on_empty_input() {
    let pipeline = Pipeline::builder()
        .label_column("test_type")
        .timing_metrics(["db_ms"])
        .build()
        .unwrap();
    let report = pipeline.run(&[]).unwrap();
    assert!(report.summaries().is_empty());
    assert!(report.trim_outcomes().is_empty());
    assert_eq!(report.dropped_rows(), 0);
}
