//! Storage method comparison (1000 records)
//!
//! Trims the 2 fastest and 2 slowest rounds of every test type, then prints
//! the per-storage mean/std table and which storage method wins each test.
//!
//! Run with: RUST_LOG=trimstats=debug cargo run --example storage_comparison

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use trimstats::{Pipeline, Row};

const DATA: &str = include_str!("../tests/fixtures/storage_1000_records.json");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trimstats=info".parse()?))
        .init();

    let rows = Row::parse_json_array(DATA).context("loading benchmark table")?;

    let pipeline = Pipeline::builder()
        .label_column("test_type")
        .sequence_column("round_num")
        .timing_metrics(["db1_time_ms", "db2_time_ms", "file_time_ms", "memory_time_ms"])
        .build()?;

    let report = pipeline.run(&rows)?;

    println!("=== Data Cleaning (1000 Records) ===");
    for outcome in report.trim_outcomes() {
        println!(
            "  {}: {} rounds -> {} rounds",
            outcome.group_label, outcome.before, outcome.after
        );
    }

    println!("\n=== Performance Statistics (After Outlier Removal) ===");
    print!("{}", report.render());

    let table = report.table();
    println!("\n=== Fastest Storage Method ===");
    for label in table.labels() {
        if let Some(fastest) = table.fastest_metric(label) {
            println!("  {label}: {fastest}");
        }
        if let Some(ratio) = table.mean_ratio(label, "file_time_ms", "memory_time_ms") {
            println!("    file / memory: {ratio:.1}x");
        }
    }

    Ok(())
}
