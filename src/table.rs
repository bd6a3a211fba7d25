//! Label x metric pivot over summary records
//!
//! Mirrors the wide "one row per group, mean/std column pair per metric" layout
//! benchmark reports are usually read in.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::summary::{format_value, SummaryRecord};
use crate::Result;

/// Summary records indexed by `(group label, metric name)`.
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    labels: Vec<String>,
    metrics: Vec<String>,
    records: Vec<SummaryRecord>,
    lookup: FxHashMap<(String, String), usize>,
}

impl SummaryTable {
    /// Build a table; labels and metrics keep their first-occurrence order.
    ///
    /// If a `(label, metric)` pair repeats, the later record wins the lookup.
    #[must_use]
    pub fn from_records(records: Vec<SummaryRecord>) -> Self {
        let mut table = Self::default();
        for (position, record) in records.iter().enumerate() {
            let label = record.group_label().to_string();
            let metric = record.metric_name().to_string();
            if !table.labels.contains(&label) {
                table.labels.push(label.clone());
            }
            if !table.metrics.contains(&metric) {
                table.metrics.push(metric.clone());
            }
            table.lookup.insert((label, metric), position);
        }
        table.records = records;
        table
    }

    /// Group labels in first-occurrence order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Metric names in first-occurrence order.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// All records in their original order.
    #[must_use]
    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    /// Look up one cell.
    #[must_use]
    pub fn get(&self, label: &str, metric: &str) -> Option<&SummaryRecord> {
        self.lookup
            .get(&(label.to_string(), metric.to_string()))
            .map(|&position| &self.records[position])
    }

    /// Records for one label, in metric order.
    #[must_use]
    pub fn row(&self, label: &str) -> Vec<&SummaryRecord> {
        self.metrics
            .iter()
            .filter_map(|metric| self.get(label, metric))
            .collect()
    }

    /// The metric with the lowest mean for a label (e.g. the fastest storage backend).
    ///
    /// Metrics without a mean are ignored; ties go to the earlier metric.
    #[must_use]
    pub fn fastest_metric(&self, label: &str) -> Option<&SummaryRecord> {
        self.row(label)
            .into_iter()
            .filter_map(|record| record.mean().map(|mean| (record, mean)))
            .fold(None, |best: Option<(&SummaryRecord, f64)>, (record, mean)| match best {
                Some((_, best_mean)) if best_mean <= mean => best,
                _ => Some((record, mean)),
            })
            .map(|(record, _)| record)
    }

    /// Ratio of two metrics' means within a label.
    ///
    /// `None` if either mean is missing or the denominator is zero.
    #[must_use]
    pub fn mean_ratio(&self, label: &str, numerator: &str, denominator: &str) -> Option<f64> {
        let numerator = self.get(label, numerator)?.mean()?;
        let denominator = self.get(label, denominator)?.mean()?;
        (denominator != 0.0).then(|| numerator / denominator)
    }

    /// Serialize the records as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Render as aligned text: one line per label, a mean/std column pair per metric.
    ///
    /// Missing values print as `NaN`. Values are rounded for display only.
    #[must_use]
    pub fn render(&self, decimals: u32) -> String {
        let mut header = vec!["group".to_string()];
        for metric in &self.metrics {
            header.push(format!("{metric}_mean"));
            header.push(format!("{metric}_std"));
        }

        let mut lines = vec![header];
        for label in &self.labels {
            let mut line = vec![label.clone()];
            for metric in &self.metrics {
                let record = self.get(label, metric);
                line.push(format_value(record.and_then(SummaryRecord::mean), decimals));
                line.push(format_value(
                    record.and_then(SummaryRecord::standard_deviation),
                    decimals,
                ));
            }
            lines.push(line);
        }

        let widths: Vec<usize> = (0..lines[0].len())
            .map(|column| lines.iter().map(|line| line[column].len()).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        for line in &lines {
            let mut cells = line.iter().zip(&widths);
            if let Some((first, &width)) = cells.next() {
                let _ = write!(out, "{first:<width$}");
            }
            for (cell, &width) in cells {
                let _ = write!(out, "  {cell:>width$}");
            }
            out.push('\n');
        }
        out
    }
}
