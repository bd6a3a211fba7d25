//! Per-group descriptive statistics
//!
//! Standard deviation is the sample (N-1) estimator, matching what benchmark
//! reports conventionally quote. Rounding is for display only: the stored
//! values are never rounded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::group::Group;

/// Decimal places used when a record is displayed.
pub const DEFAULT_DISPLAY_PRECISION: u32 = 3;

/// Summary of one metric over one (trimmed) group.
///
/// Detached from the observations it was computed from and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    group_label: String,
    metric_name: String,
    mean: Option<f64>,
    standard_deviation: Option<f64>,
    median: Option<f64>,
    sample_count: usize,
}

impl SummaryRecord {
    /// Compute the summary of a set of non-missing values.
    #[must_use]
    pub fn from_values(
        group_label: impl Into<String>,
        metric_name: impl Into<String>,
        values: &[f64],
    ) -> Self {
        Self {
            group_label: group_label.into(),
            metric_name: metric_name.into(),
            mean: mean(values),
            standard_deviation: sample_std_dev(values),
            median: median(values),
            sample_count: values.len(),
        }
    }

    /// Group label.
    #[must_use]
    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    /// Metric name.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Mean, or `None` when there were no values.
    #[must_use]
    pub const fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// Sample standard deviation, or `None` when fewer than two values.
    #[must_use]
    pub const fn standard_deviation(&self) -> Option<f64> {
        self.standard_deviation
    }

    /// Median, or `None` when there were no values.
    #[must_use]
    pub const fn median(&self) -> Option<f64> {
        self.median
    }

    /// Number of non-missing values that contributed.
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Render with a fixed number of decimals.
    #[must_use]
    pub fn display_with_precision(&self, decimals: u32) -> String {
        format!(
            "{} / {}: mean={} std={} median={} n={}",
            self.group_label,
            self.metric_name,
            format_value(self.mean, decimals),
            format_value(self.standard_deviation, decimals),
            format_value(self.median, decimals),
            self.sample_count
        )
    }
}

impl fmt::Display for SummaryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with_precision(DEFAULT_DISPLAY_PRECISION))
    }
}

/// Summarize each named metric over the members of a group.
///
/// One record per metric name, in the given order. Missing values are skipped;
/// a metric with no values at all yields a record with `sample_count == 0`.
///
/// # Example
///
/// ```
/// use trimstats::{summarize, Group, Observation};
///
/// let observations = vec![
///     Observation::new("A", 1).with_metric("ms", Some(1.0)),
///     Observation::new("A", 2).with_metric("ms", None),
///     Observation::new("A", 3).with_metric("ms", Some(3.0)),
/// ];
/// let group = Group::new("A", observations.iter().collect());
///
/// let records = summarize(&group, &["ms"]);
/// assert_eq!(records[0].sample_count(), 2);
/// assert_eq!(records[0].mean(), Some(2.0));
/// ```
#[must_use]
pub fn summarize<S: AsRef<str>>(group: &Group<'_>, metric_names: &[S]) -> Vec<SummaryRecord> {
    metric_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let values: Vec<f64> = group
                .members()
                .iter()
                .filter_map(|member| member.metric(name))
                .collect();
            SummaryRecord::from_values(group.label(), name, &values)
        })
        .collect()
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N-1 divisor), `None` for fewer than two values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squared / (values.len() - 1) as f64).sqrt())
}

/// Median, averaging the two middle values for even counts.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round half away from zero to `decimals` places.
///
/// Precisions too large for the scale factor (or the scaled value) to stay
/// finite leave the value unrounded.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Fixed-precision text for an optional value; missing renders as `NaN`.
#[must_use]
pub fn format_value(value: Option<f64>, decimals: u32) -> String {
    value.map_or_else(
        || "NaN".to_string(),
        |v| format!("{:.*}", decimals as usize, round_to(v, decimals)),
    )
}
