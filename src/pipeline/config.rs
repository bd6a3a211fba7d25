//! Pipeline configuration

use serde::{Deserialize, Serialize};

use crate::observation::Schema;
use crate::summary::DEFAULT_DISPLAY_PRECISION;
use crate::trim::{EmptyGroupPolicy, TrimPolicy};
use crate::{Error, Result};

/// Largest accepted `display_precision`; `f64` carries no more significant decimals.
pub const MAX_DISPLAY_PRECISION: u32 = 15;

/// Everything a pipeline run needs besides the rows themselves.
///
/// Loadable from JSON; omitted fields take their defaults.
///
/// ```
/// use trimstats::PipelineConfig;
///
/// # fn main() -> trimstats::Result<()> {
/// let config = PipelineConfig::from_json_str(r#"{
///     "label_columns": ["DB", "Clients"],
///     "timing_metrics": ["Latency_Avg_ms"],
///     "summary_metrics": ["TPS", "Latency_Avg_ms"],
///     "required_metrics": ["TPS", "Latency_Avg_ms"]
/// }"#)?;
/// assert_eq!(config.trim_policy.drop_lowest, 2);
/// assert_eq!(config.display_precision, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns forming the group label
    pub label_columns: Vec<String>,
    /// Trial/round column; `None` numbers rows within each group
    pub sequence_column: Option<String>,
    /// Metrics averaged into the composite trimming score
    pub timing_metrics: Vec<String>,
    /// Metrics to summarize; empty means the timing metrics
    pub summary_metrics: Vec<String>,
    /// Rows lacking any of these are dropped before grouping
    pub required_metrics: Vec<String>,
    /// Members discarded from each end of the ranking
    pub trim_policy: TrimPolicy,
    /// Behavior for groups trimmed to nothing
    pub empty_group_policy: EmptyGroupPolicy,
    /// Decimal places for rendered output
    pub display_precision: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label_columns: Vec::new(),
            sequence_column: None,
            timing_metrics: Vec::new(),
            summary_metrics: Vec::new(),
            required_metrics: Vec::new(),
            trim_policy: TrimPolicy::default(),
            empty_group_policy: EmptyGroupPolicy::default(),
            display_precision: DEFAULT_DISPLAY_PRECISION,
        }
    }
}

fn ensure_unique(kind: &str, names: &[String]) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(Error::InvalidConfig(format!(
                "{kind} metric '{name}' is listed twice"
            )));
        }
    }
    Ok(())
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed JSON and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when there is no label column, when the
    /// trim policy needs scoring but no timing metrics are given, when there is
    /// nothing to summarize, when a timing or summary metric is listed twice,
    /// when a metric (timing, summary or required) is also a structural
    /// column, or when the display precision exceeds [`MAX_DISPLAY_PRECISION`].
    pub fn validate(&self) -> Result<()> {
        if self.label_columns.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one label column is required".to_string(),
            ));
        }

        if !self.trim_policy.is_noop() && self.timing_metrics.is_empty() {
            return Err(Error::InvalidConfig(
                "trim policy discards members but no timing metrics are set for scoring".to_string(),
            ));
        }

        let summary = self.summary_metrics();
        if summary.is_empty() {
            return Err(Error::InvalidConfig("no metrics to summarize".to_string()));
        }

        ensure_unique("timing", &self.timing_metrics)?;
        ensure_unique("summary", summary)?;

        let structural = self
            .label_columns
            .iter()
            .chain(self.sequence_column.as_ref());
        for column in structural {
            if summary.contains(column)
                || self.timing_metrics.contains(column)
                || self.required_metrics.contains(column)
            {
                return Err(Error::InvalidConfig(format!(
                    "column '{column}' is a label/sequence column and cannot also be a metric"
                )));
            }
        }

        if self.display_precision > MAX_DISPLAY_PRECISION {
            return Err(Error::InvalidConfig(format!(
                "display precision {} exceeds the maximum of {MAX_DISPLAY_PRECISION} decimals",
                self.display_precision
            )));
        }

        Ok(())
    }

    /// Metrics to summarize, falling back to the timing metrics.
    #[must_use]
    pub fn summary_metrics(&self) -> &[String] {
        if self.summary_metrics.is_empty() {
            &self.timing_metrics
        } else {
            &self.summary_metrics
        }
    }

    /// Structural columns for ingestion.
    #[must_use]
    pub fn schema(&self) -> Schema {
        Schema {
            label_columns: self.label_columns.clone(),
            sequence_column: self.sequence_column.clone(),
        }
    }
}
