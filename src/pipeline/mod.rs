//! End-to-end pipeline: ingest, group, trim, summarize
//!
//! ```text
//! rows ──ingest──> observations ──GroupIndex──> groups
//!                                                 │  (independent, optionally parallel)
//!                                                 ├── trim ── summarize
//!                                                 └── trim ── summarize
//!                                                 │
//!                 SummaryRecord* (label first-occurrence order, then metric order)
//! ```
//!
//! Groups share no state, so with the `rayon` feature they are processed on
//! the rayon pool. Output order never depends on scheduling.

mod config;

pub use config::PipelineConfig;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::group::{Group, GroupIndex};
use crate::observation::{ingest, retain_complete, Row};
use crate::summary::{summarize, SummaryRecord};
use crate::table::SummaryTable;
use crate::trim::{trim, EmptyGroupPolicy, TrimPolicy};
use crate::{Error, Result};

/// Member counts of one group before and after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrimOutcome {
    /// Group label
    pub group_label: String,
    /// Members before trimming
    pub before: usize,
    /// Members retained
    pub after: usize,
}

impl TrimOutcome {
    /// Members discarded by trimming.
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.before - self.after
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    summaries: Vec<SummaryRecord>,
    trim_outcomes: Vec<TrimOutcome>,
    dropped_rows: usize,
    display_precision: u32,
}

impl PipelineReport {
    /// Summary records, grouped by label in first-occurrence order.
    #[must_use]
    pub fn summaries(&self) -> &[SummaryRecord] {
        &self.summaries
    }

    /// Take ownership of the summary records.
    #[must_use]
    pub fn into_summaries(self) -> Vec<SummaryRecord> {
        self.summaries
    }

    /// Per-group trim counts, in first-occurrence order.
    #[must_use]
    pub fn trim_outcomes(&self) -> &[TrimOutcome] {
        &self.trim_outcomes
    }

    /// Rows removed for missing required metrics.
    #[must_use]
    pub const fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Pivot the summaries into a label x metric table.
    #[must_use]
    pub fn table(&self) -> SummaryTable {
        SummaryTable::from_records(self.summaries.clone())
    }

    /// Render the summary table at the configured precision.
    #[must_use]
    pub fn render(&self) -> String {
        self.table().render(self.display_precision)
    }
}

/// Configured, validated pipeline.
///
/// # Example
///
/// ```
/// use trimstats::{Pipeline, Row};
///
/// # fn main() -> trimstats::Result<()> {
/// let pipeline = Pipeline::builder()
///     .label_column("test_type")
///     .sequence_column("round_num")
///     .timing_metrics(["db_ms", "file_ms"])
///     .build()?;
///
/// let rows: Vec<Row> = (1..=6)
///     .map(|round| {
///         Row::new()
///             .with("test_type", if round == 1 { Some("scan") } else { None })
///             .with("round_num", round)
///             .with("db_ms", f64::from(round))
///             .with("file_ms", f64::from(round) * 2.0)
///     })
///     .collect();
///
/// let report = pipeline.run(&rows)?;
/// assert_eq!(report.trim_outcomes()[0].after, 2);
/// assert_eq!(report.summaries()[0].mean(), Some(3.5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Wrap an existing configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over ordered rows.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] from ingestion (fails the whole run)
    /// - [`Error::InsufficientData`] if a member of a trimmed group cannot be scored
    /// - [`Error::EmptyGroup`] if a group trims to nothing under [`EmptyGroupPolicy::Reject`]
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: &[Row]) -> Result<PipelineReport> {
        let observations = ingest(rows, &self.config.schema())?;
        let ingested = observations.len();
        let observations = retain_complete(observations, &self.config.required_metrics);
        let dropped_rows = ingested - observations.len();

        let index = GroupIndex::build(&observations);
        let groups = index.groups(&observations);
        debug!(groups = groups.len(), observations = observations.len(), "partitioned");

        let processed = self.process_groups(&groups)?;

        let mut summaries = Vec::with_capacity(processed.iter().map(|(_, s)| s.len()).sum());
        let mut trim_outcomes = Vec::with_capacity(processed.len());
        for (outcome, records) in processed {
            trim_outcomes.push(outcome);
            summaries.extend(records);
        }

        info!(
            groups = trim_outcomes.len(),
            records = summaries.len(),
            dropped_rows,
            "pipeline complete"
        );

        Ok(PipelineReport {
            summaries,
            trim_outcomes,
            dropped_rows,
            display_precision: self.config.display_precision,
        })
    }

    #[cfg(feature = "rayon")]
    fn process_groups(&self, groups: &[Group<'_>]) -> Result<Vec<(TrimOutcome, Vec<SummaryRecord>)>> {
        use rayon::prelude::*;

        // Indexed collect keeps first-occurrence order
        groups.par_iter().map(|group| self.process_group(group)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn process_groups(&self, groups: &[Group<'_>]) -> Result<Vec<(TrimOutcome, Vec<SummaryRecord>)>> {
        groups.iter().map(|group| self.process_group(group)).collect()
    }

    fn process_group(&self, group: &Group<'_>) -> Result<(TrimOutcome, Vec<SummaryRecord>)> {
        let trimmed = trim(group, &self.config.timing_metrics, &self.config.trim_policy)?;

        if trimmed.is_empty() && !group.is_empty() {
            match self.config.empty_group_policy {
                EmptyGroupPolicy::Reject => return Err(Error::EmptyGroup(group.label().to_string())),
                EmptyGroupPolicy::Allow => warn!(
                    group = group.label(),
                    members = group.len(),
                    "trimming discarded every member"
                ),
            }
        }

        debug!(
            group = group.label(),
            before = group.len(),
            after = trimmed.len(),
            "trimmed"
        );

        let outcome = TrimOutcome {
            group_label: group.label().to_string(),
            before: group.len(),
            after: trimmed.len(),
        };
        Ok((outcome, summarize(&trimmed, self.config.summary_metrics())))
    }
}

/// Pipeline builder
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Append a label column
    #[must_use]
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.config.label_columns.push(column.into());
        self
    }

    /// Replace the label columns
    #[must_use]
    pub fn label_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.label_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the trial/round column
    #[must_use]
    pub fn sequence_column(mut self, column: impl Into<String>) -> Self {
        self.config.sequence_column = Some(column.into());
        self
    }

    /// Set the metrics averaged into the trimming score
    #[must_use]
    pub fn timing_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.timing_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Set the metrics to summarize (defaults to the timing metrics)
    #[must_use]
    pub fn summary_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.summary_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Drop rows missing any of these metrics before grouping
    #[must_use]
    pub fn required_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.required_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Set the trim policy
    #[must_use]
    pub const fn trim_policy(mut self, policy: TrimPolicy) -> Self {
        self.config.trim_policy = policy;
        self
    }

    /// Set the empty-group policy
    #[must_use]
    pub const fn empty_group_policy(mut self, policy: EmptyGroupPolicy) -> Self {
        self.config.empty_group_policy = policy;
        self
    }

    /// Set the display precision for rendered output
    #[must_use]
    pub const fn display_precision(mut self, decimals: u32) -> Self {
        self.config.display_precision = decimals;
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is inconsistent
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::from_config(self.config)
    }
}

/// Run the pipeline once with the given configuration.
///
/// Convenience wrapper over [`Pipeline::run`] returning only the summaries.
///
/// # Errors
///
/// Same as [`Pipeline::from_config`] and [`Pipeline::run`].
pub fn run_pipeline(rows: &[Row], config: &PipelineConfig) -> Result<Vec<SummaryRecord>> {
    Ok(Pipeline::from_config(config.clone())?.run(rows)?.into_summaries())
}
