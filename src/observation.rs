//! Row ingestion: label forward-fill and metric coercion
//!
//! Benchmark tables are usually written with the group label only on the first
//! row of each block:
//!
//! ```text
//! test_type            round  db_ms  file_ms
//! "Exact Query"        1      0.366  2.400
//! null                 2      0.044  2.522   <- same group as the row above
//! ```
//!
//! [`ingest`] resolves those gaps with a single linear scan and turns every
//! other column into an optional `f64`. Unparsable cells become `None`; they
//! never fail the ingest.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Separator used when a group label is built from several label columns.
pub const LABEL_SEPARATOR: &str = " / ";

/// A raw cell value as it appears in an input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Empty cell
    Null,
    /// Boolean cell (never a usable metric)
    Bool(bool),
    /// Numeric cell
    Number(f64),
    /// Text cell; parsed on demand
    Text(String),
}

impl RawValue {
    /// Coerce the cell to a metric value.
    ///
    /// Returns `None` for null, booleans, non-finite numbers, and text that
    /// does not parse as a float.
    #[must_use]
    pub fn as_metric(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Interpret the cell as a group label.
    ///
    /// Blank text counts as missing, the same way an empty CSV cell does.
    #[must_use]
    pub fn as_label(&self) -> Option<String> {
        match self {
            Self::Text(text) if !text.trim().is_empty() => Some(text.clone()),
            Self::Number(value) if value.is_finite() => Some(format_number(*value)),
            Self::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Interpret the cell as an integral sequence index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_index(&self) -> Option<i64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => {
                let text = text.trim();
                if let Ok(index) = text.parse::<i64>() {
                    return Some(index);
                }
                text.parse::<f64>().ok()?
            }
            Self::Null | Self::Bool(_) => return None,
        };
        (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then(|| value as i64)
    }

    /// True for the null placeholder.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One input row: column name to raw cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, RawValue>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell, replacing any previous value for the column.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    /// Set a cell in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RawValue>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Get a cell by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.cells.get(column)
    }

    /// Iterate over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.cells.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Number of cells in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Decode a JSON array of objects into rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not valid JSON and
    /// [`Error::MalformedInput`] if it is not an array of objects.
    ///
    /// # Example
    ///
    /// ```
    /// use trimstats::Row;
    ///
    /// # fn main() -> trimstats::Result<()> {
    /// let rows = Row::parse_json_array(r#"[{"test": "scan", "ms": 1.5}, {"test": null, "ms": "n/a"}]"#)?;
    /// assert_eq!(rows.len(), 2);
    /// assert!(rows[1].get("test").unwrap().is_null());
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse_json_array(text: &str) -> Result<Vec<Self>> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let serde_json::Value::Array(items) = value else {
            return Err(Error::MalformedInput(
                "expected a JSON array of row objects".to_string(),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                if !item.is_object() {
                    return Err(Error::MalformedInput(format!(
                        "row {position} is not a JSON object"
                    )));
                }
                Ok(serde_json::from_value(item)?)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

/// Which columns of a row carry structure rather than measurements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Columns forming the group label (forward-filled independently)
    pub label_columns: Vec<String>,
    /// Column holding the trial/round number; `None` numbers rows per group from 1
    pub sequence_column: Option<String>,
}

impl Schema {
    /// Schema with a single label column and an explicit sequence column.
    #[must_use]
    pub fn new(label_column: impl Into<String>, sequence_column: impl Into<String>) -> Self {
        Self {
            label_columns: vec![label_column.into()],
            sequence_column: Some(sequence_column.into()),
        }
    }

    /// Schema with label columns only; rows are numbered within their group.
    #[must_use]
    pub fn labels_only<I, S>(label_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label_columns: label_columns.into_iter().map(Into::into).collect(),
            sequence_column: None,
        }
    }

    fn is_structural(&self, column: &str) -> bool {
        self.sequence_column.as_deref() == Some(column)
            || self.label_columns.iter().any(|label| label == column)
    }
}

/// One measurement unit after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    group_label: String,
    sequence_index: i64,
    metrics: BTreeMap<String, Option<f64>>,
}

impl Observation {
    /// Create an observation with no metrics.
    #[must_use]
    pub fn new(group_label: impl Into<String>, sequence_index: i64) -> Self {
        Self {
            group_label: group_label.into(),
            sequence_index,
            metrics: BTreeMap::new(),
        }
    }

    /// Add a metric value (`None` marks it missing).
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Group label.
    #[must_use]
    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    /// Position within the group (trial or round number).
    #[must_use]
    pub const fn sequence_index(&self) -> i64 {
        self.sequence_index
    }

    /// Metric value, or `None` if the metric is absent or missing.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().flatten()
    }

    /// All metrics including missing markers, in name order.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, Option<f64>> {
        &self.metrics
    }
}

/// Turn ordered rows into observations, forward-filling the group label.
///
/// Every non-structural column becomes a metric. A cell that is absent or does
/// not parse as a number becomes a missing marker for that observation.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the first row lacks a value for any
/// label column, if a sequence column is configured and a row has no
/// integral value for it, or if a schema with several label columns meets a
/// label value containing [`LABEL_SEPARATOR`].
pub fn ingest(rows: &[Row], schema: &Schema) -> Result<Vec<Observation>> {
    if schema.label_columns.is_empty() {
        return Err(Error::MalformedInput(
            "at least one label column is required".to_string(),
        ));
    }

    let compound = schema.label_columns.len() > 1;
    let mut carried: Vec<Option<String>> = vec![None; schema.label_columns.len()];
    let mut ordinals: FxHashMap<String, i64> = FxHashMap::default();
    let mut observations = Vec::with_capacity(rows.len());

    for (position, row) in rows.iter().enumerate() {
        for (slot, column) in carried.iter_mut().zip(&schema.label_columns) {
            if let Some(label) = row.get(column).and_then(RawValue::as_label) {
                // Joined labels must stay unique per key tuple
                if compound && label.contains(LABEL_SEPARATOR) {
                    return Err(Error::MalformedInput(format!(
                        "row {position} label column '{column}' value '{label}' contains the separator '{LABEL_SEPARATOR}' used to join multi-column labels"
                    )));
                }
                *slot = Some(label);
            } else if slot.is_none() {
                return Err(Error::MalformedInput(format!(
                    "row {position} has no value for label column '{column}' and no earlier row to carry it from"
                )));
            }
        }

        let group_label = carried
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LABEL_SEPARATOR);

        let sequence_index = if let Some(column) = &schema.sequence_column {
            row.get(column).and_then(RawValue::as_index).ok_or_else(|| {
                Error::MalformedInput(format!(
                    "row {position} has no integral value for sequence column '{column}'"
                ))
            })?
        } else {
            let ordinal = ordinals.entry(group_label.clone()).or_insert(0);
            *ordinal += 1;
            *ordinal
        };

        let metrics = row
            .iter()
            .filter(|(column, _)| !schema.is_structural(column))
            .map(|(column, value)| (column.to_string(), value.as_metric()))
            .collect();

        observations.push(Observation {
            group_label,
            sequence_index,
            metrics,
        });
    }

    debug!(observations = observations.len(), "ingested rows");
    Ok(observations)
}

/// Drop observations missing any of the required metrics.
///
/// Order of the surviving observations is preserved.
#[must_use]
pub fn retain_complete<S: AsRef<str>>(
    observations: Vec<Observation>,
    required: &[S],
) -> Vec<Observation> {
    if required.is_empty() {
        return observations;
    }

    let before = observations.len();
    let kept: Vec<Observation> = observations
        .into_iter()
        .filter(|observation| {
            required
                .iter()
                .all(|name| observation.metric(name.as_ref()).is_some())
        })
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        warn!(dropped, kept = kept.len(), "dropped rows missing required metrics");
    }
    kept
}
