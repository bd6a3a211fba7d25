//! Error types for trimstats
//!
//! Missing metric values are not errors: they are carried as `None` and
//! excluded from scores and summaries. Only structural problems surface here.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trimstats error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input rows are structurally unusable (no leading label, missing sequence column, ...)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// No timing metric was present on an observation, so it cannot be ranked
    #[error("Insufficient data: observation {sequence_index} in group '{group_label}' has none of the composite-score metrics\nCheck the timing metric names against the row columns")]
    InsufficientData {
        /// Label of the group the observation belongs to
        group_label: String,
        /// Sequence index of the offending observation
        sequence_index: i64,
    },

    /// Trimming discarded every member of a group and the policy rejects empty groups
    #[error("Group '{0}' is empty after trimming\nUse a smaller trim policy or EmptyGroupPolicy::Allow")]
    EmptyGroup(String),

    /// Pipeline configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON decoding error (rows or configuration)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
