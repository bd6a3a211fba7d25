//! # trimstats: Outlier-Trimmed Grouped Statistics
//!
//! Turns raw per-trial benchmark measurements into per-group descriptive
//! statistics after discarding the most extreme trials.
//!
//! ## Pipeline
//!
//! 1. **Ingest**: forward-fill group labels, coerce cells to `f64` (bad cells become missing)
//! 2. **Group**: partition by label, first-occurrence order
//! 3. **Trim**: rank each group by the mean of its timing metrics, drop the 2 lowest and 2 highest
//! 4. **Summarize**: mean, sample standard deviation and median per metric
//!
//! ## Design Principles
//!
//! - **Jidoka**: structural input problems stop the run; missing values never do
//! - **Muda elimination**: observations live in one `Vec`, groups borrow them
//! - **Heijunka**: independent groups spread over the rayon pool (feature `rayon`)
//!
//! ## Example Usage
//!
//! ```rust
//! use trimstats::{Pipeline, Row};
//!
//! # fn main() -> trimstats::Result<()> {
//! let rows = Row::parse_json_array(r#"[
//!     {"test_type": "Exact Query", "round_num": 1, "db_ms": 0.366, "file_ms": 2.400},
//!     {"test_type": null,          "round_num": 2, "db_ms": 0.044, "file_ms": 2.522},
//!     {"test_type": null,          "round_num": 3, "db_ms": 0.041, "file_ms": "n/a"}
//! ]"#)?;
//!
//! let pipeline = Pipeline::builder()
//!     .label_column("test_type")
//!     .sequence_column("round_num")
//!     .timing_metrics(["db_ms", "file_ms"])
//!     .build()?;
//!
//! let report = pipeline.run(&rows)?;
//! let file = report.table().get("Exact Query", "file_ms").cloned().unwrap();
//! assert_eq!(file.sample_count(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod group;
pub mod observation;
pub mod pipeline;
pub mod score;
pub mod summary;
pub mod table;
pub mod trim;

pub use error::{Error, Result};
pub use group::{Group, GroupIndex};
pub use observation::{ingest, retain_complete, Observation, RawValue, Row, Schema};
pub use pipeline::{run_pipeline, Pipeline, PipelineBuilder, PipelineConfig, PipelineReport, TrimOutcome};
pub use score::composite_score;
pub use summary::{summarize, SummaryRecord};
pub use table::SummaryTable;
pub use trim::{trim, EmptyGroupPolicy, TrimPolicy};
