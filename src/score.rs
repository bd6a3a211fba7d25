//! Composite ranking score

use crate::observation::Observation;
use crate::{Error, Result};

/// Mean of the named metrics that are present on the observation.
///
/// Missing metrics are left out of both the sum and the divisor. The score is
/// only used to rank members for trimming.
///
/// # Errors
///
/// Returns [`Error::InsufficientData`] if none of the named metrics are present.
///
/// # Example
///
/// ```
/// use trimstats::{composite_score, Observation};
///
/// # fn main() -> trimstats::Result<()> {
/// let observation = Observation::new("scan", 1)
///     .with_metric("db_ms", Some(1.0))
///     .with_metric("file_ms", None)
///     .with_metric("memory_ms", Some(3.0));
///
/// let score = composite_score(&observation, &["db_ms", "file_ms", "memory_ms"])?;
/// assert!((score - 2.0).abs() < f64::EPSILON);
/// # Ok(())
/// # }
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn composite_score<S: AsRef<str>>(observation: &Observation, metric_names: &[S]) -> Result<f64> {
    let (sum, count) = metric_names
        .iter()
        .filter_map(|name| observation.metric(name.as_ref()))
        .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        return Err(Error::InsufficientData {
            group_label: observation.group_label().to_string(),
            sequence_index: observation.sequence_index(),
        });
    }

    Ok(sum / count as f64)
}
