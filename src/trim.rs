//! Outlier trimming by composite score
//!
//! Each group is ranked by [`composite_score`] and the extreme members at both
//! ends are discarded. Survivors keep their original sequence order.
//!
//! ```text
//! scores   [5, 1, 2, 4, 3, 10, 0.5, 9]
//! ranked   0.5 1 | 2 3 4 5 | 9 10
//! kept     [5, 2, 4, 3]          (input order, not score order)
//! ```

use serde::{Deserialize, Serialize};

use crate::group::Group;
use crate::score::composite_score;
use crate::Result;

/// How many members to discard from each end of the score ranking.
///
/// When deserialized, omitted drop counts default to 2 and an omitted
/// `min_group_size` defaults to `drop_lowest + drop_highest`, so
/// `{"drop_lowest": 1, "drop_highest": 1}` equals [`TrimPolicy::symmetric(1)`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialTrimPolicy")]
pub struct TrimPolicy {
    /// Members dropped from the low end
    pub drop_lowest: usize,
    /// Members dropped from the high end
    pub drop_highest: usize,
    /// Groups smaller than this are returned untouched
    pub min_group_size: usize,
}

impl Default for TrimPolicy {
    /// Drop the 2 lowest and 2 highest; skip groups of fewer than 4.
    fn default() -> Self {
        Self::symmetric(2)
    }
}

/// Wire form of [`TrimPolicy`] with every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialTrimPolicy {
    drop_lowest: Option<usize>,
    drop_highest: Option<usize>,
    min_group_size: Option<usize>,
}

impl From<PartialTrimPolicy> for TrimPolicy {
    fn from(partial: PartialTrimPolicy) -> Self {
        let defaults = Self::default();
        let drop_lowest = partial.drop_lowest.unwrap_or(defaults.drop_lowest);
        let drop_highest = partial.drop_highest.unwrap_or(defaults.drop_highest);
        Self {
            drop_lowest,
            drop_highest,
            min_group_size: partial
                .min_group_size
                .unwrap_or_else(|| drop_lowest.saturating_add(drop_highest)),
        }
    }
}

impl TrimPolicy {
    /// Drop `n` from each end; groups with fewer than `2n` members are untouched.
    #[must_use]
    pub const fn symmetric(n: usize) -> Self {
        Self {
            drop_lowest: n,
            drop_highest: n,
            min_group_size: n * 2,
        }
    }

    /// Keep every member.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            drop_lowest: 0,
            drop_highest: 0,
            min_group_size: 0,
        }
    }

    /// True if the policy never discards anything.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.drop_lowest == 0 && self.drop_highest == 0
    }
}

/// What to do when trimming leaves a group with no members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGroupPolicy {
    /// Keep the group; its summaries report no samples
    #[default]
    Allow,
    /// Fail the run with [`Error::EmptyGroup`](crate::Error::EmptyGroup)
    Reject,
}

/// Discard the extreme members of a group by composite score.
///
/// Groups below `policy.min_group_size` come back unchanged and are never
/// scored. Otherwise members are stably sorted by score (ties keep input
/// order), the configured number is cut from each end, and the survivors are
/// returned in their original relative order. If the policy drops more
/// members than the group holds the result is empty.
///
/// # Errors
///
/// Returns [`Error::InsufficientData`](crate::Error::InsufficientData) if any
/// member of a group that needs trimming has none of the scoring metrics.
pub fn trim<'a, S: AsRef<str>>(
    group: &Group<'a>,
    metric_names: &[S],
    policy: &TrimPolicy,
) -> Result<Group<'a>> {
    if policy.is_noop() || group.len() < policy.min_group_size {
        return Ok(group.clone());
    }

    let mut ranked = group
        .members()
        .iter()
        .enumerate()
        .map(|(position, member)| composite_score(member, metric_names).map(|s| (position, s)))
        .collect::<Result<Vec<(usize, f64)>>>()?;

    // Stable: equal scores stay in sequence order
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = ranked.len();
    let low = policy.drop_lowest.min(n);
    let high = n.saturating_sub(policy.drop_highest).max(low);

    let mut kept: Vec<usize> = ranked[low..high].iter().map(|&(position, _)| position).collect();
    kept.sort_unstable();

    let members = kept.into_iter().map(|position| group.members()[position]).collect();
    Ok(Group::new(group.label(), members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;
    use crate::Error;

    fn scored(scores: &[f64]) -> Vec<Observation> {
        scores
            .iter()
            .zip(1..)
            .map(|(&score, index)| Observation::new("A", index).with_metric("ms", Some(score)))
            .collect()
    }

    fn group_of(observations: &[Observation]) -> Group<'_> {
        Group::new("A", observations.iter().collect())
    }

    #[test]
    fn test_drops_extremes_and_keeps_input_order() {
        let observations = scored(&[5.0, 1.0, 2.0, 4.0, 3.0, 10.0, 0.5, 9.0]);
        let group = group_of(&observations);

        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        let scores: Vec<f64> = trimmed
            .members()
            .iter()
            .map(|m| m.metric("ms").unwrap())
            .collect();
        assert_eq!(scores, [5.0, 2.0, 4.0, 3.0]);
        assert_eq!(trimmed.sequence_indices(), [1, 3, 4, 5]);
        assert_eq!(trimmed.label(), "A");
    }

    #[test]
    fn test_small_group_untouched() {
        let observations = scored(&[3.0, 1.0, 2.0]);
        let group = group_of(&observations);
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        assert_eq!(trimmed, group);
    }

    #[test]
    fn test_small_group_not_scored() {
        let observations = vec![Observation::new("A", 1), Observation::new("A", 2)];
        let group = group_of(&observations);
        assert!(trim(&group, &["ms"], &TrimPolicy::default()).is_ok());
    }

    #[test]
    fn test_exactly_four_members_trims_to_empty() {
        let observations = scored(&[1.0, 2.0, 3.0, 4.0]);
        let group = group_of(&observations);
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        assert!(trimmed.is_empty());
    }

    #[test]
    fn test_ties_broken_by_sequence_order() {
        let observations = scored(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let group = group_of(&observations);
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        assert_eq!(trimmed.sequence_indices(), [3, 4]);
    }

    #[test]
    fn test_asymmetric_policy() {
        let observations = scored(&[4.0, 3.0, 2.0, 1.0, 0.0]);
        let group = group_of(&observations);
        let policy = TrimPolicy {
            drop_lowest: 0,
            drop_highest: 1,
            min_group_size: 1,
        };
        let trimmed = trim(&group, &["ms"], &policy).unwrap();
        assert_eq!(trimmed.sequence_indices(), [2, 3, 4, 5]);
    }

    #[test]
    fn test_policy_larger_than_group_yields_empty() {
        let observations = scored(&[1.0, 2.0, 3.0]);
        let group = group_of(&observations);
        let policy = TrimPolicy {
            drop_lowest: 2,
            drop_highest: 2,
            min_group_size: 0,
        };
        assert!(trim(&group, &["ms"], &policy).unwrap().is_empty());
    }

    #[test]
    fn test_none_policy_keeps_everything() {
        let observations = scored(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let group = group_of(&observations);
        let trimmed = trim(&group, &["ms"], &TrimPolicy::none()).unwrap();
        assert_eq!(trimmed.len(), 5);
    }

    #[test]
    fn test_unscorable_member_fails_trim() {
        let mut observations = scored(&[1.0, 2.0, 3.0, 4.0]);
        observations.push(Observation::new("A", 5).with_metric("ms", None));
        let group = group_of(&observations);
        let err = trim(&group, &["ms"], &TrimPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { sequence_index: 5, .. }));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: TrimPolicy = serde_json::from_str(r#"{"drop_highest": 3}"#).unwrap();
        assert_eq!(policy.drop_lowest, 2);
        assert_eq!(policy.drop_highest, 3);
        assert_eq!(policy.min_group_size, 5);

        let policy: TrimPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, TrimPolicy::default());
    }

    #[test]
    fn test_omitted_min_group_size_follows_drop_counts() {
        let policy: TrimPolicy =
            serde_json::from_str(r#"{"drop_lowest": 1, "drop_highest": 1}"#).unwrap();
        assert_eq!(policy, TrimPolicy::symmetric(1));

        let policy: TrimPolicy =
            serde_json::from_str(r#"{"drop_lowest": 1, "drop_highest": 1, "min_group_size": 10}"#)
                .unwrap();
        assert_eq!(policy.min_group_size, 10);
    }

    #[test]
    fn test_policy_json_roundtrip() {
        let policy = TrimPolicy {
            drop_lowest: 0,
            drop_highest: 3,
            min_group_size: 7,
        };
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(serde_json::from_str::<TrimPolicy>(&json).unwrap(), policy);
    }
}
