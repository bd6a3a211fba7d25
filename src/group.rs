//! Partitioning observations by group label
//!
//! Observations stay in one flat, owned `Vec`. [`GroupIndex`] maps each label
//! to the positions of its members, and [`Group`] is a borrowed view over
//! those members, so trimming never copies an observation.

use rustc_hash::FxHashMap;

use crate::observation::Observation;

/// Label to member positions, with labels kept in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    order: Vec<String>,
    positions: FxHashMap<String, Vec<usize>>,
}

impl GroupIndex {
    /// Build the index with a single pass over the observations.
    #[must_use]
    pub fn build(observations: &[Observation]) -> Self {
        let mut index = Self::default();
        for (position, observation) in observations.iter().enumerate() {
            let label = observation.group_label();
            if let Some(members) = index.positions.get_mut(label) {
                members.push(position);
            } else {
                index.order.push(label.to_string());
                index.positions.insert(label.to_string(), vec![position]);
            }
        }
        index
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no observations were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Labels in first-occurrence order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Member positions for a label, in input order.
    #[must_use]
    pub fn positions(&self, label: &str) -> Option<&[usize]> {
        self.positions.get(label).map(Vec::as_slice)
    }

    /// Materialize borrowed groups over the indexed observations.
    ///
    /// `observations` must be the slice the index was built from.
    #[must_use]
    pub fn groups<'a>(&'a self, observations: &'a [Observation]) -> Vec<Group<'a>> {
        self.order
            .iter()
            .map(|label| {
                let members = self.positions[label]
                    .iter()
                    .map(|&position| &observations[position])
                    .collect();
                Group::new(label, members)
            })
            .collect()
    }
}

/// All observations sharing a label, in their original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    label: &'a str,
    members: Vec<&'a Observation>,
}

impl<'a> Group<'a> {
    /// Create a group view.
    #[must_use]
    pub fn new(label: &'a str, members: Vec<&'a Observation>) -> Self {
        Self { label, members }
    }

    /// Group label.
    #[must_use]
    pub const fn label(&self) -> &'a str {
        self.label
    }

    /// Members in sequence order.
    #[must_use]
    pub fn members(&self) -> &[&'a Observation] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sequence indices of the members, in member order.
    #[must_use]
    pub fn sequence_indices(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.sequence_index()).collect()
    }
}
