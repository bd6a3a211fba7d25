//! Property-based tests for trimstats
//!
//! - Test the trimming and summary invariants
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use trimstats::{
    composite_score, ingest, summarize, trim, Group, GroupIndex, Observation, RawValue, Row,
    Schema, TrimPolicy,
};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Composite scores for one group
fn arb_scores(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..1000.0, 0..max_len)
}

/// Metric column with roughly a quarter of the cells missing
fn arb_sparse_values(max_len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    proptest::collection::vec(
        prop_oneof![1 => Just(None), 3 => (0.0f64..100.0).prop_map(Some)],
        0..max_len,
    )
}

fn observations(values: &[Option<f64>]) -> Vec<Observation> {
    values
        .iter()
        .zip(1..)
        .map(|(&value, index)| Observation::new("G", index).with_metric("ms", value))
        .collect()
}

fn scored(scores: &[f64]) -> Vec<Observation> {
    observations(&scores.iter().copied().map(Some).collect::<Vec<_>>())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: only the first row's label is ever needed
    #[test]
    fn prop_forward_fill_uses_first_label(len in 1usize..40, label in "[a-z]{1,8}") {
        let rows: Vec<Row> = (0..len)
            .map(|i| {
                let cell = if i == 0 { RawValue::from(label.as_str()) } else { RawValue::Null };
                Row::new().with("label", cell).with("ms", 1.0)
            })
            .collect();

        let observations = ingest(&rows, &Schema::labels_only(["label"])).unwrap();
        prop_assert_eq!(observations.len(), len);
        prop_assert!(observations.iter().all(|o| o.group_label() == label));
    }

    /// Property: groups below 4 members are returned unchanged
    #[test]
    fn prop_trim_noop_below_threshold(scores in arb_scores(4)) {
        let observations = scored(&scores);
        let group = Group::new("G", observations.iter().collect());
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        prop_assert_eq!(trimmed, group);
    }

    /// Property: groups of 4 or more lose exactly 4 members
    #[test]
    fn prop_trim_cardinality(scores in proptest::collection::vec(0.0f64..1000.0, 4..60)) {
        let observations = scored(&scores);
        let group = Group::new("G", observations.iter().collect());
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        prop_assert_eq!(trimmed.len(), scores.len() - 4);
    }

    /// Property: survivors keep their original relative order
    #[test]
    fn prop_trim_preserves_order(scores in arb_scores(60)) {
        let observations = scored(&scores);
        let group = Group::new("G", observations.iter().collect());
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();
        let indices = trimmed.sequence_indices();
        prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Property: no survivor scores outside the discarded extremes
    #[test]
    fn prop_trim_survivors_between_extremes(scores in proptest::collection::vec(0.0f64..1000.0, 5..60)) {
        let observations = scored(&scores);
        let group = Group::new("G", observations.iter().collect());
        let trimmed = trim(&group, &["ms"], &TrimPolicy::default()).unwrap();

        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        let low = sorted[1];
        let high = sorted[sorted.len() - 2];
        for member in trimmed.members() {
            let score = composite_score(member, &["ms"]).unwrap();
            prop_assert!(score >= low && score <= high);
        }
    }

    /// Property: missing values count toward neither the mean nor the sample count
    #[test]
    fn prop_missing_values_excluded(values in arb_sparse_values(30)) {
        let observations = observations(&values);
        let group = Group::new("G", observations.iter().collect());
        let record = &summarize(&group, &["ms"])[0];

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        prop_assert_eq!(record.sample_count(), present.len());
        if present.is_empty() {
            prop_assert!(record.mean().is_none());
        } else {
            let expected = present.iter().sum::<f64>() / present.len() as f64;
            prop_assert!((record.mean().unwrap() - expected).abs() < 1e-9);
        }
        prop_assert_eq!(record.standard_deviation().is_some(), present.len() > 1);
    }

    /// Property: summarize is deterministic to the bit
    #[test]
    fn prop_summary_deterministic(values in arb_sparse_values(30)) {
        let observations = observations(&values);
        let group = Group::new("G", observations.iter().collect());
        let first = summarize(&group, &["ms"]);
        let second = summarize(&group, &["ms"]);

        let bits = |v: Option<f64>| v.map(f64::to_bits);
        prop_assert_eq!(bits(first[0].mean()), bits(second[0].mean()));
        prop_assert_eq!(
            bits(first[0].standard_deviation()),
            bits(second[0].standard_deviation())
        );
        prop_assert_eq!(first, second);
    }

    /// Property: grouping is a partition in first-occurrence order
    #[test]
    fn prop_grouping_is_partition(labels in proptest::collection::vec("[a-d]", 0..50)) {
        let observations: Vec<Observation> = labels
            .iter()
            .zip(1..)
            .map(|(label, index)| Observation::new(label.clone(), index))
            .collect();
        let index = GroupIndex::build(&observations);
        let groups = index.groups(&observations);

        let total: usize = groups.iter().map(Group::len).sum();
        prop_assert_eq!(total, observations.len());

        let mut first_seen: Vec<&str> = Vec::new();
        for label in &labels {
            if !first_seen.contains(&label.as_str()) {
                first_seen.push(label);
            }
        }
        let group_labels: Vec<&str> = groups.iter().map(Group::label).collect();
        prop_assert_eq!(group_labels, first_seen);
    }
}
