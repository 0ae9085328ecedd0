//! Stack summaries of several sample-size tiers.
use super::table::{StackedSummary, SummaryTable};

/// Label of the `i`-th tier (0-based): `"10 samples:"`, `"20 samples:"`, …
pub fn tier_label(i: usize) -> String {
    format!("{} samples:", (i + 1) * 10)
}

/// Stack `(rates, nulls)` pairs, one per sample-size tier.
///
/// The pair at position `i` is labelled [`tier_label(i)`](tier_label). The returned tables
/// hold the rows of every tier keyed by `(tier, row)`, with the union of the columns.
pub fn summarize_across_samples(
    pairs: &[(SummaryTable, SummaryTable)],
) -> (StackedSummary, StackedSummary) {
    let mut scores = StackedSummary::new();
    let mut nulls = StackedSummary::new();
    for (i, (rates, null_table)) in pairs.iter().enumerate() {
        let tier = tier_label(i);
        scores.push_tier(&tier, rates);
        nulls.push_tier(&tier, null_table);
    }
    (scores, nulls)
}

#[cfg(test)]
mod samples_test {
    use super::*;
    use crate::scoring::{summarize_hit_rate, Grade, ScoreSheet, NON_NULL_ROW};

    fn pair(grades: Vec<Grade>) -> (SummaryTable, SummaryTable) {
        let ids = (0..grades.len()).map(|i| i.to_string()).collect();
        let mut sheet = ScoreSheet::new(ids);
        sheet.push_column("PDM1_g", grades).unwrap();
        summarize_hit_rate(&sheet, &["Wrong", "Right"]).unwrap()
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(tier_label(0), "10 samples:");
        assert_eq!(tier_label(4), "50 samples:");
    }

    #[test]
    fn test_stack_two_tiers() {
        let pairs = [
            pair(vec![Grade::Criterion(1), Grade::Null]),
            pair(vec![Grade::Criterion(0), Grade::Criterion(1)]),
        ];
        let (scores, nulls) = summarize_across_samples(&pairs);
        assert_eq!(scores.keys().len(), 4);
        assert_eq!(scores.get("10 samples:", "Right", "PDM1_g"), Some(1.0));
        assert_eq!(scores.get("20 samples:", "Right", "PDM1_g"), Some(0.5));
        assert_eq!(nulls.get("10 samples:", NON_NULL_ROW, "PDM1_g"), Some(0.5));
        assert_eq!(nulls.tiers(), vec!["10 samples:", "20 samples:"]);
    }
}
