//! Ranking of composite scores within a year.

use std::collections::BTreeMap;

use gapmap_scoring_models::RankingConvention;

/// Returns the 1-based rank of each score, in input order.
///
/// Ranks ascend with the score under [`RankingConvention::InequalityIndex`]
/// and descend under [`RankingConvention::Leaderboard`]. Equal scores keep
/// their input order, so the result is always a permutation of `1..=N`.
#[must_use]
pub fn rank_scores(scores: &[f64], convention: RankingConvention) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable
    order.sort_by(|&a, &b| {
        let ordering = scores[a].total_cmp(&scores[b]);
        if convention.ranks_ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });

    let mut ranks = vec![0; scores.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = rank_from_position(position);
    }
    ranks
}

/// Share of `total` regions ranked ahead of `rank`, in percent.
#[must_use]
pub fn percentile(rank: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    f64::from(rank.saturating_sub(1)) / total * 100.0
}

/// `previous - current`; positive means the region moved up.
#[must_use]
pub fn rank_delta(previous: Option<u32>, current: u32) -> Option<i64> {
    previous.map(|previous| i64::from(previous) - i64::from(current))
}

/// Ranks a previous year's scores with the same convention, keyed by
/// region id.
#[must_use]
pub fn previous_ranks(
    scores: &BTreeMap<String, f64>,
    convention: RankingConvention,
) -> BTreeMap<String, u32> {
    let values: Vec<f64> = scores.values().copied().collect();
    scores
        .keys()
        .cloned()
        .zip(rank_scores(&values, convention))
        .collect()
}

fn rank_from_position(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_under_inequality_index() {
        let ranks = rank_scores(&[30.0, 10.0, 20.0], RankingConvention::InequalityIndex);
        assert_eq!(ranks, vec![3, 1, 2]);
    }

    #[test]
    fn descending_under_leaderboard() {
        let ranks = rank_scores(&[30.0, 10.0, 20.0], RankingConvention::Leaderboard);
        assert_eq!(ranks, vec![1, 3, 2]);
    }

    #[test]
    fn ties_keep_input_order_and_form_a_permutation() {
        let ranks = rank_scores(&[0.0, 0.0, 0.0, 5.0], RankingConvention::InequalityIndex);
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let ranks = rank_scores(&[5.0, 7.0, 5.0], RankingConvention::Leaderboard);
        assert_eq!(ranks, vec![2, 1, 3]);

        let mut sorted = ranks;
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn percentile_counts_regions_ahead() {
        assert!(percentile(1, 4).abs() < f64::EPSILON);
        assert!((percentile(3, 4) - 50.0).abs() < f64::EPSILON);
        assert!(percentile(1, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn rank_delta_is_positive_when_moving_up() {
        assert_eq!(rank_delta(Some(5), 2), Some(3));
        assert_eq!(rank_delta(Some(1), 4), Some(-3));
        assert_eq!(rank_delta(None, 4), None);
    }

    #[test]
    fn previous_scores_are_ranked_by_region() {
        let scores = BTreeMap::from([
            ("a".to_string(), 80.0),
            ("b".to_string(), 20.0),
            ("c".to_string(), 50.0),
        ]);
        let ranks = previous_ranks(&scores, RankingConvention::InequalityIndex);
        assert_eq!(ranks["a"], 3);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 2);
    }
}
