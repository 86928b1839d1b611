//! Weighted aggregation of scaled indicator scores.

use std::collections::BTreeMap;

use gapmap_indicator_models::IndicatorCategory;

use crate::ScoringError;

/// One indicator's scaled score and weight for a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Category of the indicator.
    pub category: IndicatorCategory,
    /// Scaled score, 0-100.
    pub score: f64,
    /// Effective weight.
    pub weight: f64,
}

/// `Σ(score · weight) / Σ(weight)` over `contributions`.
///
/// # Errors
///
/// Returns [`ScoringError::InsufficientData`] if there are no contributions
/// or their weights sum to zero.
pub fn weighted_mean(contributions: &[Contribution]) -> Result<f64, ScoringError> {
    if contributions.is_empty() {
        return Err(ScoringError::insufficient("no indicator has data"));
    }
    let (sum, weight_sum) = contributions
        .iter()
        .fold((0.0, 0.0), |(sum, weight_sum), c| {
            (c.score.mul_add(c.weight, sum), weight_sum + c.weight)
        });
    if weight_sum <= 0.0 {
        return Err(ScoringError::insufficient(
            "every indicator with data has zero weight",
        ));
    }
    Ok((sum / weight_sum).clamp(0.0, 100.0))
}

/// Weighted mean per category. Categories whose contributions are missing
/// or carry zero total weight are omitted.
#[must_use]
pub fn category_scores(contributions: &[Contribution]) -> BTreeMap<IndicatorCategory, f64> {
    IndicatorCategory::all()
        .iter()
        .filter_map(|category| {
            let subset: Vec<Contribution> = contributions
                .iter()
                .filter(|c| c.category == *category)
                .copied()
                .collect();
            weighted_mean(&subset).ok().map(|score| (*category, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(category: IndicatorCategory, score: f64, weight: f64) -> Contribution {
        Contribution {
            category,
            score,
            weight,
        }
    }

    #[test]
    fn single_indicator_composite_equals_score() {
        let v = weighted_mean(&[c(IndicatorCategory::Social, 50.0, 1.0)]).unwrap();
        assert!((v - 50.0).abs() < 1e-9);
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        let v = weighted_mean(&[
            c(IndicatorCategory::Social, 100.0, 3.0),
            c(IndicatorCategory::Labor, 0.0, 1.0),
        ])
        .unwrap();
        assert!((v - 75.0).abs() < 1e-9);
    }

    #[test]
    fn no_data_is_insufficient_not_zero() {
        assert!(matches!(
            weighted_mean(&[]),
            Err(ScoringError::InsufficientData { .. })
        ));
        assert!(matches!(
            weighted_mean(&[c(IndicatorCategory::Social, 40.0, 0.0)]),
            Err(ScoringError::InsufficientData { .. })
        ));
    }

    #[test]
    fn category_scores_skip_empty_categories() {
        let scores = category_scores(&[
            c(IndicatorCategory::Social, 20.0, 1.0),
            c(IndicatorCategory::Social, 40.0, 1.0),
            c(IndicatorCategory::Economic, 90.0, 0.0),
        ]);
        assert_eq!(scores.len(), 1);
        assert!((scores[&IndicatorCategory::Social] - 30.0).abs() < 1e-9);
    }
}
