//! Dispersion statistics and gap-from-average.

use gapmap_scoring_models::{GapAnalysis, GapLevel, RegionGap};

use crate::ScoringError;

/// Computes the national average, dispersion and per-region gaps for one
/// year's `(region_id, score)` pairs.
///
/// # Errors
///
/// Returns [`ScoringError::InsufficientData`] if `scores` is empty.
pub fn analyze_gaps(year: i32, scores: &[(String, f64)]) -> Result<GapAnalysis, ScoringError> {
    if scores.is_empty() {
        return Err(ScoringError::insufficient(format!(
            "no scores to analyze for {year}"
        )));
    }

    #[allow(clippy::cast_precision_loss)]
    let n = scores.len() as f64;
    let mean = scores.iter().map(|(_, s)| s).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|(_, s)| (s - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_deviation = variance.sqrt();

    let min_score = scores.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
    let max_score = scores
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);

    let coefficient_of_variation = coefficient_of_variation(mean, std_deviation);

    Ok(GapAnalysis {
        year,
        region_count: scores.len(),
        national_average: mean,
        std_deviation,
        coefficient_of_variation,
        min_score,
        max_score,
        gap_range: max_score - min_score,
        level: GapLevel::from_cv(coefficient_of_variation),
        region_gaps: scores
            .iter()
            .map(|(region_id, score)| RegionGap {
                region_id: region_id.clone(),
                score: *score,
                gap_from_average: score - mean,
            })
            .collect(),
    })
}

/// `std / mean`; 0 when there is no dispersion, `None` when the mean is 0
/// and there is.
#[must_use]
pub fn coefficient_of_variation(mean: f64, std_deviation: f64) -> Option<f64> {
    if std_deviation.abs() < f64::EPSILON {
        Some(0.0)
    } else if mean.abs() < f64::EPSILON {
        None
    } else {
        Some(std_deviation / mean)
    }
}
