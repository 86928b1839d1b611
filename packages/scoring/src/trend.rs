//! Year-over-year change classification.

use std::collections::BTreeMap;

use gapmap_indicator_models::Direction;
use gapmap_scoring_models::{PeriodComparison, RegionChange, TrendDirection, TrendPoint};

use crate::ScoringError;

/// Classifies a change of `delta` for a metric with `direction`.
///
/// Changes whose magnitude does not exceed `stable_band` are stable, so a
/// delta of exactly zero is always stable.
#[must_use]
pub fn classify_change(delta: f64, direction: Direction, stable_band: f64) -> TrendDirection {
    if delta.abs() <= stable_band.max(0.0) {
        TrendDirection::Stable
    } else if direction.is_favorable(delta) {
        TrendDirection::Improving
    } else {
        TrendDirection::Worsening
    }
}

/// Builds the trend point between two observations.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn trend_point(
    (year_from, value_from): (i32, f64),
    (year_to, value_to): (i32, f64),
    direction: Direction,
    stable_band: f64,
) -> TrendPoint {
    let change_absolute = value_to - value_from;
    let change_percent = if value_from == 0.0 {
        None
    } else {
        Some(change_absolute / value_from.abs() * 100.0)
    };
    let classified = classify_change(change_absolute, direction, stable_band);

    TrendPoint {
        year_from,
        year_to,
        value_from,
        value_to,
        change_absolute,
        change_percent,
        direction: classified,
        is_significant: classified != TrendDirection::Stable,
    }
}

/// Computes one trend point per consecutive pair of a `(year, value)`
/// series. The series may be given in any order.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidInput`] if a year appears more than once
/// or a value is not finite.
pub fn analyze_series(
    series: &[(i32, f64)],
    direction: Direction,
    stable_band: f64,
) -> Result<Vec<TrendPoint>, ScoringError> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|(year, _)| *year);

    if let Some((year, value)) = sorted.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ScoringError::invalid(format!(
            "value {value} for {year} is not a finite number"
        )));
    }
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(ScoringError::invalid(format!(
            "year {} appears more than once in the series",
            pair[0].0
        )));
    }

    Ok(sorted
        .windows(2)
        .map(|pair| trend_point(pair[0], pair[1], direction, stable_band))
        .collect())
}

/// Compares every region present in both years.
///
/// `names` supplies optional display names. Regions present in only one
/// year are skipped.
#[must_use]
pub fn compare_periods(
    (year_from, values_from): (i32, &BTreeMap<String, f64>),
    (year_to, values_to): (i32, &BTreeMap<String, f64>),
    names: &BTreeMap<String, String>,
    direction: Direction,
    stable_band: f64,
) -> PeriodComparison {
    let changes: Vec<RegionChange> = values_from
        .iter()
        .filter_map(|(region_id, from)| {
            values_to.get(region_id).map(|to| RegionChange {
                region_id: region_id.clone(),
                region_name: names.get(region_id).cloned(),
                trend: trend_point(
                    (year_from, *from),
                    (year_to, *to),
                    direction,
                    stable_band,
                ),
            })
        })
        .collect();

    let count = |wanted: TrendDirection| {
        changes
            .iter()
            .filter(|c| c.trend.direction == wanted)
            .count()
    };

    PeriodComparison {
        year_from,
        year_to,
        improved: count(TrendDirection::Improving),
        worsened: count(TrendDirection::Worsening),
        stable: count(TrendDirection::Stable),
        biggest_improvement: largest_change(&changes, TrendDirection::Improving),
        biggest_decline: largest_change(&changes, TrendDirection::Worsening),
        changes,
    }
}

/// First region with the largest absolute change in `wanted` direction.
fn largest_change(changes: &[RegionChange], wanted: TrendDirection) -> Option<RegionChange> {
    changes
        .iter()
        .filter(|c| c.trend.direction == wanted)
        .fold(None::<&RegionChange>, |best, c| match best {
            Some(b) if b.trend.change_absolute.abs() >= c.trend.change_absolute.abs() => Some(b),
            _ => Some(c),
        })
        .cloned()
}
