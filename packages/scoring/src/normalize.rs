//! Size adjustment of raw metric values.

use std::collections::BTreeMap;

use gapmap_indicator_models::{Indicator, NormalizationType};

use crate::ScoringError;

/// Residents per normalization unit for [`NormalizationType::Per100k`].
pub const PER_CAPITA_BASE: f64 = 100_000.0;

/// Normalizes one raw value.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidInput`] if `value` is not finite, or if
/// the normalization needs a population or area that is missing, zero, or
/// negative.
pub fn normalize(
    value: f64,
    normalization: NormalizationType,
    population: Option<f64>,
    area: Option<f64>,
) -> Result<f64, ScoringError> {
    if !value.is_finite() {
        return Err(ScoringError::invalid(format!(
            "value {value} is not a finite number"
        )));
    }

    let population = if normalization.requires_population() {
        positive("population", population, normalization)?
    } else {
        1.0
    };
    let area = if normalization.requires_area() {
        positive("area", area, normalization)?
    } else {
        1.0
    };

    let normalized = match normalization {
        NormalizationType::Raw => value,
        NormalizationType::Per100k => value / population * PER_CAPITA_BASE,
        NormalizationType::PerKm2 => value / area,
        NormalizationType::DensityAdjusted => value / (population / area),
    };

    if normalized.is_finite() {
        Ok(normalized)
    } else {
        Err(ScoringError::invalid(format!(
            "{normalization} normalization of {value} overflowed"
        )))
    }
}

/// Normalizes an optional raw value. Unpublished values stay `None`.
///
/// # Errors
///
/// Propagates any error from [`normalize`].
pub fn normalize_metric(
    value: Option<f64>,
    normalization: NormalizationType,
    population: Option<f64>,
    area: Option<f64>,
) -> Result<Option<f64>, ScoringError> {
    value
        .map(|v| normalize(v, normalization, population, area))
        .transpose()
}

/// The override for `indicator` if one is configured, else its default.
#[must_use]
pub fn effective_normalization(
    indicator: &Indicator,
    overrides: &BTreeMap<String, NormalizationType>,
) -> NormalizationType {
    overrides
        .get(&indicator.id)
        .copied()
        .unwrap_or(indicator.default_normalization)
}

fn positive(
    what: &str,
    value: Option<f64>,
    normalization: NormalizationType,
) -> Result<f64, ScoringError> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(ScoringError::invalid(format!(
            "{normalization} normalization requires a positive {what}, got {v}"
        ))),
        None => Err(ScoringError::invalid(format!(
            "{normalization} normalization requires a {what}"
        ))),
    }
}
