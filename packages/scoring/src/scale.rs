//! Min-max scaling of one indicator across the regions of one year.

use gapmap_indicator_models::Direction;
use gapmap_scoring_models::RankingConvention;

/// Observed bounds of one indicator's normalized values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Number of non-null values.
    pub count: usize,
}

impl ScaleRange {
    /// Computes the bounds of the non-null values, or `None` if there are
    /// none.
    #[must_use]
    pub fn of(values: &[Option<f64>]) -> Option<Self> {
        values.iter().flatten().fold(None, |range, &v| {
            Some(match range {
                None => Self {
                    min: v,
                    max: v,
                    count: 1,
                },
                Some(r) => Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                    count: r.count + 1,
                },
            })
        })
    }

    /// Returns `true` when every value is the same.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_flat(&self) -> bool {
        self.max == self.min
    }

    /// Scales `value` into 0-100, inverting when `invert` is set.
    ///
    /// A flat range scales every value to 0, inverted or not.
    #[must_use]
    pub fn scale(&self, value: f64, invert: bool) -> f64 {
        if self.is_flat() {
            return 0.0;
        }
        let unit = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let oriented = if invert { 1.0 - unit } else { unit };
        oriented * 100.0
    }
}

/// Scales every value of one indicator for one year.
///
/// Null values stay null and are excluded from the bounds.
#[must_use]
pub fn scale_indicator(
    values: &[Option<f64>],
    direction: Direction,
    convention: RankingConvention,
) -> Vec<Option<f64>> {
    let Some(range) = ScaleRange::of(values) else {
        return vec![None; values.len()];
    };
    let invert = convention.inverts(direction);
    if range.is_flat() {
        log::trace!("Zero variance across {} values, scaling to 0", range.count);
    }
    values
        .iter()
        .map(|v| v.map(|v| range.scale(v, invert)))
        .collect()
}
