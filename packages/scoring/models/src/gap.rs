//! Dispersion statistics across the regions of one year.
//!
//! Used for composite scores and, in the raw-rate report, for the rates
//! themselves.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Qualitative inequality level derived from the coefficient of variation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GapLevel {
    /// CV at or below 0.2.
    Low,
    /// CV above 0.2, at or below 0.3.
    Moderate,
    /// CV above 0.3, or undefined.
    High,
}

impl GapLevel {
    /// Classifies a coefficient of variation. An undefined CV (zero mean
    /// with non-zero spread) is unbounded dispersion and classifies as
    /// [`GapLevel::High`].
    #[must_use]
    pub fn from_cv(cv: Option<f64>) -> Self {
        match cv {
            Some(cv) if cv <= 0.2 => Self::Low,
            Some(cv) if cv <= 0.3 => Self::Moderate,
            _ => Self::High,
        }
    }
}

/// One region's distance from the national average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGap {
    /// Region identifier.
    pub region_id: String,
    /// The region's score.
    pub score: f64,
    /// `score - national_average`.
    pub gap_from_average: f64,
}

/// Dispersion of scores across the regions of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    /// Year analyzed.
    pub year: i32,
    /// Number of regions included.
    pub region_count: usize,
    /// Arithmetic mean.
    pub national_average: f64,
    /// Population standard deviation.
    pub std_deviation: f64,
    /// `std_deviation / national_average`. `None` when the mean is zero
    /// but the scores are not all equal.
    pub coefficient_of_variation: Option<f64>,
    /// Smallest score.
    pub min_score: f64,
    /// Largest score.
    pub max_score: f64,
    /// `max_score - min_score`.
    pub gap_range: f64,
    /// Inequality level from the coefficient of variation.
    pub level: GapLevel,
    /// Per-region gaps, in input order.
    pub region_gaps: Vec<RegionGap>,
}

impl GapAnalysis {
    /// Looks up one region's gap.
    #[must_use]
    pub fn gap_for(&self, region_id: &str) -> Option<f64> {
        self.region_gaps
            .iter()
            .find(|g| g.region_id == region_id)
            .map(|g| g.gap_from_average)
    }
}
