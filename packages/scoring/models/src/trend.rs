//! Year-over-year change types.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Whether a change moved a value toward or away from the favorable end.
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
pub enum TrendDirection {
    /// Moved in the favorable direction.
    Improving,
    /// Moved in the unfavorable direction.
    Worsening,
    /// Unchanged, or changed by no more than the stable band.
    Stable,
}

/// Change between two consecutive observations of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Earlier year.
    pub year_from: i32,
    /// Later year.
    pub year_to: i32,
    /// Value in the earlier year.
    pub value_from: f64,
    /// Value in the later year.
    pub value_to: f64,
    /// `value_to - value_from`.
    pub change_absolute: f64,
    /// Change relative to `value_from`, in percent. `None` when
    /// `value_from` is zero.
    pub change_percent: Option<f64>,
    /// Classification of the change.
    pub direction: TrendDirection,
    /// Whether the change exceeds the stable band.
    pub is_significant: bool,
}

/// One region's change between two compared years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionChange {
    /// Region identifier.
    pub region_id: String,
    /// Display name, if known.
    pub region_name: Option<String>,
    /// The change itself.
    pub trend: TrendPoint,
}

/// Region-by-region comparison of two years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Earlier year.
    pub year_from: i32,
    /// Later year.
    pub year_to: i32,
    /// Regions that improved.
    pub improved: usize,
    /// Regions that worsened.
    pub worsened: usize,
    /// Regions that stayed stable.
    pub stable: usize,
    /// Every region present in both years, ordered by region id.
    pub changes: Vec<RegionChange>,
    /// Improving region with the largest absolute change.
    pub biggest_improvement: Option<RegionChange>,
    /// Worsening region with the largest absolute change.
    pub biggest_decline: Option<RegionChange>,
}
