//! Severity tiers, alerts, and the raw-rate report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{GapAnalysis, TrendPoint};

/// Severity tier, from least to most urgent.
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
pub enum Severity {
    /// No action needed.
    Low,
    /// Worth monitoring.
    Medium,
    /// Needs targeted action.
    High,
    /// Needs immediate intervention.
    Critical,
}

impl Severity {
    /// Returns `true` for tiers that produce a threshold alert.
    #[must_use]
    pub const fn is_alerting(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// What triggered an alert.
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
pub enum AlertKind {
    /// A value or score reached the high or critical tier.
    Threshold,
    /// A significant change in the unfavorable direction.
    WorseningTrend,
    /// A significant change in the favorable direction.
    ImprovingTrend,
}

/// Lifecycle state of an alert. Generated alerts are always
/// [`AlertStatus::Active`]; later transitions belong to whoever stores
/// them.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum AlertStatus {
    /// Newly raised.
    #[default]
    Active,
    /// Seen by an operator.
    Acknowledged,
    /// Closed.
    Resolved,
}

/// A generated alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Region the alert concerns.
    pub region_id: String,
    /// Indicator the alert concerns. `None` for composite-score alerts.
    pub indicator_id: Option<String>,
    /// Trigger.
    pub kind: AlertKind,
    /// Urgency.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Suggested response.
    pub recommendation: Option<String>,
    /// Generation time, supplied by the caller.
    pub created_at: DateTime<Utc>,
    /// Lifecycle state.
    pub status: AlertStatus,
}

/// Qualitative category of a raw rate.
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
pub enum RateCategory {
    /// 3% or less.
    Excellent,
    /// Above 3%, up to 5%.
    Good,
    /// Above 5%, up to 7%.
    Fair,
    /// Above 7%, up to 10%.
    Poor,
    /// Above 10%.
    Critical,
}

/// Assessment of a single raw rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateAssessment {
    /// The assessed rate.
    pub rate: f64,
    /// Piecewise-linear score, 0-100, higher is better.
    pub score: u8,
    /// Qualitative category.
    pub category: RateCategory,
    /// Severity tier from the configured thresholds.
    pub severity: Severity,
}

/// One region's entry in a [`RateReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRateAnalysis {
    /// Region identifier.
    pub region_id: String,
    /// Display name, falling back to the region id.
    pub region_name: String,
    /// Reported year.
    pub year: i32,
    /// Assessment of the region's rate.
    pub assessment: RateAssessment,
    /// Change since the previous year, when the region reported then.
    pub trend: Option<TrendPoint>,
    /// Alerts raised for the region.
    pub alerts: Vec<Alert>,
    /// 1-based rank, lowest rate first.
    pub rank: u32,
    /// Share of regions ranked ahead of this one, in percent.
    pub percentile: f64,
}

/// Regional gap report for a single higher-is-worse rate indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateReport {
    /// Reported indicator.
    pub indicator_id: String,
    /// Reported year.
    pub year: i32,
    /// Regions in rank order.
    pub regions: Vec<RegionRateAnalysis>,
    /// Mean rate.
    pub national_average: f64,
    /// Regions in the critical tier.
    pub critical_count: usize,
    /// Regions in the high tier.
    pub high_count: usize,
    /// Dispersion of the rates.
    pub gap: GapAnalysis,
    /// One-line human-readable summary.
    pub summary: String,
}
