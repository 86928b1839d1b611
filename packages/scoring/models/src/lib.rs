#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scoring input and output types.
//!
//! [`RegionMetricRecord`] is the only input the scoring engine consumes:
//! one region's raw indicator values for one year. Everything else in this
//! crate is either configuration ([`ScoringConfig`]) or a computed result
//! that the embedding layer serializes as-is.

pub mod alert;
pub mod config;
pub mod gap;
pub mod score;
pub mod trend;

use std::collections::BTreeMap;

use gapmap_indicator_models::{Direction, IndicatorPayload};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use alert::{
    Alert, AlertKind, AlertStatus, RateAssessment, RateCategory, RateReport, RegionRateAnalysis,
    Severity,
};
pub use config::{AlertConfig, ScoringConfig, SeverityConfig, TrendConfig};
pub use gap::{GapAnalysis, GapLevel, RegionGap};
pub use score::{
    CompositeScore, IndicatorBreakdown, ScoreBand, ScoreBreakdown, ScoringIssue, UnscoredRegion,
    YearScores,
};
pub use trend::{PeriodComparison, RegionChange, TrendDirection, TrendPoint};

/// Which end of the 0-100 scale is "best", and therefore how ranks run.
///
/// There is deliberately no default; every configuration names one.
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
pub enum RankingConvention {
    /// 0 is the least unequal region; ranks ascend with the score.
    InequalityIndex,
    /// 100 is the best performing region; ranks descend with the score.
    Leaderboard,
}

impl RankingConvention {
    /// Direction of the composite score itself under this convention.
    #[must_use]
    pub const fn score_direction(self) -> Direction {
        match self {
            Self::InequalityIndex => Direction::HigherIsWorse,
            Self::Leaderboard => Direction::HigherIsBetter,
        }
    }

    /// Returns `true` when an indicator with `direction` must be inverted
    /// so that its scaled score points the same way as the composite.
    #[must_use]
    pub fn inverts(self, direction: Direction) -> bool {
        direction != self.score_direction()
    }

    /// Returns `true` when rank 1 holds the lowest composite score.
    #[must_use]
    pub const fn ranks_ascending(self) -> bool {
        matches!(self, Self::InequalityIndex)
    }
}

/// Raw indicator values for one region in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetricRecord {
    /// Stable region identifier.
    pub region_id: String,
    /// Display name, if known.
    #[serde(default)]
    pub region_name: Option<String>,
    /// Observation year.
    pub year: i32,
    /// Resident population. Required by population-based normalizations.
    #[serde(default)]
    pub population: Option<f64>,
    /// Land area in km². Required by area-based normalizations.
    #[serde(default)]
    pub area: Option<f64>,
    /// Indicator id to raw value. `None` marks a value that was not
    /// published.
    #[serde(default)]
    pub metrics: BTreeMap<String, Option<f64>>,
}

impl RegionMetricRecord {
    /// Creates a record with no metrics.
    #[must_use]
    pub fn new(region_id: impl Into<String>, year: i32) -> Self {
        Self {
            region_id: region_id.into(),
            region_name: None,
            year,
            population: None,
            area: None,
            metrics: BTreeMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.region_name = Some(name.into());
        self
    }

    /// Sets population and area.
    #[must_use]
    pub const fn with_size(mut self, population: f64, area: f64) -> Self {
        self.population = Some(population);
        self.area = Some(area);
        self
    }

    /// Adds or replaces one metric value.
    #[must_use]
    pub fn with_metric(mut self, indicator_id: impl Into<String>, value: Option<f64>) -> Self {
        self.metrics.insert(indicator_id.into(), value);
        self
    }

    /// Adds the headline value of every payload, keyed by the payload's
    /// indicator id.
    #[must_use]
    pub fn with_payloads(mut self, payloads: impl IntoIterator<Item = IndicatorPayload>) -> Self {
        for payload in payloads {
            self.metrics
                .insert(payload.indicator_id().to_string(), payload.headline_value());
        }
        self
    }

    /// Returns the raw value for `indicator_id`, or `None` if absent or
    /// unpublished.
    #[must_use]
    pub fn metric(&self, indicator_id: &str) -> Option<f64> {
        self.metrics.get(indicator_id).copied().flatten()
    }

    /// Display name, falling back to the region id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.region_name.as_deref().unwrap_or(&self.region_id)
    }
}

#[cfg(test)]
mod tests {
    use gapmap_indicator_models::UrbanRuralValues;

    use super::*;

    #[test]
    fn convention_inversion() {
        let inequality = RankingConvention::InequalityIndex;
        assert!(inequality.inverts(Direction::HigherIsBetter));
        assert!(!inequality.inverts(Direction::HigherIsWorse));

        let leaderboard = RankingConvention::Leaderboard;
        assert!(leaderboard.inverts(Direction::HigherIsWorse));
        assert!(!leaderboard.inverts(Direction::HigherIsBetter));

        assert!(inequality.ranks_ascending());
        assert!(!leaderboard.ranks_ascending());
    }

    #[test]
    fn missing_and_null_metrics_read_as_none() {
        let record = RegionMetricRecord::new("11", 2023)
            .with_metric("gini_ratio", None)
            .with_metric("human_development_index", Some(72.5));
        assert_eq!(record.metric("gini_ratio"), None);
        assert_eq!(record.metric("poverty_percentage"), None);
        assert_eq!(record.metric("human_development_index"), Some(72.5));
        assert_eq!(record.display_name(), "11");
    }

    #[test]
    fn payloads_are_dispatched_by_indicator_id() {
        let record = RegionMetricRecord::new("31", 2023)
            .with_name("DKI Jakarta")
            .with_payloads([
                IndicatorPayload::HumanDevelopmentIndex { value: Some(82.5) },
                IndicatorPayload::PovertyPercentage {
                    semester_1: None,
                    semester_2: Some(UrbanRuralValues {
                        urban: Some(4.4),
                        rural: None,
                        total: Some(4.4),
                    }),
                },
                IndicatorPayload::GrdpPerCapita { thousands: None },
            ]);

        assert_eq!(record.display_name(), "DKI Jakarta");
        assert_eq!(record.metric("human_development_index"), Some(82.5));
        assert_eq!(record.metric("poverty_percentage"), Some(4.4));
        assert!(record.metrics.contains_key("grdp_per_capita"));
        assert_eq!(record.metric("grdp_per_capita"), None);
    }

    #[test]
    fn record_deserializes_with_null_metrics() {
        let record: RegionMetricRecord = serde_json::from_value(serde_json::json!({
            "region_id": "52",
            "year": 2022,
            "population": 5_400_000.0,
            "area": 18_572.0,
            "metrics": { "gini_ratio": 0.374, "poverty_percentage": null }
        }))
        .unwrap();
        assert_eq!(record.metric("gini_ratio"), Some(0.374));
        assert_eq!(record.metric("poverty_percentage"), None);
        assert_eq!(record.region_name, None);
    }
}
