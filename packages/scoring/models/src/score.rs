//! Composite score results.

use std::collections::BTreeMap;

use gapmap_indicator_models::IndicatorCategory;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{GapAnalysis, RankingConvention};

/// Coarse band of a 0-100 composite score.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScoreBand {
    /// Below 20.
    VeryLow,
    /// 20 up to 40.
    Low,
    /// 40 up to 60.
    Medium,
    /// 60 up to 80.
    High,
    /// 80 and above.
    VeryHigh,
}

impl ScoreBand {
    /// Bands a composite score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::VeryHigh
        } else if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else if score >= 20.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

/// A region's composite score for one year, with its rank and position
/// relative to the national average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// Region identifier.
    pub region_id: String,
    /// Display name, if known.
    pub region_name: Option<String>,
    /// Scored year.
    pub year: i32,
    /// Weighted mean of the region's scaled indicator scores, 0-100.
    pub composite_score: f64,
    /// Composite restricted to each category's indicators. Categories with
    /// no scored indicator are absent.
    pub category_scores: BTreeMap<IndicatorCategory, f64>,
    /// Number of indicators that contributed.
    pub indicators_scored: usize,
    /// 1-based rank among the year's scored regions.
    pub rank: u32,
    /// Rank in the previous available year, if the region was ranked then.
    pub previous_rank: Option<u32>,
    /// `previous_rank - rank`; positive means the region moved up.
    pub rank_delta: Option<i64>,
    /// Share of regions ranked ahead of this one, in percent.
    pub percentile: f64,
    /// `composite_score - national_average`.
    pub gap_from_average: f64,
    /// Band of the composite score.
    pub band: ScoreBand,
}

/// A region that could not be given a composite score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscoredRegion {
    /// Region identifier.
    pub region_id: String,
    /// Why no score was produced.
    pub reason: String,
}

/// A single indicator value that was dropped from scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringIssue {
    /// Region identifier.
    pub region_id: String,
    /// Indicator whose value was dropped.
    pub indicator_id: String,
    /// Why it was dropped.
    pub message: String,
}

/// The complete result of scoring one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearScores {
    /// Scored year.
    pub year: i32,
    /// Convention the scores and ranks follow.
    pub convention: RankingConvention,
    /// Scored regions in rank order.
    pub scores: Vec<CompositeScore>,
    /// Dispersion of the composite scores.
    pub gap: GapAnalysis,
    /// Regions with no scorable indicator.
    pub unscored: Vec<UnscoredRegion>,
    /// Indicator values excluded because they could not be normalized.
    pub issues: Vec<ScoringIssue>,
}

impl YearScores {
    /// Looks up one region's score.
    #[must_use]
    pub fn score_for(&self, region_id: &str) -> Option<&CompositeScore> {
        self.scores.iter().find(|s| s.region_id == region_id)
    }

    /// Region id to rank.
    #[must_use]
    pub fn ranks(&self) -> BTreeMap<String, u32> {
        self.scores
            .iter()
            .map(|s| (s.region_id.clone(), s.rank))
            .collect()
    }
}

/// One indicator's contribution to a region's composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBreakdown {
    /// Indicator id.
    pub collection: String,
    /// Indicator name.
    pub display_name: String,
    /// Scaled score, 0-100. `None` when the region had no usable value.
    pub score: Option<f64>,
    /// Raw value as reported.
    pub raw_value: Option<f64>,
    /// Value after normalization.
    pub normalized_value: Option<f64>,
    /// Smallest normalized value among the year's regions.
    pub min_value: Option<f64>,
    /// Largest normalized value among the year's regions.
    pub max_value: Option<f64>,
    /// Whether smaller raw values are better.
    pub lower_is_better: bool,
    /// Effective weight.
    pub weight: f64,
}

/// Per-indicator explanation of one region's composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Region identifier.
    pub region_id: String,
    /// Display name, falling back to the region id.
    pub region_name: String,
    /// Scored year.
    pub year: i32,
    /// Composite score, 0-100.
    pub composite_score: f64,
    /// 1-based rank.
    pub rank: u32,
    /// One entry per registered indicator, in registry order.
    pub collections: Vec<IndicatorBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::VeryLow);
        assert_eq!(ScoreBand::from_score(19.99), ScoreBand::VeryLow);
        assert_eq!(ScoreBand::from_score(20.0), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(40.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_score(59.9), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_score(60.0), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(80.0), ScoreBand::VeryHigh);
        assert_eq!(ScoreBand::from_score(100.0), ScoreBand::VeryHigh);
    }

    #[test]
    fn band_serializes_kebab_case() {
        assert_eq!(ScoreBand::VeryHigh.to_string(), "very-high");
        assert_eq!(
            serde_json::to_value(ScoreBand::VeryLow).unwrap(),
            serde_json::Value::String("very-low".to_string())
        );
    }

    #[test]
    fn category_scores_serialize_with_string_keys() {
        let mut category_scores = BTreeMap::new();
        category_scores.insert(IndicatorCategory::Labor, 42.0);
        let json = serde_json::to_value(&category_scores).unwrap();
        assert_eq!(json, serde_json::json!({ "labor": 42.0 }));
    }
}
