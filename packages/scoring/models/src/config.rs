//! Scoring configuration.
//!
//! A [`ScoringConfig`] is an immutable value passed into every engine call.
//! Only the ranking convention is required; all other sections fall back
//! to their defaults when omitted from a TOML or JSON document.

use std::collections::BTreeMap;

use gapmap_indicator_models::NormalizationType;
use serde::{Deserialize, Serialize};

use crate::RankingConvention;

/// Everything that parameterizes a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Directionality convention for scores and ranks.
    pub convention: RankingConvention,
    /// Weight preset applied on top of the registry weights.
    #[serde(default)]
    pub preset: Option<String>,
    /// Per-indicator weights applied on top of the preset.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    /// Per-indicator normalization replacing the indicator default.
    #[serde(default)]
    pub normalization_overrides: BTreeMap<String, NormalizationType>,
    /// Trend classification settings.
    #[serde(default)]
    pub trend: TrendConfig,
    /// Raw-rate severity thresholds.
    #[serde(default)]
    pub severity: SeverityConfig,
    /// Alert generation settings.
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl ScoringConfig {
    /// Creates a configuration with registry weights and default
    /// thresholds.
    #[must_use]
    pub fn new(convention: RankingConvention) -> Self {
        Self {
            convention,
            preset: None,
            weights: BTreeMap::new(),
            normalization_overrides: BTreeMap::new(),
            trend: TrendConfig::default(),
            severity: SeverityConfig::default(),
            alerts: AlertConfig::default(),
        }
    }

    /// Selects a weight preset.
    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Overrides one indicator's weight.
    #[must_use]
    pub fn with_weight(mut self, indicator_id: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(indicator_id.into(), weight);
        self
    }

    /// Overrides one indicator's normalization.
    #[must_use]
    pub fn with_normalization(
        mut self,
        indicator_id: impl Into<String>,
        normalization: NormalizationType,
    ) -> Self {
        self.normalization_overrides
            .insert(indicator_id.into(), normalization);
        self
    }
}

/// Trend classification settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Changes with an absolute value at or below this band are `stable`.
    pub stable_band: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { stable_band: 0.0 }
    }
}

/// Raw-rate thresholds, in the indicator's own unit.
///
/// A rate strictly above `critical_rate` is critical, strictly above
/// `high_rate` is high, at or above `medium_rate` is medium, and anything
/// lower is low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    /// Lower bound (inclusive) of the medium tier.
    pub medium_rate: f64,
    /// Lower bound (exclusive) of the high tier.
    pub high_rate: f64,
    /// Lower bound (exclusive) of the critical tier.
    pub critical_rate: f64,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            medium_rate: 4.0,
            high_rate: 7.0,
            critical_rate: 10.0,
        }
    }
}

/// Alert generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Emit alerts for significant worsening or improving trends, not only
    /// for threshold breaches.
    pub trend_alerts: bool,
    /// Minimum absolute change for a trend alert.
    pub significant_change: f64,
    /// Absolute change above which a worsening trend alert is high rather
    /// than medium severity.
    pub escalate_change: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            trend_alerts: true,
            significant_change: 0.5,
            escalate_change: 1.0,
        }
    }
}
