#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Indicator definition types.
//!
//! An [`Indicator`] describes one socio-economic measurement (Gini ratio,
//! unemployment rate, GRDP per capita, ...) together with the static
//! configuration the scoring engine needs: which direction is "good", how
//! raw values are size-adjusted, and how heavily the indicator weighs in
//! the composite score. Indicator definitions are fixed per deployment and
//! never discovered at runtime.

pub mod payload;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use payload::{IndicatorPayload, LaborForceSnapshot, Month, RoundValues, UrbanRuralValues};

/// Whether a larger raw value represents a better or a worse outcome.
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
pub enum Direction {
    /// Larger values are better (e.g. human development index, wages).
    HigherIsBetter,
    /// Larger values are worse (e.g. Gini ratio, poverty rate).
    HigherIsWorse,
}

impl Direction {
    /// Returns `true` when smaller raw values represent a better outcome.
    #[must_use]
    pub const fn lower_is_better(self) -> bool {
        matches!(self, Self::HigherIsWorse)
    }

    /// Returns `true` if a change of `delta` moves the value in the
    /// favorable direction. A zero delta is never favorable.
    #[must_use]
    pub fn is_favorable(self, delta: f64) -> bool {
        match self {
            Self::HigherIsBetter => delta > 0.0,
            Self::HigherIsWorse => delta < 0.0,
        }
    }
}

/// How a raw metric value is size-adjusted before scaling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum NormalizationType {
    /// Value is used unchanged.
    #[default]
    #[serde(rename = "raw")]
    #[strum(serialize = "raw")]
    Raw,
    /// Value per 100,000 residents.
    #[serde(rename = "per_100k")]
    #[strum(serialize = "per_100k")]
    Per100k,
    /// Value per square kilometre.
    #[serde(rename = "per_km2")]
    #[strum(serialize = "per_km2")]
    PerKm2,
    /// Value divided by population density (residents per km²).
    #[serde(rename = "density_adjusted")]
    #[strum(serialize = "density_adjusted")]
    DensityAdjusted,
}

impl NormalizationType {
    /// Returns `true` if this normalization needs a positive population.
    #[must_use]
    pub const fn requires_population(self) -> bool {
        matches!(self, Self::Per100k | Self::DensityAdjusted)
    }

    /// Returns `true` if this normalization needs a positive area.
    #[must_use]
    pub const fn requires_area(self) -> bool {
        matches!(self, Self::PerKm2 | Self::DensityAdjusted)
    }
}

/// Thematic grouping used for category sub-scores.
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
pub enum IndicatorCategory {
    /// Output, income and prices (GRDP, wages, inflation, CPI).
    Economic,
    /// Welfare and distribution (HDI, poverty, Gini).
    Social,
    /// Labor market (unemployment, labor force participation).
    Labor,
}

impl IndicatorCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Economic, Self::Social, Self::Labor]
    }
}

/// A single indicator definition, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Unique identifier (e.g. `"gini_ratio"`). Keys into
    /// `RegionMetricRecord::metrics`.
    pub id: String,
    /// Human-readable name (e.g. "Gini Ratio").
    pub name: String,
    /// Unit of the raw value (e.g. `"percent"`, `"ratio"`).
    pub unit: String,
    /// Whether larger raw values are better or worse.
    pub direction: Direction,
    /// Normalization applied unless the scoring config overrides it.
    #[serde(default)]
    pub default_normalization: NormalizationType,
    /// Relative weight in the composite score. Weights need not sum to 1.
    pub weight: f64,
    /// Thematic category for sub-scores.
    pub category: IndicatorCategory,
}

impl Indicator {
    /// Returns `true` when smaller raw values represent a better outcome.
    #[must_use]
    pub const fn lower_is_better(&self) -> bool {
        self.direction.lower_is_better()
    }
}

/// A named set of indicator weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPreset {
    /// Unique preset identifier (e.g. `"equal"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Indicator id to weight. Indicators missing from the map keep their
    /// registry weight.
    pub weights: BTreeMap<String, f64>,
}
