//! Compile-time registry of indicator definitions and weight presets.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding an indicator requires creating a TOML file in `indicators/` and
//! adding a corresponding entry here.

use gapmap_indicator_models::{Indicator, WeightPreset};

/// Number of registered indicators. Enforced by a test.
#[cfg(test)]
const EXPECTED_INDICATOR_COUNT: usize = 9;

/// Number of registered weight presets. Enforced by a test.
#[cfg(test)]
const EXPECTED_PRESET_COUNT: usize = 2;

/// Embedded TOML indicator definitions, in scoring order.
const INDICATOR_TOMLS: &[(&str, &str)] = &[
    // ── Social ───────────────────────────────────────────────────────
    ("gini_ratio", include_str!("../indicators/gini_ratio.toml")),
    (
        "human_development_index",
        include_str!("../indicators/human_development_index.toml"),
    ),
    (
        "poverty_percentage",
        include_str!("../indicators/poverty_percentage.toml"),
    ),
    // ── Labor ────────────────────────────────────────────────────────
    (
        "open_unemployment_rate",
        include_str!("../indicators/open_unemployment_rate.toml"),
    ),
    (
        "labor_force_employment",
        include_str!("../indicators/labor_force_employment.toml"),
    ),
    // ── Economic ─────────────────────────────────────────────────────
    (
        "grdp_per_capita",
        include_str!("../indicators/grdp_per_capita.toml"),
    ),
    (
        "average_net_wage",
        include_str!("../indicators/average_net_wage.toml"),
    ),
    (
        "annual_inflation",
        include_str!("../indicators/annual_inflation.toml"),
    ),
    (
        "consumer_price_index",
        include_str!("../indicators/consumer_price_index.toml"),
    ),
];

/// Embedded TOML weight presets.
const PRESET_TOMLS: &[(&str, &str)] = &[
    ("equal", include_str!("../presets/equal.toml")),
    ("welfare_focus", include_str!("../presets/welfare_focus.toml")),
];

/// Returns all registered indicators in scoring order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_indicators() -> Vec<Indicator> {
    INDICATOR_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse indicator '{name}': {e}"))
        })
        .collect()
}

/// Returns all registered weight presets.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse.
#[must_use]
pub fn all_presets() -> Vec<WeightPreset> {
    PRESET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse weight preset '{name}': {e}"))
        })
        .collect()
}
