#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Indicator registry.
//!
//! Holds the static catalogue of indicators the scoring engine works with.
//! The built-in catalogue is defined as TOML files embedded at compile
//! time, following the same registry pattern as the weight presets. A
//! deployment can supply its own catalogue through
//! [`IndicatorRegistry::from_toml_str`]; it is validated once and never
//! changes afterwards.

pub mod registry;

use std::collections::{BTreeMap, BTreeSet};

use gapmap_indicator_models::{Indicator, WeightPreset};
use serde::Deserialize;
use thiserror::Error;

pub use registry::{all_indicators, all_presets};

/// Errors that can occur while building an indicator registry.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The catalogue violates a registry invariant.
    #[error("Invalid indicator catalogue: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },

    /// An indicator id is not part of the catalogue.
    #[error("Unknown indicator: {id}")]
    UnknownIndicator {
        /// The requested indicator id.
        id: String,
    },

    /// A weight preset id is not part of the catalogue.
    #[error("Unknown weight preset: {id}")]
    UnknownPreset {
        /// The requested preset id.
        id: String,
    },
}

/// Shape of a deployment-supplied catalogue file.
#[derive(Debug, Deserialize)]
struct CatalogueFile {
    indicators: Vec<Indicator>,
    #[serde(default)]
    presets: Vec<WeightPreset>,
}

/// An immutable, validated catalogue of indicators and weight presets.
///
/// Iteration order is definition order, which is also the order the
/// scoring engine processes indicators in.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRegistry {
    indicators: Vec<Indicator>,
    presets: Vec<WeightPreset>,
}

impl IndicatorRegistry {
    /// Builds a registry from the embedded indicator and preset files.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalogue is malformed. The embedded files
    /// are compile-time constants covered by the registry tests.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(all_indicators(), all_presets())
            .unwrap_or_else(|e| panic!("Embedded indicator catalogue is invalid: {e}"))
    }

    /// Builds a registry, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::Invalid`] if an indicator id is empty or
    /// duplicated, a name is empty, a weight is negative or not finite, no
    /// indicator carries a positive weight, or a preset references an
    /// unknown indicator or carries an invalid weight.
    pub fn new(
        indicators: Vec<Indicator>,
        presets: Vec<WeightPreset>,
    ) -> Result<Self, IndicatorError> {
        if indicators.is_empty() {
            return Err(invalid("catalogue defines no indicators"));
        }

        let mut ids = BTreeSet::new();
        for indicator in &indicators {
            if indicator.id.trim().is_empty() {
                return Err(invalid("indicator with empty id"));
            }
            if !ids.insert(indicator.id.as_str()) {
                return Err(invalid(format!("duplicate indicator id '{}'", indicator.id)));
            }
            if indicator.name.trim().is_empty() {
                return Err(invalid(format!("indicator '{}' has empty name", indicator.id)));
            }
            check_weight(&indicator.id, indicator.weight)?;
        }

        if !indicators.iter().any(|i| i.weight > 0.0) {
            return Err(invalid("every indicator has zero weight"));
        }

        let mut preset_ids = BTreeSet::new();
        for preset in &presets {
            if !preset_ids.insert(preset.id.as_str()) {
                return Err(invalid(format!("duplicate preset id '{}'", preset.id)));
            }
            for (id, weight) in &preset.weights {
                if !ids.contains(id.as_str()) {
                    return Err(invalid(format!(
                        "preset '{}' references unknown indicator '{id}'",
                        preset.id
                    )));
                }
                check_weight(id, *weight)?;
            }
        }

        log::debug!(
            "Indicator registry built with {} indicators and {} presets",
            indicators.len(),
            presets.len()
        );

        Ok(Self {
            indicators,
            presets,
        })
    }

    /// Parses and validates a catalogue from TOML.
    ///
    /// The document holds an `[[indicators]]` array and an optional
    /// `[[presets]]` array.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::Toml`] if the document is malformed, or
    /// any error from [`IndicatorRegistry::new`].
    pub fn from_toml_str(toml_str: &str) -> Result<Self, IndicatorError> {
        let file: CatalogueFile = toml::de::from_str(toml_str)?;
        Self::new(file.indicators, file.presets)
    }

    /// Looks up an indicator by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    /// Looks up an indicator by id, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::UnknownIndicator`] if `id` is unknown.
    pub fn require(&self, id: &str) -> Result<&Indicator, IndicatorError> {
        self.get(id).ok_or_else(|| IndicatorError::UnknownIndicator { id: id.to_string() })
    }

    /// Returns `true` if `id` names a registered indicator.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over the indicators in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter()
    }

    /// Number of registered indicators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Always `false`; a registry holds at least one indicator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Indicator ids in definition order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.id.as_str()).collect()
    }

    /// Registry weight of every indicator.
    #[must_use]
    pub fn default_weights(&self) -> BTreeMap<String, f64> {
        self.indicators
            .iter()
            .map(|i| (i.id.clone(), i.weight))
            .collect()
    }

    /// Looks up a weight preset by id.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::UnknownPreset`] if `id` is unknown.
    pub fn preset(&self, id: &str) -> Result<&WeightPreset, IndicatorError> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| IndicatorError::UnknownPreset { id: id.to_string() })
    }

    /// All registered weight presets.
    #[must_use]
    pub fn presets(&self) -> &[WeightPreset] {
        &self.presets
    }
}

fn invalid(message: impl Into<String>) -> IndicatorError {
    IndicatorError::Invalid {
        message: message.into(),
    }
}

fn check_weight(id: &str, weight: f64) -> Result<(), IndicatorError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "indicator '{id}' has invalid weight {weight}: weights must be finite and non-negative"
        )))
    }
}

#[cfg(test)]
mod tests {
    use gapmap_indicator_models::{Direction, IndicatorCategory, NormalizationType};

    use super::*;

    fn indicator(id: &str, weight: f64) -> Indicator {
        Indicator {
            id: id.to_string(),
            name: id.to_uppercase(),
            unit: "percent".to_string(),
            direction: Direction::HigherIsWorse,
            default_normalization: NormalizationType::Raw,
            weight,
            category: IndicatorCategory::Social,
        }
    }

    #[test]
    fn builtin_registry_is_valid() {
        let registry = IndicatorRegistry::builtin();
        assert_eq!(registry.len(), all_indicators().len());
        assert!(registry.contains("gini_ratio"));
        assert!(registry.preset("equal").is_ok());
        assert!(registry.preset("welfare_focus").is_ok());
    }

    #[test]
    fn preserves_definition_order() {
        let registry =
            IndicatorRegistry::new(vec![indicator("b", 1.0), indicator("a", 2.0)], vec![])
                .unwrap();
        assert_eq!(registry.ids(), vec!["b", "a"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = IndicatorRegistry::new(vec![indicator("a", 1.0), indicator("a", 1.0)], vec![])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate indicator id 'a'"));
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        assert!(IndicatorRegistry::new(vec![indicator("a", -1.0)], vec![]).is_err());
        assert!(IndicatorRegistry::new(vec![indicator("a", f64::NAN)], vec![]).is_err());
    }

    #[test]
    fn rejects_all_zero_weights() {
        let err = IndicatorRegistry::new(vec![indicator("a", 0.0), indicator("b", 0.0)], vec![])
            .unwrap_err();
        assert!(matches!(err, IndicatorError::Invalid { .. }));
    }

    #[test]
    fn rejects_preset_with_unknown_indicator() {
        let preset = WeightPreset {
            id: "custom".to_string(),
            name: "Custom".to_string(),
            weights: BTreeMap::from([("missing".to_string(), 1.0)]),
        };
        let err = IndicatorRegistry::new(vec![indicator("a", 1.0)], vec![preset]).unwrap_err();
        assert!(err.to_string().contains("unknown indicator 'missing'"));
    }

    #[test]
    fn unknown_lookups_are_typed_errors() {
        let registry = IndicatorRegistry::builtin();
        assert!(matches!(
            registry.require("nope"),
            Err(IndicatorError::UnknownIndicator { .. })
        ));
        assert!(matches!(
            registry.preset("nope"),
            Err(IndicatorError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn parses_catalogue_from_toml() {
        let registry = IndicatorRegistry::from_toml_str(
            r#"
[[indicators]]
id = "crime_rate"
name = "Crime Rate"
unit = "incidents"
direction = "higher_is_worse"
default_normalization = "per_100k"
weight = 2.0
category = "social"

[[indicators]]
id = "literacy"
name = "Literacy"
unit = "percent"
direction = "higher_is_better"
weight = 1.0
category = "social"

[[presets]]
id = "crime_only"
name = "Crime only"
weights = { crime_rate = 1.0, literacy = 0.0 }
"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let crime = registry.require("crime_rate").unwrap();
        assert_eq!(crime.default_normalization, NormalizationType::Per100k);
        assert_eq!(
            registry.get("literacy").unwrap().default_normalization,
            NormalizationType::Raw
        );
        assert_eq!(registry.preset("crime_only").unwrap().weights.len(), 2);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = IndicatorRegistry::from_toml_str("indicators = 3").unwrap_err();
        assert!(matches!(err, IndicatorError::Toml(_)));
    }
}
