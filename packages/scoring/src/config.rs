//! Configuration parsing and resolution against an indicator registry.

use std::collections::BTreeMap;

use gapmap_indicator::IndicatorRegistry;
use gapmap_scoring_models::ScoringConfig;

use crate::ScoringError;

/// Parses a [`ScoringConfig`] from TOML and checks its thresholds.
///
/// Indicator ids are only checked once the config meets a registry, in
/// [`resolve_weights`] and [`check_overrides`].
///
/// # Errors
///
/// Returns [`ScoringError::Config`] if the document is malformed or lacks
/// a `convention`, or [`ScoringError::InvalidInput`] if a threshold is out
/// of range.
pub fn parse_config(toml_str: &str) -> Result<ScoringConfig, ScoringError> {
    let config: ScoringConfig = toml::de::from_str(toml_str)?;
    check_thresholds(&config)?;
    Ok(config)
}

/// Checks that every threshold in `config` is usable.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidInput`] if a threshold is negative or not
/// finite, or if the severity thresholds are not in ascending order.
pub fn check_thresholds(config: &ScoringConfig) -> Result<(), ScoringError> {
    non_negative("trend.stable_band", config.trend.stable_band)?;
    non_negative("alerts.significant_change", config.alerts.significant_change)?;
    non_negative("alerts.escalate_change", config.alerts.escalate_change)?;

    let severity = &config.severity;
    non_negative("severity.medium_rate", severity.medium_rate)?;
    non_negative("severity.high_rate", severity.high_rate)?;
    non_negative("severity.critical_rate", severity.critical_rate)?;
    if severity.medium_rate > severity.high_rate || severity.high_rate > severity.critical_rate {
        return Err(ScoringError::invalid(format!(
            "severity thresholds must ascend: medium {} <= high {} <= critical {}",
            severity.medium_rate, severity.high_rate, severity.critical_rate
        )));
    }
    Ok(())
}

/// Checks that every normalization override names a registered indicator.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidInput`] on an unknown indicator id.
pub fn check_overrides(
    registry: &IndicatorRegistry,
    config: &ScoringConfig,
) -> Result<(), ScoringError> {
    for id in config.normalization_overrides.keys() {
        if !registry.contains(id) {
            return Err(ScoringError::invalid(format!(
                "normalization override for unknown indicator '{id}'"
            )));
        }
    }
    Ok(())
}

/// Resolves the effective weight of every registered indicator.
///
/// Registry weights are replaced by the selected preset's weights, which
/// are in turn replaced by the config's per-indicator weights.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidInput`] if the preset is unknown, a
/// weight names an unknown indicator, a weight is negative or not finite,
/// or every resolved weight is zero.
pub fn resolve_weights(
    registry: &IndicatorRegistry,
    config: &ScoringConfig,
) -> Result<BTreeMap<String, f64>, ScoringError> {
    let mut weights = registry.default_weights();

    if let Some(preset_id) = &config.preset {
        let preset = registry
            .preset(preset_id)
            .map_err(|e| ScoringError::invalid(e.to_string()))?;
        log::debug!("Applying weight preset '{}'", preset.id);
        for (id, weight) in &preset.weights {
            weights.insert(id.clone(), *weight);
        }
    }

    for (id, weight) in &config.weights {
        if !registry.contains(id) {
            return Err(ScoringError::invalid(format!(
                "weight for unknown indicator '{id}'"
            )));
        }
        non_negative(&format!("weight for '{id}'"), *weight)?;
        weights.insert(id.clone(), *weight);
    }

    if !weights.values().any(|w| *w > 0.0) {
        return Err(ScoringError::invalid("every indicator weight is zero"));
    }

    Ok(weights)
}

fn non_negative(name: &str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScoringError::invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use gapmap_indicator_models::NormalizationType;
    use gapmap_scoring_models::RankingConvention;

    use super::*;

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
convention = "leaderboard"
preset = "welfare_focus"

[weights]
gini_ratio = 0.5

[normalization_overrides]
poverty_percentage = "per_100k"

[trend]
stable_band = 0.25

[severity]
medium_rate = 5.0
high_rate = 8.0
critical_rate = 12.0

[alerts]
trend_alerts = false
"#,
        )
        .unwrap();

        assert_eq!(config.convention, RankingConvention::Leaderboard);
        assert_eq!(config.preset.as_deref(), Some("welfare_focus"));
        assert_eq!(
            config.normalization_overrides.get("poverty_percentage"),
            Some(&NormalizationType::Per100k)
        );
        assert!((config.trend.stable_band - 0.25).abs() < f64::EPSILON);
        assert!(!config.alerts.trend_alerts);
        assert!((config.alerts.escalate_change - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn convention_is_required() {
        let err = parse_config("preset = \"equal\"").unwrap_err();
        assert!(matches!(err, ScoringError::Config(_)));
    }

    #[test]
    fn unordered_severity_thresholds_are_rejected() {
        let err = parse_config(
            r#"
convention = "inequality_index"
[severity]
high_rate = 11.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { .. }));
    }

    #[test]
    fn negative_stable_band_is_rejected() {
        let err = parse_config(
            r#"
convention = "inequality_index"
[trend]
stable_band = -1.0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("trend.stable_band"));
    }

    #[test]
    fn weights_layer_registry_preset_then_overrides() {
        let registry = IndicatorRegistry::builtin();
        let config = ScoringConfig::new(RankingConvention::InequalityIndex)
            .with_preset("welfare_focus")
            .with_weight("gini_ratio", 0.4);
        let weights = resolve_weights(&registry, &config).unwrap();

        assert!((weights["human_development_index"] - 0.25).abs() < f64::EPSILON);
        assert!((weights["gini_ratio"] - 0.4).abs() < f64::EPSILON);
        assert!(weights["consumer_price_index"].abs() < f64::EPSILON);
        assert_eq!(weights.len(), registry.len());
    }

    #[test]
    fn registry_weights_apply_without_preset() {
        let registry = IndicatorRegistry::builtin();
        let config = ScoringConfig::new(RankingConvention::InequalityIndex);
        assert_eq!(
            resolve_weights(&registry, &config).unwrap(),
            registry.default_weights()
        );
    }

    #[test]
    fn unknown_ids_and_bad_weights_are_rejected() {
        let registry = IndicatorRegistry::builtin();
        let base = ScoringConfig::new(RankingConvention::InequalityIndex);

        assert!(resolve_weights(&registry, &base.clone().with_preset("missing")).is_err());
        assert!(resolve_weights(&registry, &base.clone().with_weight("missing", 1.0)).is_err());
        assert!(resolve_weights(&registry, &base.clone().with_weight("gini_ratio", -1.0)).is_err());
        assert!(
            resolve_weights(&registry, &base.clone().with_weight("gini_ratio", f64::NAN)).is_err()
        );
        assert!(
            check_overrides(
                &registry,
                &base.with_normalization("missing", NormalizationType::Raw)
            )
            .is_err()
        );
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let registry = IndicatorRegistry::builtin();
        let config = registry.ids().into_iter().fold(
            ScoringConfig::new(RankingConvention::InequalityIndex),
            |config, id| config.with_weight(id, 0.0),
        );
        let err = resolve_weights(&registry, &config).unwrap_err();
        assert!(err.to_string().contains("every indicator weight is zero"));
    }
}
