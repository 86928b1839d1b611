//! Threshold and trend report for a single rate indicator, such as the
//! open unemployment rate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use gapmap_indicator_models::{Direction, Indicator};
use gapmap_scoring_models::{
    GapAnalysis, RankingConvention, RateReport, RegionMetricRecord, RegionRateAnalysis,
    ScoringConfig, Severity, SeverityConfig,
};

use crate::ScoringError;
use crate::cancel::{self, Cancellation};
use crate::gap::analyze_gaps;
use crate::rank::{percentile, rank_scores};
use crate::severity::{AlertSubject, assess_rate, generate_alerts};
use crate::trend::trend_point;

/// Assesses every region's `indicator` rate for `year`.
///
/// `current` supplies this year's values; records of other years are
/// ignored. `previous` supplies the values trends are measured against,
/// taken from each region's record with the latest year before `year`.
/// Regions without a value are left out. Regions are ranked from the
/// lowest rate up.
///
/// # Errors
///
/// * [`ScoringError::InvalidInput`] if `indicator` is not higher-is-worse
///   or a region has more than one record for `year`.
/// * [`ScoringError::InsufficientData`] if no region has a value.
/// * [`ScoringError::Cancelled`] if `cancel` fires.
pub fn analyze_rates(
    indicator: &Indicator,
    year: i32,
    current: &[RegionMetricRecord],
    previous: &[RegionMetricRecord],
    config: &ScoringConfig,
    created_at: DateTime<Utc>,
    cancel: &dyn Cancellation,
) -> Result<RateReport, ScoringError> {
    if indicator.direction != Direction::HigherIsWorse {
        return Err(ScoringError::invalid(format!(
            "'{}' is not a higher-is-worse rate",
            indicator.id
        )));
    }

    let mut seen = BTreeSet::new();
    for record in current.iter().filter(|r| r.year == year) {
        if !seen.insert(record.region_id.as_str()) {
            return Err(ScoringError::invalid(format!(
                "region '{}' has more than one record for {year}",
                record.region_id
            )));
        }
    }

    let earlier = previous_values(indicator, year, previous);

    let mut regions = Vec::new();
    for record in current.iter().filter(|r| r.year == year) {
        cancel::check(cancel)?;
        let Some(rate) = record.metric(&indicator.id) else {
            continue;
        };
        if !rate.is_finite() {
            log::warn!(
                "Skipping non-finite '{}' for region '{}' in {year}",
                indicator.id,
                record.region_id
            );
            continue;
        }

        let assessment = assess_rate(rate, &config.severity);
        let trend = earlier.get(record.region_id.as_str()).map(|&(y, v)| {
            trend_point(
                (y, v),
                (year, rate),
                indicator.direction,
                config.trend.stable_band,
            )
        });
        let subject = AlertSubject {
            region_id: &record.region_id,
            region_name: record.display_name(),
            indicator_id: Some(indicator.id.as_str()),
            label: &indicator.name,
            unit: &indicator.unit,
            value: rate,
        };
        let alerts = generate_alerts(
            &subject,
            assessment.severity,
            trend.as_ref(),
            &config.alerts,
            created_at,
        );

        regions.push(RegionRateAnalysis {
            region_id: record.region_id.clone(),
            region_name: record.display_name().to_string(),
            year,
            assessment,
            trend,
            alerts,
            rank: 0,
            percentile: 0.0,
        });
    }

    if regions.is_empty() {
        return Err(ScoringError::insufficient(format!(
            "no region reported '{}' for {year}",
            indicator.id
        )));
    }

    let rates: Vec<f64> = regions.iter().map(|r| r.assessment.rate).collect();
    let total = regions.len();
    for (region, rank) in regions
        .iter_mut()
        .zip(rank_scores(&rates, RankingConvention::InequalityIndex))
    {
        region.rank = rank;
        region.percentile = percentile(rank, total);
    }
    regions.sort_by_key(|r| r.rank);

    let pairs: Vec<(String, f64)> = regions
        .iter()
        .map(|r| (r.region_id.clone(), r.assessment.rate))
        .collect();
    let gap = analyze_gaps(year, &pairs)?;

    let count = |severity: Severity| {
        regions
            .iter()
            .filter(|r| r.assessment.severity == severity)
            .count()
    };
    let critical_count = count(Severity::Critical);
    let high_count = count(Severity::High);

    let summary = summarize(
        indicator,
        year,
        &regions,
        &gap,
        &config.severity,
        (critical_count, high_count),
    );

    log::debug!(
        "Rate report for '{}' in {year}: {total} regions, {critical_count} critical",
        indicator.id
    );

    Ok(RateReport {
        indicator_id: indicator.id.clone(),
        year,
        national_average: gap.national_average,
        critical_count,
        high_count,
        gap,
        regions,
        summary,
    })
}

/// Latest `(year, value)` before `year` per region.
fn previous_values<'r>(
    indicator: &Indicator,
    year: i32,
    previous: &'r [RegionMetricRecord],
) -> BTreeMap<&'r str, (i32, f64)> {
    let mut values: BTreeMap<&str, (i32, f64)> = BTreeMap::new();
    for record in previous.iter().filter(|r| r.year < year) {
        let Some(value) = record.metric(&indicator.id).filter(|v| v.is_finite()) else {
            continue;
        };
        let entry = values
            .entry(record.region_id.as_str())
            .or_insert((record.year, value));
        if record.year > entry.0 {
            *entry = (record.year, value);
        }
    }
    values
}

fn summarize(
    indicator: &Indicator,
    year: i32,
    regions: &[RegionRateAnalysis],
    gap: &GapAnalysis,
    thresholds: &SeverityConfig,
    (critical_count, high_count): (usize, usize),
) -> String {
    let unit = if indicator.unit == "percent" { "%" } else { "" };
    let mut parts = vec![
        format!("{} analysis for {year}:", indicator.name),
        format!("National average: {:.2}{unit}", gap.national_average),
        format!("Regions analyzed: {}", regions.len()),
    ];

    if critical_count > 0 {
        parts.push(format!(
            "{critical_count} region(s) in critical condition (>{}{unit})",
            thresholds.critical_rate
        ));
    }
    if high_count > 0 {
        parts.push(format!(
            "{high_count} region(s) with high {} ({}-{}{unit})",
            indicator.name.to_lowercase(),
            thresholds.high_rate,
            thresholds.critical_rate
        ));
    }

    let gap_index = gap
        .coefficient_of_variation
        .map_or_else(|| "n/a".to_string(), |cv| format!("{cv:.3}"));
    parts.push(format!(
        "Regional inequality: {} (gap index: {gap_index})",
        gap.level
    ));

    if let (Some(best), Some(worst)) = (regions.first(), regions.last()) {
        parts.push(format!(
            "Best: {} ({:.2}{unit})",
            best.region_name, best.assessment.rate
        ));
        parts.push(format!(
            "Worst: {} ({:.2}{unit})",
            worst.region_name, worst.assessment.rate
        ));
    }

    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use chrono::TimeZone as _;
    use gapmap_indicator::IndicatorRegistry;
    use gapmap_scoring_models::{AlertKind, RateCategory, TrendDirection};

    use super::*;
    use crate::NeverCancel;

    const ID: &str = "open_unemployment_rate";

    fn registry() -> IndicatorRegistry {
        IndicatorRegistry::builtin()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    fn rate(region: &str, name: &str, year: i32, value: Option<f64>) -> RegionMetricRecord {
        RegionMetricRecord::new(region, year)
            .with_name(name)
            .with_metric(ID, value)
    }

    fn config() -> ScoringConfig {
        ScoringConfig::new(RankingConvention::InequalityIndex)
    }

    fn report(current: &[RegionMetricRecord], previous: &[RegionMetricRecord]) -> RateReport {
        let registry = registry();
        analyze_rates(
            registry.require(ID).unwrap(),
            2023,
            current,
            previous,
            &config(),
            now(),
            &NeverCancel,
        )
        .unwrap()
    }

    #[test]
    fn regions_are_ranked_lowest_rate_first() {
        let current = vec![
            rate("31", "DKI Jakarta", 2023, Some(7.57)),
            rate("53", "NTT", 2023, Some(3.14)),
            rate("32", "Jawa Barat", 2023, Some(11.2)),
            rate("99", "Nowhere", 2023, None),
        ];
        let report = report(&current, &[]);

        let order: Vec<&str> = report.regions.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(order, vec!["53", "31", "32"]);
        assert_eq!(report.regions[0].rank, 1);
        assert!(report.regions[0].percentile.abs() < 1e-9);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.high_count, 1);
        assert_eq!(report.regions[2].assessment.category, RateCategory::Critical);
        assert!((report.national_average - (7.57 + 3.14 + 11.2) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_alerts_follow_severity() {
        let current = vec![
            rate("31", "DKI Jakarta", 2023, Some(7.57)),
            rate("53", "NTT", 2023, Some(3.14)),
            rate("32", "Jawa Barat", 2023, Some(11.2)),
        ];
        let report = report(&current, &[]);

        let jabar = &report.regions[2];
        assert_eq!(jabar.alerts.len(), 1);
        assert_eq!(jabar.alerts[0].severity, Severity::Critical);
        assert_eq!(
            jabar.alerts[0].message,
            "Jawa Barat has critical Open Unemployment Rate of 11.20%"
        );
        assert_eq!(jabar.alerts[0].indicator_id.as_deref(), Some(ID));
        assert!(report.regions[0].alerts.is_empty());
        assert!(report.regions[0].trend.is_none());
    }

    #[test]
    fn trends_use_latest_earlier_value() {
        let current = vec![
            rate("31", "DKI Jakarta", 2023, Some(8.0)),
            rate("53", "NTT", 2023, Some(3.0)),
        ];
        let previous = vec![
            rate("31", "DKI Jakarta", 2021, Some(4.0)),
            rate("31", "DKI Jakarta", 2022, Some(6.0)),
            rate("53", "NTT", 2022, Some(4.0)),
            rate("53", "NTT", 2024, Some(1.0)),
        ];
        let report = report(&current, &previous);

        let jakarta = report.regions.iter().find(|r| r.region_id == "31").unwrap();
        let trend = jakarta.trend.as_ref().unwrap();
        assert_eq!(trend.year_from, 2022);
        assert_eq!(trend.direction, TrendDirection::Worsening);
        assert!(
            jakarta
                .alerts
                .iter()
                .any(|a| a.kind == AlertKind::WorseningTrend && a.severity == Severity::High)
        );
        assert!(jakarta.alerts[0].message.ends_with("worsening by 2.0 points since 2022"));

        let ntt = report.regions.iter().find(|r| r.region_id == "53").unwrap();
        assert_eq!(ntt.trend.as_ref().unwrap().direction, TrendDirection::Improving);
        assert!(ntt.alerts.iter().any(|a| a.kind == AlertKind::ImprovingTrend));
    }

    #[test]
    fn summary_reads_left_to_right() {
        let current = vec![
            rate("31", "DKI Jakarta", 2023, Some(7.5)),
            rate("53", "NTT", 2023, Some(3.5)),
            rate("32", "Jawa Barat", 2023, Some(11.0)),
        ];
        let report = report(&current, &[]);

        let parts: Vec<&str> = report.summary.split(" | ").collect();
        assert_eq!(parts[0], "Open Unemployment Rate analysis for 2023:");
        assert_eq!(parts[1], "National average: 7.33%");
        assert_eq!(parts[2], "Regions analyzed: 3");
        assert_eq!(parts[3], "1 region(s) in critical condition (>10%)");
        assert_eq!(parts[4], "1 region(s) with high open unemployment rate (7-10%)");
        assert!(parts[5].starts_with("Regional inequality: "));
        assert!(parts[5].contains("(gap index: 0."));
        assert_eq!(parts[6], "Best: NTT (3.50%)");
        assert_eq!(parts[7], "Worst: Jawa Barat (11.00%)");
    }

    #[test]
    fn rejects_higher_is_better_indicators() {
        let registry = registry();
        let err = analyze_rates(
            registry.require("human_development_index").unwrap(),
            2023,
            &[],
            &[],
            &config(),
            now(),
            &NeverCancel,
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { .. }));
    }

    #[test]
    fn duplicate_regions_are_rejected() {
        let registry = registry();
        let current = vec![
            rate("31", "DKI Jakarta", 2023, Some(11.0)),
            rate("31", "DKI Jakarta", 2023, Some(11.0)),
            rate("53", "NTT", 2023, Some(3.0)),
        ];
        let err = analyze_rates(
            registry.require(ID).unwrap(),
            2023,
            &current,
            &[],
            &config(),
            now(),
            &NeverCancel,
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { .. }));

        let distinct = report(&current[1..], &[]);
        assert_eq!(distinct.regions.len(), 2);
        assert_eq!(distinct.critical_count, 1);
        assert!((distinct.national_average - 7.0).abs() < 1e-9);
    }

    #[test]
    fn no_values_is_insufficient() {
        let registry = registry();
        let current = vec![rate("31", "DKI Jakarta", 2023, None)];
        let err = analyze_rates(
            registry.require(ID).unwrap(),
            2023,
            &current,
            &[],
            &config(),
            now(),
            &NeverCancel,
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::InsufficientData { .. }));
    }

    #[test]
    fn honors_cancellation() {
        let registry = registry();
        let current = vec![rate("31", "DKI Jakarta", 2023, Some(5.0))];
        let err = analyze_rates(
            registry.require(ID).unwrap(),
            2023,
            &current,
            &[],
            &config(),
            now(),
            &AtomicBool::new(true),
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::Cancelled));
    }
}
