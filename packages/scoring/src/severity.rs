//! Severity classification and alert generation.
//!
//! Severity comes from one of two sources: a raw rate compared against the
//! configured thresholds, or a composite score's band read through the
//! ranking convention. Either way, high and critical tiers raise a
//! threshold alert, and significant trends can raise trend alerts.

use chrono::{DateTime, Utc};
use gapmap_scoring_models::{
    Alert, AlertConfig, AlertKind, AlertStatus, RankingConvention, RateAssessment, RateCategory,
    ScoreBand, Severity, SeverityConfig, TrendDirection, TrendPoint,
};

const CRITICAL_RECOMMENDATION: &str =
    "Immediate intervention needed: targeted programs and economic stimulus";
const HIGH_RECOMMENDATION: &str = "Implement targeted programs and monitor closely";
const WORSENING_RECOMMENDATION: &str = "Investigate causes and implement corrective measures";
const IMPROVING_RECOMMENDATION: &str = "Continue current policies and share best practices";

/// Tier of a raw rate under `thresholds`.
#[must_use]
pub fn classify_rate(rate: f64, thresholds: &SeverityConfig) -> Severity {
    if rate > thresholds.critical_rate {
        Severity::Critical
    } else if rate > thresholds.high_rate {
        Severity::High
    } else if rate >= thresholds.medium_rate {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Tier of a composite score band.
///
/// Under the inequality index a very high score is the worst outcome;
/// under the leaderboard a very low score is.
#[must_use]
pub const fn band_severity(band: ScoreBand, convention: RankingConvention) -> Severity {
    let band = match convention {
        RankingConvention::InequalityIndex => band,
        RankingConvention::Leaderboard => mirror(band),
    };
    match band {
        ScoreBand::VeryHigh => Severity::Critical,
        ScoreBand::High => Severity::High,
        ScoreBand::Medium => Severity::Medium,
        ScoreBand::Low | ScoreBand::VeryLow => Severity::Low,
    }
}

const fn mirror(band: ScoreBand) -> ScoreBand {
    match band {
        ScoreBand::VeryLow => ScoreBand::VeryHigh,
        ScoreBand::Low => ScoreBand::High,
        ScoreBand::Medium => ScoreBand::Medium,
        ScoreBand::High => ScoreBand::Low,
        ScoreBand::VeryHigh => ScoreBand::VeryLow,
    }
}

/// Scores a raw rate on a piecewise 0-100 scale (higher is better) and
/// classifies it.
///
/// | rate        | score    | category  |
/// |-------------|----------|-----------|
/// | ≤ 3         | 90-100   | excellent |
/// | 3 up to 5   | 70-90    | good      |
/// | 5 up to 7   | 50-70    | fair      |
/// | 7 up to 10  | 30-50    | poor      |
/// | > 10        | 0-30     | critical  |
#[must_use]
pub fn assess_rate(rate: f64, thresholds: &SeverityConfig) -> RateAssessment {
    let (score, category) = if rate <= 3.0 {
        (100.0 - (rate * 3.33).trunc(), RateCategory::Excellent)
    } else if rate <= 5.0 {
        (90.0 - ((rate - 3.0) * 10.0).trunc(), RateCategory::Good)
    } else if rate <= 7.0 {
        (70.0 - ((rate - 5.0) * 10.0).trunc(), RateCategory::Fair)
    } else if rate <= 10.0 {
        (50.0 - ((rate - 7.0) * 6.67).trunc(), RateCategory::Poor)
    } else {
        (30.0 - ((rate - 10.0) * 3.0).trunc(), RateCategory::Critical)
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = score.clamp(0.0, 100.0) as u8;

    RateAssessment {
        rate,
        score,
        category,
        severity: classify_rate(rate, thresholds),
    }
}

/// What an alert is about.
#[derive(Debug, Clone, Copy)]
pub struct AlertSubject<'a> {
    /// Region identifier.
    pub region_id: &'a str,
    /// Region display name.
    pub region_name: &'a str,
    /// Indicator id, or `None` for the composite score.
    pub indicator_id: Option<&'a str>,
    /// What is measured, e.g. "Open Unemployment Rate" or "composite score".
    pub label: &'a str,
    /// Unit of `value`. `"percent"` renders as `%`.
    pub unit: &'a str,
    /// The current value.
    pub value: f64,
}

impl AlertSubject<'_> {
    fn formatted_value(&self) -> String {
        match self.unit {
            "percent" => format!("{:.2}%", self.value),
            "" => format!("{:.2}", self.value),
            unit => format!("{:.2} {unit}", self.value),
        }
    }

    fn alert(
        &self,
        kind: AlertKind,
        severity: Severity,
        message: String,
        recommendation: &str,
        created_at: DateTime<Utc>,
    ) -> Alert {
        Alert {
            region_id: self.region_id.to_string(),
            indicator_id: self.indicator_id.map(str::to_string),
            kind,
            severity,
            message,
            recommendation: Some(recommendation.to_string()),
            created_at,
            status: AlertStatus::Active,
        }
    }
}

/// Raises a threshold alert for the high and critical tiers.
///
/// When `trend` is worsening, the message notes by how much and since when.
#[must_use]
pub fn threshold_alert(
    subject: &AlertSubject<'_>,
    severity: Severity,
    trend: Option<&TrendPoint>,
    created_at: DateTime<Utc>,
) -> Option<Alert> {
    if !severity.is_alerting() {
        return None;
    }
    let recommendation = if severity == Severity::Critical {
        CRITICAL_RECOMMENDATION
    } else {
        HIGH_RECOMMENDATION
    };

    let mut message = format!(
        "{} has {severity} {} of {}",
        subject.region_name,
        subject.label,
        subject.formatted_value()
    );
    if let Some(trend) = trend.filter(|t| t.direction == TrendDirection::Worsening) {
        message.push_str(&format!(
            ", worsening by {:.1} points since {}",
            trend.change_absolute.abs(),
            trend.year_from
        ));
    }

    Some(subject.alert(
        AlertKind::Threshold,
        severity,
        message,
        recommendation,
        created_at,
    ))
}

/// Raises an alert for a significant worsening or improving trend.
///
/// Worsening alerts are high severity when the change exceeds
/// `config.escalate_change`, otherwise medium. Improvement alerts are low.
#[must_use]
pub fn trend_alert(
    subject: &AlertSubject<'_>,
    trend: &TrendPoint,
    config: &AlertConfig,
    created_at: DateTime<Utc>,
) -> Option<Alert> {
    let change = trend.change_absolute.abs();
    if !config.trend_alerts || !trend.is_significant || change <= config.significant_change {
        return None;
    }

    let (kind, severity, verb, recommendation) = match trend.direction {
        TrendDirection::Worsening if change > config.escalate_change => (
            AlertKind::WorseningTrend,
            Severity::High,
            "worsened",
            WORSENING_RECOMMENDATION,
        ),
        TrendDirection::Worsening => (
            AlertKind::WorseningTrend,
            Severity::Medium,
            "worsened",
            WORSENING_RECOMMENDATION,
        ),
        TrendDirection::Improving => (
            AlertKind::ImprovingTrend,
            Severity::Low,
            "improved",
            IMPROVING_RECOMMENDATION,
        ),
        TrendDirection::Stable => return None,
    };

    let message = format!(
        "{} {} {verb} by {change:.1} points from {} to {}",
        subject.region_name, subject.label, trend.year_from, trend.year_to
    );
    Some(subject.alert(kind, severity, message, recommendation, created_at))
}

/// All alerts for one subject: the threshold alert, if any, followed by
/// the trend alert, if any.
#[must_use]
pub fn generate_alerts(
    subject: &AlertSubject<'_>,
    severity: Severity,
    trend: Option<&TrendPoint>,
    config: &AlertConfig,
    created_at: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    alerts.extend(threshold_alert(subject, severity, trend, created_at));
    if let Some(trend) = trend {
        alerts.extend(trend_alert(subject, trend, config, created_at));
    }
    alerts
}
