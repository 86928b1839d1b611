//! Strongly-typed per-family indicator payloads.
//!
//! Each statistical release has its own shape: the Gini ratio and poverty
//! figures are published per semester with an urban/rural split, the
//! unemployment rate per survey round, inflation as a monthly series, and
//! so on. [`IndicatorPayload`] carries each family's shape as its own
//! variant. The boundary layer parses a release into a payload and reduces
//! it to a single headline number keyed by indicator id before handing it
//! to the scoring engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Calendar month, used as the key of monthly series.
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
pub enum Month {
    /// January.
    January,
    /// February.
    February,
    /// March.
    March,
    /// April.
    April,
    /// May.
    May,
    /// June.
    June,
    /// July.
    July,
    /// August.
    August,
    /// September.
    September,
    /// October.
    October,
    /// November.
    November,
    /// December.
    December,
}

/// A figure split by urban and rural areas, plus the combined total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UrbanRuralValues {
    /// Urban areas.
    #[serde(default)]
    pub urban: Option<f64>,
    /// Rural areas.
    #[serde(default)]
    pub rural: Option<f64>,
    /// Urban and rural combined.
    #[serde(default)]
    pub total: Option<f64>,
}

/// A figure collected in the February and August survey rounds, with an
/// optional annual figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundValues {
    /// February round.
    #[serde(default)]
    pub february: Option<f64>,
    /// August round.
    #[serde(default)]
    pub august: Option<f64>,
    /// Annual figure. Often unpublished.
    #[serde(default)]
    pub annual: Option<f64>,
}

impl RoundValues {
    /// The annual figure when published, otherwise the August round.
    #[must_use]
    pub fn annual_or_august(&self) -> Option<f64> {
        self.annual.or(self.august)
    }
}

/// Labor force composition from one survey round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborForceSnapshot {
    /// Working-age residents in the labor force.
    #[serde(default)]
    pub labor_force: Option<f64>,
    /// Employed residents.
    #[serde(default)]
    pub employed: Option<f64>,
    /// Unemployed residents.
    #[serde(default)]
    pub unemployed: Option<f64>,
    /// Employed share of the labor force, in percent.
    #[serde(default)]
    pub employed_percent: Option<f64>,
}

impl LaborForceSnapshot {
    /// Employed share of the labor force, derived from the counts when the
    /// percentage itself was not published.
    #[must_use]
    pub fn employed_share(&self) -> Option<f64> {
        self.employed_percent.or_else(|| match (self.employed, self.labor_force) {
            (Some(employed), Some(force)) if force > 0.0 => Some(employed / force * 100.0),
            _ => None,
        })
    }
}

/// One indicator family's release for a region and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "indicator", rename_all = "snake_case")]
pub enum IndicatorPayload {
    /// Gini ratio, published per semester.
    GiniRatio {
        /// March release.
        #[serde(default)]
        semester_1: Option<UrbanRuralValues>,
        /// September release.
        #[serde(default)]
        semester_2: Option<UrbanRuralValues>,
    },
    /// Human development index.
    HumanDevelopmentIndex {
        /// Index value (0-100).
        value: Option<f64>,
    },
    /// Open unemployment rate, in percent.
    OpenUnemploymentRate {
        /// February round.
        #[serde(default)]
        february: Option<f64>,
        /// August round.
        #[serde(default)]
        august: Option<f64>,
        /// Annual figure. Often unpublished.
        #[serde(default)]
        annual: Option<f64>,
    },
    /// Share of residents below the poverty line, in percent.
    PovertyPercentage {
        /// March release.
        #[serde(default)]
        semester_1: Option<UrbanRuralValues>,
        /// September release.
        #[serde(default)]
        semester_2: Option<UrbanRuralValues>,
    },
    /// Gross regional domestic product per capita, in thousands of the
    /// local currency.
    GrdpPerCapita {
        /// Value in thousands.
        thousands: Option<f64>,
    },
    /// Average net monthly wage, by sector.
    AverageNetWage {
        /// Sector name to survey rounds. The `"total"` sector is scored.
        sectors: BTreeMap<String, RoundValues>,
    },
    /// Year-on-year inflation, in percent.
    AnnualInflation {
        /// Monthly readings.
        #[serde(default)]
        monthly: BTreeMap<Month, f64>,
    },
    /// Consumer price index.
    ConsumerPriceIndex {
        /// Monthly readings.
        #[serde(default)]
        monthly: BTreeMap<Month, f64>,
    },
    /// Labor force composition.
    LaborForce {
        /// February round.
        #[serde(default)]
        february: Option<LaborForceSnapshot>,
        /// August round.
        #[serde(default)]
        august: Option<LaborForceSnapshot>,
    },
}

impl IndicatorPayload {
    /// Sector key scored for [`IndicatorPayload::AverageNetWage`].
    pub const TOTAL_SECTOR: &'static str = "total";

    /// Returns the registry id of the indicator this payload feeds.
    #[must_use]
    pub const fn indicator_id(&self) -> &'static str {
        match self {
            Self::GiniRatio { .. } => "gini_ratio",
            Self::HumanDevelopmentIndex { .. } => "human_development_index",
            Self::OpenUnemploymentRate { .. } => "open_unemployment_rate",
            Self::PovertyPercentage { .. } => "poverty_percentage",
            Self::GrdpPerCapita { .. } => "grdp_per_capita",
            Self::AverageNetWage { .. } => "average_net_wage",
            Self::AnnualInflation { .. } => "annual_inflation",
            Self::ConsumerPriceIndex { .. } => "consumer_price_index",
            Self::LaborForce { .. } => "labor_force_employment",
        }
    }

    /// Reduces the payload to the single figure used for scoring.
    ///
    /// Semester releases use the second semester total, survey rounds use
    /// the annual figure falling back to August, monthly series use
    /// December, and the labor force uses the August employed share.
    /// Returns `None` when that figure was not published.
    #[must_use]
    pub fn headline_value(&self) -> Option<f64> {
        match self {
            Self::GiniRatio { semester_2, .. } | Self::PovertyPercentage { semester_2, .. } => {
                semester_2.and_then(|s| s.total)
            }
            Self::HumanDevelopmentIndex { value } => *value,
            Self::OpenUnemploymentRate { august, annual, .. } => annual.or(*august),
            Self::GrdpPerCapita { thousands } => *thousands,
            Self::AverageNetWage { sectors } => sectors
                .get(Self::TOTAL_SECTOR)
                .and_then(RoundValues::annual_or_august),
            Self::AnnualInflation { monthly } | Self::ConsumerPriceIndex { monthly } => {
                monthly.get(&Month::December).copied()
            }
            Self::LaborForce { august, .. } => august.and_then(|s| s.employed_share()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gini_uses_second_semester_total() {
        let payload = IndicatorPayload::GiniRatio {
            semester_1: Some(UrbanRuralValues {
                urban: Some(0.41),
                rural: Some(0.32),
                total: Some(0.39),
            }),
            semester_2: Some(UrbanRuralValues {
                urban: Some(0.40),
                rural: Some(0.31),
                total: Some(0.38),
            }),
        };
        assert_eq!(payload.indicator_id(), "gini_ratio");
        assert_eq!(payload.headline_value(), Some(0.38));
    }

    #[test]
    fn gini_without_second_semester_has_no_headline() {
        let payload = IndicatorPayload::GiniRatio {
            semester_1: Some(UrbanRuralValues {
                urban: None,
                rural: None,
                total: Some(0.39),
            }),
            semester_2: None,
        };
        assert_eq!(payload.headline_value(), None);
    }

    #[test]
    fn unemployment_prefers_annual_then_august() {
        let payload = IndicatorPayload::OpenUnemploymentRate {
            february: Some(5.1),
            august: Some(4.8),
            annual: None,
        };
        assert_eq!(payload.headline_value(), Some(4.8));

        let payload = IndicatorPayload::OpenUnemploymentRate {
            february: Some(5.1),
            august: Some(4.8),
            annual: Some(4.9),
        };
        assert_eq!(payload.headline_value(), Some(4.9));
    }

    #[test]
    fn inflation_uses_december() {
        let monthly = BTreeMap::from([(Month::January, 2.4), (Month::December, 2.9)]);
        let payload = IndicatorPayload::AnnualInflation { monthly };
        assert_eq!(payload.indicator_id(), "annual_inflation");
        assert_eq!(payload.headline_value(), Some(2.9));
    }

    #[test]
    fn wage_uses_total_sector() {
        let sectors = BTreeMap::from([
            (
                "agriculture".to_string(),
                RoundValues {
                    february: None,
                    august: Some(1_900_000.0),
                    annual: None,
                },
            ),
            (
                "total".to_string(),
                RoundValues {
                    february: None,
                    august: Some(2_800_000.0),
                    annual: None,
                },
            ),
        ]);
        let payload = IndicatorPayload::AverageNetWage { sectors };
        assert_eq!(payload.headline_value(), Some(2_800_000.0));
    }

    #[test]
    fn labor_force_derives_share_from_counts() {
        let payload = IndicatorPayload::LaborForce {
            february: None,
            august: Some(LaborForceSnapshot {
                labor_force: Some(200.0),
                employed: Some(190.0),
                unemployed: Some(10.0),
                employed_percent: None,
            }),
        };
        assert_eq!(payload.indicator_id(), "labor_force_employment");
        assert_eq!(payload.headline_value(), Some(95.0));
    }

    #[test]
    fn payload_is_tagged_by_indicator() {
        let payload: IndicatorPayload = serde_json::from_value(serde_json::json!({
            "indicator": "open_unemployment_rate",
            "february": 6.2,
            "august": 5.9
        }))
        .unwrap();
        assert_eq!(payload.headline_value(), Some(5.9));

        let payload: IndicatorPayload = serde_json::from_value(serde_json::json!({
            "indicator": "human_development_index",
            "value": 72.9
        }))
        .unwrap();
        assert_eq!(payload.indicator_id(), "human_development_index");
    }
}
