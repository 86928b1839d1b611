//! End-to-end scoring over a dataset of region records.
//!
//! [`ScoringEngine`] resolves weights and normalizations once, then runs
//! the normalize, scale, aggregate, rank and gap stages for whichever year
//! or region the caller asks about. It holds no mutable state; every call
//! recomputes from the records it is given.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use gapmap_indicator::IndicatorRegistry;
use gapmap_indicator_models::{Indicator, NormalizationType};
use gapmap_scoring_models::{
    Alert, CompositeScore, IndicatorBreakdown, PeriodComparison, RegionMetricRecord, ScoreBand,
    ScoreBreakdown, ScoringConfig, ScoringIssue, TrendPoint, UnscoredRegion, YearScores,
};
use rayon::prelude::*;

use crate::ScoringError;
use crate::cancel::{self, Cancellation};
use crate::composite::{self, Contribution};
use crate::config::{check_overrides, check_thresholds, resolve_weights};
use crate::fingerprint::{self, ScoreCache};
use crate::gap::analyze_gaps;
use crate::normalize::{effective_normalization, normalize_metric};
use crate::rank::{percentile, rank_delta, rank_scores};
use crate::scale::{ScaleRange, scale_indicator};
use crate::severity::{AlertSubject, band_severity, generate_alerts};
use crate::trend::{analyze_series, compare_periods, trend_point};

const COMPOSITE_LABEL: &str = "composite score";

/// Scores region records against a registry under one configuration.
#[derive(Debug, Clone)]
pub struct ScoringEngine<'a> {
    registry: &'a IndicatorRegistry,
    config: &'a ScoringConfig,
    weights: BTreeMap<String, f64>,
}

/// One indicator's values across the regions of a year.
struct IndicatorColumn<'r> {
    indicator: &'r Indicator,
    weight: f64,
    raw: Vec<Option<f64>>,
    normalized: Vec<Option<f64>>,
    range: Option<ScaleRange>,
    scaled: Vec<Option<f64>>,
}

/// Every indicator column for the regions of one year. Column vectors are
/// indexed like `regions`.
struct YearMatrix<'r> {
    year: i32,
    regions: Vec<&'r RegionMetricRecord>,
    columns: Vec<IndicatorColumn<'r>>,
    issues: Vec<ScoringIssue>,
}

struct ScoredRegion<'r> {
    record: &'r RegionMetricRecord,
    score: f64,
    contributions: Vec<Contribution>,
}

impl<'a> ScoringEngine<'a> {
    /// Resolves `config` against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidInput`] if the config names an unknown
    /// preset or indicator, carries a negative or non-finite weight or
    /// threshold, or leaves every indicator with zero weight.
    pub fn new(
        registry: &'a IndicatorRegistry,
        config: &'a ScoringConfig,
    ) -> Result<Self, ScoringError> {
        check_thresholds(config)?;
        check_overrides(registry, config)?;
        let weights = resolve_weights(registry, config)?;

        log::debug!(
            "Scoring engine ready: {} indicators, convention {}",
            registry.len(),
            config.convention
        );

        Ok(Self {
            registry,
            config,
            weights,
        })
    }

    /// The configuration this engine scores with.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        self.config
    }

    /// Effective weight of every registered indicator.
    #[must_use]
    pub const fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Effective normalization of every registered indicator.
    #[must_use]
    pub fn normalizations(&self) -> BTreeMap<String, NormalizationType> {
        self.registry
            .iter()
            .map(|i| {
                (
                    i.id.clone(),
                    effective_normalization(i, &self.config.normalization_overrides),
                )
            })
            .collect()
    }

    /// Scores every region of `year`.
    ///
    /// `previous_ranks` (region id to rank) fills in rank deltas.
    ///
    /// # Errors
    ///
    /// * [`ScoringError::NotFound`] if no record belongs to `year`.
    /// * [`ScoringError::InvalidInput`] if a region appears twice in `year`.
    /// * [`ScoringError::InsufficientData`] if `year` has a single region or
    ///   no region has a scorable indicator.
    /// * [`ScoringError::Cancelled`] if `cancel` fires.
    pub fn score_year(
        &self,
        records: &[RegionMetricRecord],
        year: i32,
        previous_ranks: Option<&BTreeMap<String, u32>>,
        cancel: &dyn Cancellation,
    ) -> Result<YearScores, ScoringError> {
        let matrix = self.matrix(records, year, cancel)?;
        let mut scores = self.score_matrix(matrix, cancel)?;
        if let Some(previous) = previous_ranks {
            apply_previous_ranks(&mut scores, previous);
        }
        Ok(scores)
    }

    /// Like [`ScoringEngine::score_year`] without previous ranks, memoized
    /// in `cache`.
    ///
    /// The key covers the region set, not the metric values; callers clear
    /// the cache when values change.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`ScoringEngine::score_year`].
    pub fn score_year_cached<'c>(
        &self,
        records: &[RegionMetricRecord],
        year: i32,
        cache: &'c mut ScoreCache,
        cancel: &dyn Cancellation,
    ) -> Result<&'c YearScores, ScoringError> {
        let key = self.cache_key(records, year);
        cache.get_or_try_insert_with(key, || self.score_year(records, year, None, cancel))
    }

    /// Scores every available year in parallel, chaining rank deltas from
    /// each year to the next available one.
    ///
    /// Years without enough data to score are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns the first error other than
    /// [`ScoringError::InsufficientData`], including
    /// [`ScoringError::Cancelled`].
    pub fn score_years(
        &self,
        records: &[RegionMetricRecord],
        cancel: &dyn Cancellation,
    ) -> Result<Vec<YearScores>, ScoringError> {
        let years = available_years(records);
        log::debug!("Scoring {} years", years.len());

        let results: Vec<Result<YearScores, ScoringError>> = years
            .par_iter()
            .map(|&year| self.score_year(records, year, None, cancel))
            .collect();

        let mut scored = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(year_scores) => scored.push(year_scores),
                Err(ScoringError::InsufficientData { message }) => {
                    log::warn!("Skipping year: {message}");
                }
                Err(e) => return Err(e),
            }
        }

        for i in 1..scored.len() {
            let previous = scored[i - 1].ranks();
            apply_previous_ranks(&mut scored[i], &previous);
        }

        Ok(scored)
    }

    /// Explains one region's composite score indicator by indicator.
    ///
    /// # Errors
    ///
    /// * [`ScoringError::NotFound`] if the region has no record in `year`.
    /// * [`ScoringError::InsufficientData`] if the region could not be
    ///   scored.
    /// * Any error from [`ScoringEngine::score_year`].
    pub fn breakdown(
        &self,
        records: &[RegionMetricRecord],
        region_id: &str,
        year: i32,
        cancel: &dyn Cancellation,
    ) -> Result<ScoreBreakdown, ScoringError> {
        if !records
            .iter()
            .any(|r| r.year == year && r.region_id == region_id)
        {
            return Err(ScoringError::not_found(format!(
                "region '{region_id}' has no record for {year}"
            )));
        }

        let matrix = self.matrix(records, year, cancel)?;
        let index = matrix
            .regions
            .iter()
            .position(|r| r.region_id == region_id)
            .ok_or_else(|| {
                ScoringError::not_found(format!("region '{region_id}' has no record for {year}"))
            })?;
        let region_name = matrix.regions[index].display_name().to_string();

        let collections: Vec<IndicatorBreakdown> = matrix
            .columns
            .iter()
            .map(|column| IndicatorBreakdown {
                collection: column.indicator.id.clone(),
                display_name: column.indicator.name.clone(),
                score: column.scaled[index],
                raw_value: column.raw[index],
                normalized_value: column.normalized[index],
                min_value: column.range.map(|r| r.min),
                max_value: column.range.map(|r| r.max),
                lower_is_better: column.indicator.lower_is_better(),
                weight: column.weight,
            })
            .collect();

        let scores = self.score_matrix(matrix, cancel)?;
        let score = scores.score_for(region_id).ok_or_else(|| {
            ScoringError::insufficient(format!(
                "region '{region_id}' has no scorable indicator in {year}"
            ))
        })?;

        Ok(ScoreBreakdown {
            region_id: region_id.to_string(),
            region_name,
            year,
            composite_score: score.composite_score,
            rank: score.rank,
            collections,
        })
    }

    /// Year-over-year trend of one region's composite score.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::NotFound`] if the region was never scored,
    /// or any error from [`ScoringEngine::score_years`].
    pub fn region_trend(
        &self,
        records: &[RegionMetricRecord],
        region_id: &str,
        cancel: &dyn Cancellation,
    ) -> Result<Vec<TrendPoint>, ScoringError> {
        let series: Vec<(i32, f64)> = self
            .score_years(records, cancel)?
            .iter()
            .filter_map(|y| y.score_for(region_id).map(|s| (y.year, s.composite_score)))
            .collect();

        if series.is_empty() {
            return Err(ScoringError::not_found(format!(
                "region '{region_id}' has no composite score in any year"
            )));
        }

        analyze_series(
            &series,
            self.config.convention.score_direction(),
            self.config.trend.stable_band,
        )
    }

    /// Year-over-year trend of one region's raw value for one indicator,
    /// classified by the indicator's own direction.
    ///
    /// # Errors
    ///
    /// * [`ScoringError::Indicator`] if the indicator is not registered.
    /// * [`ScoringError::NotFound`] if the region has no value for it.
    /// * [`ScoringError::InvalidInput`] if the region has two records for
    ///   the same year.
    pub fn indicator_trend(
        &self,
        records: &[RegionMetricRecord],
        region_id: &str,
        indicator_id: &str,
    ) -> Result<Vec<TrendPoint>, ScoringError> {
        let indicator = self.registry.require(indicator_id)?;
        let series: Vec<(i32, f64)> = records
            .iter()
            .filter(|r| r.region_id == region_id)
            .filter_map(|r| r.metric(indicator_id).map(|v| (r.year, v)))
            .collect();

        if series.is_empty() {
            return Err(ScoringError::not_found(format!(
                "region '{region_id}' has no value for '{indicator_id}'"
            )));
        }

        analyze_series(
            &series,
            indicator.direction,
            self.config.trend.stable_band,
        )
    }

    /// Compares every region's composite score between two years.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`ScoringEngine::score_year`] for either
    /// year.
    pub fn compare_years(
        &self,
        records: &[RegionMetricRecord],
        year_from: i32,
        year_to: i32,
        cancel: &dyn Cancellation,
    ) -> Result<PeriodComparison, ScoringError> {
        let from = self.score_year(records, year_from, None, cancel)?;
        let to = self.score_year(records, year_to, None, cancel)?;

        let composites = |scores: &YearScores| -> BTreeMap<String, f64> {
            scores
                .scores
                .iter()
                .map(|s| (s.region_id.clone(), s.composite_score))
                .collect()
        };
        let names: BTreeMap<String, String> = from
            .scores
            .iter()
            .chain(&to.scores)
            .filter_map(|s| s.region_name.clone().map(|n| (s.region_id.clone(), n)))
            .collect();

        Ok(compare_periods(
            (year_from, &composites(&from)),
            (year_to, &composites(&to)),
            &names,
            self.config.convention.score_direction(),
            self.config.trend.stable_band,
        ))
    }

    /// Alerts for every scored region of `year`, from the composite score's
    /// band and its change since the previous available year.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`ScoringEngine::score_year`] for `year`.
    /// A previous year without enough data simply yields no trend.
    pub fn alerts(
        &self,
        records: &[RegionMetricRecord],
        year: i32,
        created_at: DateTime<Utc>,
        cancel: &dyn Cancellation,
    ) -> Result<Vec<Alert>, ScoringError> {
        let previous = match available_years(records)
            .into_iter()
            .filter(|y| *y < year)
            .max()
        {
            Some(previous_year) => match self.score_year(records, previous_year, None, cancel) {
                Ok(scores) => Some(scores),
                Err(ScoringError::InsufficientData { message }) => {
                    log::debug!("No trend context for {year}: {message}");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        let previous_ranks = previous.as_ref().map(YearScores::ranks);
        let current = self.score_year(records, year, previous_ranks.as_ref(), cancel)?;

        let direction = self.config.convention.score_direction();
        let mut alerts = Vec::new();
        for score in &current.scores {
            cancel::check(cancel)?;
            let trend = previous
                .as_ref()
                .and_then(|p| p.score_for(&score.region_id))
                .map(|p| {
                    trend_point(
                        (p.year, p.composite_score),
                        (year, score.composite_score),
                        direction,
                        self.config.trend.stable_band,
                    )
                });
            let subject = AlertSubject {
                region_id: &score.region_id,
                region_name: score.region_name.as_deref().unwrap_or(&score.region_id),
                indicator_id: None,
                label: COMPOSITE_LABEL,
                unit: "",
                value: score.composite_score,
            };
            alerts.extend(generate_alerts(
                &subject,
                band_severity(score.band, self.config.convention),
                trend.as_ref(),
                &self.config.alerts,
                created_at,
            ));
        }

        log::debug!("Generated {} alerts for {year}", alerts.len());
        Ok(alerts)
    }

    /// Memoization key for scoring `year` of `records` with this engine.
    #[must_use]
    pub fn cache_key(&self, records: &[RegionMetricRecord], year: i32) -> String {
        fingerprint::cache_key(
            year,
            records
                .iter()
                .filter(|r| r.year == year)
                .map(|r| r.region_id.as_str()),
            &self.weights,
            &self.config.normalization_overrides,
            self.config.convention,
        )
    }

    fn matrix<'r>(
        &'r self,
        records: &'r [RegionMetricRecord],
        year: i32,
        cancel: &dyn Cancellation,
    ) -> Result<YearMatrix<'r>, ScoringError> {
        let regions: Vec<&RegionMetricRecord> = records.iter().filter(|r| r.year == year).collect();
        if regions.is_empty() {
            return Err(ScoringError::not_found(format!("no records for {year}")));
        }

        let mut seen = BTreeSet::new();
        for region in &regions {
            if !seen.insert(region.region_id.as_str()) {
                return Err(ScoringError::invalid(format!(
                    "region '{}' has more than one record for {year}",
                    region.region_id
                )));
            }
        }

        if regions.len() < 2 {
            return Err(ScoringError::insufficient(format!(
                "{year} has a single region; scores are relative to peer regions"
            )));
        }

        let mut columns: Vec<IndicatorColumn<'r>> = self
            .registry
            .iter()
            .map(|indicator| IndicatorColumn {
                indicator,
                weight: self
                    .weights
                    .get(&indicator.id)
                    .copied()
                    .unwrap_or(indicator.weight),
                raw: Vec::with_capacity(regions.len()),
                normalized: Vec::with_capacity(regions.len()),
                range: None,
                scaled: Vec::new(),
            })
            .collect();

        let mut issues = Vec::new();
        for region in &regions {
            cancel::check(cancel)?;
            for column in &mut columns {
                let raw = region.metric(&column.indicator.id);
                let normalization = effective_normalization(
                    column.indicator,
                    &self.config.normalization_overrides,
                );
                let normalized =
                    match normalize_metric(raw, normalization, region.population, region.area) {
                        Ok(value) => value,
                        Err(e) => {
                            log::warn!(
                                "Dropping '{}' for region '{}' in {year}: {e}",
                                column.indicator.id,
                                region.region_id
                            );
                            issues.push(ScoringIssue {
                                region_id: region.region_id.clone(),
                                indicator_id: column.indicator.id.clone(),
                                message: e.to_string(),
                            });
                            None
                        }
                    };
                column.raw.push(raw);
                column.normalized.push(normalized);
            }
        }

        for column in &mut columns {
            column.range = ScaleRange::of(&column.normalized);
            column.scaled = scale_indicator(
                &column.normalized,
                column.indicator.direction,
                self.config.convention,
            );
        }

        Ok(YearMatrix {
            year,
            regions,
            columns,
            issues,
        })
    }

    fn score_matrix(
        &self,
        matrix: YearMatrix<'_>,
        cancel: &dyn Cancellation,
    ) -> Result<YearScores, ScoringError> {
        let year = matrix.year;
        let mut scored = Vec::with_capacity(matrix.regions.len());
        let mut unscored = Vec::new();

        for (index, record) in matrix.regions.iter().copied().enumerate() {
            cancel::check(cancel)?;
            let contributions: Vec<Contribution> = matrix
                .columns
                .iter()
                .filter(|c| c.weight > 0.0)
                .filter_map(|c| {
                    c.scaled[index].map(|score| Contribution {
                        category: c.indicator.category,
                        score,
                        weight: c.weight,
                    })
                })
                .collect();

            match composite::weighted_mean(&contributions) {
                Ok(score) => scored.push(ScoredRegion {
                    record,
                    score,
                    contributions,
                }),
                Err(e) => {
                    log::debug!("Region '{}' unscored in {year}: {e}", record.region_id);
                    unscored.push(UnscoredRegion {
                        region_id: record.region_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if scored.is_empty() {
            return Err(ScoringError::insufficient(format!(
                "no region has a scorable indicator in {year}"
            )));
        }

        let values: Vec<f64> = scored.iter().map(|s| s.score).collect();
        let ranks = rank_scores(&values, self.config.convention);
        let pairs: Vec<(String, f64)> = scored
            .iter()
            .map(|s| (s.record.region_id.clone(), s.score))
            .collect();
        let gap = analyze_gaps(year, &pairs)?;
        let total = scored.len();

        let mut scores: Vec<CompositeScore> = scored
            .into_iter()
            .zip(ranks)
            .map(|(s, rank)| CompositeScore {
                region_id: s.record.region_id.clone(),
                region_name: s.record.region_name.clone(),
                year,
                composite_score: s.score,
                category_scores: composite::category_scores(&s.contributions),
                indicators_scored: s.contributions.len(),
                rank,
                previous_rank: None,
                rank_delta: None,
                percentile: percentile(rank, total),
                gap_from_average: s.score - gap.national_average,
                band: ScoreBand::from_score(s.score),
            })
            .collect();
        scores.sort_by_key(|s| s.rank);

        log::debug!(
            "Scored {} regions for {year} ({} unscored, {} issues)",
            scores.len(),
            unscored.len(),
            matrix.issues.len()
        );

        Ok(YearScores {
            year,
            convention: self.config.convention,
            scores,
            gap,
            unscored,
            issues: matrix.issues,
        })
    }
}

/// Distinct years present in `records`, ascending.
#[must_use]
pub fn available_years(records: &[RegionMetricRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn apply_previous_ranks(scores: &mut YearScores, previous: &BTreeMap<String, u32>) {
    for score in &mut scores.scores {
        score.previous_rank = previous.get(&score.region_id).copied();
        score.rank_delta = rank_delta(score.previous_rank, score.rank);
    }
}
