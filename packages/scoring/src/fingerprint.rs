//! Memoization keys for scored years.
//!
//! Scoring is a pure function of the year, the set of regions scored, the
//! effective weights, the normalization overrides and the convention, so a
//! SHA-256 digest of exactly those inputs identifies a result. Callers that
//! rescore the same data repeatedly keep a [`ScoreCache`] keyed by it.

use std::collections::{BTreeMap, BTreeSet};

use gapmap_indicator_models::NormalizationType;
use gapmap_scoring_models::{RankingConvention, YearScores};
use sha2::{Digest, Sha256};

use crate::ScoringError;

/// Hex-encoded SHA-256 fingerprint of one scoring run's inputs.
///
/// Region order and duplicates do not affect the key.
#[must_use]
pub fn cache_key<'a>(
    year: i32,
    region_ids: impl IntoIterator<Item = &'a str>,
    weights: &BTreeMap<String, f64>,
    normalization_overrides: &BTreeMap<String, NormalizationType>,
    convention: RankingConvention,
) -> String {
    let regions: BTreeSet<&str> = region_ids.into_iter().collect();

    let mut region_hasher = Sha256::new();
    for id in &regions {
        region_hasher.update(id.as_bytes());
        region_hasher.update([0]);
    }
    let region_set_hash = region_hasher.finalize();

    let mut hasher = Sha256::new();
    hasher.update(year.to_be_bytes());
    hasher.update(region_set_hash);
    hasher.update(convention.as_ref().as_bytes());
    hasher.update([0]);
    for (id, weight) in weights {
        hasher.update(id.as_bytes());
        hasher.update([0]);
        hasher.update(weight.to_bits().to_be_bytes());
    }
    hasher.update([0xff]);
    for (id, normalization) in normalization_overrides {
        hasher.update(id.as_bytes());
        hasher.update([0]);
        hasher.update(normalization.as_ref().as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}

/// Caller-owned memo of scored years, keyed by [`cache_key`].
#[derive(Debug, Clone, Default)]
pub struct ScoreCache {
    entries: BTreeMap<String, YearScores>,
}

impl ScoreCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a cached result.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&YearScores> {
        self.entries.get(key)
    }

    /// Returns the cached result for `key`, computing and storing it on a
    /// miss. Failed computations are not cached.
    ///
    /// # Errors
    ///
    /// Propagates any error from `compute`.
    pub fn get_or_try_insert_with(
        &mut self,
        key: String,
        compute: impl FnOnce() -> Result<YearScores, ScoringError>,
    ) -> Result<&YearScores, ScoringError> {
        if self.entries.contains_key(&key) {
            log::trace!("Score cache hit for {key}");
        } else {
            log::trace!("Score cache miss for {key}");
            let scores = compute()?;
            self.entries.insert(key.clone(), scores);
        }
        self.entries
            .get(&key)
            .ok_or_else(|| ScoringError::not_found(format!("cache entry {key}")))
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> BTreeMap<String, f64> {
        BTreeMap::from([("gini_ratio".to_string(), 1.0), ("poverty".to_string(), 0.5)])
    }

    fn key(year: i32, regions: &[&str], weights: &BTreeMap<String, f64>) -> String {
        cache_key(
            year,
            regions.iter().copied(),
            weights,
            &BTreeMap::new(),
            RankingConvention::InequalityIndex,
        )
    }

    #[test]
    fn key_is_hex_sha256() {
        let k = key(2023, &["a", "b"], &weights());
        assert_eq!(k.len(), 64);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn region_order_does_not_matter() {
        assert_eq!(
            key(2023, &["a", "b", "c"], &weights()),
            key(2023, &["c", "a", "b", "a"], &weights())
        );
    }

    #[test]
    fn every_input_changes_the_key() {
        let base = key(2023, &["a", "b"], &weights());
        assert_ne!(base, key(2022, &["a", "b"], &weights()));
        assert_ne!(base, key(2023, &["a", "b", "c"], &weights()));

        let mut changed = weights();
        changed.insert("poverty".to_string(), 0.6);
        assert_ne!(base, key(2023, &["a", "b"], &changed));

        let overrides =
            BTreeMap::from([("poverty".to_string(), NormalizationType::Per100k)]);
        assert_ne!(
            base,
            cache_key(
                2023,
                ["a", "b"],
                &weights(),
                &overrides,
                RankingConvention::InequalityIndex
            )
        );
        assert_ne!(
            base,
            cache_key(
                2023,
                ["a", "b"],
                &weights(),
                &BTreeMap::new(),
                RankingConvention::Leaderboard
            )
        );
    }

    #[test]
    fn failed_computations_are_not_cached() {
        let mut cache = ScoreCache::new();
        let result = cache.get_or_try_insert_with("k".to_string(), || {
            Err(ScoringError::insufficient("nothing"))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
