#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regional scoring and gap-analysis engine.
//!
//! Turns per-region, per-year indicator values into comparable composite
//! scores. Each stage is a pure function in its own module:
//!
//! 1. [`normalize`]: size-adjusts raw values (per capita, per km², ...).
//! 2. [`scale`]: min-max scales each indicator to 0-100 across the year's
//!    regions, inverting indicators whose direction opposes the
//!    [`RankingConvention`].
//! 3. [`composite`]: weighted mean of the scaled scores.
//! 4. [`rank`]: ranks, rank deltas and percentiles.
//! 5. [`gap`]: national average, dispersion, and per-region gaps.
//! 6. [`trend`]: year-over-year change classification.
//! 7. [`severity`]: severity tiers and alerts.
//!
//! [`ScoringEngine`] wires the stages together for a full dataset. No
//! stage keeps state between calls, and every long-running entry point
//! takes a [`Cancellation`] token.

pub mod cancel;
pub mod composite;
pub mod config;
pub mod fingerprint;
pub mod gap;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod rates;
pub mod scale;
pub mod severity;
pub mod trend;

use gapmap_indicator::IndicatorError;
use thiserror::Error;

pub use cancel::{Cancellation, Deadline, NeverCancel};
pub use config::parse_config;
pub use fingerprint::{ScoreCache, cache_key};
pub use gapmap_scoring_models::RankingConvention;
pub use pipeline::ScoringEngine;
pub use rates::analyze_rates;

/// Errors that can occur while scoring.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// An input value or configuration entry is unusable.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what went wrong.
        message: String,
    },

    /// Not enough data to produce a meaningful result.
    #[error("Insufficient data: {message}")]
    InsufficientData {
        /// Description of what is missing.
        message: String,
    },

    /// A requested region or year is absent from the dataset.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was requested.
        message: String,
    },

    /// The caller cancelled the computation.
    #[error("Scoring cancelled")]
    Cancelled,

    /// Indicator registry error.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// Configuration TOML could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl ScoringError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}
