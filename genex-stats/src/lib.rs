//! Exact statistical tests for the genex built-in catalog.
//!
//! These are the numeric bodies behind `hwe`, `fet` and `pAB`. They know
//! nothing about the dispatch registry: inputs are plain integer counts and
//! outputs are plain structs. Invalid inputs (negative counts, probabilities
//! outside `[0, 1]`, totals above [`MAX_TOTAL_COUNT`]) are reported as
//! [`StatsError`] so the caller can turn them into an evaluation failure.
//!
//! # Module Structure
//!
//! - [`special`] - Log-space combinatorics and root finding
//! - [`hwe`] - Hardy-Weinberg equilibrium (Levene-Haldane exact mid-p)
//! - [`fisher`] - Fisher's exact test with conditional MLE odds ratio
//! - [`binomial`] - Exact two-sided binomial test

pub mod binomial;
pub mod fisher;
pub mod hwe;
pub mod special;

use thiserror::Error;

pub use binomial::binomial_test;
pub use fisher::{fisher_exact, FisherResult};
pub use hwe::{hardy_weinberg, HweResult};

/// Errors raised for inputs outside a test's domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("{name} must be non-negative, got {value}")]
    NegativeCount { name: &'static str, value: i64 },

    #[error("{name} must be in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("successes ({successes}) exceed trials ({trials})")]
    SuccessesExceedTrials { successes: u64, trials: u64 },

    #[error("{name} total {total} exceeds the limit of {}", MAX_TOTAL_COUNT)]
    TooManyObservations { name: &'static str, total: u64 },
}

/// Largest total count an exact test accepts. The tests enumerate their
/// whole support, which grows linearly with the total.
pub const MAX_TOTAL_COUNT: u64 = 10_000_000;

/// Validate a count argument and convert it to `u64`.
pub(crate) fn count(name: &'static str, value: i64) -> Result<u64, StatsError> {
    u64::try_from(value).map_err(|_| StatsError::NegativeCount { name, value })
}

/// Sum validated counts, rejecting totals above [`MAX_TOTAL_COUNT`].
pub(crate) fn total(name: &'static str, counts: &[u64]) -> Result<u64, StatsError> {
    let total = counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
    if total > MAX_TOTAL_COUNT {
        return Err(StatsError::TooManyObservations { name, total });
    }
    Ok(total)
}
