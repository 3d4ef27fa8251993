//! Exact two-sided binomial test.

use crate::special::{ln_choose, REL_ERR};
use crate::{count, total, StatsError};

/// Two-sided exact binomial test of `successes` out of `trials` against
/// success probability `p`.
///
/// The p-value sums the probability of every outcome no more likely than the
/// observed one.
pub fn binomial_test(successes: i64, trials: i64, p: f64) -> Result<f64, StatsError> {
    let successes = count("successes", successes)?;
    let trials = total("trials", &[count("trials", trials)?])?;
    if successes > trials {
        return Err(StatsError::SuccessesExceedTrials { successes, trials });
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidProbability { name: "p", value: p });
    }

    if p == 0.0 || p == 1.0 {
        let certain = if p == 0.0 { 0 } else { trials };
        return Ok(if successes == certain { 1.0 } else { 0.0 });
    }

    let (ln_p, ln_q) = (p.ln(), (1.0 - p).ln());
    let density = |k: u64| {
        (ln_choose(trials, k) + k as f64 * ln_p + (trials - k) as f64 * ln_q).exp()
    };
    let observed = density(successes);
    let total: f64 = (0..=trials)
        .map(density)
        .filter(|&d| d <= observed * REL_ERR)
        .sum();
    Ok(total.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_balanced_counts() {
        let p = binomial_test(5, 10, 0.5).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_failures() {
        let p = binomial_test(0, 10, 0.5).unwrap();
        assert!((p - 2.0 * 0.5f64.powi(10)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_probability() {
        assert_eq!(binomial_test(0, 4, 0.0), Ok(1.0));
        assert_eq!(binomial_test(1, 4, 0.0), Ok(0.0));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            binomial_test(5, 3, 0.5),
            Err(StatsError::SuccessesExceedTrials { successes: 5, trials: 3 })
        );
        assert!(matches!(
            binomial_test(1, 3, 1.5),
            Err(StatsError::InvalidProbability { .. })
        ));
        assert_eq!(
            binomial_test(0, i64::MAX, 0.5),
            Err(StatsError::TooManyObservations { name: "trials", total: i64::MAX as u64 })
        );
    }
}
