//! Hardy-Weinberg equilibrium via the Levene-Haldane distribution.
//!
//! Conditional on the sample size `n` and the minor allele count `n_a`, the
//! number of heterozygotes follows the Levene-Haldane distribution. The
//! reported p-value is the two-sided exact mid-p of the observed
//! heterozygote count under that distribution.

use crate::special::{ln_factorial, normalize_log_weights, REL_ERR};
use crate::{count, total, StatsError};

/// Result of a Hardy-Weinberg test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HweResult {
    /// Expected heterozygote frequency under equilibrium.
    pub expected_het_frequency: f64,
    /// Two-sided exact mid-p value.
    pub p_value: f64,
}

/// Levene-Haldane distribution over heterozygote counts.
struct LeveneHaldane {
    /// Heterozygote counts in the support (same parity as `n_a`).
    support: Vec<u64>,
    /// Probability of each support point.
    probs: Vec<f64>,
}

impl LeveneHaldane {
    fn new(n: u64, n_a: u64) -> Self {
        let n_b = 2 * n - n_a;
        let max_het = n_a.min(n_b);
        let support: Vec<u64> = (n_a % 2..=max_het).step_by(2).collect();
        let log_weights: Vec<f64> = support
            .iter()
            .map(|&n_ab| {
                let n_aa = (n_a - n_ab) / 2;
                let n_bb = (n_b - n_ab) / 2;
                n_ab as f64 * std::f64::consts::LN_2 - ln_factorial(n_aa)
                    - ln_factorial(n_ab)
                    - ln_factorial(n_bb)
            })
            .collect();
        Self { probs: normalize_log_weights(&log_weights), support }
    }

    fn mean(&self) -> f64 {
        self.support
            .iter()
            .zip(&self.probs)
            .map(|(&k, &p)| k as f64 * p)
            .sum()
    }

    fn probability(&self, n_ab: u64) -> f64 {
        self.support
            .iter()
            .position(|&k| k == n_ab)
            .map_or(0.0, |i| self.probs[i])
    }

    /// Sum of probabilities below `p(n_ab)` plus half of those tied with it.
    fn exact_mid_p(&self, n_ab: u64) -> f64 {
        let observed = self.probability(n_ab);
        let (mut below, mut tied) = (0.0, 0.0);
        for &p in &self.probs {
            if p * REL_ERR < observed {
                below += p;
            } else if p <= observed * REL_ERR {
                tied += p;
            }
        }
        (below + 0.5 * tied).min(1.0)
    }
}

/// Test genotype counts for Hardy-Weinberg equilibrium.
///
/// Returns `Ok(None)` when there are no genotypes at all, since neither the
/// expected frequency nor the p-value is defined for an empty sample.
pub fn hardy_weinberg(
    n_hom_ref: i64,
    n_het: i64,
    n_hom_var: i64,
) -> Result<Option<HweResult>, StatsError> {
    let n_hom_ref = count("nHomRef", n_hom_ref)?;
    let n_het = count("nHet", n_het)?;
    let n_hom_var = count("nHomVar", n_hom_var)?;

    let n = total("genotype", &[n_hom_ref, n_het, n_hom_var])?;
    if n == 0 {
        return Ok(None);
    }

    let n_a = n_het + 2 * n_hom_ref.min(n_hom_var);
    let dist = LeveneHaldane::new(n, n_a);

    Ok(Some(HweResult {
        expected_het_frequency: dist.mean() / n as f64,
        p_value: dist.exact_mid_p(n_het),
    }))
}
