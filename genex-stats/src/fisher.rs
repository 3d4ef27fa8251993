//! Fisher's exact test on a 2x2 contingency table.
//!
//! The table is laid out as
//!
//! ```text
//!            col 1   col 2
//!   row 1      a       b
//!   row 2      c       d
//! ```
//!
//! Conditioning on the margins, `a` follows a (noncentral) hypergeometric
//! distribution. The p-value is two-sided; the odds ratio is the conditional
//! maximum likelihood estimate and the interval is the 95% conditional
//! interval obtained by inverting the two one-sided tests.

use crate::special::{bisect, ln_choose, normalize_log_weights, REL_ERR};
use crate::{count, total, StatsError};

/// Two-sided confidence level tail mass (95% interval).
const ALPHA: f64 = 0.025;

/// Result of Fisher's exact test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherResult {
    pub p_value: f64,
    pub odds_ratio: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// The conditional distribution of the top-left cell.
struct Hypergeometric {
    lo: u64,
    hi: u64,
    /// Support `lo..=hi` as floats, for weighting.
    support: Vec<f64>,
    /// Central hypergeometric log-densities over the support.
    log_density: Vec<f64>,
}

impl Hypergeometric {
    fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        let m = a + c;
        let n = b + d;
        let k = a + b;
        let lo = k.saturating_sub(n);
        let hi = k.min(m);
        let support: Vec<f64> = (lo..=hi).map(|x| x as f64).collect();
        let log_density = (lo..=hi)
            .map(|x| ln_choose(m, x) + ln_choose(n, k - x) - ln_choose(m + n, k))
            .collect();
        Self { lo, hi, support, log_density }
    }

    /// Noncentral density with odds ratio `ncp` (finite, positive).
    fn density(&self, ncp: f64) -> Vec<f64> {
        let ln_ncp = ncp.ln();
        let weights: Vec<f64> = self
            .log_density
            .iter()
            .zip(&self.support)
            .map(|(ld, x)| ld + ln_ncp * x)
            .collect();
        normalize_log_weights(&weights)
    }

    fn mean(&self, ncp: f64) -> f64 {
        if ncp == 0.0 {
            return self.lo as f64;
        }
        if ncp.is_infinite() {
            return self.hi as f64;
        }
        self.density(ncp)
            .iter()
            .zip(&self.support)
            .map(|(p, x)| p * x)
            .sum()
    }

    /// `P(X <= q)` or, with `upper`, `P(X >= q)` under odds ratio `ncp`.
    fn cdf(&self, q: u64, ncp: f64, upper: bool) -> f64 {
        let indicator = |b: bool| if b { 1.0 } else { 0.0 };
        if ncp == 0.0 {
            return if upper { indicator(q <= self.lo) } else { indicator(q >= self.lo) };
        }
        if ncp.is_infinite() {
            return if upper { indicator(q <= self.hi) } else { indicator(q >= self.hi) };
        }
        self.density(ncp)
            .iter()
            .zip(self.lo..=self.hi)
            .filter(|&(_, x)| if upper { x >= q } else { x <= q })
            .map(|(p, _)| p)
            .sum()
    }

    fn p_value(&self, x: u64) -> f64 {
        let d = self.density(1.0);
        let observed = d[(x - self.lo) as usize];
        d.iter()
            .filter(|&&p| p <= observed * REL_ERR)
            .sum::<f64>()
            .min(1.0)
    }

    fn odds_ratio(&self, x: u64) -> f64 {
        if x == self.lo {
            return 0.0;
        }
        if x == self.hi {
            return f64::INFINITY;
        }
        let target = x as f64;
        let mu = self.mean(1.0);
        if mu > target {
            bisect(|t| self.mean(t) - target, 0.0, 1.0)
        } else if mu < target {
            1.0 / bisect(|t| self.mean(1.0 / t) - target, f64::EPSILON, 1.0)
        } else {
            1.0
        }
    }

    fn ci_upper(&self, x: u64) -> f64 {
        if x == self.hi {
            return f64::INFINITY;
        }
        let p = self.cdf(x, 1.0, false);
        if p < ALPHA {
            bisect(|t| self.cdf(x, t, false) - ALPHA, 0.0, 1.0)
        } else if p > ALPHA {
            1.0 / bisect(|t| self.cdf(x, 1.0 / t, false) - ALPHA, f64::EPSILON, 1.0)
        } else {
            1.0
        }
    }

    fn ci_lower(&self, x: u64) -> f64 {
        if x == self.lo {
            return 0.0;
        }
        let p = self.cdf(x, 1.0, true);
        if p > ALPHA {
            bisect(|t| self.cdf(x, t, true) - ALPHA, 0.0, 1.0)
        } else if p < ALPHA {
            1.0 / bisect(|t| self.cdf(x, 1.0 / t, true) - ALPHA, f64::EPSILON, 1.0)
        } else {
            1.0
        }
    }
}

/// Run Fisher's exact test on the table `[[a, b], [c, d]]`.
pub fn fisher_exact(a: i64, b: i64, c: i64, d: i64) -> Result<FisherResult, StatsError> {
    let a = count("a", a)?;
    let b = count("b", b)?;
    let c = count("c", c)?;
    let d = count("d", d)?;
    total("table", &[a, b, c, d])?;

    let dist = Hypergeometric::new(a, b, c, d);
    if dist.lo == dist.hi {
        // Degenerate margins: every table with these margins is the observed one.
        return Ok(FisherResult {
            p_value: 1.0,
            odds_ratio: f64::NAN,
            ci_lower: 0.0,
            ci_upper: f64::INFINITY,
        });
    }

    Ok(FisherResult {
        p_value: dist.p_value(a),
        odds_ratio: dist.odds_ratio(a),
        ci_lower: dist.ci_lower(a),
        ci_upper: dist.ci_upper(a),
    })
}
