//! Log-space combinatorics and root finding.

/// Below this, `ln n!` is summed directly; above it Stirling's series is used.
const STIRLING_CUTOFF: u64 = 256;

/// Natural log of `n!`.
pub fn ln_factorial(n: u64) -> f64 {
    if n < STIRLING_CUTOFF {
        return (2..=n).map(|k| (k as f64).ln()).sum();
    }
    let x = n as f64;
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    x * x.ln() - x + 0.5 * (2.0 * std::f64::consts::PI * x).ln()
        + inv * (1.0 / 12.0 - inv2 * (1.0 / 360.0 - inv2 / 1260.0))
}

/// Natural log of the binomial coefficient `n choose k`.
///
/// Returns negative infinity when `k > n`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

/// Turn log-weights into probabilities that sum to one.
pub fn normalize_log_weights(log_weights: &[f64]) -> Vec<f64> {
    let max = log_weights
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = log_weights.iter().map(|w| (w - max).exp()).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Relative tolerance used when comparing point probabilities.
pub const REL_ERR: f64 = 1.0 + 1e-7;

/// Find a root of a monotone function on `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one of them be zero).
pub fn bisect(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    let mut f_lo = f(lo);
    if f_lo == 0.0 {
        return lo;
    }
    if f(hi) == 0.0 {
        return hi;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo) <= f64::EPSILON * mid.abs() {
            return mid;
        }
        if (f_mid < 0.0) == (f_lo < 0.0) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
