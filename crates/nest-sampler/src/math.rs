//! Log-space arithmetic helpers shared across the sampler.

use statrs::function::gamma::ln_gamma;

/// Numerically stable `log(exp(a) + exp(b))`.
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == f64::NEG_INFINITY {
        f64::NEG_INFINITY
    } else {
        max + ((a - max).exp() + (b - max).exp()).ln()
    }
}

/// `log(1 - exp(x))` for `x < 0`, stable for `x` close to zero.
///
/// Used for the prior-mass shell width `log(X_{i-1} - X_i)
/// = log X_{i-1} + log(1 - exp(-1/N))`.
pub fn ln_one_minus_exp(x: f64) -> f64 {
    debug_assert!(x < 0.0);
    (-x.exp_m1()).ln()
}

/// Log volume of the unit ball in `dim` dimensions:
/// `(dim/2)·ln(pi) - ln Γ(dim/2 + 1)`.
pub fn ln_unit_ball_volume(dim: usize) -> f64 {
    let half = dim as f64 / 2.0;
    half * std::f64::consts::PI.ln() - ln_gamma(half + 1.0)
}
