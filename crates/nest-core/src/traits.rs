//! Core traits for nest
//!
//! This module defines the narrow surface the sampler needs from a
//! user model: a log-likelihood over physical coordinates. High-level
//! sampling logic does not depend on how the likelihood is computed.

/// User-supplied log-likelihood.
///
/// The function must be pure and total: for infeasible inputs it returns
/// `f64::NEG_INFINITY` rather than panicking or erroring. The sampler
/// treats `-inf` as "point rejected".
pub trait LogLikelihood: Send + Sync {
    /// Log-likelihood at physical parameter coordinates.
    fn log_likelihood(&self, theta: &[f64]) -> f64;
}

/// Plain closures work as likelihoods, which keeps tests and demos short.
impl<F> LogLikelihood for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn log_likelihood(&self, theta: &[f64]) -> f64 {
        self(theta)
    }
}
