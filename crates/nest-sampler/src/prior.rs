//! Separable priors over the parameter space.
//!
//! The sampler works in two coordinate systems: physical coordinates
//! (what the likelihood sees) and unit coordinates in `[0,1]^D` (what
//! the clustering and ellipsoid geometry see). A [`Prior`] is a product
//! of per-dimension marginals, each with an invertible CDF, so the two
//! systems are related by `theta_k = F_k^{-1}(u_k)` per dimension.
//!
//! Separability is load-bearing: with a non-separable prior the unit
//! cube would no longer be a product space and the ellipsoid geometry
//! would lose its meaning.

use nest_core::{Error, Result};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Clamp applied to unit coordinates before an unbounded inverse CDF.
const UNIT_EPS: f64 = 1e-15;

/// One marginal prior distribution.
#[derive(Debug, Clone)]
pub enum MarginalPrior {
    /// Uniform on `[lower, upper]`.
    Uniform {
        /// Lower bound.
        lower: f64,
        /// Upper bound, strictly greater than `lower`.
        upper: f64,
    },
    /// Gaussian with the given mean and standard deviation.
    Gaussian {
        /// Mean.
        mean: f64,
        /// Standard deviation, strictly positive.
        sd: f64,
    },
}

impl MarginalPrior {
    fn validate(&self) -> Result<()> {
        match *self {
            MarginalPrior::Uniform { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                    return Err(Error::Config(format!(
                        "uniform prior requires finite lower < upper, got [{lower}, {upper}]"
                    )));
                }
            }
            MarginalPrior::Gaussian { mean, sd } => {
                if !mean.is_finite() || !sd.is_finite() || sd <= 0.0 {
                    return Err(Error::Config(format!(
                        "gaussian prior requires finite mean and sd > 0, got N({mean}, {sd})"
                    )));
                }
            }
        }
        Ok(())
    }

    fn from_unit(&self, u: f64) -> f64 {
        match *self {
            MarginalPrior::Uniform { lower, upper } => lower + u * (upper - lower),
            MarginalPrior::Gaussian { mean, sd } => {
                let u = u.clamp(UNIT_EPS, 1.0 - UNIT_EPS);
                // Normal::new validated at construction.
                Normal::new(mean, sd).unwrap().inverse_cdf(u)
            }
        }
    }

    fn to_unit(&self, theta: f64) -> f64 {
        match *self {
            MarginalPrior::Uniform { lower, upper } => {
                ((theta - lower) / (upper - lower)).clamp(0.0, 1.0)
            }
            MarginalPrior::Gaussian { mean, sd } => Normal::new(mean, sd).unwrap().cdf(theta),
        }
    }

    fn log_pdf(&self, theta: f64) -> f64 {
        match *self {
            MarginalPrior::Uniform { lower, upper } => {
                if theta < lower || theta > upper {
                    f64::NEG_INFINITY
                } else {
                    -(upper - lower).ln()
                }
            }
            MarginalPrior::Gaussian { mean, sd } => Normal::new(mean, sd).unwrap().ln_pdf(theta),
        }
    }
}

/// Product prior over all dimensions.
#[derive(Debug, Clone)]
pub struct Prior {
    margins: Vec<MarginalPrior>,
}

impl Prior {
    /// Build a prior from per-dimension marginals.
    pub fn new(margins: Vec<MarginalPrior>) -> Result<Self> {
        if margins.is_empty() {
            return Err(Error::Config("prior must have at least one dimension".to_string()));
        }
        for m in &margins {
            m.validate()?;
        }
        Ok(Self { margins })
    }

    /// Uniform hyper-rectangle prior from `(lower, upper)` bounds.
    pub fn uniform_box(bounds: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            bounds
                .iter()
                .map(|&(lower, upper)| MarginalPrior::Uniform { lower, upper })
                .collect(),
        )
    }

    /// Parameter dimensionality.
    pub fn dim(&self) -> usize {
        self.margins.len()
    }

    /// Map unit coordinates to physical coordinates via the inverse CDF.
    pub fn from_unit(&self, u: &[f64]) -> Vec<f64> {
        debug_assert_eq!(u.len(), self.dim());
        self.margins.iter().zip(u.iter()).map(|(m, &ui)| m.from_unit(ui)).collect()
    }

    /// Map physical coordinates to unit coordinates via the CDF.
    pub fn to_unit(&self, theta: &[f64]) -> Vec<f64> {
        debug_assert_eq!(theta.len(), self.dim());
        self.margins.iter().zip(theta.iter()).map(|(m, &t)| m.to_unit(t)).collect()
    }

    /// Log prior density at physical coordinates; `-inf` outside support.
    pub fn log_pdf(&self, theta: &[f64]) -> f64 {
        debug_assert_eq!(theta.len(), self.dim());
        self.margins.iter().zip(theta.iter()).map(|(m, &t)| m.log_pdf(t)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_round_trip() {
        let prior = Prior::uniform_box(&[(-5.0, 5.0), (0.0, 2.0)]).unwrap();
        let theta = vec![1.25, 0.5];
        let u = prior.to_unit(&theta);
        let back = prior.from_unit(&u);
        for (a, b) in theta.iter().zip(back.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gaussian_round_trip() {
        let prior =
            Prior::new(vec![MarginalPrior::Gaussian { mean: 1.0, sd: 0.5 }]).unwrap();
        for theta in [-0.3, 1.0, 2.4] {
            let u = prior.to_unit(&[theta]);
            let back = prior.from_unit(&u);
            assert_relative_eq!(back[0], theta, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_uniform_log_pdf() {
        let prior = Prior::uniform_box(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
        // Density 1/100 inside the box.
        assert_relative_eq!(prior.log_pdf(&[0.0, 0.0]), -(100.0f64.ln()), epsilon = 1e-12);
        assert_eq!(prior.log_pdf(&[6.0, 0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_unit_corners_stay_finite_for_gaussian() {
        let prior = Prior::new(vec![MarginalPrior::Gaussian { mean: 0.0, sd: 1.0 }]).unwrap();
        assert!(prior.from_unit(&[0.0])[0].is_finite());
        assert!(prior.from_unit(&[1.0])[0].is_finite());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(Prior::uniform_box(&[]).is_err());
        assert!(Prior::uniform_box(&[(1.0, 1.0)]).is_err());
        assert!(Prior::new(vec![MarginalPrior::Gaussian { mean: 0.0, sd: 0.0 }]).is_err());
    }
}
