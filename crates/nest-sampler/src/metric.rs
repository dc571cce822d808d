//! Distance metrics injected into the clusterer.
//!
//! A sum type instead of a trait object: the set of metrics is closed
//! and the clusterer's inner loop stays monomorphic.

use nest_core::{Error, Result};

/// Distance metric over points in unit coordinates.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Standard Euclidean distance.
    Euclidean,
    /// Mahalanobis distance with a fixed inverse covariance.
    Mahalanobis {
        /// Dimensionality of the space.
        dim: usize,
        /// Inverse covariance, row-major `dim × dim`.
        inv_cov: Vec<f64>,
    },
}

impl Metric {
    /// Mahalanobis metric from a row-major inverse covariance matrix.
    pub fn mahalanobis(dim: usize, inv_cov: Vec<f64>) -> Result<Self> {
        if dim == 0 || inv_cov.len() != dim * dim {
            return Err(Error::Config(format!(
                "inverse covariance must be {dim}x{dim}, got {} entries",
                inv_cov.len()
            )));
        }
        if inv_cov.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("inverse covariance must be finite".to_string()));
        }
        Ok(Self::Mahalanobis { dim, inv_cov })
    }

    /// Squared distance between `a` and `b`.
    pub fn distance_sq(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Metric::Euclidean => {
                a.iter().zip(b.iter()).map(|(&x, &y)| (x - y) * (x - y)).sum()
            }
            Metric::Mahalanobis { dim, inv_cov } => {
                let n = *dim;
                debug_assert_eq!(a.len(), n);
                let mut acc = 0.0;
                for i in 0..n {
                    let di = a[i] - b[i];
                    for j in 0..n {
                        acc += di * inv_cov[i * n + j] * (a[j] - b[j]);
                    }
                }
                acc
            }
        }
    }

    /// Distance between `a` and `b`.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self.distance_sq(a, b).sqrt()
    }
}
