//! Bounding ellipsoids over live-point clusters.
//!
//! An ellipsoid is `{ x : (x - c)^T (f Σ)^{-1} (x - c) <= 1 }` with
//! center `c`, sample covariance `Σ`, and enlargement factor `f >= 1`.
//! The eigendecomposition `Σ = Q Λ Q^T` is computed once at
//! construction and cached; all queries work in the rotated frame.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use nest_core::{Error, Result};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::math::ln_unit_ball_volume;

/// Floor applied to covariance eigenvalues to keep near-singular
/// clusters (fewer than `D + 1` points, or degenerate geometry)
/// invertible.
const EIGENVALUE_FLOOR: f64 = 1e-12;

/// A bounding ellipsoid with cached eigendecomposition.
#[derive(Debug, Clone)]
pub struct Ellipsoid {
    center: DVector<f64>,
    /// Orthogonal eigenvector matrix `Q` (columns are principal axes).
    eigenvectors: DMatrix<f64>,
    /// Eigenvalues `λ_i > 0` of the covariance, floored.
    eigenvalues: DVector<f64>,
    /// Enlargement factor `f >= 1`; geometry uses `f Σ`.
    enlargement: f64,
    /// Cached `ln` of the enlarged volume.
    ln_volume: f64,
}

impl Ellipsoid {
    /// Build from a cluster of points (unit coordinates, all the same
    /// dimension). Uses the sample mean and the unbiased sample
    /// covariance; the covariance is symmetrized before decomposition.
    ///
    /// Fails with [`Error::Numerical`] when the decomposition produces
    /// non-finite eigenvalues, which signals a cluster the caller
    /// should merge away.
    pub fn from_points(points: &[Vec<f64>]) -> Result<Self> {
        let n = points.len();
        if n == 0 {
            return Err(Error::Numerical("cannot bound an empty cluster".to_string()));
        }
        let dim = points[0].len();

        let mut center = DVector::zeros(dim);
        for p in points {
            debug_assert_eq!(p.len(), dim);
            for (i, &v) in p.iter().enumerate() {
                center[i] += v;
            }
        }
        center /= n as f64;

        let mut cov = DMatrix::zeros(dim, dim);
        if n > 1 {
            for p in points {
                for i in 0..dim {
                    let di = p[i] - center[i];
                    for j in 0..=i {
                        cov[(i, j)] += di * (p[j] - center[j]);
                    }
                }
            }
            cov /= (n - 1) as f64;
            // Only the lower triangle was accumulated; mirror it.
            for i in 0..dim {
                for j in (i + 1)..dim {
                    cov[(i, j)] = cov[(j, i)];
                }
            }
        }

        // Symmetrize to guard against accumulated asymmetry.
        let cov = (&cov + cov.transpose()) * 0.5;
        let eigen = SymmetricEigen::new(cov);

        if eigen.eigenvalues.iter().any(|v| !v.is_finite()) {
            return Err(Error::Numerical(format!(
                "degenerate covariance for cluster of {n} points in {dim} dimensions"
            )));
        }

        let eigenvalues = eigen.eigenvalues.map(|v| v.max(EIGENVALUE_FLOOR));
        let mut out = Self {
            center,
            eigenvectors: eigen.eigenvectors,
            eigenvalues,
            enlargement: 1.0,
            ln_volume: 0.0,
        };
        out.ln_volume = out.compute_ln_volume();
        Ok(out)
    }

    /// Dimensionality.
    pub fn dim(&self) -> usize {
        self.center.len()
    }

    /// Ellipsoid center.
    pub fn center(&self) -> &[f64] {
        self.center.as_slice()
    }

    /// Current enlargement factor.
    pub fn enlargement(&self) -> f64 {
        self.enlargement
    }

    /// Set the enlargement factor (clamped to `>= 1`) and refresh the
    /// cached volume.
    pub fn enlarge(&mut self, f: f64) {
        self.enlargement = f.max(1.0);
        self.ln_volume = self.compute_ln_volume();
    }

    /// Squared Mahalanobis distance of `x` from the center with respect
    /// to the *unenlarged* covariance. `O(D^2)` per call.
    pub fn mahalanobis_sq(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.dim());
        let dim = self.dim();
        let mut acc = 0.0;
        for k in 0..dim {
            // y_k = (Q^T (x - c))_k
            let mut y = 0.0;
            for i in 0..dim {
                y += self.eigenvectors[(i, k)] * (x[i] - self.center[i]);
            }
            acc += y * y / self.eigenvalues[k];
        }
        acc
    }

    /// Point-in-ellipsoid test under the current enlargement.
    pub fn contains(&self, x: &[f64]) -> bool {
        self.mahalanobis_sq(x) <= self.enlargement
    }

    /// Largest squared Mahalanobis distance over `points`, used by the
    /// caller to grow the enlargement until the whole cluster is
    /// enclosed.
    pub fn max_mahalanobis_sq(&self, points: &[Vec<f64>]) -> f64 {
        points.iter().map(|p| self.mahalanobis_sq(p)).fold(0.0, f64::max)
    }

    /// Draw a point uniformly from the enlarged ellipsoid: a direction
    /// from the unit sphere, a radius `U^{1/D}`, then the affine map
    /// `x = c + sqrt(f) · Q · diag(sqrt(λ)) · z`.
    pub fn sample_uniform(&self, rng: &mut impl Rng) -> Vec<f64> {
        let dim = self.dim();
        let mut z: Vec<f64> = (0..dim).map(|_| StandardNormal.sample(rng)).collect();
        let norm = z.iter().map(|v| v * v).sum::<f64>().sqrt();
        let radius = rng.random::<f64>().powf(1.0 / dim as f64);
        let scale = if norm > 0.0 { radius / norm } else { 0.0 };
        for v in &mut z {
            *v *= scale;
        }

        let sqrt_f = self.enlargement.sqrt();
        let mut x = vec![0.0; dim];
        for (i, xi) in x.iter_mut().enumerate() {
            let mut acc = 0.0;
            for k in 0..dim {
                acc += self.eigenvectors[(i, k)] * self.eigenvalues[k].sqrt() * z[k];
            }
            *xi = self.center[i] + sqrt_f * acc;
        }
        x
    }

    /// Log volume of the enlarged ellipsoid.
    pub fn ln_volume(&self) -> f64 {
        self.ln_volume
    }

    fn compute_ln_volume(&self) -> f64 {
        let dim = self.dim();
        ln_unit_ball_volume(dim)
            + 0.5 * (dim as f64) * self.enlargement.ln()
            + 0.5 * self.eigenvalues.iter().map(|v| v.ln()).sum::<f64>()
    }
}
