//! Multi-ellipsoidal constrained prior sampling.
//!
//! Replacement live points are drawn uniformly from the union of
//! cluster bounding ellipsoids in unit coordinates, then filtered by
//! the unit hypercube and the hard likelihood constraint. Overlap
//! correction (accept with probability `1/q` where `q` ellipsoids
//! contain the candidate) keeps the union sampling uniform.

use nest_core::{Error, LogLikelihood, Result};
use rand::Rng;

use crate::cluster::ClusterAssignment;
use crate::ellipsoid::Ellipsoid;
use crate::live::LivePoint;
use crate::prior::Prior;

/// Outcome of a successful constrained draw.
#[derive(Debug)]
pub struct DrawOutcome {
    /// The accepted replacement live point.
    pub point: LivePoint,
    /// Attempts consumed, including rejections of every kind.
    pub attempts: usize,
    /// Likelihood evaluations spent (attempts that survived the
    /// geometric filters).
    pub likelihood_evaluations: usize,
}

/// Constrained sampler over a union of cluster bounding ellipsoids.
#[derive(Debug, Clone)]
pub struct MultiEllipsoidSampler {
    initial_enlargement_fraction: f64,
    shrinking_rate: f64,
    ellipsoids: Vec<Ellipsoid>,
}

impl MultiEllipsoidSampler {
    /// Create a sampler with the given enlargement policy. The
    /// enlargement fraction must be non-negative and the shrinking rate
    /// must lie in `[0, 1]`.
    pub fn new(initial_enlargement_fraction: f64, shrinking_rate: f64) -> Result<Self> {
        if !initial_enlargement_fraction.is_finite() || initial_enlargement_fraction < 0.0 {
            return Err(Error::Config(format!(
                "enlargement fraction must be non-negative, got {initial_enlargement_fraction}"
            )));
        }
        if !(0.0..=1.0).contains(&shrinking_rate) {
            return Err(Error::Config(format!(
                "shrinking rate must lie in [0, 1], got {shrinking_rate}"
            )));
        }
        Ok(Self {
            initial_enlargement_fraction,
            shrinking_rate,
            ellipsoids: Vec::new(),
        })
    }

    /// Number of ellipsoids in the current geometry.
    pub fn n_ellipsoids(&self) -> usize {
        self.ellipsoids.len()
    }

    /// Current geometry, for inspection.
    pub fn ellipsoids(&self) -> &[Ellipsoid] {
        &self.ellipsoids
    }

    /// Rebuild the ellipsoid set from the live points (unit
    /// coordinates) and their cluster assignment. The previous geometry
    /// is replaced wholesale.
    ///
    /// Each cluster's enlargement is
    /// `max(1, fraction · X^rate · n_k/N, d²_max)` with `X =
    /// exp(log_remaining_mass)` and `d²_max` the largest squared
    /// Mahalanobis distance of the cluster's own points, so every
    /// source point stays enclosed. A cluster whose covariance cannot
    /// be decomposed is merged into its nearest neighbor.
    pub fn rebuild(
        &mut self,
        points: &[Vec<f64>],
        assignment: &ClusterAssignment,
        log_remaining_mass: f64,
    ) -> Result<()> {
        let n_live = points.len();
        if n_live == 0 {
            return Err(Error::Numerical("cannot build geometry from an empty live set".to_string()));
        }

        let mut clusters: Vec<Vec<Vec<f64>>> = assignment
            .members()
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(|m| m.into_iter().map(|i| points[i].clone()).collect())
            .collect();
        if clusters.is_empty() {
            clusters.push(points.to_vec());
        }

        let mass_shrink = log_remaining_mass.exp().powf(self.shrinking_rate);

        loop {
            match self.try_build(&clusters, mass_shrink, n_live) {
                Ok(ellipsoids) => {
                    self.ellipsoids = ellipsoids;
                    return Ok(());
                }
                Err(bad) if clusters.len() > 1 => {
                    // Merge the offending cluster into its nearest
                    // neighbor (by centroid distance) and retry.
                    let victim = clusters.swap_remove(bad);
                    let nearest = nearest_cluster(&clusters, &victim);
                    tracing::warn!(
                        merged_into = nearest,
                        size = victim.len(),
                        "degenerate cluster covariance, merging with nearest neighbor"
                    );
                    clusters[nearest].extend(victim);
                }
                Err(_) => {
                    return Err(Error::Numerical(
                        "covariance not stabilizable even as a single cluster".to_string(),
                    ));
                }
            }
        }
    }

    /// Build one ellipsoid per cluster; `Err(index)` flags the first
    /// cluster whose covariance is degenerate.
    fn try_build(
        &self,
        clusters: &[Vec<Vec<f64>>],
        mass_shrink: f64,
        n_live: usize,
    ) -> std::result::Result<Vec<Ellipsoid>, usize> {
        let mut out = Vec::with_capacity(clusters.len());
        for (k, cluster) in clusters.iter().enumerate() {
            let mut ell = Ellipsoid::from_points(cluster).map_err(|_| k)?;
            let policy = self.initial_enlargement_fraction
                * mass_shrink
                * (cluster.len() as f64 / n_live as f64);
            let enclose = ell.max_mahalanobis_sq(cluster);
            ell.enlarge(policy.max(enclose));
            out.push(ell);
        }
        Ok(out)
    }

    /// Draw a replacement live point at or above the likelihood
    /// constraint `log_like_min`.
    ///
    /// Repeats up to `max_attempts` times: pick an ellipsoid with
    /// probability proportional to its volume, sample uniformly inside
    /// it, apply the `1/q` overlap correction, reject candidates
    /// outside the unit hypercube, then evaluate the likelihood.
    pub fn draw<L: LogLikelihood + ?Sized>(
        &self,
        rng: &mut impl Rng,
        prior: &Prior,
        likelihood: &L,
        log_like_min: f64,
        max_attempts: usize,
    ) -> Result<DrawOutcome> {
        if self.ellipsoids.is_empty() {
            return Err(Error::Numerical("constrained draw before geometry build".to_string()));
        }

        // Volume weights, computed once per draw.
        let max_ln_v =
            self.ellipsoids.iter().map(Ellipsoid::ln_volume).fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> =
            self.ellipsoids.iter().map(|e| (e.ln_volume() - max_ln_v).exp()).collect();
        let total_weight: f64 = weights.iter().sum();

        let mut likelihood_evaluations = 0usize;
        for attempt in 1..=max_attempts {
            let chosen = pick_weighted(rng, &weights, total_weight);
            let x = self.ellipsoids[chosen].sample_uniform(rng);

            // Overlap correction: uniform over the union requires
            // accepting with probability 1/q.
            let q = self.ellipsoids.iter().filter(|e| e.contains(&x)).count().max(1);
            if q > 1 && rng.random::<f64>() * q as f64 >= 1.0 {
                continue;
            }

            if x.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
                continue;
            }

            let parameters = prior.from_unit(&x);
            let log_likelihood = likelihood.log_likelihood(&parameters);
            likelihood_evaluations += 1;
            // Ties at the constraint are accepted (a plateau must still
            // evolve), but `-inf` always means rejected.
            if log_likelihood >= log_like_min && log_likelihood > f64::NEG_INFINITY {
                return Ok(DrawOutcome {
                    point: LivePoint { unit: x, parameters, log_likelihood },
                    attempts: attempt,
                    likelihood_evaluations,
                });
            }
        }

        Err(Error::DrawExhausted { attempts: max_attempts })
    }
}

/// Index of the cluster whose centroid is closest to `victim`'s.
fn nearest_cluster(clusters: &[Vec<Vec<f64>>], victim: &[Vec<f64>]) -> usize {
    let centroid = |pts: &[Vec<f64>]| -> Vec<f64> {
        let dim = pts[0].len();
        let mut c = vec![0.0; dim];
        for p in pts {
            for (ci, &v) in c.iter_mut().zip(p.iter()) {
                *ci += v;
            }
        }
        for ci in &mut c {
            *ci /= pts.len() as f64;
        }
        c
    };
    let v = centroid(victim);
    let mut best = (0usize, f64::INFINITY);
    for (k, cluster) in clusters.iter().enumerate() {
        let c = centroid(cluster);
        let d: f64 = c.iter().zip(v.iter()).map(|(&a, &b)| (a - b) * (a - b)).sum();
        if d < best.1 {
            best = (k, d);
        }
    }
    best.0
}

fn pick_weighted(rng: &mut impl Rng, weights: &[f64], total: f64) -> usize {
    let mut target = rng.random::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        target -= w;
        if target <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}
