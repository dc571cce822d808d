//! K-means partitioning of the live set.
//!
//! Lloyd's algorithm with k-means++ seeding, repeated over a number of
//! trials per candidate `K`, with the winning `K` selected by a
//! BIC-like criterion. Distances come from the injected [`Metric`].

use nest_core::{Error, Result};
use rand::Rng;

use crate::metric::Metric;

/// Hard cap on Lloyd iterations per trial.
const MAX_LLOYD_ITERATIONS: usize = 50;

/// A partition of the live set into clusters.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Cluster index per point, contiguous in `0..n_clusters`.
    pub labels: Vec<usize>,
    /// Number of non-empty clusters.
    pub n_clusters: usize,
}

impl ClusterAssignment {
    /// The trivial single-cluster assignment.
    pub fn single(n_points: usize) -> Self {
        Self { labels: vec![0; n_points], n_clusters: 1 }
    }

    /// Indices of the points in each cluster.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.n_clusters];
        for (i, &label) in self.labels.iter().enumerate() {
            out[label].push(i);
        }
        out
    }
}

/// K-means clusterer with trial repetition and BIC-like model selection.
#[derive(Debug, Clone)]
pub struct KmeansClusterer {
    metric: Metric,
    k_min: usize,
    k_max: usize,
    n_trials: usize,
    rel_tol: f64,
}

struct TrialResult {
    labels: Vec<usize>,
    n_clusters: usize,
    cost: f64,
}

impl KmeansClusterer {
    /// Create a clusterer. `k_min <= k_max`, at least one trial, and a
    /// positive relative tolerance are required.
    pub fn new(
        metric: Metric,
        k_min: usize,
        k_max: usize,
        n_trials: usize,
        rel_tol: f64,
    ) -> Result<Self> {
        if k_min == 0 || k_min > k_max {
            return Err(Error::Config(format!(
                "cluster count bounds must satisfy 1 <= k_min <= k_max, got [{k_min}, {k_max}]"
            )));
        }
        if n_trials == 0 {
            return Err(Error::Config("at least one k-means trial is required".to_string()));
        }
        if !(rel_tol > 0.0) {
            return Err(Error::Config(format!(
                "k-means relative tolerance must be positive, got {rel_tol}"
            )));
        }
        Ok(Self { metric, k_min, k_max, n_trials, rel_tol })
    }

    /// Partition `points`, choosing `K` in `[k_min, k_max]` by the
    /// criterion `bic(K) = n·ln(W_K/n) + K·D·ln(n)`, where `W_K` is the
    /// best within-cluster sum of squared distances found over the
    /// trials. Falls back to a single cluster when every candidate
    /// collapses.
    pub fn cluster(&self, rng: &mut impl Rng, points: &[Vec<f64>]) -> ClusterAssignment {
        let n = points.len();
        if n == 0 {
            return ClusterAssignment { labels: Vec::new(), n_clusters: 0 };
        }
        let dim = points[0].len();
        let k_max = self.k_max.min(n);
        let k_min = self.k_min.min(k_max);

        let mut best: Option<(f64, TrialResult)> = None;

        for k in k_min..=k_max {
            let mut best_trial: Option<TrialResult> = None;
            for _ in 0..self.n_trials {
                let trial = self.run_trial(rng, points, k);
                if best_trial.as_ref().is_none_or(|b| trial.cost < b.cost) {
                    best_trial = Some(trial);
                }
            }
            let Some(trial) = best_trial else { continue };

            // Spherical-Gaussian BIC surrogate; the tiny floor keeps a
            // zero-cost partition (duplicated points) comparable.
            let bic = (n as f64) * ((trial.cost / n as f64).max(1e-300)).ln()
                + (trial.n_clusters * dim) as f64 * (n as f64).ln();
            if best.as_ref().is_none_or(|(b, _)| bic < *b) {
                best = Some((bic, trial));
            }
        }

        match best {
            Some((_, trial)) if trial.n_clusters > 0 => ClusterAssignment {
                labels: trial.labels,
                n_clusters: trial.n_clusters,
            },
            _ => ClusterAssignment::single(n),
        }
    }

    /// One seeded Lloyd run for a fixed `k`.
    fn run_trial(&self, rng: &mut impl Rng, points: &[Vec<f64>], k: usize) -> TrialResult {
        let n = points.len();
        let mut centers = self.seed_plus_plus(rng, points, k);
        let mut labels = vec![0usize; n];
        let mut cost = f64::INFINITY;

        for _ in 0..MAX_LLOYD_ITERATIONS {
            // Assignment step.
            let mut new_cost = 0.0;
            for (i, p) in points.iter().enumerate() {
                let (label, d) = nearest_center(&self.metric, p, &centers);
                labels[i] = label;
                new_cost += d;
            }

            // Update step: centers move to the member mean; empty
            // clusters are dropped and labels compacted.
            let dim = points[0].len();
            let mut sums = vec![vec![0.0; dim]; centers.len()];
            let mut counts = vec![0usize; centers.len()];
            for (i, p) in points.iter().enumerate() {
                counts[labels[i]] += 1;
                for (s, &v) in sums[labels[i]].iter_mut().zip(p.iter()) {
                    *s += v;
                }
            }
            let mut remap = vec![usize::MAX; centers.len()];
            let mut kept = Vec::with_capacity(centers.len());
            for (c, count) in counts.iter().enumerate() {
                if *count > 0 {
                    remap[c] = kept.len();
                    let mut center = std::mem::take(&mut sums[c]);
                    for v in &mut center {
                        *v /= *count as f64;
                    }
                    kept.push(center);
                }
            }
            for label in &mut labels {
                *label = remap[*label];
            }
            centers = kept;

            let converged = new_cost == 0.0
                || (cost.is_finite() && (cost - new_cost).abs() / cost.max(f64::MIN_POSITIVE) < self.rel_tol);
            cost = new_cost;
            if converged {
                break;
            }
        }

        // Final assignment against the settled centers.
        let mut final_cost = 0.0;
        for (i, p) in points.iter().enumerate() {
            let (label, d) = nearest_center(&self.metric, p, &centers);
            labels[i] = label;
            final_cost += d;
        }

        TrialResult { labels, n_clusters: centers.len(), cost: final_cost }
    }

    /// K-means++ seeding: each subsequent center is drawn with
    /// probability proportional to the squared distance from the
    /// centers chosen so far.
    fn seed_plus_plus(&self, rng: &mut impl Rng, points: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
        let n = points.len();
        let mut centers = Vec::with_capacity(k);
        centers.push(points[rng.random_range(0..n)].clone());

        let mut dist_sq: Vec<f64> =
            points.iter().map(|p| self.metric.distance_sq(p, &centers[0])).collect();

        while centers.len() < k {
            let total: f64 = dist_sq.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                let mut chosen = n - 1;
                for (i, &d) in dist_sq.iter().enumerate() {
                    target -= d;
                    if target <= 0.0 {
                        chosen = i;
                        break;
                    }
                }
                chosen
            } else {
                // All remaining mass at the existing centers; any point
                // will do.
                rng.random_range(0..n)
            };
            centers.push(points[next].clone());
            for (d, p) in dist_sq.iter_mut().zip(points.iter()) {
                *d = d.min(self.metric.distance_sq(p, centers.last().unwrap()));
            }
        }
        centers
    }
}

fn nearest_center(metric: &Metric, point: &[f64], centers: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0usize, f64::INFINITY);
    for (c, center) in centers.iter().enumerate() {
        let d = metric.distance_sq(point, center);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::StandardNormal;

    fn blob(rng: &mut StdRng, n: usize, center: &[f64], spread: f64) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| {
                center.iter().map(|&c| c + spread * rng.sample::<f64, _>(StandardNormal)).collect()
            })
            .collect()
    }

    #[test]
    fn test_two_well_separated_blobs() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut points = blob(&mut rng, 60, &[0.2, 0.2], 0.02);
        points.extend(blob(&mut rng, 60, &[0.8, 0.8], 0.02));

        let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 4, 5, 0.01).unwrap();
        let assignment = clusterer.cluster(&mut rng, &points);

        assert_eq!(assignment.n_clusters, 2);
        // Points of each blob share a label.
        let first = assignment.labels[0];
        assert!(assignment.labels[..60].iter().all(|&l| l == first));
        assert!(assignment.labels[60..].iter().all(|&l| l != first));
    }

    #[test]
    fn test_single_blob_selects_one_cluster() {
        let mut rng = StdRng::seed_from_u64(9);
        let points = blob(&mut rng, 100, &[0.5, 0.5], 0.05);
        let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 4, 5, 0.01).unwrap();
        let assignment = clusterer.cluster(&mut rng, &points);
        assert_eq!(assignment.n_clusters, 1);
    }

    #[test]
    fn test_k_max_one_is_always_single() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut points = blob(&mut rng, 30, &[0.1, 0.1], 0.02);
        points.extend(blob(&mut rng, 30, &[0.9, 0.9], 0.02));
        let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 1, 3, 0.01).unwrap();
        let assignment = clusterer.cluster(&mut rng, &points);
        assert_eq!(assignment.n_clusters, 1);
        assert!(assignment.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_labels_are_contiguous() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut points = blob(&mut rng, 40, &[0.2, 0.8], 0.02);
        points.extend(blob(&mut rng, 40, &[0.8, 0.2], 0.02));
        let clusterer = KmeansClusterer::new(Metric::Euclidean, 2, 6, 5, 0.01).unwrap();
        let assignment = clusterer.cluster(&mut rng, &points);
        for members in assignment.members() {
            assert!(!members.is_empty(), "empty cluster survived compaction");
        }
    }

    #[test]
    fn test_more_clusters_than_points() {
        let mut rng = StdRng::seed_from_u64(2);
        let points = vec![vec![0.1, 0.1], vec![0.9, 0.9]];
        let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 6, 3, 0.01).unwrap();
        let assignment = clusterer.cluster(&mut rng, &points);
        assert!(assignment.n_clusters <= 2);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(KmeansClusterer::new(Metric::Euclidean, 0, 3, 5, 0.01).is_err());
        assert!(KmeansClusterer::new(Metric::Euclidean, 4, 3, 5, 0.01).is_err());
        assert!(KmeansClusterer::new(Metric::Euclidean, 1, 3, 0, 0.01).is_err());
        assert!(KmeansClusterer::new(Metric::Euclidean, 1, 3, 5, 0.0).is_err());
    }
}
