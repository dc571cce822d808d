//! Common data types for nest

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One retired point of the posterior sample.
///
/// `log_weight` is the log prior-mass weight including the likelihood,
/// `log ΔX_i + log L_i`, so that `exp(log_weight - log_evidence)` is the
/// point's normalized posterior probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorPoint {
    /// Physical parameter coordinates.
    pub parameters: Vec<f64>,
    /// Log-likelihood at `parameters`.
    pub log_likelihood: f64,
    /// Log posterior weight (unnormalized).
    pub log_weight: f64,
}

/// Append-only weighted posterior sample, in strict retirement order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosteriorSample {
    points: Vec<PosteriorPoint>,
    dim: usize,
}

impl PosteriorSample {
    /// Create an empty sample for `dim`-dimensional parameters.
    pub fn new(dim: usize) -> Self {
        Self { points: Vec::new(), dim }
    }

    /// Parameter dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of retired points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no point has been retired yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a retired point. Panics if the dimensionality disagrees.
    pub fn push(&mut self, point: PosteriorPoint) {
        assert_eq!(point.parameters.len(), self.dim, "posterior point dimension mismatch");
        self.points.push(point);
    }

    /// All retired points, in retirement order.
    pub fn points(&self) -> &[PosteriorPoint] {
        &self.points
    }

    /// Values of parameter `k` across the sample, in retirement order.
    pub fn parameter_column(&self, k: usize) -> Vec<f64> {
        self.points.iter().map(|p| p.parameters[k]).collect()
    }

    /// Normalized linear-space posterior probabilities,
    /// `exp(log_weight - log_evidence)`. These sum to 1 within
    /// floating-point tolerance after a completed run.
    pub fn normalized_probabilities(&self, log_evidence: f64) -> Vec<f64> {
        self.points.iter().map(|p| (p.log_weight - log_evidence).exp()).collect()
    }
}

/// Why a nested-sampling run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The remaining-evidence criterion fell below the termination factor.
    Converged,
    /// The host requested cancellation; the sample is partial.
    Cancelled,
    /// The outer iteration cap was reached before convergence.
    IterationCapReached,
}

/// Summary of one nested-sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Accumulated log evidence, `log Z`.
    pub log_evidence: f64,
    /// Evidence uncertainty in log units, `sqrt(H / N_initial)`.
    pub log_evidence_error: f64,
    /// Information gain `H` (KL divergence of posterior from prior).
    pub information: f64,
    /// Number of completed driver iterations.
    pub n_iterations: usize,
    /// Live points remaining when the run stopped.
    pub n_live_final: usize,
    /// Total likelihood evaluations, including rejected draw attempts.
    pub n_likelihood_evaluations: usize,
    /// Stop reason.
    pub termination: Termination,
}

/// Cooperative cancellation signal, polled by the driver between
/// iterations. Clones share the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from another thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
