//! Nested-sampling driver.
//!
//! Evolves a live-point population under a rising likelihood
//! constraint, accumulating the evidence by trapezoidal integration
//! over log prior mass. Replacement points come from the
//! multi-ellipsoidal constrained sampler; the live population may
//! shrink over time according to a [`LivePointReducer`] schedule.
//!
//! All evidence arithmetic is in log space with 64-bit floats; the
//! accumulators are `log Z`, the information `H`, and the remaining
//! log prior mass `log X`.

use nest_core::{
    CancelToken, Error, LogLikelihood, PosteriorPoint, PosteriorSample, Result, RunSummary,
    Termination,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterAssignment, KmeansClusterer};
use crate::live::{LivePoint, LiveSet};
use crate::math::{ln_one_minus_exp, log_sum_exp};
use crate::multiellipsoid::MultiEllipsoidSampler;
use crate::prior::Prior;
use crate::reducer::LivePointReducer;

/// Nested-sampling driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedSamplerConfig {
    /// Initial live-point population size.
    pub n_initial: usize,
    /// Lower bound on the live-point population.
    pub n_min: usize,
    /// Per-replacement draw budget.
    pub max_draw_attempts: usize,
    /// Iterations treated as a single cluster before k-means kicks in.
    pub n_initial_no_clustering: usize,
    /// Clustering + geometry rebuild period, in iterations.
    pub n_recluster_period: usize,
    /// Base ellipsoid inflation factor.
    pub initial_enlargement_fraction: f64,
    /// Exponent on the remaining prior mass in the enlargement formula,
    /// in `[0, 1]`.
    pub shrinking_rate: f64,
    /// Stop once the remaining-evidence fraction falls below this.
    pub termination_factor: f64,
    /// Outer iteration cap; reaching it flags a non-converged run.
    pub max_iterations: usize,
    /// Master RNG seed. The driver owns the single generator stream.
    pub seed: u64,
}

impl Default for NestedSamplerConfig {
    fn default() -> Self {
        Self {
            n_initial: 400,
            n_min: 400,
            max_draw_attempts: 50_000,
            n_initial_no_clustering: 100,
            n_recluster_period: 10,
            initial_enlargement_fraction: 2.5,
            shrinking_rate: 0.6,
            termination_factor: 0.01,
            max_iterations: 1_000_000,
            seed: 42,
        }
    }
}

impl NestedSamplerConfig {
    fn validate(&self) -> Result<()> {
        if self.n_min == 0 || self.n_min > self.n_initial {
            return Err(Error::Config(format!(
                "live-point bounds must satisfy 1 <= n_min <= n_initial, got [{}, {}]",
                self.n_min, self.n_initial
            )));
        }
        if self.max_draw_attempts == 0 {
            return Err(Error::Config("draw budget must be at least 1".to_string()));
        }
        if self.n_recluster_period == 0 {
            return Err(Error::Config("recluster period must be at least 1".to_string()));
        }
        if !(self.termination_factor > 0.0) {
            return Err(Error::Config(format!(
                "termination factor must be positive, got {}",
                self.termination_factor
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("iteration cap must be at least 1".to_string()));
        }
        // Enlargement parameters are validated by the constrained sampler.
        Ok(())
    }
}

/// Nested sampler over a user likelihood and separable prior.
///
/// The sampler retains its posterior sample and evidence accumulators
/// after `run` returns, including after a [`Error::DrawExhausted`]
/// failure, so partial results stay reachable through the accessors.
pub struct NestedSampler<L: LogLikelihood> {
    config: NestedSamplerConfig,
    prior: Prior,
    likelihood: L,
    clusterer: KmeansClusterer,
    constrained: MultiEllipsoidSampler,
    rng: StdRng,
    live: LiveSet,
    posterior: PosteriorSample,
    log_evidence: f64,
    information: f64,
    log_mass_remaining: f64,
    iteration: usize,
    n_likelihood_evaluations: usize,
}

impl<L: LogLikelihood> NestedSampler<L> {
    /// Create a sampler and draw the initial population uniformly from
    /// the prior. Unit draws are generated serially from the owned RNG
    /// (reproducibility); likelihood evaluations fan out over Rayon.
    pub fn new(
        prior: Prior,
        likelihood: L,
        clusterer: KmeansClusterer,
        config: NestedSamplerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let constrained =
            MultiEllipsoidSampler::new(config.initial_enlargement_fraction, config.shrinking_rate)?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let dim = prior.dim();
        let units: Vec<Vec<f64>> = (0..config.n_initial)
            .map(|_| (0..dim).map(|_| rng.random::<f64>()).collect())
            .collect();
        let points: Vec<LivePoint> = units
            .into_par_iter()
            .map(|unit| {
                let parameters = prior.from_unit(&unit);
                let log_likelihood = likelihood.log_likelihood(&parameters);
                LivePoint { unit, parameters, log_likelihood }
            })
            .collect();

        Ok(Self {
            posterior: PosteriorSample::new(dim),
            n_likelihood_evaluations: config.n_initial,
            config,
            prior,
            likelihood,
            clusterer,
            constrained,
            rng,
            live: LiveSet::new(points),
            log_evidence: f64::NEG_INFINITY,
            information: 0.0,
            log_mass_remaining: 0.0,
            iteration: 0,
        })
    }

    /// Run until convergence, cancellation, the iteration cap, or draw
    /// exhaustion.
    ///
    /// On normal termination the remaining prior mass is distributed
    /// uniformly among the surviving live points and they are appended
    /// to the posterior sample in ascending likelihood order.
    pub fn run(&mut self, reducer: &LivePointReducer, cancel: &CancelToken) -> Result<RunSummary> {
        reducer.validate()?;
        let ln_termination = self.config.termination_factor.ln();

        loop {
            if cancel.is_cancelled() {
                tracing::info!(iteration = self.iteration, "cancellation requested");
                return Ok(self.finalize(Termination::Cancelled));
            }
            if self.iteration >= self.config.max_iterations {
                tracing::warn!(
                    iterations = self.iteration,
                    "iteration cap reached before convergence"
                );
                return Ok(self.finalize(Termination::IterationCapReached));
            }

            // Termination test: fraction of the total evidence still
            // locked in the live set. max(logL) * X_i bounds what the
            // survivors can contribute.
            let log_remaining = self.live.max_log_likelihood() + self.log_mass_remaining;
            if log_remaining > f64::NEG_INFINITY {
                let log_total = log_sum_exp(self.log_evidence, log_remaining);
                if log_remaining - log_total <= ln_termination {
                    return Ok(self.finalize(Termination::Converged));
                }
            }

            self.refresh_geometry()?;

            // Retire the worst point and draw its replacement above the
            // constraint.
            let worst = self.live.worst_index();
            let constraint = self.live.point(worst).log_likelihood;
            let n_live = self.live.len();
            self.retire(worst, n_live);

            let outcome = match self.constrained.draw(
                &mut self.rng,
                &self.prior,
                &self.likelihood,
                constraint,
                self.config.max_draw_attempts,
            ) {
                Ok(outcome) => outcome,
                Err(err) => {
                    if matches!(err, Error::DrawExhausted { .. }) {
                        tracing::error!(
                            iteration = self.iteration,
                            constraint,
                            "draw budget exhausted; evidence estimate is no longer unbiased"
                        );
                    }
                    return Err(err);
                }
            };
            self.n_likelihood_evaluations += outcome.likelihood_evaluations;
            self.live.replace(worst, outcome.point);
            self.iteration += 1;

            // Population reduction: retire additional worst points down
            // to the schedule's target, never below n_min.
            let target = reducer
                .target(self.iteration, self.config.n_initial, self.config.n_min)
                .max(self.config.n_min);
            while self.live.len() > target {
                let worst = self.live.worst_index();
                let n_live = self.live.len();
                self.retire(worst, n_live);
                self.live.remove(worst);
            }
        }
    }

    /// Rebuild clustering and ellipsoid geometry when due. Between
    /// rebuilds the previous geometry is reused.
    fn refresh_geometry(&mut self) -> Result<()> {
        let due = self.constrained.n_ellipsoids() == 0
            || self.iteration % self.config.n_recluster_period == 0;
        if !due {
            return Ok(());
        }
        let unit = self.live.unit_coordinates();
        let assignment = if self.iteration < self.config.n_initial_no_clustering {
            ClusterAssignment::single(unit.len())
        } else {
            self.clusterer.cluster(&mut self.rng, &unit)
        };
        tracing::debug!(
            iteration = self.iteration,
            n_clusters = assignment.n_clusters,
            log_mass_remaining = self.log_mass_remaining,
            "rebuilding sampling geometry"
        );
        self.constrained.rebuild(&unit, &assignment, self.log_mass_remaining)
    }

    /// Retire the live point at `index`: account its prior-mass shell
    /// into the evidence and append it to the posterior sample. The
    /// point itself stays in the live set; the caller replaces or
    /// removes it.
    fn retire(&mut self, index: usize, n_live: usize) {
        let n = n_live as f64;
        let log_shell = self.log_mass_remaining + ln_one_minus_exp(-1.0 / n);
        let point = self.live.point(index);
        let log_weight = log_shell + point.log_likelihood;
        let log_likelihood = point.log_likelihood;
        let parameters = point.parameters.clone();

        self.accumulate(log_weight, log_likelihood);
        self.posterior.push(PosteriorPoint { parameters, log_likelihood, log_weight });
        self.log_mass_remaining -= 1.0 / n;
    }

    /// Fold one weighted point into `log Z` and the information `H`
    /// via the standard nested-sampling identity.
    fn accumulate(&mut self, log_weight: f64, log_likelihood: f64) {
        let log_z_new = log_sum_exp(self.log_evidence, log_weight);
        if log_z_new == f64::NEG_INFINITY {
            return;
        }
        if log_z_new.is_nan() {
            // Saturated accumulator: clamp and continue.
            tracing::warn!("evidence accumulator underflow, clamping to -inf");
            return;
        }

        let term_new = if log_weight == f64::NEG_INFINITY {
            0.0
        } else {
            (log_weight - log_z_new).exp() * log_likelihood
        };
        let term_old = if self.log_evidence == f64::NEG_INFINITY {
            0.0
        } else {
            (self.log_evidence - log_z_new).exp() * (self.information + self.log_evidence)
        };
        let information = term_new + term_old - log_z_new;
        if information.is_finite() {
            self.information = information;
        } else {
            tracing::warn!("information accumulator underflow, keeping previous value");
        }
        self.log_evidence = log_z_new;
    }

    /// Distribute the remaining prior mass uniformly among the
    /// surviving live points and build the run summary.
    fn finalize(&mut self, termination: Termination) -> RunSummary {
        let live = std::mem::take(&mut self.live);
        let n_live_final = live.len();
        if n_live_final > 0 {
            let log_each = self.log_mass_remaining - (n_live_final as f64).ln();
            for point in live.into_sorted_points() {
                let log_weight = log_each + point.log_likelihood;
                self.accumulate(log_weight, point.log_likelihood);
                self.posterior.push(PosteriorPoint {
                    parameters: point.parameters,
                    log_likelihood: point.log_likelihood,
                    log_weight,
                });
            }
        }
        self.log_mass_remaining = f64::NEG_INFINITY;

        let summary = RunSummary {
            log_evidence: self.log_evidence,
            log_evidence_error: self.log_evidence_error(),
            information: self.information,
            n_iterations: self.iteration,
            n_live_final,
            n_likelihood_evaluations: self.n_likelihood_evaluations,
            termination,
        };
        tracing::info!(
            log_evidence = summary.log_evidence,
            log_evidence_error = summary.log_evidence_error,
            information = summary.information,
            iterations = summary.n_iterations,
            ?termination,
            "nested sampling finished"
        );
        summary
    }

    /// Accumulated log evidence.
    pub fn log_evidence(&self) -> f64 {
        self.log_evidence
    }

    /// Evidence uncertainty in log units, `sqrt(H / N_initial)`.
    pub fn log_evidence_error(&self) -> f64 {
        (self.information.max(0.0) / self.config.n_initial as f64).sqrt()
    }

    /// Information gain `H`.
    pub fn information(&self) -> f64 {
        self.information
    }

    /// Completed iterations.
    pub fn n_iterations(&self) -> usize {
        self.iteration
    }

    /// The posterior sample accumulated so far (partial until `run`
    /// returns a converged summary).
    pub fn posterior_sample(&self) -> &PosteriorSample {
        &self.posterior
    }
}
