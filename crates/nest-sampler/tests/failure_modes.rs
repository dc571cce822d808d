//! Failure-path behavior: draw exhaustion and host cancellation.

use nest_core::{CancelToken, Error, Termination};
use nest_sampler::{
    KmeansClusterer, LivePointReducer, Metric, NestedSampler, NestedSamplerConfig, Prior,
};

#[test]
fn draw_exhausted_surfaces_partial_state() {
    // Feasible on a ball covering ~3e-6 of the domain: the initial
    // population is all `-inf`, and no replacement can beat it within
    // the budget.
    fn needle(theta: &[f64]) -> f64 {
        let r2 = (theta[0] - 0.5).powi(2) + (theta[1] - 0.5).powi(2);
        if r2 < 1e-6 { 0.0 } else { f64::NEG_INFINITY }
    }
    let prior = Prior::uniform_box(&[(0.0, 1.0), (0.0, 1.0)]).unwrap();
    let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 3, 3, 0.01).unwrap();
    let config = NestedSamplerConfig {
        n_initial: 50,
        n_min: 50,
        max_draw_attempts: 200,
        n_initial_no_clustering: 10,
        ..Default::default()
    };
    let mut sampler = NestedSampler::new(prior, needle, clusterer, config).unwrap();

    let err = sampler.run(&LivePointReducer::None, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, Error::DrawExhausted { attempts: 200 }));

    // Partial state stays reachable on the sampler.
    assert!(!sampler.posterior_sample().is_empty());
    assert_eq!(sampler.log_evidence(), f64::NEG_INFINITY);
}

#[test]
fn cancellation_yields_partial_sample() {
    fn log_like(theta: &[f64]) -> f64 {
        -0.5 * theta.iter().map(|t| t * t).sum::<f64>()
    }
    let prior = Prior::uniform_box(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
    let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 3, 3, 0.01).unwrap();
    let config = NestedSamplerConfig { n_initial: 80, n_min: 80, ..Default::default() };
    let mut sampler = NestedSampler::new(prior, log_like, clusterer, config).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let summary = sampler.run(&LivePointReducer::None, &cancel).unwrap();

    assert_eq!(summary.termination, Termination::Cancelled);
    assert_eq!(summary.n_iterations, 0);
    // The survivors were still distributed into the posterior sample.
    assert_eq!(sampler.posterior_sample().len(), 80);
}

#[test]
fn iteration_cap_flags_non_convergence() {
    fn log_like(theta: &[f64]) -> f64 {
        -0.5 * theta.iter().map(|t| t * t).sum::<f64>()
    }
    let prior = Prior::uniform_box(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
    let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 3, 3, 0.01).unwrap();
    let config = NestedSamplerConfig {
        n_initial: 60,
        n_min: 60,
        max_iterations: 25,
        ..Default::default()
    };
    let mut sampler = NestedSampler::new(prior, log_like, clusterer, config).unwrap();
    let summary = sampler.run(&LivePointReducer::None, &CancelToken::new()).unwrap();

    assert_eq!(summary.termination, Termination::IterationCapReached);
    assert_eq!(summary.n_iterations, 25);
    // 25 retirements plus 60 survivors.
    assert_eq!(sampler.posterior_sample().len(), 85);
}
