//! Degenerate configurations that must still run to completion.

use nest_core::{CancelToken, Termination};
use nest_sampler::{
    KmeansClusterer, LivePointReducer, Metric, NestedSampler, NestedSamplerConfig, Prior,
};

#[test]
fn single_live_point_population() {
    fn log_like(_theta: &[f64]) -> f64 {
        0.0
    }
    let prior = Prior::uniform_box(&[(0.0, 1.0)]).unwrap();
    let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 2, 2, 0.01).unwrap();
    let config = NestedSamplerConfig {
        n_initial: 1,
        n_min: 1,
        termination_factor: 0.5,
        n_initial_no_clustering: 5,
        ..Default::default()
    };
    let mut sampler = NestedSampler::new(prior, log_like, clusterer, config).unwrap();
    let summary = sampler.run(&LivePointReducer::None, &CancelToken::new()).unwrap();

    assert_eq!(summary.termination, Termination::Converged);
    // X_i = exp(-i) crosses 0.5 at the first iteration.
    assert_eq!(summary.n_iterations, 1);
    assert!(summary.log_evidence.abs() < 1e-9);
}

#[test]
fn k_max_one_disables_multimodal_decomposition() {
    // Two well-separated Gaussian modes, but the clusterer is pinned to
    // a single cluster; the run must still converge with one ellipsoid.
    fn log_like(theta: &[f64]) -> f64 {
        let a = (theta[0] - 2.0).powi(2) + theta[1].powi(2);
        let b = (theta[0] + 2.0).powi(2) + theta[1].powi(2);
        let la = -0.5 * a / 0.09;
        let lb = -0.5 * b / 0.09;
        la.max(lb) + (1.0 + (-(la - lb).abs()).exp()).ln()
    }
    let prior = Prior::uniform_box(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
    let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 1, 3, 0.01).unwrap();
    let config = NestedSamplerConfig {
        n_initial: 300,
        n_min: 300,
        n_initial_no_clustering: 50,
        ..Default::default()
    };
    let mut sampler = NestedSampler::new(prior, log_like, clusterer, config).unwrap();
    let summary = sampler.run(&LivePointReducer::None, &CancelToken::new()).unwrap();

    assert_eq!(summary.termination, Termination::Converged);
    // Two modes, each sigma = 0.3: Z = 2 * 2*pi*sigma^2 / 100.
    let expected = (2.0 * 2.0 * std::f64::consts::PI * 0.09 / 100.0).ln();
    assert!(
        (summary.log_evidence - expected).abs() < 0.35,
        "log Z = {}, expected {expected}",
        summary.log_evidence
    );
}

#[test]
fn one_dimensional_run_with_mahalanobis_metric() {
    fn log_like(theta: &[f64]) -> f64 {
        -0.5 * theta[0] * theta[0] / 0.25
    }
    let prior = Prior::uniform_box(&[(-3.0, 3.0)]).unwrap();
    let metric = Metric::mahalanobis(1, vec![4.0]).unwrap();
    let clusterer = KmeansClusterer::new(metric, 1, 2, 3, 0.01).unwrap();
    let config = NestedSamplerConfig {
        n_initial: 150,
        n_min: 150,
        n_initial_no_clustering: 30,
        ..Default::default()
    };
    let mut sampler = NestedSampler::new(prior, log_like, clusterer, config).unwrap();
    let summary = sampler.run(&LivePointReducer::None, &CancelToken::new()).unwrap();

    // sigma = 0.5 Gaussian on a length-6 box: Z = sigma*sqrt(2*pi)/6.
    let expected = (0.5 * (2.0 * std::f64::consts::PI).sqrt() / 6.0).ln();
    assert!(
        (summary.log_evidence - expected).abs() < 0.3,
        "log Z = {}, expected {expected}",
        summary.log_evidence
    );
}
