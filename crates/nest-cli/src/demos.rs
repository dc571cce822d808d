//! Built-in demo problems with known evidence values.

use clap::ValueEnum;
use nest_core::LogLikelihood;
use nest_sampler::Prior;

/// Demo likelihoods selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DemoProblem {
    /// Unit Gaussian `exp(-r^2/2)` on `[-5,5]^2`; log Z = log(2*pi/100).
    Gaussian,
    /// Himmelblau's function as `exp(-f/2)` on `[-5,5]^2`; four modes.
    Himmelblau,
    /// Eggbox `(2 + cos(x/2) cos(y/2))^5` on `[0,10*pi]^2`; log Z ~ 235.88.
    Eggbox,
}

impl DemoProblem {
    /// The prior box for this problem.
    pub fn prior(&self) -> Prior {
        let bounds: &[(f64, f64)] = match self {
            DemoProblem::Gaussian | DemoProblem::Himmelblau => {
                &[(-5.0, 5.0), (-5.0, 5.0)]
            }
            DemoProblem::Eggbox => {
                &[(0.0, 10.0 * std::f64::consts::PI), (0.0, 10.0 * std::f64::consts::PI)]
            }
        };
        // Bounds are static and valid.
        Prior::uniform_box(bounds).expect("demo prior bounds are valid")
    }

    /// Known analytic or benchmark log evidence, where available.
    pub fn expected_log_evidence(&self) -> Option<f64> {
        match self {
            DemoProblem::Gaussian => Some((2.0 * std::f64::consts::PI / 100.0).ln()),
            DemoProblem::Himmelblau => None,
            DemoProblem::Eggbox => Some(235.88),
        }
    }
}

impl LogLikelihood for DemoProblem {
    fn log_likelihood(&self, theta: &[f64]) -> f64 {
        match self {
            DemoProblem::Gaussian => -0.5 * theta.iter().map(|t| t * t).sum::<f64>(),
            DemoProblem::Himmelblau => {
                let (x, y) = (theta[0], theta[1]);
                let f = (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2);
                -0.5 * f
            }
            DemoProblem::Eggbox => {
                5.0 * (2.0 + (theta[0] / 2.0).cos() * (theta[1] / 2.0).cos()).ln()
            }
        }
    }
}
