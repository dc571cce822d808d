//! Marginal statistics from the weighted posterior sample.
//!
//! For each parameter the sample is marginalized by sorting on the
//! parameter value and merging exact duplicates (their probabilities
//! add). From the 1-D marginal we then read the expectation, the
//! median, the mode, and the shortest credible interval around the
//! mode.

use nest_core::{Error, PosteriorSample, Result};
use serde::{Deserialize, Serialize};

/// Marginal estimates for one parameter. The credible bounds are
/// offsets from the mode, not absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEstimate {
    /// Expectation value under the posterior.
    pub mean: f64,
    /// Value where the cumulative marginal first reaches one half.
    pub median: f64,
    /// Value with the largest marginal probability.
    pub mode: f64,
    /// Distance from the mode down to the interval's lower edge.
    pub lower_credible: f64,
    /// Distance from the mode up to the interval's upper edge.
    pub upper_credible: f64,
}

/// Compute per-parameter marginal estimates.
///
/// `credible_level` is a percentage in `(0, 100)`, e.g. `68.27`.
pub fn parameter_estimates(
    sample: &PosteriorSample,
    log_evidence: f64,
    credible_level: f64,
) -> Result<Vec<ParameterEstimate>> {
    if !(0.0..100.0).contains(&credible_level) || credible_level <= 0.0 {
        return Err(Error::Config(format!(
            "credible level must be a percentage in (0, 100), got {credible_level}"
        )));
    }
    if sample.is_empty() {
        return Err(Error::Config("cannot estimate parameters from an empty sample".to_string()));
    }

    let probs = sample.normalized_probabilities(log_evidence);
    let mut out = Vec::with_capacity(sample.dim());
    for k in 0..sample.dim() {
        let (values, marginal) = marginalize(&sample.parameter_column(k), &probs);

        let mean: f64 = values.iter().zip(marginal.iter()).map(|(&v, &p)| v * p).sum();

        let mut cumulative = 0.0;
        let mut median = values[0];
        for (&v, &p) in values.iter().zip(marginal.iter()) {
            median = v;
            cumulative += p;
            if cumulative >= 0.5 {
                break;
            }
        }

        let mode_idx = marginal
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mode = values[mode_idx];

        let (lower_credible, upper_credible) =
            shortest_credible_interval(&values, &marginal, mode_idx, credible_level / 100.0);

        out.push(ParameterEstimate { mean, median, mode, lower_credible, upper_credible });
    }
    Ok(out)
}

/// Sort one parameter column with its probabilities and merge exact
/// duplicates. Duplicates are tracked with a kept/merged mask rather
/// than a sentinel value in the data itself.
fn marginalize(values: &[f64], probs: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out_values: Vec<f64> = Vec::with_capacity(values.len());
    let mut out_probs: Vec<f64> = Vec::with_capacity(values.len());
    for &i in &order {
        if out_values.last() == Some(&values[i]) {
            // Same parameter value retired more than once: merge the
            // probability mass.
            *out_probs.last_mut().unwrap() += probs[i];
        } else {
            out_values.push(values[i]);
            out_probs.push(probs[i]);
        }
    }
    (out_values, out_probs)
}

/// Shortest credible interval around the mode of a sorted marginal.
///
/// Expands to the right of the mode one bin at a time; for each right
/// edge, the left edge is the bin (at or below the mode) whose
/// probability is closest to the right edge's, which keeps the interval
/// balanced in density rather than in width. Stops as soon as the
/// enclosed mass reaches `level`.
fn shortest_credible_interval(
    values: &[f64],
    probs: &[f64],
    mode_idx: usize,
    level: f64,
) -> (f64, f64) {
    let n = values.len();
    let mode_value = values[mode_idx];
    if n == 1 {
        return (0.0, 0.0);
    }

    let mut left_idx = mode_idx;
    let mut right_idx = mode_idx;
    for step_right in 1.. {
        right_idx = (mode_idx + step_right).min(n - 1);
        let limit = probs[right_idx];
        left_idx = (0..=mode_idx)
            .min_by(|&a, &b| (probs[a] - limit).abs().total_cmp(&(probs[b] - limit).abs()))
            .unwrap_or(mode_idx);

        let total: f64 = probs[left_idx..=right_idx].iter().sum();
        if total >= level {
            break;
        }
        if right_idx == n - 1 {
            // Right edge saturated; grow leftward until the mass fits
            // or the marginal is exhausted.
            while left_idx > 0 && probs[left_idx..=right_idx].iter().sum::<f64>() < level {
                left_idx -= 1;
            }
            break;
        }
    }

    (mode_value - values[left_idx], values[right_idx] - mode_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nest_core::PosteriorPoint;

    /// Sample whose weights are already normalized (log Z = 0).
    fn sample_from(rows: &[(f64, f64)]) -> PosteriorSample {
        let mut s = PosteriorSample::new(1);
        for &(value, prob) in rows {
            s.push(PosteriorPoint {
                parameters: vec![value],
                log_likelihood: 0.0,
                log_weight: prob.ln(),
            });
        }
        s
    }

    #[test]
    fn test_mean_median_mode() {
        let s = sample_from(&[(1.0, 0.1), (2.0, 0.5), (3.0, 0.2), (4.0, 0.2)]);
        let est = &parameter_estimates(&s, 0.0, 68.27).unwrap()[0];
        assert_relative_eq!(est.mean, 0.1 + 1.0 + 0.6 + 0.8, epsilon = 1e-12);
        assert_relative_eq!(est.median, 2.0);
        assert_relative_eq!(est.mode, 2.0);
    }

    #[test]
    fn test_duplicate_values_are_merged() {
        // Two retirements at x = 2.0 merge into a single marginal bin,
        // which then dominates the mode.
        let s = sample_from(&[(1.0, 0.3), (2.0, 0.2), (2.0, 0.25), (3.0, 0.25)]);
        let est = &parameter_estimates(&s, 0.0, 68.27).unwrap()[0];
        assert_relative_eq!(est.mode, 2.0);
        assert_relative_eq!(est.mean, 0.3 + 0.9 + 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_credible_interval_covers_requested_mass() {
        // Symmetric triangle around x = 0.
        let rows: Vec<(f64, f64)> = (-10..=10)
            .map(|i| {
                let x = i as f64 / 10.0;
                (x, (1.0 - x.abs()).max(1e-4))
            })
            .collect();
        let total: f64 = rows.iter().map(|r| r.1).sum();
        let rows: Vec<(f64, f64)> = rows.into_iter().map(|(x, p)| (x, p / total)).collect();
        let s = sample_from(&rows);
        let est = &parameter_estimates(&s, 0.0, 68.27).unwrap()[0];

        assert_relative_eq!(est.mode, 0.0);
        assert!(est.lower_credible > 0.0 && est.upper_credible > 0.0);
        // Enclosed mass must be at least the requested level.
        let mass: f64 = rows
            .iter()
            .filter(|(x, _)| *x >= -est.lower_credible && *x <= est.upper_credible)
            .map(|(_, p)| p)
            .sum();
        assert!(mass >= 0.6827, "interval encloses only {mass}");
        // And the interval should not be trivially the full support.
        assert!(est.lower_credible < 1.0 || est.upper_credible < 1.0);
    }

    #[test]
    fn test_mode_at_right_edge() {
        let s = sample_from(&[(1.0, 0.1), (2.0, 0.2), (3.0, 0.7)]);
        let est = &parameter_estimates(&s, 0.0, 90.0).unwrap()[0];
        assert_relative_eq!(est.mode, 3.0);
        assert_relative_eq!(est.upper_credible, 0.0);
        assert!(est.lower_credible > 0.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let s = sample_from(&[(1.0, 1.0)]);
        assert!(parameter_estimates(&s, 0.0, 0.0).is_err());
        assert!(parameter_estimates(&s, 0.0, 100.0).is_err());
        let empty = PosteriorSample::new(1);
        assert!(parameter_estimates(&empty, 0.0, 68.27).is_err());
    }
}
