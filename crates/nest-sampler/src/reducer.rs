//! Live-point reduction schedules.
//!
//! A reducer maps the iteration counter to a target live-point count.
//! The driver enforces monotone non-increase and never goes below
//! `n_min`; the reducer itself is a pure function of the iteration, so
//! there is no back-reference from the reducer into the sampler.

use nest_core::{Error, Result};

/// Schedule for shrinking the live-point population.
#[derive(Debug, Clone, Copy)]
pub enum LivePointReducer {
    /// Keep the population at its initial size.
    None,
    /// `N(i) = N_min + (N_initial - N_min) · exp(-i · tolerance)`.
    Feroz {
        /// Decay tolerance, larger shrinks faster.
        tolerance: f64,
    },
    /// `N(i) = N_initial · exp(-i · rate)`, floored at `N_min`.
    Exponential {
        /// Decay rate per iteration.
        rate: f64,
    },
}

impl LivePointReducer {
    /// Validate the schedule parameters.
    pub fn validate(&self) -> Result<()> {
        let rate = match *self {
            LivePointReducer::None => return Ok(()),
            LivePointReducer::Feroz { tolerance } => tolerance,
            LivePointReducer::Exponential { rate } => rate,
        };
        if !rate.is_finite() || rate < 0.0 {
            return Err(Error::Config(format!(
                "reducer decay must be finite and non-negative, got {rate}"
            )));
        }
        Ok(())
    }

    /// Target live-point count at `iteration`. Always within
    /// `[n_min, n_initial]`.
    pub fn target(&self, iteration: usize, n_initial: usize, n_min: usize) -> usize {
        let i = iteration as f64;
        let raw = match *self {
            LivePointReducer::None => n_initial as f64,
            LivePointReducer::Feroz { tolerance } => {
                n_min as f64 + n_initial.saturating_sub(n_min) as f64 * (-i * tolerance).exp()
            }
            LivePointReducer::Exponential { rate } => n_initial as f64 * (-i * rate).exp(),
        };
        (raw.floor() as usize).clamp(n_min, n_initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_keeps_population() {
        let r = LivePointReducer::None;
        assert_eq!(r.target(0, 400, 100), 400);
        assert_eq!(r.target(10_000, 400, 100), 400);
    }

    #[test]
    fn test_feroz_decays_to_n_min() {
        let r = LivePointReducer::Feroz { tolerance: 0.01 };
        assert_eq!(r.target(0, 400, 100), 400);
        let mid = r.target(100, 400, 100);
        assert!(mid < 400 && mid > 100);
        assert_eq!(r.target(10_000, 400, 100), 100);
    }

    #[test]
    fn test_exponential_floors_at_n_min() {
        let r = LivePointReducer::Exponential { rate: 0.05 };
        assert_eq!(r.target(0, 400, 100), 400);
        assert_eq!(r.target(10_000, 400, 100), 100);
    }

    #[test]
    fn test_schedules_are_monotone_non_increasing() {
        for r in [
            LivePointReducer::Feroz { tolerance: 0.02 },
            LivePointReducer::Exponential { rate: 0.03 },
        ] {
            let mut previous = usize::MAX;
            for i in 0..500 {
                let t = r.target(i, 400, 50);
                assert!(t <= previous, "schedule increased at iteration {i}");
                previous = t;
            }
        }
    }

    #[test]
    fn test_negative_decay_rejected() {
        assert!(LivePointReducer::Feroz { tolerance: -0.1 }.validate().is_err());
        assert!(LivePointReducer::Exponential { rate: f64::NAN }.validate().is_err());
        assert!(LivePointReducer::None.validate().is_ok());
    }
}
