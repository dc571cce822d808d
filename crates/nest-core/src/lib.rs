//! # nest-core
//!
//! Shared foundation for the nest workspace: the error type, the
//! [`traits::LogLikelihood`] contract implemented by user models, and
//! the result types produced by a nested-sampling run.
//!
//! Higher-level crates (`nest-sampler`, `nest-results`) depend on this
//! crate only; they never depend on each other's internals.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::LogLikelihood;
pub use types::{CancelToken, PosteriorPoint, PosteriorSample, RunSummary, Termination};
