//! # nest-results
//!
//! Post-processing for nested-sampling runs: marginal statistics
//! (mean, median, mode, shortest credible intervals) from the weighted
//! posterior sample, and the ASCII result writers.

/// Marginal statistics and credible intervals.
pub mod estimates;
/// ASCII output files.
pub mod writer;

pub use estimates::{ParameterEstimate, parameter_estimates};
pub use writer::{
    write_all, write_evidence_information, write_log_likelihood, write_parameter_files,
    write_parameter_summary, write_posterior_probability,
};
