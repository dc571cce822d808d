//! ASCII result writers.
//!
//! One file per output, plain columns, scientific notation with nine
//! significant digits. File names share a path prefix:
//! `<prefix>_Parameter000.txt`, `<prefix>_LikelihoodDistribution.txt`,
//! and so on.

use nest_core::{PosteriorSample, Result, RunSummary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::estimates::{ParameterEstimate, parameter_estimates};

/// Scientific notation, nine significant digits.
macro_rules! sci {
    ($value:expr) => {
        format_args!("{:.8e}", $value)
    };
}

/// Write one file per parameter, each a single column of posterior
/// values in retirement order: `<prefix>_Parameter<k>.txt`.
pub fn write_parameter_files(sample: &PosteriorSample, path_prefix: &str) -> Result<()> {
    for k in 0..sample.dim() {
        let path = format!("{path_prefix}_Parameter{k:03}.txt");
        let mut out = BufWriter::new(File::create(&path)?);
        for value in sample.parameter_column(k) {
            writeln!(out, "{}", sci!(value))?;
        }
        out.flush()?;
    }
    Ok(())
}

/// Write the log-likelihood of each posterior point, one column.
pub fn write_log_likelihood(sample: &PosteriorSample, path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Posterior sample from nested sampling")?;
    writeln!(out, "# log(Likelihood)")?;
    for point in sample.points() {
        writeln!(out, "{}", sci!(point.log_likelihood))?;
    }
    out.flush()?;
    Ok(())
}

/// Write the evidence, its error, and the information gain.
pub fn write_evidence_information(summary: &RunSummary, path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Evidence results from nested sampling")?;
    writeln!(out, "# log(Evidence)  Error of log(Evidence)  Information Gain")?;
    writeln!(
        out,
        "{}  {}  {}",
        sci!(summary.log_evidence),
        sci!(summary.log_evidence_error),
        sci!(summary.information)
    )?;
    out.flush()?;
    Ok(())
}

/// Write the normalized linear-space posterior probability of each
/// point, one column; the column sums to 1.
pub fn write_posterior_probability(
    sample: &PosteriorSample,
    log_evidence: f64,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Posterior probability distribution from nested sampling")?;
    for probability in sample.normalized_probabilities(log_evidence) {
        writeln!(out, "{}", sci!(probability))?;
    }
    out.flush()?;
    Ok(())
}

/// Write the parameter summary: one row per parameter with mean,
/// median, mode, and the shortest credible interval offsets.
pub fn write_parameter_summary(
    estimates: &[ParameterEstimate],
    credible_level: f64,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# Summary of Parameter Estimation from nested sampling")?;
    writeln!(out, "# Credible intervals are the shortest credible intervals")?;
    writeln!(out, "# according to the usual definition")?;
    writeln!(out, "# Credible level: {credible_level:.2} %")?;
    writeln!(out, "# Column #1: Expectation")?;
    writeln!(out, "# Column #2: Median")?;
    writeln!(out, "# Column #3: Mode")?;
    writeln!(out, "# Column #4: Lower Credible Interval (CI)")?;
    writeln!(out, "# Column #5: Upper Credible Interval (CI)")?;
    for e in estimates {
        writeln!(
            out,
            "{}  {}  {}  {}  {}",
            sci!(e.mean),
            sci!(e.median),
            sci!(e.mode),
            sci!(e.lower_credible),
            sci!(e.upper_credible)
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write the full output set under a shared path prefix.
pub fn write_all(
    sample: &PosteriorSample,
    summary: &RunSummary,
    credible_level: f64,
    path_prefix: &str,
) -> Result<()> {
    write_parameter_files(sample, path_prefix)?;
    write_log_likelihood(sample, format!("{path_prefix}_LikelihoodDistribution.txt"))?;
    write_evidence_information(summary, format!("{path_prefix}_EvidenceInformation.txt"))?;
    write_posterior_probability(
        sample,
        summary.log_evidence,
        format!("{path_prefix}_PosteriorDistribution.txt"),
    )?;
    let estimates = parameter_estimates(sample, summary.log_evidence, credible_level)?;
    write_parameter_summary(
        &estimates,
        credible_level,
        format!("{path_prefix}_ParameterSummary.txt"),
    )?;
    tracing::info!(path_prefix, "result files written");
    Ok(())
}
