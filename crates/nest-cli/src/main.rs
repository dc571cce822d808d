//! nest CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nest_core::CancelToken;
use nest_sampler::{
    KmeansClusterer, LivePointReducer, Metric, NestedSampler, NestedSamplerConfig,
};
use tracing_subscriber::EnvFilter;

mod demos;
use demos::DemoProblem;

#[derive(Parser)]
#[command(name = "nest")]
#[command(about = "nest - nested sampling evidence estimation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in demo problem and write the result files
    Demo {
        /// Demo likelihood to run
        #[arg(long, value_enum)]
        problem: DemoProblem,

        /// Path prefix for the output files
        #[arg(short, long, default_value = "nest_demo")]
        output_prefix: String,

        /// Initial live-point population
        #[arg(long, default_value = "400")]
        n_live: usize,

        /// Minimum live-point population (defaults to n_live)
        #[arg(long)]
        n_min: Option<usize>,

        /// Feroz reducer tolerance; 0 keeps the population constant
        #[arg(long, default_value = "0.0")]
        reduction_tolerance: f64,

        /// Termination factor for the nesting loop
        #[arg(long, default_value = "0.01")]
        termination_factor: f64,

        /// Per-iteration draw budget
        #[arg(long, default_value = "50000")]
        max_draw_attempts: usize,

        /// Credible level (percent) for the parameter summary
        #[arg(long, default_value = "68.27")]
        credible_level: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            problem,
            output_prefix,
            n_live,
            n_min,
            reduction_tolerance,
            termination_factor,
            max_draw_attempts,
            credible_level,
            seed,
        } => {
            let prior = problem.prior();
            let clusterer = KmeansClusterer::new(Metric::Euclidean, 1, 6, 10, 0.01)
                .context("building clusterer")?;
            let config = NestedSamplerConfig {
                n_initial: n_live,
                n_min: n_min.unwrap_or(n_live),
                max_draw_attempts,
                termination_factor,
                seed,
                ..Default::default()
            };
            let reducer = if reduction_tolerance > 0.0 {
                LivePointReducer::Feroz { tolerance: reduction_tolerance }
            } else {
                LivePointReducer::None
            };

            let mut sampler = NestedSampler::new(prior, problem, clusterer, config)
                .context("configuring nested sampler")?;
            let summary = sampler
                .run(&reducer, &CancelToken::new())
                .context("nested sampling run failed")?;

            if let Some(expected) = problem.expected_log_evidence() {
                tracing::info!(
                    log_evidence = summary.log_evidence,
                    expected,
                    "evidence recovered"
                );
            }

            nest_results::write_all(
                sampler.posterior_sample(),
                &summary,
                credible_level,
                &output_prefix,
            )
            .context("writing result files")?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}
