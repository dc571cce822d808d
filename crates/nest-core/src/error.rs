//! Error types for nest

use thiserror::Error;

/// nest error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration, rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// The per-iteration draw budget ran out before a replacement live
    /// point above the likelihood constraint was found. The sampler
    /// retains the partial posterior sample and evidence accumulators.
    #[error("replacement draw budget exhausted after {attempts} attempts")]
    DrawExhausted {
        /// Attempts consumed before giving up.
        attempts: usize,
    },

    /// Unrecoverable numerical failure
    #[error("Numerical error: {0}")]
    Numerical(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
