//! Error types for contract validation.
//!
//! Everything here is a load-time failure that stops the run before any route
//! is validated. Per-route failures are not errors: they are collected as
//! [`crate::validator::RouteOutcome`] values.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for usage, configuration and spec loading failures.
pub const EXIT_USAGE: u8 = 2;

/// Failure to obtain or parse one OpenAPI document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("download failed: {0}")]
    Download(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("read body: {0}")]
    ReadBody(#[source] std::io::Error),

    #[error("read file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse document: {0}")]
    Parse(String),
}

/// Failure to load the gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no x-contract-specs found in config")]
    NoContractSpecs,
}

/// Top-level error of a validation run.
#[derive(Debug, Error)]
pub enum ContractTestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{hostname}: FAILED ({source})")]
    SpecLoad {
        hostname: String,
        #[source]
        source: SpecError,
    },

    #[error("writing report: {0}")]
    Output(#[from] std::io::Error),
}

impl ContractTestError {
    /// Process exit code for this error. All load-time failures share one code.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::SpecLoad { .. } | Self::Output(_) => EXIT_USAGE,
        }
    }
}
