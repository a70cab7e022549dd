//! Gateway contract test
//!
//! Verifies that every backend route of a `KrakenD` configuration is covered by
//! the OpenAPI spec published for the upstream hostname it targets.
//!
//! # Usage
//!
//! ```bash
//! # Validate with the default config/krakend.json
//! gateway-contract-test
//!
//! # Validate one service against a local spec and list uncovered spec paths
//! gateway-contract-test -service users.example \
//!     -override users.example=./openapi.yaml -warn-uncovered
//! ```
//!
//! Exit codes: 0 all routes pass, 1 at least one route fails, 2 usage,
//! configuration or spec loading error.

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr, clippy::exit)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gateway_contract_test::error::{ConfigError, ContractTestError};
use gateway_contract_test::options::{
    DEFAULT_CONFIG_PATH, OverrideSpec, ValidationOptions, expand_single_dash_flags,
};
use gateway_contract_test::routes::canonical_hostname;

/// Gateway vs OpenAPI contract test
///
/// Checks every gateway backend route against the OpenAPI spec declared for
/// its hostname under `x-contract-specs`.
#[derive(Parser, Debug)]
#[command(name = "gateway-contract-test")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the gateway configuration (krakend.json)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Warn about spec paths not covered by any backend route
    #[arg(long, value_name = "BOOL", default_value_t = false, num_args = 0..=1,
          require_equals = true, default_missing_value = "true",
          action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    warn_uncovered: bool,

    /// Include health check routes (`*/health`) in validation
    #[arg(long, value_name = "BOOL", default_value_t = false, num_args = 0..=1,
          require_equals = true, default_missing_value = "true",
          action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    include_health: bool,

    /// Print base paths and every documented operation while loading specs
    #[arg(long, short = 'v', value_name = "BOOL", default_value_t = false, num_args = 0..=1,
          require_equals = true, default_missing_value = "true",
          action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    verbose: bool,

    /// Override a service spec with a local file: hostname=/path/to/spec.yaml
    /// (can be specified multiple times)
    #[arg(long = "override", value_name = "HOSTNAME=PATH", action = ArgAction::Append)]
    overrides: Vec<OverrideSpec>,

    /// Only validate routes and load specs for this service hostname
    #[arg(long, value_name = "HOSTNAME")]
    service: Option<String>,
}

impl From<Cli> for ValidationOptions {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            warn_uncovered: cli.warn_uncovered,
            include_health: cli.include_health,
            verbose: cli.verbose,
            overrides: cli.overrides,
            service: cli
                .service
                .filter(|s| !s.is_empty())
                .map(|s| canonical_hostname(&s)),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "warn,gateway_contract_test=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fatal(err: &ContractTestError) -> ExitCode {
    let line = match err {
        ContractTestError::SpecLoad { .. } => format!("  {err}"),
        ContractTestError::Config(ConfigError::Read { .. } | ConfigError::Parse { .. }) => {
            err.to_string()
        }
        _ => format!("Error: {err}"),
    };
    eprintln!("{}", line.red());
    ExitCode::from(err.exit_code())
}

fn main() -> ExitCode {
    // Malformed flags (including a bad -override value) exit with code 2 here.
    let cli = Cli::parse_from(expand_single_dash_flags(std::env::args_os()));
    init_logging(cli.verbose);

    let opts = ValidationOptions::from(cli);
    let mut stdout = io::stdout().lock();

    match gateway_contract_test::run(&opts, &mut stdout) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => fatal(&err),
    }
}
