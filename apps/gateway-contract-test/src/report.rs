//! Human-readable output of a validation run.
//!
//! All functions write to a caller-supplied writer so the binary can use
//! stdout and tests can capture into a buffer.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use crate::openapi::DocumentedSpec;
use crate::validator::{FailureReason, RouteOutcome, ValidationReport};

/// Title and the start of spec loading.
///
/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "Contract Test: KrakenD vs OpenAPI Specs".bold())?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "Downloading specs...")
}

/// Verbose note for a spec excluded by the service filter.
///
/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_spec_filtered(out: &mut impl Write, hostname: &str, service: &str) -> io::Result<()> {
    writeln!(
        out,
        "  {hostname}: {}",
        format!("skipped (filtering for {service})").dimmed()
    )
}

/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_spec_override(out: &mut impl Write, hostname: &str, path: &Path) -> io::Result<()> {
    writeln!(out, "  {hostname}: loading from local file {}", path.display())
}

/// Report a loaded spec. In verbose mode the base path and every documented
/// operation are listed first.
///
/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_spec_loaded(
    out: &mut impl Write,
    hostname: &str,
    spec: &DocumentedSpec,
    verbose: bool,
) -> io::Result<()> {
    if verbose {
        if !spec.base_path.is_empty() {
            writeln!(out, "    base path: {}", spec.base_path)?;
        }
        for key in &spec.operations {
            writeln!(out, "    spec: {key}")?;
        }
    }
    writeln!(
        out,
        "  {hostname}: {} ({} operations)",
        "OK".green(),
        spec.operation_count()
    )
}

/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_validation_header(
    out: &mut impl Write,
    route_count: usize,
    health_skipped: usize,
) -> io::Result<()> {
    let skipped = if health_skipped > 0 {
        format!(" ({health_skipped} health routes skipped)")
    } else {
        String::new()
    };
    writeln!(out)?;
    writeln!(out, "Validating {route_count} backend routes{skipped}...")
}

/// Per-route lines, warnings and the final tally.
///
/// # Errors
///
/// Propagates failures of the underlying writer.
pub fn print_report(out: &mut impl Write, report: &ValidationReport) -> io::Result<()> {
    for result in &report.results {
        let label = match result.outcome {
            RouteOutcome::Pass => "PASS".green(),
            RouteOutcome::Fail(_) => "FAIL".red().bold(),
        };
        let route = &result.route;
        writeln!(
            out,
            "  {label}  {:<6} {:<45} -> {}",
            route.method, route.path, route.hostname
        )?;
        match result.outcome {
            RouteOutcome::Pass => {}
            RouteOutcome::Fail(reason @ FailureReason::NoSpecForHostname) => {
                writeln!(out, "        {reason} \"{}\"", route.hostname)?;
            }
            RouteOutcome::Fail(reason) => writeln!(out, "        {reason}")?,
        }
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        for warning in &report.warnings {
            writeln!(
                out,
                "  {}  spec path {:<45} in {} not covered by any gateway route",
                "WARN".yellow(),
                warning.path,
                warning.hostname
            )?;
        }
    }

    writeln!(out)?;
    let verdict = if report.is_success() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    writeln!(
        out,
        "Result: {verdict} ({} passed, {} failed)",
        report.passed(),
        report.failed()
    )
}
