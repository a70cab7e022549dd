//! Run options and command-line helpers.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::routes::{RouteFilter, canonical_hostname};

/// Default location of the gateway configuration.
pub const DEFAULT_CONFIG_PATH: &str = "config/krakend.json";

/// Long flags that are also accepted with a single leading dash
/// (`-config x`, `-warn-uncovered`).
pub const LONG_FLAGS: &[&str] = &[
    "config",
    "warn-uncovered",
    "include-health",
    "verbose",
    "override",
    "service",
];

/// Local replacement for one hostname's remote spec: `hostname=/path/to/spec.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSpec {
    pub hostname: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOverride(String);

impl fmt::Display for InvalidOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-override must be in format hostname=/path/to/spec.yaml, got '{}'",
            self.0
        )
    }
}

impl std::error::Error for InvalidOverride {}

impl FromStr for OverrideSpec {
    type Err = InvalidOverride;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((hostname, path)) if !hostname.is_empty() && !path.is_empty() => Ok(Self {
                hostname: canonical_hostname(hostname),
                path: PathBuf::from(path),
            }),
            _ => Err(InvalidOverride(s.to_owned())),
        }
    }
}

/// Everything a validation run needs to know.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub config: PathBuf,
    pub warn_uncovered: bool,
    pub include_health: bool,
    pub verbose: bool,
    pub overrides: Vec<OverrideSpec>,
    pub service: Option<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            warn_uncovered: false,
            include_health: false,
            verbose: false,
            overrides: Vec::new(),
            service: None,
        }
    }
}

impl ValidationOptions {
    /// Local file replacing the remote spec of `hostname`, if any.
    /// The last override for a hostname wins.
    #[must_use]
    pub fn override_for(&self, hostname: &str) -> Option<&OverrideSpec> {
        self.overrides.iter().rev().find(|o| o.hostname == hostname)
    }

    #[must_use]
    pub fn route_filter(&self) -> RouteFilter {
        RouteFilter {
            include_health: self.include_health,
            service: self.service.clone(),
        }
    }
}

/// Rewrite single-dash long flags (`-config`, `-override=a=b`) to their
/// double-dash form so clap can parse them. Arguments after `--` and values
/// that are not known flags are passed through untouched.
#[must_use]
pub fn expand_single_dash_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix('-').filter(|f| !f.starts_with('-')) else {
                return arg;
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
