//! Cross-referencing of gateway routes against documented operations.
//!
//! Validation never stops on a failing route: every route gets a
//! [`RouteOutcome`] and the caller decides what to do with the collection.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use indexmap::IndexMap;

use crate::normalize::{OperationKey, normalize_path};
use crate::openapi::DocumentedSpec;
use crate::routes::BackendRoute;

/// Loaded specs keyed by hostname, in the order they were declared.
pub type SpecCatalog = IndexMap<String, DocumentedSpec>;

/// Why a route failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The route's hostname has no entry in `x-contract-specs`.
    NoSpecForHostname,
    /// The spec exists but does not document this method and path.
    NotInSpec,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpecForHostname => f.write_str("no spec configured for hostname"),
            Self::NotInSpec => f.write_str("not found in OpenAPI spec"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Pass,
    Fail(FailureReason),
}

/// Validation result for one extracted route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResult {
    pub route: BackendRoute,
    pub key: OperationKey,
    pub outcome: RouteOutcome,
}

impl RouteResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == RouteOutcome::Pass
    }
}

/// A documented path no gateway route reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageWarning {
    pub hostname: String,
    pub path: String,
}

/// Everything a validation run produced.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// One entry per route, in extraction order.
    pub results: Vec<RouteResult>,
    /// Uncovered spec paths, grouped by hostname. Empty unless requested.
    pub warnings: Vec<CoverageWarning>,
}

impl ValidationReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Warnings never count against success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Validate `routes` against `specs`.
///
/// When `warn_uncovered` is set, every documented path of every loaded spec
/// that no passing route touched is reported as a [`CoverageWarning`].
#[must_use]
pub fn validate_routes(
    routes: &[BackendRoute],
    specs: &SpecCatalog,
    warn_uncovered: bool,
) -> ValidationReport {
    let mut covered: HashMap<&str, BTreeSet<String>> = HashMap::new();
    let mut results = Vec::with_capacity(routes.len());

    for route in routes {
        let key = OperationKey::new(&route.method, &route.path);
        let outcome = match specs.get(&route.hostname) {
            None => RouteOutcome::Fail(FailureReason::NoSpecForHostname),
            Some(spec) if spec.documents(&key) => {
                covered
                    .entry(route.hostname.as_str())
                    .or_default()
                    .insert(normalize_path(&route.path));
                RouteOutcome::Pass
            }
            Some(_) => RouteOutcome::Fail(FailureReason::NotInSpec),
        };
        results.push(RouteResult {
            route: route.clone(),
            key,
            outcome,
        });
    }

    let mut warnings = Vec::new();
    if warn_uncovered {
        for (hostname, spec) in specs {
            let hit = covered.get(hostname.as_str());
            for path in &spec.paths {
                if !hit.is_some_and(|paths| paths.contains(path)) {
                    warnings.push(CoverageWarning {
                        hostname: hostname.clone(),
                        path: path.clone(),
                    });
                }
            }
        }
    }

    ValidationReport { results, warnings }
}
