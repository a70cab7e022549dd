//! One validation run: load, extract, validate, report.

use std::io::Write;

use crate::error::ContractTestError;
use crate::gateway::{GatewayConfig, load_gateway_config};
use crate::openapi::{SpecSource, load_spec};
use crate::options::ValidationOptions;
use crate::report;
use crate::routes::extract_routes;
use crate::validator::{SpecCatalog, ValidationReport, validate_routes};

/// Execute a full run, writing progress and results to `out`.
///
/// Per-route failures end up in the returned report; only load-time problems
/// are errors.
///
/// # Errors
///
/// Returns a [`ContractTestError`] if the gateway config or any selected spec
/// cannot be loaded, or if writing to `out` fails.
pub fn run(opts: &ValidationOptions, out: &mut impl Write) -> Result<ValidationReport, ContractTestError> {
    let cfg = load_gateway_config(&opts.config)?;

    for o in &opts.overrides {
        if !cfg.contract_specs.contains_key(&o.hostname) {
            tracing::warn!(
                hostname = %o.hostname,
                "override given for a hostname without x-contract-specs entry; ignoring"
            );
        }
    }

    report::print_banner(out)?;
    let specs = load_specs(&cfg, opts, out)?;

    let extracted = extract_routes(&cfg, &opts.route_filter());
    report::print_validation_header(out, extracted.routes.len(), extracted.health_skipped)?;

    let result = validate_routes(&extracted.routes, &specs, opts.warn_uncovered);
    tracing::debug!(
        passed = result.passed(),
        failed = result.failed(),
        warnings = result.warnings.len(),
        "validation finished"
    );
    report::print_report(out, &result)?;
    Ok(result)
}

/// Load every selected spec in declaration order. The first failure aborts,
/// since validating against a partial set would be meaningless.
fn load_specs(
    cfg: &GatewayConfig,
    opts: &ValidationOptions,
    out: &mut impl Write,
) -> Result<SpecCatalog, ContractTestError> {
    let filter = opts.route_filter();
    let mut specs = SpecCatalog::new();

    for (hostname, contract) in &cfg.contract_specs {
        if !filter.wants_hostname(hostname) {
            if opts.verbose
                && let Some(service) = filter.service.as_deref()
            {
                report::print_spec_filtered(out, hostname, service)?;
            }
            continue;
        }

        let source = match opts.override_for(hostname) {
            Some(o) => {
                report::print_spec_override(out, hostname, &o.path)?;
                SpecSource::Local(o.path.clone())
            }
            None => SpecSource::Remote(contract.openapi_url.clone()),
        };

        let spec = load_spec(&source).map_err(|source| ContractTestError::SpecLoad {
            hostname: hostname.clone(),
            source,
        })?;
        report::print_spec_loaded(out, hostname, &spec, opts.verbose)?;
        specs.insert(hostname.clone(), spec);
    }

    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SpecError};
    use crate::options::OverrideSpec;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const USERS_SPEC: &str = r"
servers:
  - url: https://users.example/v1
paths:
  /users/{userId}:
    get: {}
  /users:
    post: {}
";

    const ORDERS_SPEC: &str = r"
paths:
  /orders/{id}:
    get: {}
";

    const CONFIG: &str = r#"{
        "endpoints": [
            {
                "endpoint": "/api/users/{id}",
                "method": "GET",
                "backend": [{ "url_pattern": "/v1/users/{id}", "host": ["https://users.example"] }]
            },
            {
                "endpoint": "/api/users",
                "method": "POST",
                "backend": [{ "url_pattern": "/v1/users", "host": ["https://users.example"] }]
            },
            {
                "endpoint": "/api/orders/{id}",
                "method": "GET",
                "backend": [{ "url_pattern": "/orders/{id}", "host": ["https://orders.example"] }]
            },
            {
                "endpoint": "/__health",
                "method": "GET",
                "backend": [{ "url_pattern": "/health", "host": ["https://users.example"] }]
            }
        ],
        "x-contract-specs": {
            "users.example": { "openapi_url": "http://127.0.0.1:1/users.yaml" },
            "orders.example": { "openapi_url": "http://127.0.0.1:1/orders.yaml" }
        }
    }"#;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(config: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("krakend.json"), config).unwrap();
            fs::write(dir.path().join("users.yaml"), USERS_SPEC).unwrap();
            fs::write(dir.path().join("orders.yaml"), ORDERS_SPEC).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn local(&self, hostname: &str, file: &str) -> OverrideSpec {
            OverrideSpec {
                hostname: hostname.to_owned(),
                path: self.path(file),
            }
        }

        fn options(&self) -> ValidationOptions {
            ValidationOptions {
                config: self.path("krakend.json"),
                overrides: vec![
                    self.local("users.example", "users.yaml"),
                    self.local("orders.example", "orders.yaml"),
                ],
                ..ValidationOptions::default()
            }
        }
    }

    fn run_to_string(opts: &ValidationOptions) -> (Result<ValidationReport, ContractTestError>, String) {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        let result = run(opts, &mut buf);
        (result, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_all_routes_documented() {
        let fx = Fixture::new(CONFIG);
        let (result, text) = run_to_string(&fx.options());
        let report = result.unwrap();

        assert!(report.is_success());
        assert_eq!(report.passed(), 3);
        assert!(text.contains("users.example: loading from local file"));
        assert!(text.contains("users.example: OK (2 operations)"));
        assert!(text.contains("Validating 3 backend routes (1 health routes skipped)..."));
        assert!(text.contains("Result: PASS (3 passed, 0 failed)"));
    }

    #[test]
    fn test_include_health_counts_health_route() {
        let fx = Fixture::new(CONFIG);
        let opts = ValidationOptions {
            include_health: true,
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let report = result.unwrap();

        assert_eq!(report.results.len(), 4);
        assert_eq!(report.failed(), 1);
        assert!(text.contains("Validating 4 backend routes..."));
    }

    #[test]
    fn test_service_filter_restricts_specs_and_routes() {
        let fx = Fixture::new(CONFIG);
        // No override for orders.example: its remote URL would fail if fetched.
        let opts = ValidationOptions {
            service: Some("users.example".to_owned()),
            overrides: vec![fx.local("users.example", "users.yaml")],
            verbose: true,
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let report = result.unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(report.results.iter().all(|r| r.route.hostname == "users.example"));
        assert!(text.contains("orders.example: skipped (filtering for users.example)"));
        assert!(!text.contains("-> orders.example"));
        assert!(text.contains("    base path: /v1"));
    }

    #[test]
    fn test_service_filter_with_no_matching_routes_succeeds() {
        let fx = Fixture::new(CONFIG);
        let opts = ValidationOptions {
            service: Some("nobody.example".to_owned()),
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let report = result.unwrap();

        assert!(report.results.is_empty());
        assert!(report.is_success());
        assert!(text.contains("Result: PASS (0 passed, 0 failed)"));
    }

    #[test]
    fn test_spec_load_failure_aborts_and_names_hostname() {
        let fx = Fixture::new(CONFIG);
        let opts = ValidationOptions {
            overrides: vec![fx.local("users.example", "missing.yaml")],
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let err = result.unwrap_err();

        assert!(matches!(
            &err,
            ContractTestError::SpecLoad { hostname, source: SpecError::ReadFile { .. } }
                if hostname == "users.example"
        ));
        assert_eq!(err.exit_code(), 2);
        assert!(!text.contains("Validating"));
    }

    #[test]
    fn test_remote_fetch_failure_aborts() {
        let fx = Fixture::new(CONFIG);
        let opts = ValidationOptions {
            overrides: vec![fx.local("users.example", "users.yaml")],
            ..fx.options()
        };
        let (result, _) = run_to_string(&opts);
        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            ContractTestError::SpecLoad { hostname, source: SpecError::Download(_) }
                if hostname == "orders.example"
        ));
    }

    #[test]
    fn test_undocumented_and_unknown_host_routes_fail() {
        let config = r#"{
            "endpoints": [
                { "endpoint": "/a", "method": "GET",
                  "backend": [{ "url_pattern": "/v1/profiles/{id}", "host": ["https://users.example"] }] },
                { "endpoint": "/b", "method": "GET",
                  "backend": [{ "url_pattern": "/x", "host": ["https://ghost.example"] }] }
            ],
            "x-contract-specs": {
                "users.example": { "openapi_url": "http://127.0.0.1:1/users.yaml" }
            }
        }"#;
        let fx = Fixture::new(config);
        let opts = ValidationOptions {
            overrides: vec![fx.local("users.example", "users.yaml")],
            warn_uncovered: true,
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let report = result.unwrap();

        assert_eq!(report.failed(), 2);
        assert!(text.contains("not found in OpenAPI spec"));
        assert!(text.contains("no spec configured for hostname \"ghost.example\""));
        assert_eq!(report.warnings.len(), 2);
        assert!(text.contains("Result: FAIL (0 passed, 2 failed)"));
    }

    #[test]
    fn test_hostnames_match_regardless_of_case() {
        let config = r#"{
            "endpoints": [
                { "endpoint": "/a", "method": "GET",
                  "backend": [{ "url_pattern": "/orders/{id}", "host": ["https://ORDERS.example"] }] }
            ],
            "x-contract-specs": {
                "Orders.Example": { "openapi_url": "http://127.0.0.1:1/orders.yaml" }
            }
        }"#;
        let fx = Fixture::new(config);
        let opts = ValidationOptions {
            overrides: vec![
                format!("Orders.EXAMPLE={}", fx.path("orders.yaml").display())
                    .parse()
                    .unwrap(),
            ],
            service: Some("orders.example".to_owned()),
            ..fx.options()
        };
        let (result, text) = run_to_string(&opts);
        let report = result.unwrap();

        assert!(report.is_success(), "{text}");
        assert_eq!(report.passed(), 1);
        assert!(text.contains("orders.example: loading from local file"));
    }

    #[test]
    fn test_config_without_contract_specs() {
        let fx = Fixture::new(r#"{"endpoints": []}"#);
        let (result, text) = run_to_string(&fx.options());
        assert!(matches!(
            result.unwrap_err(),
            ContractTestError::Config(ConfigError::NoContractSpecs)
        ));
        assert!(text.is_empty());
    }

    #[test]
    fn test_missing_config() {
        let opts = ValidationOptions {
            config: Path::new("/nonexistent/krakend.json").to_owned(),
            ..ValidationOptions::default()
        };
        let (result, _) = run_to_string(&opts);
        let err = result.unwrap_err();
        assert!(matches!(err, ContractTestError::Config(ConfigError::Read { .. })));
        assert_eq!(err.exit_code(), 2);
    }
}
