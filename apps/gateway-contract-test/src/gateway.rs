//! `KrakenD` gateway configuration (partial).
//!
//! Only endpoints, their backends and the `x-contract-specs` extension are
//! read; every other key in the file is ignored.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::routes::canonical_hostname;

/// Gateway definition with its contract spec declarations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    /// Hostname to spec reference, in declaration order. Keys are
    /// case-folded on load.
    #[serde(rename = "x-contract-specs", default)]
    pub contract_specs: IndexMap<String, ContractSpec>,
}

/// A public gateway route fanning out to one or more backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "endpoint", default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub backend: Vec<Backend>,
}

/// One upstream target of an endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub url_pattern: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub host: Vec<String>,
}

/// Reference to the OpenAPI document of one upstream hostname.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractSpec {
    #[serde(default)]
    pub openapi_url: String,
}

impl GatewayConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::NoContractSpecs`] when nothing can be contract-tested.
    pub fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let mut cfg: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        cfg.contract_specs = cfg
            .contract_specs
            .into_iter()
            .map(|(hostname, spec)| (canonical_hostname(&hostname), spec))
            .collect();

        if cfg.contract_specs.is_empty() {
            return Err(ConfigError::NoContractSpecs);
        }
        Ok(cfg)
    }

    /// Backend count across all endpoints, before any filtering.
    #[must_use]
    pub fn backend_count(&self) -> usize {
        self.endpoints.iter().map(|ep| ep.backend.len()).sum()
    }
}

/// Read and parse the gateway configuration file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable, is not valid JSON or
/// declares no contract specs.
pub fn load_gateway_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let cfg = GatewayConfig::from_json(path, &content)?;
    tracing::debug!(
        path = %path.display(),
        endpoints = cfg.endpoints.len(),
        backends = cfg.backend_count(),
        contract_specs = cfg.contract_specs.len(),
        "loaded gateway config"
    );
    Ok(cfg)
}
