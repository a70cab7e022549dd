//! Flattening of gateway endpoints into concrete backend routes.
//!
//! Hostnames are compared case-insensitively. Backend hosts come out of
//! [`Url`] already lower-cased (and IDNA-encoded for non-ASCII names), so every
//! other hostname the user supplies goes through [`canonical_hostname`].
//! Non-ASCII `x-contract-specs` keys must be given in their punycode form.

use url::Url;

use crate::gateway::{Backend, Endpoint, GatewayConfig};

/// Suffix of health check backends, skipped unless explicitly included.
pub const HEALTH_SUFFIX: &str = "/health";

/// Method the gateway assumes when neither endpoint nor backend names one.
pub const DEFAULT_METHOD: &str = "GET";

/// A backend call the gateway makes: method, templated path and target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRoute {
    pub method: String,
    pub path: String,
    pub hostname: String,
}

/// Which backends take part in validation.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub include_health: bool,
    /// Only keep routes targeting this hostname.
    pub service: Option<String>,
}

impl RouteFilter {
    /// Whether specs for `hostname` need loading at all.
    #[must_use]
    pub fn wants_hostname(&self, hostname: &str) -> bool {
        self.service.as_deref().is_none_or(|svc| svc == hostname)
    }
}

/// Routes in extraction order plus the number of skipped health routes.
#[derive(Debug, Clone, Default)]
pub struct ExtractedRoutes {
    pub routes: Vec<BackendRoute>,
    pub health_skipped: usize,
}

/// Hostname as it is compared against backend hosts.
#[must_use]
pub fn canonical_hostname(hostname: &str) -> String {
    hostname.to_ascii_lowercase()
}

/// Network hostname of a backend host entry, empty if it has none.
#[must_use]
pub fn extract_hostname(host: &str) -> String {
    Url::parse(host)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_owned())
        })
        .unwrap_or_default()
}

fn resolve_method(endpoint: &Endpoint, backend: &Backend) -> String {
    let method = backend
        .method
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(&endpoint.method);
    if method.is_empty() {
        DEFAULT_METHOD.to_owned()
    } else {
        method.to_ascii_uppercase()
    }
}

/// Flatten every endpoint/backend pair of `cfg` that passes `filter`.
///
/// The health check runs before the service filter, so skipped health routes
/// are counted for every hostname.
#[must_use]
pub fn extract_routes(cfg: &GatewayConfig, filter: &RouteFilter) -> ExtractedRoutes {
    let mut extracted = ExtractedRoutes::default();

    for endpoint in &cfg.endpoints {
        for backend in &endpoint.backend {
            if !filter.include_health && backend.url_pattern.ends_with(HEALTH_SUFFIX) {
                extracted.health_skipped += 1;
                continue;
            }

            let hostname = backend
                .host
                .first()
                .map(|h| extract_hostname(h))
                .unwrap_or_default();

            if !filter.wants_hostname(&hostname) {
                continue;
            }

            extracted.routes.push(BackendRoute {
                method: resolve_method(endpoint, backend),
                path: backend.url_pattern.clone(),
                hostname,
            });
        }
    }

    extracted
}
