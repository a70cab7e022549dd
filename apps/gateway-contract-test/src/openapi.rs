//! OpenAPI document loading.
//!
//! Only the parts needed for route coverage are modelled: `servers[0].url`
//! for the base path and the `paths` object for the documented operations.
//! Everything else in the document is ignored.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::SpecError;
use crate::normalize::{OperationKey, normalize_path};

/// Method keys recognised under a path item. Anything else (`parameters`,
/// `summary`, `x-*` extensions) is skipped.
pub const HTTP_METHODS: &[&str] = &[
    "get", "post", "put", "patch", "delete", "head", "options", "trace",
];

/// The subset of an OpenAPI document this tool reads.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub servers: Option<Vec<Server>>,
    #[serde(default)]
    pub paths: Option<BTreeMap<String, Option<PathItem>>>,
}

/// Keys of one path item. Operation bodies are skipped unparsed, so their
/// contents (extensions, odd YAML keys) never fail the document.
pub type PathItem = BTreeMap<String, IgnoredAny>;

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
}

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    Remote(String),
    Local(PathBuf),
}

impl SpecSource {
    /// Human-readable location, used in progress output.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

/// Operations documented by one spec, relative to the provider's base path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentedSpec {
    /// Path prefix taken from `servers[0].url`, without trailing slash.
    pub base_path: String,
    /// `METHOD /base/path/{_}` keys for every recognised operation.
    pub operations: BTreeSet<OperationKey>,
    /// Every normalized full path, regardless of method.
    pub paths: BTreeSet<String>,
}

impl DocumentedSpec {
    /// Flatten a parsed document into operation keys and paths.
    #[must_use]
    pub fn from_document(doc: &OpenApiDocument) -> Self {
        let base_path = doc
            .servers
            .as_deref()
            .and_then(<[Server]>::first)
            .map(|server| base_path(&server.url))
            .unwrap_or_default();

        let mut operations = BTreeSet::new();
        let mut paths = BTreeSet::new();

        for (template, item) in doc.paths.iter().flatten() {
            let full_path = format!("{base_path}{template}");
            paths.insert(normalize_path(&full_path));

            // A null path item documents the path but no operation.
            let Some(methods) = item else {
                continue;
            };
            for method in methods.keys() {
                let lower = method.to_ascii_lowercase();
                if HTTP_METHODS.contains(&lower.as_str()) {
                    operations.insert(OperationKey::new(method, &full_path));
                }
            }
        }

        Self {
            base_path,
            operations,
            paths,
        }
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn documents(&self, key: &OperationKey) -> bool {
        self.operations.contains(key)
    }
}

/// Base path derived from a server URL.
///
/// Absolute URLs contribute their path component, anything else is taken as
/// the path itself. Trailing slashes are dropped so the result can be
/// prefixed to a path template directly.
#[must_use]
pub fn base_path(server_url: &str) -> String {
    let path = match server_url.split_once("://") {
        Some((_scheme, rest)) => {
            // Server variables (`https://{host}/v1`) are not valid URLs, so the
            // authority is cut off textually instead of through `url::Url`.
            let after_authority = rest.find('/').map_or("", |idx| &rest[idx..]);
            after_authority
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
        }
        None => server_url,
    };
    path.trim_end_matches('/').to_owned()
}

/// Parse document bytes. JSON documents are parsed with `serde_json`,
/// everything else as YAML.
///
/// # Errors
///
/// Returns [`SpecError::Parse`] if the bytes are not UTF-8 or do not form an
/// OpenAPI-shaped document.
pub fn parse_document(bytes: &[u8]) -> Result<OpenApiDocument, SpecError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SpecError::Parse(format!("document is not valid UTF-8: {e}")))?;

    if text.trim_start().starts_with('{') {
        serde_json::from_str(text).map_err(|e| SpecError::Parse(format!("JSON: {e}")))
    } else {
        serde_saphyr::from_str(text).map_err(|e| SpecError::Parse(format!("YAML: {e}")))
    }
}

/// Load and flatten the document behind `source`.
///
/// # Errors
///
/// Returns a [`SpecError`] if the document cannot be fetched, read or parsed.
pub fn load_spec(source: &SpecSource) -> Result<DocumentedSpec, SpecError> {
    let bytes = match source {
        SpecSource::Remote(url) => download(url)?,
        SpecSource::Local(path) => read_local(path)?,
    };
    let doc = parse_document(&bytes)?;
    let spec = DocumentedSpec::from_document(&doc);
    tracing::debug!(
        source = %source.location(),
        base_path = %spec.base_path,
        operations = spec.operation_count(),
        "parsed OpenAPI document"
    );
    Ok(spec)
}

fn download(url: &str) -> Result<Vec<u8>, SpecError> {
    tracing::debug!(%url, "downloading OpenAPI document");
    // ureq::call() returns Err(ureq::Error::Status(...)) for 4xx/5xx responses
    let resp = match ureq::get(url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(status, _)) => {
            return Err(SpecError::HttpStatus {
                status,
                url: url.to_owned(),
            });
        }
        Err(e) => return Err(SpecError::Download(e.to_string())),
    };

    if resp.status() != 200 {
        return Err(SpecError::HttpStatus {
            status: resp.status(),
            url: url.to_owned(),
        });
    }

    let mut bytes = Vec::new();
    resp.into_reader()
        .read_to_end(&mut bytes)
        .map_err(SpecError::ReadBody)?;
    Ok(bytes)
}

fn read_local(path: &Path) -> Result<Vec<u8>, SpecError> {
    tracing::debug!(path = %path.display(), "reading OpenAPI document from disk");
    fs::read(path).map_err(|source| SpecError::ReadFile {
        path: path.to_owned(),
        source,
    })
}
