//! Canonical form of path templates.
//!
//! Gateway backends and OpenAPI documents name their path parameters
//! independently (`/users/{id}` vs `/users/{userId}`, sometimes `/users/:id`).
//! Both sides are passed through [`normalize_path`] so that only the shape of
//! the path takes part in the comparison.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Token every path parameter collapses to.
pub const WILDCARD: &str = "{_}";

/// `{name}` placeholders. Never crosses a `/`, so the segment count survives.
#[allow(clippy::unwrap_used)]
static BRACE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^{}/]+\}").unwrap());

/// `:name` placeholders occupying a whole segment.
#[allow(clippy::unwrap_used)]
static COLON_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|/):[^/]+").unwrap());

/// Replace every parameter placeholder in `path` with [`WILDCARD`].
///
/// Literal segments and separators are left untouched and the function is
/// idempotent.
///
/// # Examples
///
/// ```
/// use gateway_contract_test::normalize::normalize_path;
///
/// assert_eq!(normalize_path("/users/{id}/orders"), "/users/{_}/orders");
/// assert_eq!(normalize_path("/users/:id"), "/users/{_}");
/// assert_eq!(normalize_path("/users/{_}"), "/users/{_}");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let braces = BRACE_PARAM.replace_all(path, WILDCARD);
    COLON_PARAM
        .replace_all(&braces, format!("${{1}}{WILDCARD}").as_str())
        .into_owned()
}

/// Equality key between a gateway route and a documented operation:
/// `"METHOD /normalized/path"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationKey(String);

impl OperationKey {
    /// Build a key from a raw method and a raw (not yet normalized) path.
    /// The method is upper-cased so comparison is case-insensitive.
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self(format!(
            "{} {}",
            method.to_ascii_uppercase(),
            normalize_path(path)
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
