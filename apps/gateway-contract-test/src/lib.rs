//! Gateway contract test
//!
//! Checks that every backend route declared in a `KrakenD` gateway
//! configuration is documented by the OpenAPI spec of the upstream service it
//! targets, and optionally reports spec paths no gateway route exercises.
//!
//! The pieces are usable on their own: [`normalize`] for path canonicalization,
//! [`openapi`] and [`gateway`] for loading, [`routes`] for route extraction and
//! [`validator`] for the cross-reference. [`runner::run`] wires them together
//! the way the command-line tool does.

pub mod error;
pub mod gateway;
pub mod normalize;
pub mod openapi;
pub mod options;
pub mod report;
pub mod routes;
pub mod runner;
pub mod validator;

pub use error::{ConfigError, ContractTestError, SpecError};
pub use options::{OverrideSpec, ValidationOptions};
pub use runner::run;
pub use validator::ValidationReport;
