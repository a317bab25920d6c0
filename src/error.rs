//! Error types surfaced by the engine.
//!
//! Outdated or uninitialized fingerprints are ordinary control flow and have
//! no representation here; only genuine failures do.

use std::fmt;

use crate::facets::FacetKind;

/// What: Failure of a list load.
///
/// Details:
/// - `Clone` because one failure is observed through a shared completion by
///   every holder of that completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The requested saved query does not exist.
    NotFound {
        /// Requested id.
        query_id: u64,
    },
    /// Encoded properties from navigation could not be decoded.
    InvalidProps(String),
    /// The backend reported a failure.
    Backend(String),
    /// A reload of the current query was requested before any query was loaded.
    MissingQuery,
    /// The controller that should apply the result is gone.
    Detached,
    /// The load task was cancelled or panicked.
    Aborted(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { query_id } => write!(f, "query {query_id} not found"),
            Self::InvalidProps(reason) => write!(f, "invalid query properties: {reason}"),
            Self::Backend(reason) => write!(f, "backend failure: {reason}"),
            Self::MissingQuery => write!(f, "no query loaded yet"),
            Self::Detached => write!(f, "list controller is no longer running"),
            Self::Aborted(reason) => write!(f, "load task aborted: {reason}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// What: A facet value was rejected when it was set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FacetError {
    /// The value violates the facet's constraints.
    Invalid {
        /// Facet that rejected the value.
        facet: FacetKind,
        /// Human readable reason.
        reason: String,
    },
    /// Page number or page size out of range.
    InvalidPagination(String),
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { facet, reason } => {
                write!(f, "invalid {} value: {reason}", facet.as_str())
            }
            Self::InvalidPagination(reason) => write!(f, "invalid pagination: {reason}"),
        }
    }
}

impl std::error::Error for FacetError {}

/// What: Failure while loading or running a scenario file.
#[derive(Debug)]
pub enum ScenarioError {
    /// Reading the scenario file failed.
    Io(std::io::Error),
    /// The scenario is not valid YAML for the expected shape.
    Parse(serde_norway::Error),
    /// A step tried to set an invalid facet value.
    Facet(FacetError),
    /// Encoding the report failed.
    Report(serde_json::Error),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Parse(err) => write!(f, "scenario parse error: {err}"),
            Self::Facet(err) => write!(f, "scenario step rejected: {err}"),
            Self::Report(err) => write!(f, "report encoding failed: {err}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Facet(err) => Some(err),
            Self::Report(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_norway::Error> for ScenarioError {
    fn from(value: serde_norway::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<FacetError> for ScenarioError {
    fn from(value: FacetError) -> Self {
        Self::Facet(value)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(value: serde_json::Error) -> Self {
        Self::Report(value)
    }
}
