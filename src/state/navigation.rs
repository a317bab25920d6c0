//! Navigation parameters (`query_id`, `query_props`) of the list view.

use serde::{Deserialize, Serialize};

/// The navigation parameters the list view reads and writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationParams {
    /// Saved-query id, absent for the default query.
    #[serde(default)]
    pub query_id: Option<u64>,
    /// Encoded query properties; absent means "the query as saved".
    #[serde(default)]
    pub query_props: Option<String>,
}

impl NavigationParams {
    /// What: Build parameters from raw strings as found in a location.
    ///
    /// Inputs:
    /// - `query_id`: Raw id; non-numeric or empty values count as absent.
    /// - `query_props`: Raw encoded properties; empty counts as absent.
    ///
    /// Output:
    /// - Parsed parameters.
    #[must_use]
    pub fn parse(query_id: Option<&str>, query_props: Option<&str>) -> Self {
        let query_id = query_id.and_then(|raw| raw.trim().parse::<u64>().ok());
        let query_props = query_props
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(ToString::to_string);
        Self {
            query_id,
            query_props,
        }
    }

    /// What: Parameters pointing at a saved query without modifications.
    #[must_use]
    pub const fn for_query(query_id: u64) -> Self {
        Self {
            query_id: Some(query_id),
            query_props: None,
        }
    }
}
