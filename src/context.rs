//! Shared holders of one table view.
//!
//! A `TableContext` is created once per table view and passed explicitly to
//! the controller and to whoever mutates facets. Clones share every holder.

use crate::checksum::ChecksumService;
use crate::facets::{PaginationState, TableFacets};
use crate::indicator::LoadingIndicator;
use crate::state::{NavigationParams, Query, QueryResults, State};

/// What: Every shared holder of one table view.
#[derive(Clone, Debug)]
pub struct TableContext {
    /// Canonical current query (the query state store).
    pub query: State<Query>,
    /// Most recently applied result page.
    pub results: State<QueryResults>,
    /// Facet holders.
    pub facets: TableFacets,
    /// Paging holder.
    pub pagination: PaginationState,
    /// Navigation parameters of the view.
    pub navigation: State<NavigationParams>,
    /// Fingerprint of the loaded query.
    pub checksum: ChecksumService,
    /// Sink for visible reloads.
    pub indicator: LoadingIndicator,
}

impl TableContext {
    /// What: Create a context for a view opened with `navigation`.
    ///
    /// Inputs:
    /// - `navigation`: Parameters the view was opened with.
    /// - `per_page`: Page size before the first load reports one.
    #[must_use]
    pub fn new(navigation: NavigationParams, per_page: u32) -> Self {
        let navigation = State::with_value(navigation);
        Self {
            query: State::new(),
            results: State::new(),
            facets: TableFacets::default(),
            pagination: PaginationState::new(per_page),
            checksum: ChecksumService::new(navigation.clone()),
            navigation,
            indicator: LoadingIndicator::new(),
        }
    }

    /// What: Simulate an external navigation (back/forward, edited location).
    pub fn navigate(&self, params: NavigationParams) {
        tracing::debug!(params = ?params, "[Context] navigation");
        self.navigation.put(params);
    }

    /// What: Current navigation parameters.
    #[must_use]
    pub fn navigation_params(&self) -> NavigationParams {
        self.navigation.value().unwrap_or_default()
    }
}
