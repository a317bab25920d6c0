//! Pagination holder.
//!
//! Pagination is not encoded in the query itself, but it is part of the
//! fingerprint, so it gets a holder of its own with a dedicated observer in
//! the controller.

use crate::error::FacetError;
use crate::state::{Pagination, State, Subscription};

/// What: Holder for the current page and page size.
#[derive(Clone, Debug)]
pub struct PaginationState {
    /// Current paging.
    state: State<Pagination>,
    /// Page size used while nothing was loaded yet.
    default_per_page: u32,
}

impl PaginationState {
    /// What: Create a holder without a value.
    ///
    /// Inputs:
    /// - `default_per_page`: Page size reported by [`Self::current`] before the
    ///   first value arrives; clamped to at least 1.
    #[must_use]
    pub fn new(default_per_page: u32) -> Self {
        Self {
            state: State::new(),
            default_per_page: default_per_page.max(1),
        }
    }

    /// What: Current paging, falling back to page one with the default size.
    #[must_use]
    pub fn current(&self) -> Pagination {
        self.state.value().unwrap_or(Pagination {
            page: 1,
            per_page: self.default_per_page,
        })
    }

    /// What: Replace the paging and notify observers.
    ///
    /// # Errors
    /// - `FacetError::InvalidPagination` when `page` or `per_page` is zero.
    pub fn set(&self, pagination: Pagination) -> Result<(), FacetError> {
        if pagination.page == 0 {
            return Err(invalid("page must be at least 1"));
        }
        if pagination.per_page == 0 {
            return Err(invalid("page size must be at least 1"));
        }
        tracing::debug!(
            page = pagination.page,
            per_page = pagination.per_page,
            "[Facet] pagination set"
        );
        self.state.put(pagination);
        Ok(())
    }

    /// What: Jump to `page`, keeping the page size.
    ///
    /// # Errors
    /// - See [`Self::set`].
    pub fn set_page(&self, page: u32) -> Result<(), FacetError> {
        let current = self.current();
        self.set(Pagination {
            page,
            per_page: current.per_page,
        })
    }

    /// What: Change the page size; the page resets to one.
    ///
    /// # Errors
    /// - See [`Self::set`].
    pub fn set_per_page(&self, per_page: u32) -> Result<(), FacetError> {
        self.set(Pagination { page: 1, per_page })
    }

    /// What: Adopt the paging of a loaded result without notifying.
    pub fn initialize(&self, pagination: Pagination) {
        self.state.put_quiet(pagination);
    }

    /// What: Register `callback` for every notifying paging change.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Pagination) + Send + Sync + 'static,
    {
        self.state.subscribe(callback)
    }
}

/// Build the rejection error for paging values.
fn invalid(reason: &str) -> FacetError {
    FacetError::InvalidPagination(reason.to_string())
}
