//! Message handlers of the list controller.

use std::collections::BTreeSet;

use super::{Incoming, ListController};
use crate::facets::FacetKind;
use crate::loader::LoadedResults;
use crate::refresh::RefreshRequest;
use crate::state::{NavigationParams, Query};

/// Reason attached to refreshes caused by facet changes.
const QUERY_UPDATED: &str = "Query updated by user";

impl ListController {
    /// What: Route one message to its handler.
    pub(super) fn handle(&mut self, incoming: Incoming) {
        match incoming {
            Incoming::Loaded(loaded) => self.handle_loaded(loaded),
            Incoming::Query(_) => self.handle_query_replaced(),
            Incoming::Navigation(params) => self.handle_navigation(params),
            Incoming::Pagination(_) => self.handle_pagination(),
            Incoming::Facets(kinds) => self.handle_facets(&kinds),
            Incoming::Refresh(request) => self.handle_refresh(request),
        }
    }

    /// What: Write changed facets into the query state store.
    ///
    /// Inputs:
    /// - `kinds`: Facets that notified, applied in their fixed order.
    ///
    /// Details:
    /// - Facets are compared with the store's current query, so a facet that
    ///   was only initialized from a load (or set back to the stored value) is
    ///   skipped.
    /// - Each applied facet publishes the new fingerprint; a reload is
    ///   requested only for reload-significant changes.
    fn handle_facets(&self, kinds: &BTreeSet<FacetKind>) {
        for &kind in kinds {
            let Some(mut query) = self.context.query.value() else {
                tracing::debug!(
                    facet = %kind,
                    "[Controller] facet changed before any query; ignored"
                );
                continue;
            };
            let facet = self.context.facets.get(kind);
            if !facet.has_changed(&query) {
                tracing::trace!(facet = %kind, "[Controller] facet unchanged");
                continue;
            }
            let significant = facet.apply_to_query(&mut query);
            let pagination = self.context.pagination.current();
            self.context.query.put(query.clone());
            self.context.checksum.update_if_different(&query, &pagination);
            tracing::debug!(facet = %kind, significant, "[Controller] facet applied");
            if significant {
                self.refresh
                    .request(QUERY_UPDATED, true, kind.resets_to_first_page());
            }
        }
    }

    /// What: Reload the current page after the paging changed.
    fn handle_pagination(&self) {
        let Some(query) = self.context.query.value() else {
            return;
        };
        let pagination = self.context.pagination.current();
        if !self.context.checksum.is_query_outdated(&query, &pagination) {
            return;
        }
        tracing::debug!(
            page = pagination.page,
            per_page = pagination.per_page,
            "[Controller] paging changed"
        );
        self.context.checksum.update(&query, &pagination);
        self.update_results(RefreshRequest {
            visible: true,
            first_page: false,
        });
    }

    /// What: React to a replaced query.
    ///
    /// Details:
    /// - Reads the store instead of the notified value, so a burst of
    ///   replacements is judged by the newest one.
    fn handle_query_replaced(&mut self) {
        let Some(query) = self.context.query.value() else {
            return;
        };
        if !self.view.table_information_loaded {
            self.view.table_information_loaded = true;
            tracing::info!("[Controller] table information loaded");
        }
        self.update_title(&query);
        if self.last_query_id != Some(query.id) {
            self.last_query_id = Some(query.id);
            self.context
                .checksum
                .set_to_query(&query, &self.context.pagination.current());
        }
    }

    /// What: Load a query the navigation points at, unless it is our own echo.
    fn handle_navigation(&mut self, params: NavigationParams) {
        if self.last_navigation.as_ref() == Some(&params) {
            return;
        }
        self.last_navigation = Some(params.clone());
        let checksum = self.context.checksum.clone();
        checksum.execute_if_outdated(params.query_id, params.query_props.as_deref(), || {
            self.load_query();
        });
    }

    /// What: Perform a refresh emitted by the refresh coordinator.
    fn handle_refresh(&self, request: RefreshRequest) {
        tracing::debug!(
            visible = request.visible,
            first_page = request.first_page,
            "[Controller] refreshing results"
        );
        self.update_results(request);
    }

    /// What: Issue the reload described by `request`.
    ///
    /// Details:
    /// - Only visible reloads reach the loading indicator.
    fn update_results(&self, request: RefreshRequest) {
        let completion = if request.first_page {
            self.loader.load_current_first_page()
        } else {
            self.loader.reload_current_page()
        };
        if request.visible {
            self.context.indicator.assign(completion);
        }
    }

    /// What: Apply a completed load to the shared holders.
    ///
    /// Details:
    /// - Holders are initialized quietly so the load does not feed back into
    ///   the facet observer.
    /// - A result older than one already applied still wins; it is logged.
    /// - A reload whose query was edited in the meantime only contributes its
    ///   rows and paging; the edited query and the facet holders are kept.
    fn handle_loaded(&mut self, loaded: LoadedResults) {
        let LoadedResults {
            sequence,
            requested,
            results,
            ack,
        } = loaded;
        if sequence < self.last_applied_sequence {
            tracing::warn!(
                sequence,
                newest = self.last_applied_sequence,
                "[Controller] applying a result older than the last applied one"
            );
        }
        self.last_applied_sequence = self.last_applied_sequence.max(sequence);

        let pagination = results.pagination;
        let current = self.context.query.value();
        if let (Some(requested), Some(current)) = (requested.as_ref(), current)
            && *requested != current
        {
            tracing::debug!(
                sequence,
                "[Controller] query edited while loading; keeping the edited query"
            );
            self.context.pagination.initialize(pagination);
            self.context.results.put(results);
            self.context
                .checksum
                .update_if_different(&current, &pagination);
            let _ = ack.send(());
            return;
        }

        let query = results.query.clone();
        self.context.facets.initialize(&query);
        self.context.pagination.initialize(pagination);
        tracing::debug!(
            sequence,
            query_id = ?query.id,
            total = results.total,
            "[Controller] results applied"
        );
        self.context.results.put(results);
        self.context.query.put(query.clone());
        if self.context.checksum.is_uninitialized() {
            self.context.checksum.set_to_query(&query, &pagination);
        } else {
            self.context.checksum.update_if_different(&query, &pagination);
        }
        let _ = ack.send(());
    }

    /// What: Derive the title from `query`.
    pub(super) fn update_title(&mut self, query: &Query) {
        let title = if query.id.is_some() {
            query.name.clone()
        } else {
            self.default_title.clone()
        };
        if title != self.view.selected_title {
            tracing::info!(title = %title, "[Controller] title updated");
            self.view.selected_title = title;
        }
    }
}
