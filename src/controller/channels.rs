//! Channels feeding the list controller.

use std::collections::BTreeSet;

use tokio::{select, sync::mpsc};

use crate::facets::FacetKind;
use crate::loader::LoadedResults;
use crate::refresh::RefreshRequest;
use crate::state::{NavigationParams, Pagination, Query};

/// What: One unit of work for the controller.
#[derive(Debug)]
pub enum Incoming {
    /// A load finished and waits to be applied.
    Loaded(LoadedResults),
    /// The query state store was replaced.
    Query(Query),
    /// Navigation parameters changed.
    Navigation(NavigationParams),
    /// Paging changed.
    Pagination(Pagination),
    /// One or more facets changed; iteration order is the application order.
    Facets(BTreeSet<FacetKind>),
    /// The refresh coordinator emitted a refresh.
    Refresh(RefreshRequest),
}

/// What: Senders and receivers owned by the controller.
///
/// Details:
/// - Senders are cloned into observer callbacks; the receivers are drained
///   by [`Channels::recv`] only.
pub struct Channels {
    /// Facet change notifications.
    pub facet_tx: mpsc::UnboundedSender<FacetKind>,
    /// Receiver for facet change notifications.
    facet_rx: mpsc::UnboundedReceiver<FacetKind>,
    /// Paging change notifications.
    pub pagination_tx: mpsc::UnboundedSender<Pagination>,
    /// Receiver for paging change notifications.
    pagination_rx: mpsc::UnboundedReceiver<Pagination>,
    /// Query store replacements.
    pub query_tx: mpsc::UnboundedSender<Query>,
    /// Receiver for query store replacements.
    query_rx: mpsc::UnboundedReceiver<Query>,
    /// Navigation parameter changes.
    pub navigation_tx: mpsc::UnboundedSender<NavigationParams>,
    /// Receiver for navigation parameter changes.
    navigation_rx: mpsc::UnboundedReceiver<NavigationParams>,
    /// Refreshes emitted by the refresh worker.
    refresh_rx: mpsc::UnboundedReceiver<RefreshRequest>,
    /// Completed loads from the loader.
    loaded_rx: mpsc::UnboundedReceiver<LoadedResults>,
}

impl Channels {
    /// What: Create all controller channels.
    ///
    /// Output:
    /// - The channels plus the sender for completed loads (handed to the
    ///   loader) and the sender for refresh emissions (handed to the refresh
    ///   worker).
    pub fn new() -> (
        Self,
        mpsc::UnboundedSender<LoadedResults>,
        mpsc::UnboundedSender<RefreshRequest>,
    ) {
        let (facet_tx, facet_rx) = mpsc::unbounded_channel();
        let (pagination_tx, pagination_rx) = mpsc::unbounded_channel();
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();
        (
            Self {
                facet_tx,
                facet_rx,
                pagination_tx,
                pagination_rx,
                query_tx,
                query_rx,
                navigation_tx,
                navigation_rx,
                refresh_rx,
                loaded_rx,
            },
            loaded_tx,
            refresh_tx,
        )
    }

    /// What: Wait for the next unit of work.
    ///
    /// Output:
    /// - `None` once every channel is closed.
    ///
    /// Details:
    /// - Polled in a fixed priority: completed loads, then the internal echoes
    ///   (query, navigation), then user changes (paging, facets), then
    ///   refresh emissions.
    /// - Facet changes already queued are drained together so one batch is
    ///   applied in the fixed facet order.
    /// - Cancel-safe: nothing is lost when the returned future is dropped.
    pub async fn recv(&mut self) -> Option<Incoming> {
        select! {
            biased;
            Some(loaded) = self.loaded_rx.recv() => Some(Incoming::Loaded(loaded)),
            Some(query) = self.query_rx.recv() => Some(Incoming::Query(query)),
            Some(params) = self.navigation_rx.recv() => Some(Incoming::Navigation(params)),
            Some(pagination) = self.pagination_rx.recv() => Some(Incoming::Pagination(pagination)),
            Some(kind) = self.facet_rx.recv() => {
                let mut kinds = BTreeSet::from([kind]);
                while let Ok(next) = self.facet_rx.try_recv() {
                    kinds.insert(next);
                }
                Some(Incoming::Facets(kinds))
            }
            Some(request) = self.refresh_rx.recv() => Some(Incoming::Refresh(request)),
            else => None,
        }
    }
}
