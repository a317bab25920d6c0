//! List loader.
//!
//! Fetches result pages through a [`ListBackend`] and hands each completed
//! page to the list controller, which applies it to the shared state. Every
//! operation returns a [`Completion`] that resolves once the result was
//! applied (or the load failed).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::{mpsc, oneshot};

use crate::error::LoadError;
use crate::facets::PaginationState;
use crate::state::{NavigationParams, Pagination, Query, QueryResults, State};

mod memory;

pub use memory::{MemoryBackend, default_props};

/// Shared completion signal of one load.
pub type Completion = Shared<BoxFuture<'static, Result<(), LoadError>>>;

/// What: What to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    /// Resolve a query from navigation parameters (fresh or initial load).
    FromParams {
        /// Navigation parameters to resolve.
        params: NavigationParams,
        /// Project the list is scoped to, if any.
        project: Option<String>,
    },
    /// Fetch a page of an already resolved query.
    Query {
        /// Query to run.
        query: Query,
        /// Page to fetch.
        pagination: Pagination,
    },
}

/// What: Backend capability that fetches one page of results.
pub trait ListBackend: Send + Sync {
    /// What: Fetch the page described by `request`.
    ///
    /// Output:
    /// - Future resolving to the fetched page or the backend failure.
    fn fetch(&self, request: LoadRequest) -> BoxFuture<'static, Result<QueryResults, LoadError>>;
}

/// What: A fetched page on its way to the controller.
#[derive(Debug)]
pub struct LoadedResults {
    /// Position of the originating request among all requests of this loader.
    pub sequence: u64,
    /// Query the reload was issued for; `None` for loads from navigation.
    pub requested: Option<Query>,
    /// Fetched page.
    pub results: QueryResults,
    /// Signalled by the controller once the page was applied.
    pub ack: oneshot::Sender<()>,
}

/// What: Issues loads and routes their results to the controller.
#[derive(Clone)]
pub struct ListLoader {
    /// Fetch capability.
    backend: Arc<dyn ListBackend>,
    /// Current query, read for reloads.
    query: State<Query>,
    /// Current paging, read for reloads.
    pagination: PaginationState,
    /// Channel to the controller.
    loaded_tx: mpsc::UnboundedSender<LoadedResults>,
    /// Last issued sequence number.
    sequence: Arc<AtomicU64>,
}

impl std::fmt::Debug for ListLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListLoader")
            .field("issued", &self.issued())
            .finish_non_exhaustive()
    }
}

impl ListLoader {
    /// What: Create a loader.
    ///
    /// Inputs:
    /// - `backend`: Fetch capability.
    /// - `query`, `pagination`: Shared holders read when reloading.
    /// - `loaded_tx`: Where completed pages are sent.
    #[must_use]
    pub fn new(
        backend: Arc<dyn ListBackend>,
        query: State<Query>,
        pagination: PaginationState,
        loaded_tx: mpsc::UnboundedSender<LoadedResults>,
    ) -> Self {
        Self {
            backend,
            query,
            pagination,
            loaded_tx,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// What: Number of loads issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// What: Load the first page of the query described by navigation parameters.
    pub fn load_first_page(&self, params: &NavigationParams, project: Option<&str>) -> Completion {
        self.dispatch(LoadRequest::FromParams {
            params: params.clone(),
            project: project.map(ToString::to_string),
        })
    }

    /// What: Load the first page of the current query.
    pub fn load_current_first_page(&self) -> Completion {
        let pagination = self.pagination.current().first_page();
        self.reload_with(pagination)
    }

    /// What: Reload the current page of the current query.
    pub fn reload_current_page(&self) -> Completion {
        self.reload_with(self.pagination.current())
    }

    /// Reload the current query at `pagination`.
    fn reload_with(&self, pagination: Pagination) -> Completion {
        let Some(query) = self.query.value() else {
            tracing::warn!("[Loader] reload requested before any query was loaded");
            return futures::future::ready(Err::<(), _>(LoadError::MissingQuery))
                .boxed()
                .shared();
        };
        self.dispatch(LoadRequest::Query { query, pagination })
    }

    /// What: Start one load in the background.
    ///
    /// Details:
    /// - The backend future is created synchronously, so the request is
    ///   visible to the backend before this returns.
    /// - Results reach the controller in completion order; the sequence number
    ///   lets the controller notice a superseded result.
    fn dispatch(&self, request: LoadRequest) -> Completion {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(sequence, request = ?request, "[Loader] dispatching");
        let requested = match &request {
            LoadRequest::Query { query, .. } => Some(query.clone()),
            LoadRequest::FromParams { .. } => None,
        };
        let fetch = self.backend.fetch(request);
        let loaded_tx = self.loaded_tx.clone();
        let task = tokio::spawn(async move {
            let results = match fetch.await {
                Ok(results) => results,
                Err(err) => {
                    tracing::warn!(sequence, error = %err, "[Loader] load failed");
                    return Err(err);
                }
            };
            let (ack, applied) = oneshot::channel();
            let loaded = LoadedResults {
                sequence,
                requested,
                results,
                ack,
            };
            if loaded_tx.send(loaded).is_err() {
                return Err(LoadError::Detached);
            }
            applied.await.map_err(|_| LoadError::Detached)
        });
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(LoadError::Aborted(join_err.to_string())),
            }
        }
        .boxed()
        .shared()
    }
}
