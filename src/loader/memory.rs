//! In-memory list backend.
//!
//! Serves saved queries from memory and synthesizes result pages. Latency and
//! failures can be injected per request, which is what the scenario runner and
//! the tests use to reproduce slow or failing loads.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::time::{Duration, sleep};

use super::{ListBackend, LoadRequest};
use crate::error::LoadError;
use crate::state::{
    DEFAULT_PER_PAGE, Pagination, Query, QueryProps, QueryResults, SortCriterion, SortDirection,
    decode_query_props,
};

/// What: Mutable interior of the backend.
#[derive(Debug)]
struct Inner {
    /// Saved queries by id.
    saved: HashMap<u64, Query>,
    /// Query served when navigation carries no id.
    default_query: Query,
    /// Number of rows every query matches.
    total: u64,
    /// Page size used when navigation carries no paging.
    per_page: u32,
    /// Latency applied when no per-request latency is queued.
    latency: Duration,
    /// Per-request latencies, consumed in request order.
    queued_latencies: VecDeque<Duration>,
    /// Failures, consumed in request order before anything else.
    queued_failures: VecDeque<LoadError>,
    /// Every request received so far.
    requests: Vec<LoadRequest>,
}

/// What: Cloneable in-memory [`ListBackend`].
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    /// Shared interior.
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(100)
    }
}

/// What: Props of the query served when nothing else is requested.
#[must_use]
pub fn default_props() -> QueryProps {
    QueryProps {
        columns: ["id", "subject", "type", "status", "assigned_to"]
            .iter()
            .map(ToString::to_string)
            .collect(),
        sort_by: vec![SortCriterion::new("id", SortDirection::Desc)],
        ..QueryProps::default()
    }
}

impl MemoryBackend {
    /// What: Create a backend whose queries all match `total` rows.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                saved: HashMap::new(),
                default_query: Query::unsaved("Work packages", default_props()),
                total,
                per_page: DEFAULT_PER_PAGE,
                latency: Duration::ZERO,
                queued_latencies: VecDeque::new(),
                queued_failures: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Lock the interior, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Register a saved query; it must carry an id.
    pub fn add_query(&self, query: Query) {
        if let Some(id) = query.id {
            self.lock().saved.insert(id, query);
        } else {
            tracing::warn!(name = %query.name, "[Backend] ignoring saved query without id");
        }
    }

    /// What: Page size used when navigation carries no paging.
    pub fn set_per_page(&self, per_page: u32) {
        self.lock().per_page = per_page.max(1);
    }

    /// What: Latency of every request without a queued latency.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// What: Latency of the next request that has none queued yet.
    pub fn push_latency(&self, latency: Duration) {
        self.lock().queued_latencies.push_back(latency);
    }

    /// What: Make the next request fail with `error`.
    pub fn fail_next(&self, error: LoadError) {
        self.lock().queued_failures.push_back(error);
    }

    /// What: Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<LoadRequest> {
        self.lock().requests.clone()
    }

    /// What: Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Resolve a request against the stored queries.
    fn resolve(inner: &Inner, request: LoadRequest) -> Result<QueryResults, LoadError> {
        let (query, pagination) = match request {
            LoadRequest::Query { query, pagination } => (query, pagination),
            LoadRequest::FromParams { params, .. } => {
                let mut query = match params.query_id {
                    Some(id) => inner
                        .saved
                        .get(&id)
                        .cloned()
                        .ok_or(LoadError::NotFound { query_id: id })?,
                    None => inner.default_query.clone(),
                };
                let mut pagination = Pagination {
                    page: 1,
                    per_page: inner.per_page,
                };
                if let Some(raw) = params.query_props.as_deref() {
                    let (props, paging) = decode_query_props(raw)
                        .map_err(|err| LoadError::InvalidProps(err.to_string()))?;
                    query.props = props;
                    if let Some(paging) = paging {
                        pagination = paging;
                    }
                }
                (query, pagination)
            }
        };
        let per_page = u64::from(pagination.per_page.max(1));
        let first = u64::from(pagination.page.max(1) - 1) * per_page + 1;
        let last = (first + per_page - 1).min(inner.total);
        let work_package_ids = (first..=last).collect();
        Ok(QueryResults {
            query,
            pagination,
            total: inner.total,
            work_package_ids,
        })
    }
}

impl ListBackend for MemoryBackend {
    fn fetch(&self, request: LoadRequest) -> BoxFuture<'static, Result<QueryResults, LoadError>> {
        let (outcome, latency) = {
            let mut inner = self.lock();
            inner.requests.push(request.clone());
            let latency = inner
                .queued_latencies
                .pop_front()
                .unwrap_or(inner.latency);
            let outcome = match inner.queued_failures.pop_front() {
                Some(err) => Err(err),
                None => Self::resolve(&inner, request),
            };
            (outcome, latency)
        };
        async move {
            if !latency.is_zero() {
                sleep(latency).await;
            }
            outcome
        }
        .boxed()
    }
}
