//! Shared harness for controller tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tablesync::auth::PermissionSet;
use tablesync::config::Settings;
use tablesync::context::TableContext;
use tablesync::controller::ListController;
use tablesync::loader::{LoadRequest, MemoryBackend};
use tablesync::state::{
    NavigationParams, Pagination, Query, QueryProps, SortCriterion, SortDirection, Subscription,
    decode_query_props,
};
use tokio::time::Duration;

/// Longer than the debounce window; the controller is idle after this much silence.
pub const QUIET: Duration = Duration::from_millis(200);

/// Saved query with columns `id, subject, status`.
pub const BUGS: u64 = 7;
/// Saved query grouped by `type`.
pub const FEATURES: u64 = 9;

/// What: Props of the `Bugs` saved query.
pub fn bugs_props() -> QueryProps {
    QueryProps {
        columns: vec!["id".into(), "subject".into(), "status".into()],
        sort_by: vec![SortCriterion::new("id", SortDirection::Asc)],
        ..QueryProps::default()
    }
}

/// What: Props of the `Features` saved query.
pub fn features_props() -> QueryProps {
    QueryProps {
        columns: vec!["id".into(), "subject".into()],
        group_by: Some("type".into()),
        ..QueryProps::default()
    }
}

/// What: Backend, context and controller of one table view.
pub struct Harness {
    pub backend: MemoryBackend,
    pub context: TableContext,
    pub controller: ListController,
}

impl Harness {
    /// What: Unmounted view opened with `start`, default settings.
    pub fn new(start: NavigationParams) -> Self {
        Self::with_settings(start, &Settings::default())
    }

    /// What: Unmounted view opened with `start`.
    ///
    /// Details:
    /// - 100 rows per query; saved queries `Bugs` (7) and `Features` (9).
    pub fn with_settings(start: NavigationParams, settings: &Settings) -> Self {
        let backend = MemoryBackend::new(100);
        backend.add_query(Query::saved(BUGS, "Bugs", bugs_props()));
        backend.add_query(Query::saved(FEATURES, "Features", features_props()));
        let context = TableContext::new(start, settings.per_page);
        let controller = ListController::new(
            context.clone(),
            Arc::new(backend.clone()),
            Arc::new(PermissionSet::new([("work_packages", "create")])),
            settings,
            Some("demo".into()),
        );
        Self {
            backend,
            context,
            controller,
        }
    }

    /// What: View opened on `Bugs`, mounted and settled after its first load.
    pub async fn mounted_on_bugs() -> Self {
        let mut harness = Self::new(NavigationParams::for_query(BUGS));
        harness.controller.mount();
        harness.settle().await;
        harness
    }

    /// What: Let the controller work until it is idle.
    pub async fn settle(&mut self) -> usize {
        self.controller.settle(QUIET).await
    }

    /// What: Current query of the store.
    pub fn query(&self) -> Query {
        self.context.query.value().expect("a query was loaded")
    }

    /// What: Props and paging currently written to the navigation parameters.
    pub fn navigation_props(&self) -> (QueryProps, Option<Pagination>) {
        let params = self.context.navigation_params();
        let raw = params.query_props.expect("props were published");
        decode_query_props(&raw).expect("published props decode")
    }

    /// What: Requests that resolved navigation parameters.
    pub fn from_params_requests(&self) -> Vec<NavigationParams> {
        self.backend
            .requests()
            .into_iter()
            .filter_map(|request| match request {
                LoadRequest::FromParams { params, .. } => Some(params),
                LoadRequest::Query { .. } => None,
            })
            .collect()
    }

    /// What: Paging of the most recent reload of an already loaded query.
    pub fn last_reload_pagination(&self) -> Option<Pagination> {
        self.backend
            .requests()
            .into_iter()
            .rev()
            .find_map(|request| match request {
                LoadRequest::Query { pagination, .. } => Some(pagination),
                LoadRequest::FromParams { .. } => None,
            })
    }

    /// What: Count replacements of the query state store from now on.
    pub fn count_query_puts(&self) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let subscription = self.context.query.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, subscription)
    }
}
