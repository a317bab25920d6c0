//! List controller.
//!
//! Wires the facet holders, the query state store, the checksum service, the
//! refresh coordinator and the list loader of one table view. Observer
//! callbacks only forward into channels; all state mutation happens while the
//! controller drains them, one message at a time.

use std::sync::Arc;

use tokio::{
    select,
    task::JoinHandle,
    time::{Duration, Instant, sleep, sleep_until},
};

use crate::auth::Authorisation;
use crate::config::Settings;
use crate::context::TableContext;
use crate::facets::FacetKind;
use crate::loader::{ListBackend, ListLoader};
use crate::refresh::{RefreshHandle, spawn_refresh_worker};
use crate::state::{NavigationParams, Subscription};

mod channels;
mod handlers;

pub use channels::Incoming;
use channels::Channels;

/// Reason logged when the initial load discards pending refreshes.
const IMPENDING_LOAD: &str = "Impending query loading.";
/// Reason logged when the controller goes away.
const SCOPE_DESTROYED: &str = "Table controller scope destroyed.";

/// What: View state exposed to the surrounding UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListView {
    /// Title of the displayed list.
    pub selected_title: String,
    /// Set once the first query arrived.
    pub table_information_loaded: bool,
}

/// What: Orchestrates one table view.
///
/// Details:
/// - Create inside a tokio runtime; the refresh worker and the loads are
///   spawned tasks.
/// - Nothing is observed until [`ListController::mount`].
pub struct ListController {
    /// Shared holders of the view.
    context: TableContext,
    /// Issues loads.
    loader: ListLoader,
    /// Sender side of the refresh coordinator.
    refresh: RefreshHandle,
    /// Refresh worker task.
    refresh_worker: JoinHandle<()>,
    /// Authorization capability.
    auth: Arc<dyn Authorisation>,
    /// Project the list is scoped to.
    project: Option<String>,
    /// Title used while the query has no id.
    default_title: String,
    /// Observer channels.
    channels: Channels,
    /// Live observer registrations.
    subscriptions: Vec<Subscription>,
    /// UI-facing state.
    view: ListView,
    /// Id of the last query seen by the query observer.
    last_query_id: Option<Option<u64>>,
    /// Last distinct navigation parameters seen.
    last_navigation: Option<NavigationParams>,
    /// Highest load sequence applied so far.
    last_applied_sequence: u64,
    /// Whether observers are registered.
    mounted: bool,
}

impl std::fmt::Debug for ListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("view", &self.view)
            .field("mounted", &self.mounted)
            .field("last_applied_sequence", &self.last_applied_sequence)
            .finish_non_exhaustive()
    }
}

impl ListController {
    /// What: Create a controller for `context`.
    ///
    /// Inputs:
    /// - `context`: Shared holders of the view.
    /// - `backend`: Fetch capability used by the loader.
    /// - `auth`: Authorization capability behind [`ListController::allowed`].
    /// - `settings`: Debounce window and default title.
    /// - `project`: Project the list is scoped to, if any.
    #[must_use]
    pub fn new(
        context: TableContext,
        backend: Arc<dyn ListBackend>,
        auth: Arc<dyn Authorisation>,
        settings: &Settings,
        project: Option<String>,
    ) -> Self {
        let (channels, loaded_tx, refresh_tx) = Channels::new();
        let (refresh, refresh_worker) = spawn_refresh_worker(
            Duration::from_millis(settings.refresh_debounce_ms),
            refresh_tx,
        );
        let loader = ListLoader::new(
            backend,
            context.query.clone(),
            context.pagination.clone(),
            loaded_tx,
        );
        Self {
            context,
            loader,
            refresh,
            refresh_worker,
            auth,
            project,
            default_title: settings.default_title.clone(),
            channels,
            subscriptions: Vec::new(),
            view: ListView::default(),
            last_query_id: None,
            last_navigation: None,
            last_applied_sequence: 0,
            mounted: false,
        }
    }

    /// Shared holders of the view.
    #[must_use]
    pub const fn context(&self) -> &TableContext {
        &self.context
    }

    /// UI-facing state.
    #[must_use]
    pub const fn view(&self) -> &ListView {
        &self.view
    }

    /// Sender side of the refresh coordinator.
    #[must_use]
    pub const fn refresh(&self) -> &RefreshHandle {
        &self.refresh
    }

    /// Number of loads issued so far.
    #[must_use]
    pub fn loads_issued(&self) -> u64 {
        self.loader.issued()
    }

    /// What: Whether the current user holds `permission` on `model`.
    #[must_use]
    pub fn allowed(&self, model: &str, permission: &str) -> bool {
        self.auth.can(model, permission)
    }

    /// What: Register observers and start the initial load when needed.
    ///
    /// Details:
    /// - A checksum that is already initialized means the holders were
    ///   hydrated by someone else; no load is issued then.
    /// - Calling it twice is a no-op.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        let loading_required = self.context.checksum.is_uninitialized();
        self.setup_observers();
        self.last_navigation = Some(self.context.navigation_params());
        if let Some(query) = self.context.query.value() {
            self.update_title(&query);
        }
        if loading_required {
            self.refresh.clear(IMPENDING_LOAD);
            self.load_query();
        } else {
            tracing::debug!("[Controller] checksum initialized; skipping initial load");
        }
    }

    /// What: Drop observers and discard pending refreshes.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.refresh.clear(SCOPE_DESTROYED);
        self.subscriptions.clear();
        tracing::debug!("[Controller] unmounted");
    }

    /// Register one forwarding observer per holder.
    fn setup_observers(&mut self) {
        for kind in FacetKind::ALL {
            let tx = self.channels.facet_tx.clone();
            let subscription = self
                .context
                .facets
                .get(kind)
                .on_change(Box::new(move || {
                    let _ = tx.send(kind);
                }));
            self.subscriptions.push(subscription);
        }

        let tx = self.channels.pagination_tx.clone();
        self.subscriptions
            .push(self.context.pagination.on_change(move |pagination| {
                let _ = tx.send(*pagination);
            }));

        let tx = self.channels.query_tx.clone();
        self.subscriptions
            .push(self.context.query.subscribe(move |query| {
                let _ = tx.send(query.clone());
            }));

        let tx = self.channels.navigation_tx.clone();
        self.subscriptions
            .push(self.context.navigation.subscribe(move |params| {
                let _ = tx.send(params.clone());
            }));
    }

    /// What: Load the first page of the query named by the navigation parameters.
    ///
    /// Details:
    /// - Clears the checksum first so the completed load sets it afresh.
    /// - The completion is shown on the loading indicator.
    fn load_query(&self) {
        self.context.checksum.clear();
        let params = self.context.navigation_params();
        tracing::info!(query_id = ?params.query_id, "[Controller] loading query");
        let completion = self
            .loader
            .load_first_page(&params, self.project.as_deref());
        self.context.indicator.assign(completion);
    }

    /// What: Wait for and handle one message.
    ///
    /// Output:
    /// - `false` once every channel is closed.
    pub async fn next_event(&mut self) -> bool {
        match self.channels.recv().await {
            Some(incoming) => {
                self.handle(incoming);
                true
            }
            None => false,
        }
    }

    /// What: Handle messages until none arrived for `quiet`.
    ///
    /// Output:
    /// - Number of messages handled.
    ///
    /// Details:
    /// - Timers of the refresh worker and the backend keep producing messages
    ///   while they run, so `quiet` should exceed the debounce window.
    pub async fn settle(&mut self, quiet: Duration) -> usize {
        let mut handled = 0;
        loop {
            let incoming = select! {
                incoming = self.channels.recv() => incoming,
                () = sleep(quiet) => None,
            };
            let Some(incoming) = incoming else {
                break;
            };
            self.handle(incoming);
            handled += 1;
        }
        handled
    }

    /// What: Handle messages until `duration` has elapsed.
    ///
    /// Output:
    /// - Number of messages handled.
    pub async fn process_for(&mut self, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut handled = 0;
        loop {
            let incoming = select! {
                incoming = self.channels.recv() => incoming,
                () = sleep_until(deadline) => None,
            };
            let Some(incoming) = incoming else {
                break;
            };
            self.handle(incoming);
            handled += 1;
        }
        handled
    }

    /// What: Handle messages until the returned future is dropped.
    ///
    /// Details:
    /// - The controller holds senders of its own channels, so this only
    ///   returns if the channels are torn down underneath it.
    pub async fn run(&mut self) {
        while self.next_event().await {}
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.unmount();
        self.refresh_worker.abort();
    }
}
