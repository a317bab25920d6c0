//! Scenario runner.
//!
//! A scenario is a YAML file describing how a table view is opened, which
//! saved queries and permissions exist, and a list of steps a user (or the
//! browser location) performs. The runner replays it against a
//! [`MemoryBackend`] and reports the state the view ends up in.
//!
//! ```yaml
//! project: demo
//! saved_queries:
//!   - id: 7
//!     name: Bugs
//!     props: { columns: [id, subject] }
//! start: { query_id: 7 }
//! steps:
//!   - action: set_filters
//!     filters: [{ name: status, operator: "=", values: ["open"] }]
//!   - action: wait
//!     ms: 50
//! checks:
//!   - { model: work_packages, permission: create }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::auth::PermissionSet;
use crate::checksum::Fingerprint;
use crate::config::Settings;
use crate::context::TableContext;
use crate::controller::ListController;
use crate::error::ScenarioError;
use crate::facets::{
    Columns, Filters, GroupBy, Hierarchies, RelationColumns, SortBy, Sums, Timeline,
};
use crate::loader::MemoryBackend;
use crate::state::{
    Filter, NavigationParams, Pagination, Query, QueryProps, SortCriterion, TimelineSettings,
    ZoomLevel, encode_query_props,
};

/// Rows matched by every query unless the scenario says otherwise.
const DEFAULT_TOTAL: u64 = 100;

/// What: Navigation target in readable form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NavigateTo {
    /// Saved query id.
    pub query_id: Option<u64>,
    /// Props to encode into the navigation; none means "as saved".
    pub props: Option<QueryProps>,
    /// Page encoded together with `props`.
    pub page: Option<u32>,
    /// Page size encoded together with `props`.
    pub per_page: Option<u32>,
}

impl NavigateTo {
    /// What: Encode into navigation parameters.
    ///
    /// Details:
    /// - Paging is only encoded when props are given.
    #[must_use]
    pub fn to_params(&self, default_per_page: u32) -> NavigationParams {
        let query_props = self.props.as_ref().map(|props| {
            let pagination = Pagination {
                page: self.page.unwrap_or(1).max(1),
                per_page: self.per_page.unwrap_or(default_per_page).max(1),
            };
            encode_query_props(props, &pagination)
        });
        NavigationParams {
            query_id: self.query_id,
            query_props,
        }
    }
}

/// What: A saved query known to the backend.
#[derive(Clone, Debug, Deserialize)]
pub struct SavedQuery {
    /// Query id.
    pub id: u64,
    /// Query name.
    pub name: String,
    /// Saved props.
    #[serde(default)]
    pub props: QueryProps,
}

/// What: A `(model, permission)` pair.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Permission {
    /// Model name, e.g. `work_packages`.
    pub model: String,
    /// Permission name, e.g. `create`.
    pub permission: String,
}

/// What: One scenario step.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Replace the filter set.
    SetFilters {
        /// New filters.
        #[serde(default)]
        filters: Vec<Filter>,
    },
    /// Replace the sort order.
    SetSortBy {
        /// New sort criteria.
        #[serde(default)]
        sort_by: Vec<SortCriterion>,
    },
    /// Group by a column, or stop grouping.
    SetGroupBy {
        /// Group-by column.
        #[serde(default)]
        group_by: Option<String>,
    },
    /// Toggle sums.
    SetSums {
        /// Whether sums are shown.
        enabled: bool,
    },
    /// Change the timeline.
    SetTimeline {
        /// Whether the timeline is shown.
        visible: bool,
        /// Zoom level.
        #[serde(default)]
        zoom: ZoomLevel,
    },
    /// Toggle hierarchies.
    SetHierarchies {
        /// Whether hierarchies are shown.
        enabled: bool,
    },
    /// Replace the visible columns.
    SetColumns {
        /// New columns.
        columns: Vec<String>,
    },
    /// Replace the expanded relation columns.
    SetRelationColumns {
        /// New relation columns.
        #[serde(default)]
        columns: Vec<String>,
    },
    /// Go to a page.
    SetPage {
        /// 1-based page.
        page: u32,
    },
    /// Change the page size.
    SetPerPage {
        /// Rows per page.
        per_page: u32,
    },
    /// Change the location externally (back/forward, edited URL).
    Navigate(NavigateTo),
    /// Let time pass while the controller keeps working.
    Wait {
        /// Milliseconds to wait.
        ms: u64,
    },
}

/// What: A complete scenario file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Project the list is scoped to.
    pub project: Option<String>,
    /// Rows matched by every query.
    pub total: Option<u64>,
    /// Latency of every backend request, in milliseconds.
    pub latency_ms: u64,
    /// Saved queries.
    pub saved_queries: Vec<SavedQuery>,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Navigation the view is opened with.
    pub start: NavigateTo,
    /// Steps in order.
    pub steps: Vec<Step>,
    /// Permissions to report on.
    pub checks: Vec<Permission>,
}

/// What: Outcome of one permission check.
#[derive(Clone, Debug, Serialize)]
pub struct PermissionCheck {
    /// Model name.
    pub model: String,
    /// Permission name.
    pub permission: String,
    /// Whether it was granted.
    pub allowed: bool,
}

/// What: State the view ended up in.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Displayed title.
    pub title: String,
    /// Whether any query arrived.
    pub table_information_loaded: bool,
    /// Current query.
    pub query: Option<Query>,
    /// Current paging.
    pub pagination: Pagination,
    /// Stored fingerprint.
    pub fingerprint: Option<Fingerprint>,
    /// Final navigation parameters.
    pub navigation: NavigationParams,
    /// Rows matched by the displayed query.
    pub total: Option<u64>,
    /// Rows of the displayed page.
    pub work_package_ids: Vec<u64>,
    /// Requests the backend received.
    pub backend_requests: usize,
    /// Outcome of the last visible load, if it failed.
    pub last_load_error: Option<String>,
    /// Permission checks.
    pub permissions: Vec<PermissionCheck>,
}

/// What: Parse a scenario from YAML text.
///
/// # Errors
/// - [`ScenarioError::Parse`] when the text is not a valid scenario.
pub fn parse_scenario(content: &str) -> Result<Scenario, ScenarioError> {
    Ok(serde_norway::from_str(content)?)
}

/// What: Read and parse a scenario file.
///
/// # Errors
/// - [`ScenarioError::Io`] or [`ScenarioError::Parse`].
pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let content = std::fs::read_to_string(path)?;
    parse_scenario(&content)
}

/// What: Replay `scenario` and report the resulting state.
///
/// Inputs:
/// - `scenario`: Parsed scenario.
/// - `settings`: Debounce window, default title and page size.
///
/// Output:
/// - The final [`Report`].
///
/// # Errors
/// - [`ScenarioError::Facet`] when a step sets an invalid value.
///
/// Details:
/// - Steps run back to back without letting the controller work in between;
///   use `wait` steps to let debounce windows and loads elapse.
/// - After the last step the controller runs until it is idle.
pub async fn run_scenario(
    scenario: &Scenario,
    settings: &Settings,
) -> Result<Report, ScenarioError> {
    let backend = MemoryBackend::new(scenario.total.unwrap_or(DEFAULT_TOTAL));
    backend.set_per_page(settings.per_page);
    backend.set_latency(Duration::from_millis(scenario.latency_ms));
    for saved in &scenario.saved_queries {
        backend.add_query(Query::saved(saved.id, &saved.name, saved.props.clone()));
    }
    let auth = PermissionSet::new(
        scenario
            .permissions
            .iter()
            .map(|p| (p.model.clone(), p.permission.clone())),
    );

    let context = TableContext::new(scenario.start.to_params(settings.per_page), settings.per_page);
    let mut controller = ListController::new(
        context.clone(),
        Arc::new(backend.clone()),
        Arc::new(auth),
        settings,
        scenario.project.clone(),
    );
    tracing::info!(steps = scenario.steps.len(), "[Scenario] starting");
    controller.mount();

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(index, step = ?step, "[Scenario] step");
        apply_step(&mut controller, &context, step, settings.per_page).await?;
    }

    let quiet = Duration::from_millis(settings.refresh_debounce_ms.saturating_mul(4).max(100))
        + Duration::from_millis(scenario.latency_ms);
    let handled = controller.settle(quiet).await;
    tracing::info!(handled, "[Scenario] settled");

    let last_load_error = match context.indicator.wait().await {
        Some(Err(err)) => Some(err.to_string()),
        _ => None,
    };
    let results = context.results.value();
    let permissions = scenario
        .checks
        .iter()
        .map(|check| PermissionCheck {
            model: check.model.clone(),
            permission: check.permission.clone(),
            allowed: controller.allowed(&check.model, &check.permission),
        })
        .collect();
    Ok(Report {
        title: controller.view().selected_title.clone(),
        table_information_loaded: controller.view().table_information_loaded,
        query: context.query.value(),
        pagination: context.pagination.current(),
        fingerprint: context.checksum.current(),
        navigation: context.navigation_params(),
        total: results.as_ref().map(|r| r.total),
        work_package_ids: results.map(|r| r.work_package_ids).unwrap_or_default(),
        backend_requests: backend.request_count(),
        last_load_error,
        permissions,
    })
}

/// What: Encode a report as JSON.
///
/// Inputs:
/// - `report`: Report to encode.
/// - `compact`: Single line instead of pretty-printed.
///
/// # Errors
/// - [`ScenarioError::Report`] when encoding fails.
pub fn render_report(report: &Report, compact: bool) -> Result<String, ScenarioError> {
    let rendered = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    Ok(rendered)
}

/// Perform one step.
async fn apply_step(
    controller: &mut ListController,
    context: &TableContext,
    step: &Step,
    default_per_page: u32,
) -> Result<(), ScenarioError> {
    let facets = &context.facets;
    match step {
        Step::SetFilters { filters } => facets.filters.set(Filters(filters.clone()))?,
        Step::SetSortBy { sort_by } => facets.sort_by.set(SortBy(sort_by.clone()))?,
        Step::SetGroupBy { group_by } => facets.group_by.set(GroupBy(group_by.clone()))?,
        Step::SetSums { enabled } => facets.sums.set(Sums(*enabled))?,
        Step::SetTimeline { visible, zoom } => facets.timeline.set(Timeline(TimelineSettings {
            visible: *visible,
            zoom: *zoom,
        }))?,
        Step::SetHierarchies { enabled } => facets.hierarchies.set(Hierarchies(*enabled))?,
        Step::SetColumns { columns } => facets.columns.set(Columns(columns.clone()))?,
        Step::SetRelationColumns { columns } => facets
            .relation_columns
            .set(RelationColumns(columns.clone()))?,
        Step::SetPage { page } => context.pagination.set_page(*page)?,
        Step::SetPerPage { per_page } => context.pagination.set_per_page(*per_page)?,
        Step::Navigate(target) => context.navigate(target.to_params(default_per_page)),
        Step::Wait { ms } => {
            controller.process_for(Duration::from_millis(*ms)).await;
        }
    }
    Ok(())
}
