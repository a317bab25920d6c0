//! Mounting and unmounting.

use tablesync::config::Settings;
use tablesync::facets::Filters;
use tablesync::state::{Filter, NavigationParams, Pagination, Query};

use crate::common::{BUGS, Harness, bugs_props};

#[tokio::test(start_paused = true)]
/// What: Mounting an uninitialized view loads the navigation target once.
///
/// Output:
/// - One request resolving the navigation; title, flags, facets and the
///   unpublished fingerprint reflect the loaded query.
async fn mount_loads_initial_query() {
    let mut h = Harness::new(NavigationParams::for_query(BUGS));
    assert!(!h.controller.view().table_information_loaded);

    h.controller.mount();
    h.settle().await;

    assert_eq!(
        h.from_params_requests(),
        vec![NavigationParams::for_query(BUGS)]
    );
    assert_eq!(h.backend.request_count(), 1);
    assert!(h.controller.view().table_information_loaded);
    assert_eq!(h.controller.view().selected_title, "Bugs");
    assert_eq!(h.query().props, bugs_props());
    assert_eq!(
        h.context.facets.columns.value().map(|c| c.0),
        Some(bugs_props().columns)
    );
    assert!(!h.context.checksum.is_uninitialized());
    assert_eq!(h.context.navigation_params(), NavigationParams::for_query(BUGS));
    assert_eq!(h.context.indicator.wait().await, Some(Ok(())));
    assert!(h.controller.allowed("work_packages", "create"));
    assert!(!h.controller.allowed("work_packages", "delete"));
}

#[tokio::test(start_paused = true)]
/// What: Mounting a view whose checksum is already initialized loads nothing.
async fn mount_skips_load_when_hydrated() {
    let mut h = Harness::new(NavigationParams::for_query(BUGS));
    let query = Query::saved(BUGS, "Bugs", bugs_props());
    h.context.facets.initialize(&query);
    h.context.query.put_quiet(query.clone());
    h.context
        .checksum
        .set_to_query(&query, &Pagination::default());

    h.controller.mount();
    h.settle().await;

    assert_eq!(h.backend.request_count(), 0);
    assert_eq!(h.controller.loads_issued(), 0);
    assert_eq!(h.controller.view().selected_title, "Bugs");
}

#[tokio::test(start_paused = true)]
/// What: A refresh requested before mounting is dropped by the initial load.
async fn mount_clears_pending_refresh() {
    let mut h = Harness::new(NavigationParams::for_query(BUGS));
    h.controller.refresh().request("early", true, false);

    h.controller.mount();
    h.settle().await;

    assert_eq!(h.backend.request_count(), 1);
}

#[tokio::test(start_paused = true)]
/// What: The default query is titled from settings.
async fn default_query_uses_configured_title() {
    let settings = Settings {
        default_title: "All open".into(),
        ..Settings::default()
    };
    let mut h = Harness::with_settings(NavigationParams::default(), &settings);

    h.controller.mount();
    h.settle().await;

    assert_eq!(h.query().id, None);
    assert_eq!(h.controller.view().selected_title, "All open");
}

#[tokio::test(start_paused = true)]
/// What: Unmounting discards a pending refresh and stops observing facets.
///
/// Inputs:
/// - A filter change handled up to its refresh request, then unmount, then
///   another filter change.
///
/// Output:
/// - No reload after the initial load; the second change never reaches the
///   query.
async fn unmount_cancels_refresh_and_observers() {
    let mut h = Harness::mounted_on_bugs().await;
    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("status", "=", &["open"])]))
        .expect("valid filter");
    assert!(h.controller.next_event().await);

    h.controller.unmount();
    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("status", "=", &["closed"])]))
        .expect("valid filter");
    h.settle().await;

    assert_eq!(h.backend.request_count(), 1);
    assert_eq!(
        h.query().props.filters,
        vec![Filter::new("status", "=", &["open"])]
    );
}
