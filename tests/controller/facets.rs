//! Facet changes flowing into the query, the navigation and reloads.

use std::sync::atomic::Ordering;

use tablesync::facets::{Columns, Filters, Hierarchies, RelationColumns, Sums, Timeline};
use tablesync::state::{Filter, TimelineSettings, ZoomLevel};

use crate::common::Harness;

#[tokio::test(start_paused = true)]
/// What: Changing filters reloads the first page exactly once.
///
/// Inputs:
/// - View on page 3 of `Bugs`; filters set to `status = open`.
///
/// Output:
/// - One extra request, for page 1; query, paging and navigation carry the
///   new filter.
async fn filters_change_reloads_first_page_once() {
    let mut h = Harness::mounted_on_bugs().await;
    h.context.pagination.set_page(3).expect("valid page");
    h.settle().await;
    let before = h.backend.request_count();

    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("status", "=", &["open"])]))
        .expect("valid filter");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    assert_eq!(h.last_reload_pagination().map(|p| p.page), Some(1));
    assert_eq!(h.context.pagination.current().page, 1);
    assert_eq!(
        h.query().props.filters,
        vec![Filter::new("status", "=", &["open"])]
    );
    let (props, paging) = h.navigation_props();
    assert_eq!(props.filters, h.query().props.filters);
    assert_eq!(paging.map(|p| p.page), Some(1));
}

#[tokio::test(start_paused = true)]
/// What: Removing a column updates query and navigation without a reload;
/// adding one reloads the current page.
async fn columns_reload_only_when_added() {
    let mut h = Harness::mounted_on_bugs().await;
    let before = h.backend.request_count();

    h.context
        .facets
        .columns
        .set(Columns(vec!["id".into(), "subject".into()]))
        .expect("valid columns");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before);
    assert_eq!(h.query().props.columns, ["id", "subject"]);
    assert_eq!(h.navigation_props().0.columns, ["id", "subject"]);

    h.context
        .facets
        .columns
        .set(Columns(vec!["id".into(), "subject".into(), "priority".into()]))
        .expect("valid columns");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    assert_eq!(h.last_reload_pagination().map(|p| p.page), Some(1));
}

#[tokio::test(start_paused = true)]
/// What: A facet set to the value the query already holds is ignored.
///
/// Output:
/// - No store replacement, no request, navigation untouched.
async fn unchanged_facet_is_ignored() {
    let mut h = Harness::mounted_on_bugs().await;
    let (puts, _subscription) = h.count_query_puts();
    let navigation = h.context.navigation_params();
    let before = h.backend.request_count();

    h.context
        .facets
        .filters
        .set(Filters(Vec::new()))
        .expect("empty filters are valid");
    h.settle().await;

    assert_eq!(puts.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend.request_count(), before);
    assert_eq!(h.context.navigation_params(), navigation);
}

#[tokio::test(start_paused = true)]
/// What: Enabling sums reloads, disabling them does not; timeline and
/// relation columns never reload.
async fn display_facets_reload_rules() {
    let mut h = Harness::mounted_on_bugs().await;
    let before = h.backend.request_count();

    h.context.facets.sums.set(Sums(true)).expect("valid");
    h.settle().await;
    assert_eq!(h.backend.request_count(), before + 1);
    assert!(h.query().props.sums);

    h.context.facets.sums.set(Sums(false)).expect("valid");
    h.context
        .facets
        .timeline
        .set(Timeline(TimelineSettings {
            visible: true,
            zoom: ZoomLevel::Months,
        }))
        .expect("valid");
    h.context
        .facets
        .relation_columns
        .set(RelationColumns(vec!["relatesTo".into()]))
        .expect("valid");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    let props = h.query().props;
    assert!(!props.sums);
    assert!(props.timeline_visible);
    assert_eq!(props.timeline_zoom, ZoomLevel::Months);
    assert_eq!(props.relation_columns, ["relatesTo"]);
    assert_eq!(h.navigation_props().0, props);
}

#[tokio::test(start_paused = true)]
/// What: Facets changed together end up in one reload that starts over at
/// page one.
///
/// Inputs:
/// - View on page 2; a new column (current page) and a filter (first page)
///   set back to back.
///
/// Output:
/// - One reload, for page 1, with both changes in the query.
async fn batched_facets_coalesce_into_one_reload() {
    let mut h = Harness::mounted_on_bugs().await;
    h.context.pagination.set_page(2).expect("valid page");
    h.settle().await;
    let before = h.backend.request_count();

    h.context
        .facets
        .columns
        .set(Columns(vec![
            "id".into(),
            "subject".into(),
            "status".into(),
            "author".into(),
        ]))
        .expect("valid columns");
    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("type", "=", &["bug"])]))
        .expect("valid filter");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    assert_eq!(h.last_reload_pagination().map(|p| p.page), Some(1));
    let props = h.query().props;
    assert_eq!(props.columns.len(), 4);
    assert_eq!(props.filters.len(), 1);
}

#[tokio::test(start_paused = true)]
/// What: A visible request absorbs a pending background request.
///
/// Output:
/// - One reload, shown on the loading indicator.
async fn visible_request_absorbs_background_request() {
    let mut h = Harness::mounted_on_bugs().await;
    let assignments = h.context.indicator.assignments();
    let before = h.backend.request_count();

    h.controller.refresh().request("background poll", false, false);
    h.context.facets.hierarchies.set(Hierarchies(true)).expect("valid");
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    assert_eq!(h.context.indicator.assignments(), assignments + 1);
}

#[tokio::test(start_paused = true)]
/// What: A background refresh reloads without touching the indicator.
async fn background_refresh_is_silent() {
    let mut h = Harness::mounted_on_bugs().await;
    let assignments = h.context.indicator.assignments();
    let before = h.backend.request_count();

    h.controller.refresh().request("background poll", false, false);
    h.settle().await;

    assert_eq!(h.backend.request_count(), before + 1);
    assert_eq!(h.context.indicator.assignments(), assignments);
}
