//! Navigation changes: external navigation versus echoes of our own writes.

use tablesync::facets::Filters;
use tablesync::state::{Filter, NavigationParams, Pagination, QueryProps, encode_query_props};

use crate::common::{BUGS, FEATURES, Harness, features_props};

#[tokio::test(start_paused = true)]
/// What: Navigating to another query with props loads it exactly once.
///
/// Inputs:
/// - View on `Bugs`; navigation to `Features` with sums enabled, delivered
///   twice.
///
/// Output:
/// - One extra request resolving the navigation; title and fingerprint
///   follow the new query.
async fn external_navigation_loads_once() {
    let mut h = Harness::mounted_on_bugs().await;
    let props = QueryProps {
        sums: true,
        ..features_props()
    };
    let target = NavigationParams {
        query_id: Some(FEATURES),
        query_props: Some(encode_query_props(&props, &Pagination::default())),
    };

    h.context.navigate(target.clone());
    h.settle().await;
    h.context.navigate(target.clone());
    h.settle().await;

    assert_eq!(h.from_params_requests().len(), 2);
    assert_eq!(h.from_params_requests().last(), Some(&target));
    let query = h.query();
    assert_eq!(query.id, Some(FEATURES));
    assert_eq!(query.props, props);
    assert_eq!(h.controller.view().selected_title, "Features");
    let fingerprint = h.context.checksum.current().expect("initialized");
    assert_eq!(fingerprint.query_id, Some(FEATURES));
    assert_eq!(fingerprint.props, target.query_props);
    assert_eq!(
        h.context.facets.group_by.value().map(|g| g.0),
        Some(Some("type".into()))
    );
}

#[tokio::test(start_paused = true)]
/// What: The navigation write caused by a facet change does not load again.
async fn own_navigation_write_is_ignored() {
    let mut h = Harness::mounted_on_bugs().await;

    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("status", "!*", &[])]))
        .expect("valid filter");
    h.settle().await;

    assert!(h.context.navigation_params().query_props.is_some());
    assert_eq!(h.from_params_requests().len(), 1);
    assert_eq!(h.backend.request_count(), 2);
}

#[tokio::test(start_paused = true)]
/// What: Going back to the saved query (no props) after a change reloads it
/// as saved.
///
/// Inputs:
/// - Filter change on `Bugs` (published), then navigation to `Bugs` without
///   props.
///
/// Output:
/// - The saved props are back, including in the facet holders.
async fn navigating_back_to_saved_query_reloads_it() {
    let mut h = Harness::mounted_on_bugs().await;
    h.context
        .facets
        .filters
        .set(Filters(vec![Filter::new("status", "=", &["open"])]))
        .expect("valid filter");
    h.settle().await;

    h.context.navigate(NavigationParams::for_query(BUGS));
    h.settle().await;

    assert_eq!(h.from_params_requests().len(), 2);
    assert!(h.query().props.filters.is_empty());
    assert_eq!(
        h.context.facets.filters.value().map(|f| f.0),
        Some(Vec::new())
    );
}

#[tokio::test(start_paused = true)]
/// What: Navigating to what is already displayed does nothing.
async fn navigation_to_current_query_is_ignored() {
    let mut h = Harness::mounted_on_bugs().await;
    let fingerprint = h.context.checksum.current().expect("initialized");

    h.context.navigate(NavigationParams {
        query_id: fingerprint.query_id,
        query_props: fingerprint.props,
    });
    h.settle().await;

    assert_eq!(h.backend.request_count(), 1);
}
