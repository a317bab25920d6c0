//! Paging reloads, load failures and overlapping loads.

use tablesync::error::LoadError;
use tablesync::facets::Filters;
use tablesync::loader::LoadRequest;
use tablesync::state::{Filter, NavigationParams, Pagination};
use tokio::time::Duration;

use crate::common::Harness;

#[tokio::test(start_paused = true)]
/// What: Changing the page reloads the current page visibly and publishes it.
async fn page_change_reloads_current_page() {
    let mut h = Harness::mounted_on_bugs().await;
    let assignments = h.context.indicator.assignments();

    h.context.pagination.set_page(2).expect("valid page");
    h.settle().await;

    assert_eq!(h.backend.request_count(), 2);
    assert_eq!(
        h.last_reload_pagination(),
        Some(Pagination {
            page: 2,
            per_page: 20
        })
    );
    assert_eq!(h.context.indicator.assignments(), assignments + 1);
    assert_eq!(h.navigation_props().1.map(|p| p.page), Some(2));
    let results = h.context.results.value().expect("results applied");
    assert_eq!(results.work_package_ids.first(), Some(&21));
    assert_eq!(h.from_params_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
/// What: Changing the page size starts over at page one.
async fn per_page_change_resets_page() {
    let mut h = Harness::mounted_on_bugs().await;
    h.context.pagination.set_page(3).expect("valid page");
    h.settle().await;

    h.context.pagination.set_per_page(50).expect("valid size");
    h.settle().await;

    assert_eq!(
        h.last_reload_pagination(),
        Some(Pagination {
            page: 1,
            per_page: 50
        })
    );
    assert_eq!(h.context.results.value().map(|r| r.work_package_ids.len()), Some(50));
}

#[tokio::test(start_paused = true)]
/// What: A failed reload surfaces through the indicator and changes nothing else.
///
/// Output:
/// - The indicator resolves to the backend error; the fingerprint keeps the
///   requested page; the displayed results stay on page one.
async fn failed_reload_surfaces_through_indicator() {
    let mut h = Harness::mounted_on_bugs().await;
    h.backend.fail_next(LoadError::Backend("503 Service Unavailable".into()));

    h.context.pagination.set_page(2).expect("valid page");
    h.settle().await;

    assert_eq!(
        h.context.indicator.wait().await,
        Some(Err(LoadError::Backend("503 Service Unavailable".into())))
    );
    let fingerprint = h.context.checksum.current().expect("initialized");
    assert_eq!(fingerprint.props, h.context.navigation_params().query_props);
    let results = h.context.results.value().expect("initial results");
    assert_eq!(results.pagination.page, 1);
    assert_eq!(results.work_package_ids.first(), Some(&1));
}

#[tokio::test(start_paused = true)]
/// What: A failed initial load leaves the view empty and uninitialized.
async fn failed_initial_load_leaves_view_empty() {
    let mut h = Harness::new(NavigationParams::for_query(42));

    h.controller.mount();
    h.settle().await;

    assert_eq!(
        h.context.indicator.wait().await,
        Some(Err(LoadError::NotFound { query_id: 42 }))
    );
    assert!(h.context.query.value().is_none());
    assert!(h.context.checksum.is_uninitialized());
    assert!(!h.controller.view().table_information_loaded);
}

#[tokio::test(start_paused = true)]
/// What: Overlapping loads are applied in completion order.
///
/// Inputs:
/// - A slow reload of page 2 followed by a fast reload of page 3.
///
/// Output:
/// - Page 3 arrives first, page 2 last and stays displayed; the fingerprint
///   and the navigation follow the page that was applied last.
async fn overlapping_loads_apply_in_completion_order() {
    let mut h = Harness::mounted_on_bugs().await;
    h.backend.push_latency(Duration::from_millis(100));
    h.backend.push_latency(Duration::from_millis(10));

    h.context.pagination.set_page(2).expect("valid page");
    h.controller.process_for(Duration::from_millis(1)).await;
    h.context.pagination.set_page(3).expect("valid page");
    h.settle().await;

    assert_eq!(h.backend.request_count(), 3);
    assert_eq!(h.context.pagination.current().page, 2);
    let results = h.context.results.value().expect("results applied");
    assert_eq!(results.work_package_ids.first(), Some(&21));
    assert_eq!(h.navigation_props().1.map(|p| p.page), Some(2));
}

#[tokio::test(start_paused = true)]
/// What: A filter set while a page reload is in flight survives that reload.
///
/// Inputs:
/// - A 40ms reload of page 2; `status = open` set 30ms into it.
///
/// Output:
/// - Holder, query and the follow-up first-page request all carry the filter.
async fn facet_change_during_reload_is_kept() {
    let mut h = Harness::mounted_on_bugs().await;
    h.backend.push_latency(Duration::from_millis(40));
    let open = vec![Filter::new("status", "=", &["open"])];

    h.context.pagination.set_page(2).expect("valid page");
    h.controller.process_for(Duration::from_millis(30)).await;
    h.context
        .facets
        .filters
        .set(Filters(open.clone()))
        .expect("valid filter");
    h.settle().await;

    assert_eq!(h.context.facets.filters.value().map(|f| f.0), Some(open.clone()));
    assert_eq!(h.query().props.filters, open);
    assert_eq!(h.backend.request_count(), 3);
    match h.backend.requests().last() {
        Some(LoadRequest::Query { query, pagination }) => {
            assert_eq!(query.props.filters, open);
            assert_eq!(pagination.page, 1);
        }
        other => panic!("expected a first-page reload, got {other:?}"),
    }
    assert_eq!(h.navigation_props().0.filters, open);
    let results = h.context.results.value().expect("results applied");
    assert_eq!(results.query.props.filters, open);
    assert_eq!(results.pagination.page, 1);
}
