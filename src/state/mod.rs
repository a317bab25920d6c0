//! Shared state of one table view.
//!
//! The data model lives in `query` and `navigation`; `observable` provides the
//! `State<T>` cell every holder is built on. Public items are re-exported so
//! callers can use `crate::state::*`.

pub mod navigation;
pub mod observable;
pub mod query;

pub use navigation::NavigationParams;
pub use observable::{State, Subscription};
pub use query::{
    DEFAULT_PER_PAGE, Filter, Pagination, Query, QueryProps, QueryResults, SortCriterion,
    SortDirection, TimelineSettings, ZoomLevel, decode_query_props, encode_query_props,
};
