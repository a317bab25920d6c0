//! Library entry for tablesync exposing the table query synchronization engine.
//!
//! A table view is described by a [`context::TableContext`] (facet holders,
//! query state store, paging, navigation, checksum and loading indicator) and
//! driven by a [`controller::ListController`] that keeps them consistent with
//! each other, with the navigation parameters and with the loaded results.

pub mod args;
pub mod auth;
pub mod checksum;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod facets;
pub mod indicator;
pub mod loader;
pub mod refresh;
pub mod scenario;
pub mod state;
