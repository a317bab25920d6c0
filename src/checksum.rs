//! Query fingerprint bookkeeping.
//!
//! The fingerprint of a query is its id plus the canonical encoding of its
//! props and the current paging. Comparing fingerprints replaces deep
//! comparison of queries, and doubles as the way to tell a navigation change
//! caused by the user (back/forward, edited location) from the echo of our own
//! navigation writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::state::{NavigationParams, Pagination, Query, State, encode_query_props};

/// What: Identity plus encoded props of a query/paging pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    /// Query id, absent for the default query.
    pub query_id: Option<u64>,
    /// Encoded props including paging; absent when the fingerprint was taken
    /// from navigation parameters that carried no props.
    pub props: Option<String>,
}

impl Fingerprint {
    /// What: Fingerprint of a query at the given paging.
    #[must_use]
    pub fn of(query: &Query, pagination: &Pagination) -> Self {
        Self {
            query_id: query.id,
            props: Some(encode_query_props(&query.props, pagination)),
        }
    }
}

/// What: Mutable interior of the service.
#[derive(Debug, Default)]
struct Inner {
    /// Stored fingerprint; `None` while uninitialized.
    current: Option<Fingerprint>,
    /// Whether the stored props were written to navigation parameters.
    published: bool,
}

/// What: Cloneable handle to the fingerprint of one table view.
///
/// Details:
/// - Sole writer of the fingerprint.
/// - `update` and `update_if_different` publish the fingerprint as navigation
///   parameters so the location can be bookmarked; the resulting navigation
///   change is ignored by [`ChecksumService::execute_if_outdated`].
#[derive(Clone, Debug)]
pub struct ChecksumService {
    /// Shared interior.
    inner: Arc<Mutex<Inner>>,
    /// Navigation parameters the fingerprint is published to.
    navigation: State<NavigationParams>,
}

impl ChecksumService {
    /// What: Create an uninitialized service publishing to `navigation`.
    #[must_use]
    pub fn new(navigation: State<NavigationParams>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            navigation,
        }
    }

    /// Lock the interior, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// What: Whether no fingerprint was stored since creation or the last clear.
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.lock().current.is_none()
    }

    /// What: Stored fingerprint, if any.
    #[must_use]
    pub fn current(&self) -> Option<Fingerprint> {
        self.lock().current.clone()
    }

    /// What: Store the fingerprint of `query` at `pagination` without publishing.
    ///
    /// Details:
    /// - Used when a query finished loading: the location already describes
    ///   what was requested.
    pub fn set_to_query(&self, query: &Query, pagination: &Pagination) {
        let fingerprint = Fingerprint::of(query, pagination);
        tracing::debug!(query_id = ?fingerprint.query_id, "[Checksum] set to loaded query");
        self.lock().current = Some(fingerprint);
    }

    /// What: Whether the stored fingerprint differs from the one of the pair.
    ///
    /// Output:
    /// - `true` when nothing is stored or the fingerprints differ.
    #[must_use]
    pub fn is_query_outdated(&self, query: &Query, pagination: &Pagination) -> bool {
        self.lock().current.as_ref() != Some(&Fingerprint::of(query, pagination))
    }

    /// What: Store and publish the fingerprint of the pair.
    pub fn update(&self, query: &Query, pagination: &Pagination) {
        let fingerprint = Fingerprint::of(query, pagination);
        {
            let mut inner = self.lock();
            inner.current = Some(fingerprint.clone());
            inner.published = true;
        }
        tracing::debug!(query_id = ?fingerprint.query_id, "[Checksum] updated");
        self.publish(fingerprint);
    }

    /// What: [`Self::update`] only when the pair is outdated.
    ///
    /// Output:
    /// - `true` when the stored fingerprint changed.
    pub fn update_if_different(&self, query: &Query, pagination: &Pagination) -> bool {
        if self.is_query_outdated(query, pagination) {
            self.update(query, pagination);
            true
        } else {
            false
        }
    }

    /// What: Forget the stored fingerprint.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.current = None;
        inner.published = false;
        tracing::debug!("[Checksum] cleared");
    }

    /// What: Run `load` when a navigation target differs from the stored fingerprint.
    ///
    /// Inputs:
    /// - `target_id`: Query id from navigation.
    /// - `target_props`: Encoded props from navigation, if present.
    /// - `load`: Invoked at most once, after the internal lock is released.
    ///
    /// Output:
    /// - `true` when `load` was invoked.
    ///
    /// Details:
    /// - Uninitialized: not outdated; the startup path performs the first load.
    /// - Different id: outdated.
    /// - Same id with different props: outdated.
    /// - Same id without props while our props were published: outdated (the
    ///   user went back to the query as saved).
    /// - When outdated the target is stored before `load` runs.
    pub fn execute_if_outdated<F>(
        &self,
        target_id: Option<u64>,
        target_props: Option<&str>,
        load: F,
    ) -> bool
    where
        F: FnOnce(),
    {
        let outdated = {
            let mut inner = self.lock();
            let outdated = match inner.current.as_ref() {
                None => false,
                Some(current) if current.query_id != target_id => true,
                Some(current) => match target_props {
                    Some(props) => current.props.as_deref() != Some(props),
                    None => inner.published,
                },
            };
            if outdated {
                inner.current = Some(Fingerprint {
                    query_id: target_id,
                    props: target_props.map(ToString::to_string),
                });
                inner.published = false;
            }
            outdated
        };
        if outdated {
            tracing::info!(query_id = ?target_id, "[Checksum] navigation target outdated; loading");
            load();
        } else {
            tracing::trace!(query_id = ?target_id, "[Checksum] navigation target already current");
        }
        outdated
    }

    /// Write the fingerprint into the navigation parameters.
    fn publish(&self, fingerprint: Fingerprint) {
        let params = NavigationParams {
            query_id: fingerprint.query_id,
            query_props: fingerprint.props,
        };
        if self.navigation.value().as_ref() != Some(&params) {
            self.navigation.put(params);
        }
    }
}
