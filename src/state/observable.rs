//! Observable state cell with scoped subscriptions.
//!
//! Every holder in a table context (query, pagination, navigation, facets,
//! results) is a `State<T>`. Writers replace the value wholesale; subscribers
//! are notified in registration order. A subscription stays active only as
//! long as its [`Subscription`] guard is alive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked with the new value after each notifying write.
type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// What: Shared interior of a [`State`].
struct Inner<T> {
    /// Current value; `None` until the first write.
    value: Option<T>,
    /// Registered observers with their registration ids, in registration order.
    observers: Vec<(u64, Callback<T>)>,
    /// Id handed to the next registration.
    next_id: u64,
}

/// What: Cloneable handle to a shared, observable value.
///
/// Details:
/// - Clones share the same value and observer list.
/// - Observers run outside the internal lock, so a callback may read the
///   state it was notified from.
pub struct State<T> {
    /// Shared interior.
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: None,
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl<T> std::fmt::Debug for State<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = lock(&self.inner);
        f.debug_struct("State")
            .field("value", &guard.value)
            .field("observers", &guard.observers.len())
            .finish()
    }
}

/// Lock the interior, recovering the data if a previous holder panicked.
fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> State<T>
where
    T: Clone + Send + 'static,
{
    /// What: Create an empty state without a value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Create a state already holding `value`.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        let state = Self::default();
        state.put_quiet(value);
        state
    }

    /// What: Return a clone of the current value, if any.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        lock(&self.inner).value.clone()
    }

    /// What: Whether a value was ever written.
    #[must_use]
    pub fn has_value(&self) -> bool {
        lock(&self.inner).value.is_some()
    }

    /// What: Replace the value and notify every observer in registration order.
    ///
    /// Inputs:
    /// - `value`: New value.
    ///
    /// Details:
    /// - The observer list is snapshotted before callbacks run; observers
    ///   registered from inside a callback see the next write only.
    pub fn put(&self, value: T) {
        let observers: Vec<Callback<T>> = {
            let mut guard = lock(&self.inner);
            guard.value = Some(value.clone());
            guard.observers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in observers {
            cb(&value);
        }
    }

    /// What: Replace the value without notifying observers.
    ///
    /// Details:
    /// - Used when a holder adopts a value from a freshly loaded query; the
    ///   load itself is the reason for the change, so observers must not react.
    pub fn put_quiet(&self, value: T) {
        lock(&self.inner).value = Some(value);
    }

    /// What: Register an observer for subsequent notifying writes.
    ///
    /// Inputs:
    /// - `callback`: Invoked with the new value on every [`State::put`].
    ///
    /// Output:
    /// - Guard that deregisters the observer when dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut guard = lock(&self.inner);
            let id = guard.next_id;
            guard.next_id += 1;
            guard.observers.push((id, Arc::new(callback)));
            id
        };
        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner).observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    /// What: Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }
}

/// What: Registration guard returned by [`State::subscribe`].
///
/// Details:
/// - Dropping the guard deregisters the observer. Collect guards in the
///   owning component so teardown happens when the component goes away.
#[must_use = "dropping a Subscription immediately deregisters the observer"]
pub struct Subscription {
    /// Deregistration action; taken on drop.
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// What: Wrap a deregistration action.
    fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
