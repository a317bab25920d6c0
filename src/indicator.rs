//! Loading indicator handle.
//!
//! The surrounding UI shows a spinner while the completion assigned here is
//! pending. The engine only assigns; it never inspects how the indicator is
//! drawn.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LoadError;
use crate::loader::Completion;

/// What: Cloneable sink for the completion of visible reloads.
#[derive(Clone, Default)]
pub struct LoadingIndicator {
    /// Completion of the most recent visible reload.
    promise: Arc<Mutex<Option<Completion>>>,
    /// Number of assignments since creation.
    assignments: Arc<AtomicU64>,
}

impl std::fmt::Debug for LoadingIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingIndicator")
            .field("assignments", &self.assignments())
            .finish_non_exhaustive()
    }
}

impl LoadingIndicator {
    /// What: Create an indicator with nothing assigned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Assign the completion of a visible reload.
    pub fn assign(&self, completion: Completion) {
        *self.promise.lock().unwrap_or_else(PoisonError::into_inner) = Some(completion);
        self.assignments.fetch_add(1, Ordering::Relaxed);
    }

    /// What: Most recently assigned completion.
    #[must_use]
    pub fn promise(&self) -> Option<Completion> {
        self.promise
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// What: How many visible reloads were assigned so far.
    #[must_use]
    pub fn assignments(&self) -> u64 {
        self.assignments.load(Ordering::Relaxed)
    }

    /// What: Wait for the most recently assigned completion.
    ///
    /// Output:
    /// - `None` when nothing was assigned, else the load outcome.
    pub async fn wait(&self) -> Option<Result<(), LoadError>> {
        let promise = self.promise()?;
        Some(promise.await)
    }
}
