//! Coalescing state machine behind the refresh worker.

use serde::Serialize;

/// What: A refresh the list should perform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefreshRequest {
    /// Show the loading indicator while reloading.
    pub visible: bool,
    /// Reload from the first page instead of the current page.
    pub first_page: bool,
}

impl RefreshRequest {
    /// What: Combine two requests so neither flag is lost.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            visible: self.visible || other.visible,
            first_page: self.first_page || other.first_page,
        }
    }
}

/// What: Commands accepted by the refresh worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshCommand {
    /// Ask for a refresh.
    Request {
        /// Why the refresh is needed, for logs.
        reason: String,
        /// Requested flags.
        request: RefreshRequest,
    },
    /// Drop any pending refresh.
    Clear {
        /// Why, for logs.
        reason: String,
    },
}

/// What: Idle / pending machine that merges bursts of requests.
///
/// Details:
/// - `request` moves to pending, OR-merging with a pending request.
/// - `clear` returns to idle without emitting.
/// - `take` emits the pending request and returns to idle.
#[derive(Debug, Default)]
pub struct RefreshMachine {
    /// Pending request; `None` while idle.
    pending: Option<RefreshRequest>,
}

impl RefreshMachine {
    /// What: Whether no request is pending.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// What: Currently pending request, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<RefreshRequest> {
        self.pending
    }

    /// What: Record a request, merging it with a pending one.
    pub fn request(&mut self, reason: &str, request: RefreshRequest) {
        let merged = self
            .pending
            .map_or(request, |pending| pending.merge(request));
        tracing::debug!(
            reason,
            visible = merged.visible,
            first_page = merged.first_page,
            "[Refresh] request pending"
        );
        self.pending = Some(merged);
    }

    /// What: Drop the pending request.
    ///
    /// Output:
    /// - `true` when a request was pending.
    pub fn clear(&mut self, reason: &str) -> bool {
        let had_pending = self.pending.take().is_some();
        tracing::debug!(reason, had_pending, "[Refresh] cleared");
        had_pending
    }

    /// What: Apply one command.
    pub fn handle(&mut self, command: RefreshCommand) {
        match command {
            RefreshCommand::Request { reason, request } => self.request(&reason, request),
            RefreshCommand::Clear { reason } => {
                self.clear(&reason);
            }
        }
    }

    /// What: Emit the pending request, returning to idle.
    pub const fn take(&mut self) -> Option<RefreshRequest> {
        self.pending.take()
    }
}
