//! Refresh coordinator.
//!
//! Every part of the table that wants the result list reloaded sends a request
//! through a [`RefreshHandle`]. A background worker feeds the requests into a
//! [`RefreshMachine`] and debounces them: once no command arrived for the
//! debounce window, the merged request is emitted exactly once.

use tokio::{
    select,
    sync::mpsc,
    task::JoinHandle,
    time::{Duration, sleep},
};

mod machine;

pub use machine::{RefreshCommand, RefreshMachine, RefreshRequest};

/// Default debounce window.
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

/// What: Cloneable sender side of the refresh coordinator.
#[derive(Clone, Debug)]
pub struct RefreshHandle {
    /// Command queue of the worker.
    tx: mpsc::UnboundedSender<RefreshCommand>,
}

impl RefreshHandle {
    /// What: Ask for a refresh.
    ///
    /// Inputs:
    /// - `reason`: Logged with the request.
    /// - `visible`: Show the loading indicator.
    /// - `first_page`: Start over at the first page.
    pub fn request(&self, reason: &str, visible: bool, first_page: bool) {
        let command = RefreshCommand::Request {
            reason: reason.to_string(),
            request: RefreshRequest {
                visible,
                first_page,
            },
        };
        if self.tx.send(command).is_err() {
            tracing::debug!(reason, "[Refresh] worker gone; request dropped");
        }
    }

    /// What: Drop any refresh that was requested but not yet emitted.
    ///
    /// Details:
    /// - A load already in flight is not affected.
    pub fn clear(&self, reason: &str) {
        let command = RefreshCommand::Clear {
            reason: reason.to_string(),
        };
        if self.tx.send(command).is_err() {
            tracing::debug!(reason, "[Refresh] worker gone; clear dropped");
        }
    }
}

/// What: Spawn the debouncing refresh worker.
///
/// Inputs:
/// - `window`: Debounce window; restarts on every received command.
/// - `action_tx`: Receives one merged request per elapsed window.
///
/// Output:
/// - Handle to send commands and the worker's join handle.
///
/// Details:
/// - The worker stops when every [`RefreshHandle`] is dropped or the action
///   receiver is gone; a request pending at that moment is discarded.
pub fn spawn_refresh_worker(
    window: Duration,
    action_tx: mpsc::UnboundedSender<RefreshRequest>,
) -> (RefreshHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<RefreshCommand>();
    let join = tokio::spawn(async move {
        let mut machine = RefreshMachine::default();
        loop {
            let Some(command) = rx.recv().await else {
                break;
            };
            machine.handle(command);
            let mut closed = false;
            while !machine.is_idle() {
                select! {
                    next = rx.recv() => match next {
                        Some(command) => machine.handle(command),
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    () = sleep(window) => {
                        if let Some(request) = machine.take() {
                            tracing::debug!(
                                visible = request.visible,
                                first_page = request.first_page,
                                "[Refresh] emitting"
                            );
                            if action_tx.send(request).is_err() {
                                closed = true;
                            }
                        }
                    }
                }
            }
            if closed {
                break;
            }
        }
        tracing::debug!("[Refresh] worker stopped");
    });
    (RefreshHandle { tx }, join)
}
