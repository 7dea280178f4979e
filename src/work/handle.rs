//! Asynchronous completion handles for submitted work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::error::{PilumError, Result};

/// Caller-side handle resolved when a submitted work item completes.
///
/// Submission returns immediately; the handle delivers the item's outcome
/// once its effect has been applied (and, under the per-batch commit
/// policy, committed).
#[derive(Debug)]
pub struct WorkHandle {
    receiver: Receiver<Result<()>>,
    cancelled: Arc<AtomicBool>,
}

impl WorkHandle {
    /// Block until the item's outcome is delivered.
    pub fn wait(&self) -> Result<()> {
        match self.receiver.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(PilumError::internal(
                "work completion channel dropped before resolving",
            )),
        }
    }

    /// Wait up to `timeout` for the outcome; `None` if still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<()>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => None,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Some(Err(
                PilumError::internal("work completion channel dropped before resolving"),
            )),
        }
    }

    /// Non-blocking poll for the outcome; `None` while pending.
    pub fn try_wait(&self) -> Option<Result<()>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(crossbeam_channel::TryRecvError::Empty) => None,
            Err(crossbeam_channel::TryRecvError::Disconnected) => Some(Err(
                PilumError::internal("work completion channel dropped before resolving"),
            )),
        }
    }

    /// Request cancellation. Honored only if the item has not started
    /// executing; an item already merged into an executing batch completes
    /// with the batch's outcome instead.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Executor-side completion endpoint paired with a [`WorkHandle`].
#[derive(Debug)]
pub(crate) struct WorkCompletion {
    sender: Sender<Result<()>>,
    cancelled: Arc<AtomicBool>,
}

impl WorkCompletion {
    /// Whether the paired handle requested cancellation.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Deliver the outcome. The paired handle may already be dropped;
    /// delivery failure is ignored.
    pub(crate) fn complete(self, outcome: Result<()>) {
        let _ = self.sender.send(outcome);
    }
}

/// Create a paired completion endpoint and handle.
pub(crate) fn completion_channel() -> (WorkCompletion, WorkHandle) {
    let (sender, receiver) = bounded(1);
    let cancelled = Arc::new(AtomicBool::new(false));
    (
        WorkCompletion {
            sender,
            cancelled: Arc::clone(&cancelled),
        },
        WorkHandle {
            receiver,
            cancelled,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_then_wait() {
        let (completion, handle) = completion_channel();
        completion.complete(Ok(()));
        assert!(handle.wait().is_ok());
    }

    #[test]
    fn test_try_wait_pending() {
        let (completion, handle) = completion_channel();
        assert!(handle.try_wait().is_none());
        completion.complete(Err(PilumError::cancelled("work w-1")));
        assert!(matches!(
            handle.try_wait(),
            Some(Err(PilumError::OperationCancelled(_)))
        ));
    }

    #[test]
    fn test_wait_timeout_expires() {
        let (_completion, handle) = completion_channel();
        assert!(handle.wait_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_cancel_flag_visible_to_completion() {
        let (completion, handle) = completion_channel();
        assert!(!completion.is_cancelled());
        handle.cancel();
        assert!(completion.is_cancelled());
    }

    #[test]
    fn test_dropped_completion_resolves_internal_error() {
        let (completion, handle) = completion_channel();
        drop(completion);
        assert!(matches!(handle.wait(), Err(PilumError::Internal(_))));
    }
}
