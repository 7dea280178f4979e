//! Orchestrator counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters maintained by the orchestrator and its executors.
#[derive(Debug, Default)]
pub struct OrchestratorStats {
    works_submitted: AtomicU64,
    works_completed: AtomicU64,
    works_failed: AtomicU64,
    works_cancelled: AtomicU64,
    batches_executed: AtomicU64,
    management_executed: AtomicU64,
}

impl OrchestratorStats {
    pub(crate) fn record_submitted(&self) {
        self.works_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.works_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.works_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.works_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self) {
        self.batches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_management(&self) {
        self.management_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> OrchestratorStatsSnapshot {
        OrchestratorStatsSnapshot {
            works_submitted: self.works_submitted.load(Ordering::Relaxed),
            works_completed: self.works_completed.load(Ordering::Relaxed),
            works_failed: self.works_failed.load(Ordering::Relaxed),
            works_cancelled: self.works_cancelled.load(Ordering::Relaxed),
            batches_executed: self.batches_executed.load(Ordering::Relaxed),
            management_executed: self.management_executed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`OrchestratorStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorStatsSnapshot {
    /// Work items accepted by the orchestrator.
    pub works_submitted: u64,

    /// Work items that completed successfully.
    pub works_completed: u64,

    /// Work items that resolved with a failure.
    pub works_failed: u64,

    /// Work items cancelled before execution.
    pub works_cancelled: u64,

    /// Indexing batches applied.
    pub batches_executed: u64,

    /// Management operations executed.
    pub management_executed: u64,
}
