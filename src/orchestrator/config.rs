//! Orchestrator tuning knobs.

use std::time::Duration;

/// When the executor commits applied changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Commit after every applied batch, before resolving completions.
    /// A resolved handle then means the change is durable.
    OnBatch,

    /// Commit only on explicit flush/force-commit management work.
    /// A resolved handle then means the change is applied, not durable.
    Manual,
}

/// Configuration for the write orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of indexing items coalesced into one batch.
    pub max_batch_size: usize,

    /// Maximum wait after a batch's first item before the batch closes.
    pub max_batch_wait: Duration,

    /// Per-index submission queue capacity. A full queue blocks submitters
    /// until the executor catches up.
    pub queue_capacity: usize,

    /// Commit durability mode.
    pub commit_policy: CommitPolicy,

    /// How long stop/shutdown waits for an index to drain before failing
    /// still-pending work.
    pub stop_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            max_batch_size: 128,
            max_batch_wait: Duration::from_millis(10),
            queue_capacity: 1024,
            commit_policy: CommitPolicy::OnBatch,
            stop_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_batch_size, 128);
        assert_eq!(config.max_batch_wait, Duration::from_millis(10));
        assert_eq!(config.commit_policy, CommitPolicy::OnBatch);
    }
}
