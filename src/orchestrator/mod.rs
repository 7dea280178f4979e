//! The serializing write scheduler.
//!
//! [`WriteOrchestrator`] accepts indexing and management work from many
//! concurrent callers and routes each item to a per-index executor thread.
//! That single executor performs every mutating call against the index's
//! writer, which makes the single-writer invariant structural: there is no
//! locking inside the writer, and per-index submission order is execution
//! order. Different logical indexes are fully independent.

mod config;
mod executor;
mod stats;

pub use config::{CommitPolicy, OrchestratorConfig};
pub use stats::{OrchestratorStats, OrchestratorStatsSnapshot};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use ahash::AHashMap;
use crossbeam_channel::{Sender, bounded};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::accessor::IndexAccessor;
use crate::error::{PilumError, Result};
use crate::index::LogicalIndex;
use crate::reporting::EventContext;
use crate::resource::ResourceFactory;
use crate::work::handle::{WorkCompletion, completion_channel};
use crate::work::{IndexingWork, ManagementWork, WorkHandle};
use executor::{IndexExecutor, Submission};

/// Registry entry for one logical index's executor.
#[derive(Debug)]
struct IndexHandle {
    sender: Sender<Submission>,
    closed: Arc<AtomicBool>,
    abort_drain: Arc<AtomicBool>,
    close_reason: Arc<Mutex<Option<String>>>,
    context: EventContext,
    join: Option<JoinHandle<()>>,
}

/// The write orchestrator: one serializing executor per logical index,
/// FIFO ordering, batched indexing work, exclusive management work.
///
/// Executors are spawned lazily on an index's first submission and exit
/// when their index is stopped, when the orchestrator shuts down, or when
/// the orchestrator is dropped.
#[derive(Debug)]
pub struct WriteOrchestrator {
    config: OrchestratorConfig,
    factory: Arc<dyn ResourceFactory>,
    indexes: Mutex<AHashMap<LogicalIndex, IndexHandle>>,
    stopping: AtomicBool,
    stats: Arc<OrchestratorStats>,
}

impl WriteOrchestrator {
    /// Create an orchestrator writing through the given resource factory.
    pub fn new(factory: Arc<dyn ResourceFactory>, config: OrchestratorConfig) -> Self {
        WriteOrchestrator {
            config,
            factory,
            indexes: Mutex::new(AHashMap::new()),
            stopping: AtomicBool::new(false),
            stats: Arc::new(OrchestratorStats::default()),
        }
    }

    /// The orchestrator's configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Snapshot of the orchestrator's counters.
    pub fn stats(&self) -> OrchestratorStatsSnapshot {
        self.stats.snapshot()
    }

    /// Submit indexing work for an index. Returns immediately with a handle
    /// resolved when the work's effect has been applied.
    pub fn submit_indexing(
        &self,
        index: &LogicalIndex,
        work: IndexingWork,
    ) -> Result<WorkHandle> {
        self.submit_with(index, move |completion| {
            Submission::Indexing(work, completion)
        })
    }

    /// Submit management work for an index. The work executes exclusively:
    /// indexing work submitted before it completes first, and indexing work
    /// submitted after it does not start until it finishes.
    pub fn submit_management(
        &self,
        index: &LogicalIndex,
        work: ManagementWork,
    ) -> Result<WorkHandle> {
        self.submit_with(index, move |completion| {
            Submission::Management(work, completion)
        })
    }

    /// Drain and close one index's executor. Remaining queued work executes
    /// in order; the wait is bounded by the configured stop timeout, after
    /// which still-pending work fails with the drain-timeout error.
    pub fn stop_index(&self, index: &LogicalIndex) -> Result<()> {
        let handle = self.indexes.lock().remove(index);
        match handle {
            Some(handle) => self.stop_handle(handle),
            None => Ok(()),
        }
    }

    /// Tear down an index's executor so the next submission starts fresh.
    /// This is the explicit recovery path after an unrecoverable failure
    /// transitioned the index to its closed state.
    pub fn reopen_index(&self, index: &LogicalIndex) -> Result<()> {
        self.stop_index(index)
    }

    /// Stop all executors and refuse further submissions. Returns the first
    /// drain timeout encountered, if any.
    pub fn shutdown(&self) -> Result<()> {
        self.stopping.store(true, Ordering::Release);
        let handles: Vec<IndexHandle> = {
            let mut indexes = self.indexes.lock();
            indexes.drain().map(|(_, handle)| handle).collect()
        };
        let mut first_error = None;
        for handle in handles {
            if let Err(error) = self.stop_handle(handle) {
                warn!(error = %error, "index drain failed during shutdown");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn submit_with<F>(&self, index: &LogicalIndex, build: F) -> Result<WorkHandle>
    where
        F: FnOnce(WorkCompletion) -> Submission,
    {
        if self.stopping.load(Ordering::Acquire) {
            return Err(PilumError::orchestrator_closed(
                "orchestrator is shut down",
                &index.event_context(),
            ));
        }
        let (sender, closed, close_reason, context) = {
            let mut indexes = self.indexes.lock();
            if !indexes.contains_key(index) {
                let handle = self.spawn_executor(index)?;
                indexes.insert(index.clone(), handle);
            }
            let handle = match indexes.get(index) {
                Some(handle) => handle,
                None => return Err(PilumError::internal("index registry entry vanished")),
            };
            (
                handle.sender.clone(),
                Arc::clone(&handle.closed),
                Arc::clone(&handle.close_reason),
                handle.context.clone(),
            )
        };
        // Fail fast once the index is closed, without touching the queue or
        // the resource.
        if closed.load(Ordering::Acquire) {
            let reason = close_reason
                .lock()
                .clone()
                .unwrap_or_else(|| "index writer is closed".to_string());
            return Err(PilumError::orchestrator_closed(reason, &context));
        }
        let (completion, handle) = completion_channel();
        sender
            .send(build(completion))
            .map_err(|_| PilumError::orchestrator_closed("index writer is stopped", &context))?;
        self.stats.record_submitted();
        Ok(handle)
    }

    fn spawn_executor(&self, index: &LogicalIndex) -> Result<IndexHandle> {
        let (sender, receiver) = bounded(self.config.queue_capacity);
        let closed = Arc::new(AtomicBool::new(false));
        let abort_drain = Arc::new(AtomicBool::new(false));
        let close_reason = Arc::new(Mutex::new(None));
        let accessor = IndexAccessor::new(index.clone(), Arc::clone(&self.factory));
        let executor = IndexExecutor::new(
            index.clone(),
            self.config.clone(),
            receiver,
            accessor,
            Arc::clone(&closed),
            Arc::clone(&abort_drain),
            Arc::clone(&close_reason),
            Arc::clone(&self.stats),
        );
        let join = thread::Builder::new()
            .name(format!("index-writer-{index}"))
            .spawn(move || executor.run())
            .map_err(|e| PilumError::internal(format!("failed to spawn index executor: {e}")))?;
        debug!(index = %index, "spawned index executor");
        Ok(IndexHandle {
            sender,
            closed,
            abort_drain,
            close_reason,
            context: index.event_context(),
            join: Some(join),
        })
    }

    fn stop_handle(&self, mut handle: IndexHandle) -> Result<()> {
        let (drained_tx, drained_rx) = bounded(1);
        if handle
            .sender
            .send(Submission::Stop {
                drained: drained_tx,
            })
            .is_err()
        {
            // Executor already exited.
            if let Some(join) = handle.join.take() {
                let _ = join.join();
            }
            return Ok(());
        }
        match drained_rx.recv_timeout(self.config.stop_timeout) {
            Ok(()) => {
                if let Some(join) = handle.join.take() {
                    let _ = join.join();
                }
                Ok(())
            }
            Err(_) => {
                // The executor is stuck in the resource or still draining a
                // deep queue. Flag it to fail remaining work and let its
                // thread exit on its own; joining here could block forever.
                handle.abort_drain.store(true, Ordering::Release);
                warn!(context = %handle.context, "drain timed out, failing pending work");
                Err(PilumError::drain_timeout(
                    self.config.stop_timeout,
                    &handle.context,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryResourceFactory;
    use crate::work::ManagementOp;
    use crate::writer::DocumentChange;
    use crate::document::Document;

    fn orchestrator() -> (WriteOrchestrator, Arc<MemoryResourceFactory>) {
        let factory = Arc::new(MemoryResourceFactory::new());
        let orchestrator =
            WriteOrchestrator::new(factory.clone(), OrchestratorConfig::default());
        (orchestrator, factory)
    }

    #[test]
    fn test_submit_and_wait() {
        let (orchestrator, factory) = orchestrator();
        let index = LogicalIndex::new("products");

        let handle = orchestrator
            .submit_indexing(
                &index,
                IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
            )
            .unwrap();
        handle.wait().unwrap();

        let state = factory.state(&index).unwrap();
        assert!(state.lock().documents.contains_key("doc-1"));

        let stats = orchestrator.stats();
        assert_eq!(stats.works_submitted, 1);
        assert_eq!(stats.works_completed, 1);
        orchestrator.shutdown().unwrap();
    }

    #[test]
    fn test_management_roundtrip() {
        let (orchestrator, factory) = orchestrator();
        let index = LogicalIndex::new("products");

        orchestrator
            .submit_management(&index, ManagementWork::new(ManagementOp::Create))
            .unwrap()
            .wait()
            .unwrap();

        let state = factory.state(&index).unwrap();
        assert!(state.lock().journal.contains(&"manage[create]".to_string()));
        assert_eq!(orchestrator.stats().management_executed, 1);
        orchestrator.shutdown().unwrap();
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let (orchestrator, _) = orchestrator();
        let index = LogicalIndex::new("products");
        orchestrator.shutdown().unwrap();

        let result = orchestrator.submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::delete("doc-1")),
        );
        assert!(matches!(
            result,
            Err(PilumError::OrchestratorClosed { .. })
        ));
    }

    #[test]
    fn test_stop_index_is_idempotent() {
        let (orchestrator, _) = orchestrator();
        let index = LogicalIndex::new("products");

        orchestrator
            .submit_indexing(
                &index,
                IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
            )
            .unwrap()
            .wait()
            .unwrap();

        orchestrator.stop_index(&index).unwrap();
        orchestrator.stop_index(&index).unwrap();
    }
}
