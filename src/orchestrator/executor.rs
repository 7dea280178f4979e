//! Per-index executor: the single thread serializing all mutating access.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::accessor::IndexAccessor;
use crate::error::PilumError;
use crate::index::LogicalIndex;
use crate::orchestrator::config::{CommitPolicy, OrchestratorConfig};
use crate::orchestrator::stats::OrchestratorStats;
use crate::reporting::EventContext;
use crate::work::context::{IndexingWorkContext, ManagementWorkContext};
use crate::work::handle::WorkCompletion;
use crate::work::{IndexingWork, ManagementWork};
use crate::writer::ChangeSet;

/// A message on an index's submission queue.
#[derive(Debug)]
pub(crate) enum Submission {
    Indexing(IndexingWork, WorkCompletion),
    Management(ManagementWork, WorkCompletion),
    /// Drain remaining work, close the delegator, acknowledge, exit.
    Stop { drained: Sender<()> },
}

/// Scheduling state of one logical index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutorState {
    Idle,
    Batching,
    ExecutingManagement,
    Closed,
}

/// The single executor owning all mutating access to one logical index.
///
/// Runs as a dedicated thread draining the index's submission queue:
/// indexing work is coalesced into batches bounded by count and wait time,
/// management work executes exclusively between batches. An apply or commit
/// failure transitions the index to `Closed`; queued and future work then
/// fails fast without touching the resource.
pub(crate) struct IndexExecutor {
    index: LogicalIndex,
    config: OrchestratorConfig,
    receiver: Receiver<Submission>,
    accessor: IndexAccessor,
    context: EventContext,
    state: ExecutorState,
    closed: Arc<AtomicBool>,
    abort_drain: Arc<AtomicBool>,
    close_reason: Arc<Mutex<Option<String>>>,
    stats: Arc<OrchestratorStats>,
}

impl IndexExecutor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: LogicalIndex,
        config: OrchestratorConfig,
        receiver: Receiver<Submission>,
        accessor: IndexAccessor,
        closed: Arc<AtomicBool>,
        abort_drain: Arc<AtomicBool>,
        close_reason: Arc<Mutex<Option<String>>>,
        stats: Arc<OrchestratorStats>,
    ) -> Self {
        let context = index.event_context();
        IndexExecutor {
            index,
            config,
            receiver,
            accessor,
            context,
            state: ExecutorState::Idle,
            closed,
            abort_drain,
            close_reason,
            stats,
        }
    }

    /// Thread main: drain the submission queue until stopped.
    pub(crate) fn run(mut self) {
        info!(index = %self.index, "index executor started");
        let mut carry: Option<Submission> = None;
        loop {
            let submission = match carry.take() {
                Some(submission) => submission,
                None => match self.receiver.recv() {
                    Ok(submission) => submission,
                    // All senders dropped without an explicit stop.
                    Err(_) => break,
                },
            };
            match submission {
                Submission::Indexing(work, completion) => {
                    let context = self.item_context(work.context());
                    if let Some(error) = self.pre_execution_failure(&context) {
                        self.stats.record_failed();
                        completion.complete(Err(error));
                        continue;
                    }
                    carry = self.run_batch(work, completion);
                }
                Submission::Management(work, completion) => {
                    let context = self.item_context(work.context());
                    if let Some(error) = self.pre_execution_failure(&context) {
                        self.stats.record_failed();
                        completion.complete(Err(error));
                        continue;
                    }
                    self.run_management(work, completion);
                }
                Submission::Stop { drained } => {
                    self.drain_remaining();
                    self.close_delegator();
                    let _ = drained.send(());
                    info!(index = %self.index, "index executor stopped");
                    return;
                }
            }
        }
        self.close_delegator();
        info!(index = %self.index, "index executor exited");
    }

    /// Accumulate a batch starting from `first`, then execute it. Returns
    /// the non-indexing submission that interrupted accumulation, if any.
    fn run_batch(
        &mut self,
        first: IndexingWork,
        completion: WorkCompletion,
    ) -> Option<Submission> {
        self.state = ExecutorState::Batching;
        let mut batch = vec![(first, completion)];
        let mut interrupt = None;
        let deadline = Instant::now() + self.config.max_batch_wait;
        while batch.len() < self.config.max_batch_size {
            match self.receiver.recv_deadline(deadline) {
                Ok(Submission::Indexing(work, completion)) => batch.push((work, completion)),
                Ok(other) => {
                    interrupt = Some(other);
                    break;
                }
                // Deadline reached or channel disconnected.
                Err(_) => break,
            }
        }
        self.execute_batch(batch);
        interrupt
    }

    /// Apply one batch as a combined change set and resolve each item's
    /// completion in submission order.
    fn execute_batch(&mut self, batch: Vec<(IndexingWork, WorkCompletion)>) {
        self.state = ExecutorState::Batching;
        let mut live: Vec<(WorkCompletion, EventContext)> = Vec::with_capacity(batch.len());
        let mut combined = ChangeSet::new();
        for (work, completion) in batch {
            let context = self.item_context(work.context());
            if completion.is_cancelled() {
                debug!(index = %self.index, work = work.id(), "work cancelled before execution");
                self.stats.record_cancelled();
                completion.complete(Err(PilumError::cancelled(format!(
                    "work {} cancelled before execution",
                    work.id()
                ))));
                continue;
            }
            combined.push(work.change().clone());
            live.push((completion, context));
        }
        if live.is_empty() {
            self.state = ExecutorState::Idle;
            return;
        }
        if self.abort_drain.load(Ordering::Acquire) {
            for (completion, context) in live {
                self.stats.record_failed();
                completion.complete(Err(PilumError::drain_timeout(
                    self.config.stop_timeout,
                    &context,
                )));
            }
            self.state = ExecutorState::Idle;
            return;
        }

        debug!(index = %self.index, items = live.len(), "applying indexing batch");
        let policy = self.config.commit_policy;
        let result = {
            let mut exec_ctx = IndexingWorkContext::new(self.context.clone(), &mut self.accessor);
            let context = exec_ctx.event_context().clone();
            exec_ctx.writer_delegator().and_then(|delegator| {
                delegator.apply(&combined, &context)?;
                if policy == CommitPolicy::OnBatch {
                    delegator.commit(&context)?;
                }
                Ok(())
            })
        };
        match result {
            Ok(()) => {
                self.stats.record_batch();
                for (completion, _) in live {
                    self.stats.record_completed();
                    completion.complete(Ok(()));
                }
                self.state = ExecutorState::Idle;
            }
            Err(root) => {
                // The resource state after a failed apply is unknown: close
                // the index first so new submissions fail fast, then fail
                // every item of the batch with the shared root cause,
                // re-tagged with its own context.
                let message = root.root_message();
                warn!(index = %self.index, error = %message, "batch failed, closing index writer");
                self.transition_closed(message.clone());
                for (completion, context) in live {
                    self.stats.record_failed();
                    completion.complete(Err(PilumError::index_io(message.clone(), &context)));
                }
            }
        }
    }

    /// Execute one management work item exclusively.
    fn run_management(&mut self, work: ManagementWork, completion: WorkCompletion) {
        let context = self.item_context(work.context());
        if completion.is_cancelled() {
            debug!(index = %self.index, work = work.id(), "work cancelled before execution");
            self.stats.record_cancelled();
            completion.complete(Err(PilumError::cancelled(format!(
                "work {} cancelled before execution",
                work.id()
            ))));
            return;
        }
        self.state = ExecutorState::ExecutingManagement;
        debug!(index = %self.index, op = %work.op(), "executing management work");
        let result = {
            let mut exec_ctx = ManagementWorkContext::new(context, &mut self.accessor);
            work.execute(&mut exec_ctx)
        };
        self.stats.record_management();
        match &result {
            Ok(()) => self.stats.record_completed(),
            Err(error) => {
                warn!(index = %self.index, op = %work.op(), error = %error, "management work failed");
                self.stats.record_failed();
            }
        }
        completion.complete(result);
        // Management failures are reported to their submitter only; the
        // index resumes accepting work.
        self.state = ExecutorState::Idle;
    }

    /// Execute whatever is already queued, in order. Items arriving after
    /// the drain budget was spent fail with the drain-timeout error.
    fn drain_remaining(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(Submission::Indexing(work, completion)) => {
                    let context = self.item_context(work.context());
                    if let Some(error) = self.pre_execution_failure(&context) {
                        self.stats.record_failed();
                        completion.complete(Err(error));
                        continue;
                    }
                    self.execute_batch(vec![(work, completion)]);
                }
                Ok(Submission::Management(work, completion)) => {
                    let context = self.item_context(work.context());
                    if let Some(error) = self.pre_execution_failure(&context) {
                        self.stats.record_failed();
                        completion.complete(Err(error));
                        continue;
                    }
                    self.run_management(work, completion);
                }
                Ok(Submission::Stop { drained }) => {
                    let _ = drained.send(());
                }
                Err(_) => break,
            }
        }
    }

    /// Why a submission must fail before reaching the resource, if at all.
    fn pre_execution_failure(&self, context: &EventContext) -> Option<PilumError> {
        if self.abort_drain.load(Ordering::Acquire) {
            return Some(PilumError::drain_timeout(self.config.stop_timeout, context));
        }
        if self.state == ExecutorState::Closed {
            let reason = self
                .close_reason
                .lock()
                .clone()
                .unwrap_or_else(|| "index writer is closed".to_string());
            return Some(PilumError::orchestrator_closed(reason, context));
        }
        None
    }

    /// Transition to `Closed` after an unrecoverable failure.
    fn transition_closed(&mut self, reason: String) {
        *self.close_reason.lock() = Some(reason);
        self.closed.store(true, Ordering::Release);
        self.state = ExecutorState::Closed;
        if let Err(error) = self.accessor.close() {
            warn!(index = %self.index, error = %error, "failed to close index writer after failure");
        }
    }

    fn close_delegator(&mut self) {
        if let Err(error) = self.accessor.close() {
            warn!(index = %self.index, error = %error, "failed to close index writer");
        }
    }

    /// The full per-item context: index-level prefix plus the work's own.
    fn item_context(&self, work_context: &EventContext) -> EventContext {
        self.context.append(work_context)
    }
}
