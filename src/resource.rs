//! The boundary to the underlying index resource.
//!
//! The search engine itself is a black box behind [`IndexResource`]: a
//! small fixed set of operations that must never be called concurrently on
//! the same instance. Serialization is provided by the orchestrator, not by
//! implementations. Failures are reported as [`anyhow::Error`] and are
//! translated into the crate's typed taxonomy by the writer delegator.
//!
//! [`MemoryIndexResource`] is the in-memory reference implementation; it
//! keeps an operation journal and per-operation counters so orchestrated
//! writes can be observed from the outside.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::bail;
use parking_lot::Mutex;

use crate::document::Document;
use crate::index::LogicalIndex;
use crate::work::ManagementOp;
use crate::writer::change_set::{ChangeSet, DocumentChange};

/// A mutable handle to one logical index inside the search engine.
///
/// Implementations are reentrant-unsafe by contract: at most one thread may
/// be inside a call at a time. `apply` stages changes; `commit` makes staged
/// changes durable and visible.
pub trait IndexResource: Send + fmt::Debug {
    /// Open the resource. Called before any other operation.
    fn open(&mut self) -> anyhow::Result<()>;

    /// Apply a set of document changes, staging them for the next commit.
    fn apply(&mut self, changes: &ChangeSet) -> anyhow::Result<()>;

    /// Make all staged changes durable.
    fn commit(&mut self) -> anyhow::Result<()>;

    /// Perform an index-level management operation.
    fn manage(&mut self, op: &ManagementOp) -> anyhow::Result<()>;

    /// Close the resource and release its handle.
    fn close(&mut self) -> anyhow::Result<()>;
}

/// Creates one resource handle per logical index.
///
/// The accessor calls this lazily when an index receives its first work and
/// again after an index was dropped or recovered.
pub trait ResourceFactory: Send + Sync + fmt::Debug {
    /// Create a fresh resource handle for the given index.
    fn create(&self, index: &LogicalIndex) -> anyhow::Result<Box<dyn IndexResource>>;
}

/// Observable state of a [`MemoryIndexResource`], shared with its factory.
#[derive(Debug, Default)]
pub struct MemoryIndexState {
    /// Committed documents, keyed by document id.
    pub documents: BTreeMap<String, Document>,

    /// Changes applied but not yet committed.
    pub staged: Vec<DocumentChange>,

    /// Journal of resource operations, in call order.
    pub journal: Vec<String>,

    /// Per-operation call counters.
    pub open_calls: u64,
    pub apply_calls: u64,
    pub commit_calls: u64,
    pub manage_calls: u64,
    pub close_calls: u64,
}

impl MemoryIndexState {
    fn commit_staged(&mut self) {
        for change in self.staged.drain(..) {
            match change {
                DocumentChange::Add {
                    document_id,
                    document,
                }
                | DocumentChange::Update {
                    document_id,
                    document,
                } => {
                    self.documents.insert(document_id, document);
                }
                DocumentChange::Delete { document_id } => {
                    self.documents.remove(&document_id);
                }
            }
        }
    }
}

/// In-memory index resource for embedding and testing.
#[derive(Debug)]
pub struct MemoryIndexResource {
    index: LogicalIndex,
    state: Arc<Mutex<MemoryIndexState>>,
    open: bool,
}

impl MemoryIndexResource {
    /// Create a resource with its own private state.
    pub fn new(index: LogicalIndex) -> Self {
        MemoryIndexResource::with_state(index, Arc::default())
    }

    /// Create a resource backed by shared state, so the state survives the
    /// resource being closed and recreated.
    pub fn with_state(index: LogicalIndex, state: Arc<Mutex<MemoryIndexState>>) -> Self {
        MemoryIndexResource {
            index,
            state,
            open: false,
        }
    }

    /// Handle to the observable state.
    pub fn state(&self) -> Arc<Mutex<MemoryIndexState>> {
        Arc::clone(&self.state)
    }
}

impl IndexResource for MemoryIndexResource {
    fn open(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        state.open_calls += 1;
        state.journal.push("open".to_string());
        self.open = true;
        Ok(())
    }

    fn apply(&mut self, changes: &ChangeSet) -> anyhow::Result<()> {
        if !self.open {
            bail!("index '{}' is not open", self.index);
        }
        let mut state = self.state.lock();
        state.apply_calls += 1;
        let described: Vec<String> = changes
            .changes()
            .iter()
            .map(|c| format!("{} '{}'", c.kind_name(), c.document_id()))
            .collect();
        state.journal.push(format!("apply[{}]", described.join(", ")));
        state.staged.extend(changes.changes().iter().cloned());
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        if !self.open {
            bail!("index '{}' is not open", self.index);
        }
        let mut state = self.state.lock();
        state.commit_calls += 1;
        state.journal.push("commit".to_string());
        state.commit_staged();
        Ok(())
    }

    fn manage(&mut self, op: &ManagementOp) -> anyhow::Result<()> {
        if !self.open {
            bail!("index '{}' is not open", self.index);
        }
        let mut state = self.state.lock();
        state.manage_calls += 1;
        state.journal.push(format!("manage[{op}]"));
        match op {
            ManagementOp::Create => {}
            ManagementOp::Drop => {
                state.staged.clear();
                state.documents.clear();
            }
            ManagementOp::Flush | ManagementOp::ForceCommit => state.commit_staged(),
            ManagementOp::Optimize => {}
        }
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if !self.open {
            return Ok(());
        }
        let mut state = self.state.lock();
        state.close_calls += 1;
        state.journal.push("close".to_string());
        // Closing commits staged changes, like an engine-side writer close.
        state.commit_staged();
        self.open = false;
        Ok(())
    }
}

/// Factory handing out [`MemoryIndexResource`] handles whose state is shared
/// per logical index across recreations.
#[derive(Debug, Default)]
pub struct MemoryResourceFactory {
    states: Mutex<AHashMap<LogicalIndex, Arc<Mutex<MemoryIndexState>>>>,
}

impl MemoryResourceFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        MemoryResourceFactory::default()
    }

    /// The shared state of an index, if any resource was created for it.
    pub fn state(&self, index: &LogicalIndex) -> Option<Arc<Mutex<MemoryIndexState>>> {
        self.states.lock().get(index).cloned()
    }
}

impl ResourceFactory for MemoryResourceFactory {
    fn create(&self, index: &LogicalIndex) -> anyhow::Result<Box<dyn IndexResource>> {
        let state = Arc::clone(self.states.lock().entry(index.clone()).or_default());
        Ok(Box::new(MemoryIndexResource::with_state(
            index.clone(),
            state,
        )))
    }
}
