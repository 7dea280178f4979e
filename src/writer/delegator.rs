//! Serialized write access to one index's underlying resource.

use crate::error::{PilumError, Result};
use crate::index::LogicalIndex;
use crate::reporting::EventContext;
use crate::resource::IndexResource;
use crate::work::ManagementOp;
use crate::writer::change_set::ChangeSet;

/// Wraps the live resource handle for one logical index.
///
/// The delegator performs no internal locking: the orchestrator guarantees
/// that at most one thread is ever inside a mutating call. Every method
/// takes the call-site [`EventContext`] and translates resource failures
/// into [`PilumError::IndexIo`]; the resource's native error type never
/// escapes.
#[derive(Debug)]
pub struct WriterDelegator {
    index: LogicalIndex,
    resource: Box<dyn IndexResource>,
    open: bool,
}

impl WriterDelegator {
    /// Wrap a resource handle. The delegator starts closed; call
    /// [`open`](WriterDelegator::open) before any mutating operation.
    pub fn new(index: LogicalIndex, resource: Box<dyn IndexResource>) -> Self {
        WriterDelegator {
            index,
            resource,
            open: false,
        }
    }

    /// The logical index this delegator writes to.
    pub fn index(&self) -> &LogicalIndex {
        &self.index
    }

    /// Whether the delegator currently holds an open resource.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the underlying resource. Opening an already-open delegator is a
    /// no-op success.
    pub fn open(&mut self, context: &EventContext) -> Result<()> {
        if self.open {
            return Ok(());
        }
        self.resource.open().map_err(|e| {
            PilumError::index_io(format!("failed to open index writer: {e:#}"), context)
        })?;
        self.open = true;
        Ok(())
    }

    /// Apply a change set. An empty set is a no-op success.
    pub fn apply(&mut self, changes: &ChangeSet, context: &EventContext) -> Result<()> {
        self.ensure_open(context)?;
        if changes.is_empty() {
            return Ok(());
        }
        self.resource.apply(changes).map_err(|e| {
            PilumError::index_io(format!("failed to apply change set: {e:#}"), context)
        })
    }

    /// Commit staged changes.
    pub fn commit(&mut self, context: &EventContext) -> Result<()> {
        self.ensure_open(context)?;
        self.resource.commit().map_err(|e| {
            PilumError::index_io(format!("failed to commit index writer: {e:#}"), context)
        })
    }

    /// Execute an index-level management operation.
    pub fn manage(&mut self, op: &ManagementOp, context: &EventContext) -> Result<()> {
        self.ensure_open(context)?;
        self.resource.manage(op).map_err(|e| {
            PilumError::index_io(format!("failed to {op} index: {e:#}"), context)
        })
    }

    /// Close the underlying resource. Closing an already-closed delegator is
    /// a no-op success. A failed close still marks the delegator closed:
    /// the resource state is unknown and must not be written to again.
    pub fn close(&mut self, context: &EventContext) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.resource.close().map_err(|e| {
            PilumError::index_io(format!("failed to close index writer: {e:#}"), context)
        })
    }

    fn ensure_open(&self, context: &EventContext) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(PilumError::index_io("index writer is not open", context))
        }
    }
}
