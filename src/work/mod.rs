//! Work items submitted to the write orchestrator.
//!
//! Two kinds of work exist: [`IndexingWork`] mutates document content
//! (add, update, delete) and may be coalesced into batches;
//! [`ManagementWork`] mutates the index itself (create, drop, flush,
//! optimize, force-commit) and always executes exclusively of indexing
//! work on the same index. Work items are immutable once submitted and
//! consumed exactly once by the executor.

pub mod context;
pub mod handle;

pub use context::{IndexingWorkContext, ManagementWorkContext};
pub use handle::WorkHandle;

use std::fmt;

use uuid::Uuid;

use crate::error::Result;
use crate::reporting::{ContextElement, EventContext};
use crate::writer::change_set::DocumentChange;

/// An index-level management operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementOp {
    /// Ensure the index exists and is open.
    Create,

    /// Remove the index's content and close its writer.
    Drop,

    /// Make all applied changes durable and visible.
    Flush,

    /// Merge/compact the index's underlying structures.
    Optimize,

    /// Commit without flushing ancillary state.
    ForceCommit,
}

impl ManagementOp {
    /// Short name of the operation, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ManagementOp::Create => "create",
            ManagementOp::Drop => "drop",
            ManagementOp::Flush => "flush",
            ManagementOp::Optimize => "optimize",
            ManagementOp::ForceCommit => "force-commit",
        }
    }
}

impl fmt::Display for ManagementOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit of work mutating document content.
#[derive(Debug, Clone)]
pub struct IndexingWork {
    id: String,
    change: DocumentChange,
    context: EventContext,
}

impl IndexingWork {
    /// Create indexing work for one document change. The work's context is
    /// derived from the change's document id.
    pub fn new(change: DocumentChange) -> Self {
        let context = EventContext::of(ContextElement::document(change.document_id()));
        IndexingWork {
            id: Uuid::new_v4().to_string(),
            change,
            context,
        }
    }

    /// Prefix the work's context with caller-supplied metadata, e.g. the
    /// entity the mapping layer derived the document from.
    pub fn in_context(mut self, parent: EventContext) -> Self {
        self.context = parent.append(&self.context);
        self
    }

    /// Unique id of this work item.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document change this work carries.
    pub fn change(&self) -> &DocumentChange {
        &self.change
    }

    /// The work-level event context (without the index-level prefix).
    pub fn context(&self) -> &EventContext {
        &self.context
    }
}

/// A unit of work mutating the index itself.
#[derive(Debug, Clone)]
pub struct ManagementWork {
    id: String,
    op: ManagementOp,
    context: EventContext,
}

impl ManagementWork {
    /// Create management work for one operation.
    pub fn new(op: ManagementOp) -> Self {
        let id = Uuid::new_v4().to_string();
        let context = EventContext::of(ContextElement::work(format!("{op} {id}")));
        ManagementWork { id, op, context }
    }

    /// Prefix the work's context with caller-supplied metadata.
    pub fn in_context(mut self, parent: EventContext) -> Self {
        self.context = parent.append(&self.context);
        self
    }

    /// Unique id of this work item.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The management operation this work carries.
    pub fn op(&self) -> ManagementOp {
        self.op
    }

    /// The work-level event context (without the index-level prefix).
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// Execute the operation against the execution context supplied by the
    /// orchestrator.
    pub(crate) fn execute(&self, ctx: &mut ManagementWorkContext<'_>) -> Result<()> {
        let context = ctx.event_context().clone();
        match self.op {
            ManagementOp::Drop => {
                ctx.accessor()
                    .writer_delegator()?
                    .manage(&ManagementOp::Drop, &context)?;
                ctx.accessor().close()
            }
            ManagementOp::ForceCommit => ctx.writer_delegator()?.commit(&context),
            op => ctx.writer_delegator()?.manage(&op, &context),
        }
    }
}
