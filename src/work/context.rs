//! Per-execution views handed to work items.
//!
//! Each view lives for exactly one work item's (or batch's) execution and
//! must not be retained beyond it. Indexing work only sees the event
//! context and the writer delegator; management work additionally reaches
//! the accessor, because operations like drop need to manipulate the
//! writer's lifecycle rather than just the index's content.

use crate::accessor::IndexAccessor;
use crate::error::Result;
use crate::reporting::EventContext;
use crate::writer::WriterDelegator;

/// Execution view for indexing work.
#[derive(Debug)]
pub struct IndexingWorkContext<'a> {
    context: EventContext,
    accessor: &'a mut IndexAccessor,
}

impl<'a> IndexingWorkContext<'a> {
    pub(crate) fn new(context: EventContext, accessor: &'a mut IndexAccessor) -> Self {
        IndexingWorkContext { context, accessor }
    }

    /// The event context of the executing work.
    pub fn event_context(&self) -> &EventContext {
        &self.context
    }

    /// The current writer delegator, opened lazily.
    pub fn writer_delegator(&mut self) -> Result<&mut WriterDelegator> {
        self.accessor.writer_delegator()
    }
}

/// Execution view for management work.
#[derive(Debug)]
pub struct ManagementWorkContext<'a> {
    context: EventContext,
    accessor: &'a mut IndexAccessor,
}

impl<'a> ManagementWorkContext<'a> {
    pub(crate) fn new(context: EventContext, accessor: &'a mut IndexAccessor) -> Self {
        ManagementWorkContext { context, accessor }
    }

    /// The event context of the executing work.
    pub fn event_context(&self) -> &EventContext {
        &self.context
    }

    /// The current writer delegator, opened lazily.
    pub fn writer_delegator(&mut self) -> Result<&mut WriterDelegator> {
        self.accessor.writer_delegator()
    }

    /// The index accessor, for operations that manage the writer lifecycle.
    pub fn accessor(&mut self) -> &mut IndexAccessor {
        self.accessor
    }
}
