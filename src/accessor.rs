//! Lifecycle ownership of one logical index's writer delegator.

use std::sync::Arc;

use crate::error::{PilumError, Result};
use crate::index::LogicalIndex;
use crate::reporting::EventContext;
use crate::resource::ResourceFactory;
use crate::writer::WriterDelegator;

/// Owns at most one live [`WriterDelegator`] per logical index.
///
/// The delegator is created and opened lazily on first use; `close` closes
/// and discards it, and the next use opens a fresh one. The accessor is
/// owned by its index's executor thread, so open/close transitions are
/// serialized with all in-flight work by construction.
#[derive(Debug)]
pub struct IndexAccessor {
    index: LogicalIndex,
    context: EventContext,
    factory: Arc<dyn ResourceFactory>,
    delegator: Option<WriterDelegator>,
}

impl IndexAccessor {
    /// Create an accessor for the given index.
    pub fn new(index: LogicalIndex, factory: Arc<dyn ResourceFactory>) -> Self {
        let context = index.event_context();
        IndexAccessor {
            index,
            context,
            factory,
            delegator: None,
        }
    }

    /// The logical index this accessor manages.
    pub fn index(&self) -> &LogicalIndex {
        &self.index
    }

    /// The index-level event context.
    pub fn event_context(&self) -> &EventContext {
        &self.context
    }

    /// Whether a delegator is currently live and open.
    pub fn is_open(&self) -> bool {
        self.delegator.as_ref().is_some_and(WriterDelegator::is_open)
    }

    /// The current delegator, created and opened lazily.
    pub fn writer_delegator(&mut self) -> Result<&mut WriterDelegator> {
        if self.delegator.is_none() {
            let resource = self.factory.create(&self.index).map_err(|e| {
                PilumError::index_io(
                    format!("failed to create index resource: {e:#}"),
                    &self.context,
                )
            })?;
            self.delegator = Some(WriterDelegator::new(self.index.clone(), resource));
        }
        match self.delegator.as_mut() {
            Some(delegator) => {
                delegator.open(&self.context)?;
                Ok(delegator)
            }
            None => Err(PilumError::internal("writer delegator initialization failed")),
        }
    }

    /// Close and discard the current delegator, if any. The delegator is
    /// discarded even when the close fails: its resource state is unknown
    /// and the next use must start from a fresh handle.
    pub fn close(&mut self) -> Result<()> {
        match self.delegator.take() {
            Some(mut delegator) => delegator.close(&self.context),
            None => Ok(()),
        }
    }
}
