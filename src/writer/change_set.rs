//! Document change sets applied against the index resource.

use crate::document::Document;

/// A single document-level mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentChange {
    /// Add a document to the index.
    Add {
        document_id: String,
        document: Document,
    },

    /// Update a document (replace its previous content).
    Update {
        document_id: String,
        document: Document,
    },

    /// Delete a document from the index.
    Delete { document_id: String },
}

impl DocumentChange {
    /// Create an add change.
    pub fn add<S: Into<String>>(document_id: S, document: Document) -> Self {
        DocumentChange::Add {
            document_id: document_id.into(),
            document,
        }
    }

    /// Create an update change.
    pub fn update<S: Into<String>>(document_id: S, document: Document) -> Self {
        DocumentChange::Update {
            document_id: document_id.into(),
            document,
        }
    }

    /// Create a delete change.
    pub fn delete<S: Into<String>>(document_id: S) -> Self {
        DocumentChange::Delete {
            document_id: document_id.into(),
        }
    }

    /// The identifier of the document this change targets.
    pub fn document_id(&self) -> &str {
        match self {
            DocumentChange::Add { document_id, .. }
            | DocumentChange::Update { document_id, .. }
            | DocumentChange::Delete { document_id } => document_id,
        }
    }

    /// Short name of the change kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocumentChange::Add { .. } => "add",
            DocumentChange::Update { .. } => "update",
            DocumentChange::Delete { .. } => "delete",
        }
    }
}

/// An ordered collection of document changes applied in one resource call.
///
/// The orchestrator coalesces adjacent indexing work into a single change
/// set; order within the set is submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<DocumentChange>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        ChangeSet::default()
    }

    /// Append a change to the set.
    pub fn push(&mut self, change: DocumentChange) {
        self.changes.push(change);
    }

    /// Append all changes of `other`, preserving order.
    pub fn merge(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    /// The changes in submission order.
    pub fn changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    /// The number of changes in the set.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl FromIterator<DocumentChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = DocumentChange>>(iter: I) -> Self {
        ChangeSet {
            changes: iter.into_iter().collect(),
        }
    }
}
