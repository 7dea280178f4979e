//! Composable diagnostic context attached to work items and errors.
//!
//! Every operation flowing through the orchestrator carries an
//! [`EventContext`]: an immutable, ordered sequence of `(kind, identifier)`
//! elements describing where the operation came from (which index, which
//! document, which work item). Contexts compose cheaply and render
//! deterministically, so a failure deep in the write path can always be
//! reported with its full causal path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel rendered in place of a missing identifier.
const UNKNOWN: &str = "unknown";

/// The kind of a context element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A logical index name.
    Index,

    /// A tenant or shard qualifier of an index.
    Tenant,

    /// The domain entity type a document was mapped from.
    EntityType,

    /// A document identifier.
    Document,

    /// A submitted work item.
    Work,
}

impl ElementKind {
    /// Human-readable label used when rendering.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Index => "index",
            ElementKind::Tenant => "tenant",
            ElementKind::EntityType => "entity type",
            ElementKind::Document => "document",
            ElementKind::Work => "work",
        }
    }
}

/// One `(kind, identifier)` element of an [`EventContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextElement {
    kind: ElementKind,
    id: String,
}

impl ContextElement {
    /// Create a new element. An empty identifier is kept and renders as
    /// `'unknown'` rather than failing.
    pub fn new<S: Into<String>>(kind: ElementKind, id: S) -> Self {
        ContextElement {
            kind,
            id: id.into(),
        }
    }

    /// Create an index element.
    pub fn index<S: Into<String>>(name: S) -> Self {
        ContextElement::new(ElementKind::Index, name)
    }

    /// Create a tenant element.
    pub fn tenant<S: Into<String>>(name: S) -> Self {
        ContextElement::new(ElementKind::Tenant, name)
    }

    /// Create an entity type element.
    pub fn entity_type<S: Into<String>>(name: S) -> Self {
        ContextElement::new(ElementKind::EntityType, name)
    }

    /// Create a document element.
    pub fn document<S: Into<String>>(id: S) -> Self {
        ContextElement::new(ElementKind::Document, id)
    }

    /// Create a work element.
    pub fn work<S: Into<String>>(id: S) -> Self {
        ContextElement::new(ElementKind::Work, id)
    }

    /// The kind of this element.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The identifier of this element.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ContextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = if self.id.is_empty() {
            UNKNOWN
        } else {
            self.id.as_str()
        };
        write!(f, "{} '{}'", self.kind.label(), id)
    }
}

/// An immutable, ordered sequence of context elements.
///
/// Composition is associative and never fails: appending context B to
/// context A yields a context that renders A's elements followed by B's.
/// An empty context renders the `'unknown'` sentinel so that error messages
/// never lose their context slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    elements: Vec<ContextElement>,
}

impl EventContext {
    /// A context with no elements.
    pub fn empty() -> Self {
        EventContext::default()
    }

    /// A context with a single element.
    pub fn of(element: ContextElement) -> Self {
        EventContext {
            elements: vec![element],
        }
    }

    /// A context built from the given elements, in order.
    pub fn from_elements(elements: Vec<ContextElement>) -> Self {
        EventContext { elements }
    }

    /// A copy of this context with `element` appended.
    pub fn with(&self, element: ContextElement) -> Self {
        let mut elements = self.elements.clone();
        elements.push(element);
        EventContext { elements }
    }

    /// Compose this context (parent) with another (child): the result
    /// renders this context's elements followed by the other's.
    pub fn append(&self, other: &EventContext) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + other.elements.len());
        elements.extend_from_slice(&self.elements);
        elements.extend_from_slice(&other.elements);
        EventContext { elements }
    }

    /// The elements of this context, in composition order.
    pub fn elements(&self) -> &[ContextElement] {
        &self.elements
    }

    /// Whether this context carries no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str(UNKNOWN);
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
