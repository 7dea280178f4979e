//! Logical index identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reporting::{ContextElement, EventContext};

/// Identifies one independently-writable index.
///
/// Exactly one writer delegator and one orchestrator queue exist per logical
/// index at any time; different logical indexes are fully independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalIndex {
    name: String,
    tenant: Option<String>,
}

impl LogicalIndex {
    /// Create a new logical index with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        LogicalIndex {
            name: name.into(),
            tenant: None,
        }
    }

    /// Create a new tenant-scoped logical index.
    pub fn with_tenant<S: Into<String>, T: Into<String>>(name: S, tenant: T) -> Self {
        LogicalIndex {
            name: name.into(),
            tenant: Some(tenant.into()),
        }
    }

    /// The index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tenant qualifier, if any.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// The index-level event context: an index element, plus a tenant
    /// element when this index is tenant-scoped.
    pub fn event_context(&self) -> EventContext {
        let context = EventContext::of(ContextElement::index(&self.name));
        match &self.tenant {
            Some(tenant) => context.with(ContextElement::tenant(tenant)),
            None => context,
        }
    }
}

impl fmt::Display for LogicalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}/{}", self.name, tenant),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(LogicalIndex::new("products").to_string(), "products");
        assert_eq!(
            LogicalIndex::with_tenant("products", "eu").to_string(),
            "products/eu"
        );
    }

    #[test]
    fn test_event_context() {
        let context = LogicalIndex::with_tenant("products", "eu").event_context();
        assert_eq!(context.to_string(), "index 'products', tenant 'eu'");
    }
}
