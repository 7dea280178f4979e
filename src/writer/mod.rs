//! Write access to the underlying index resource.
//!
//! [`ChangeSet`](change_set::ChangeSet) is the unit that crosses the
//! resource boundary; [`WriterDelegator`](delegator::WriterDelegator) wraps
//! the live resource handle and translates its failures into typed errors.

pub mod change_set;
pub mod delegator;

pub use change_set::{ChangeSet, DocumentChange};
pub use delegator::WriterDelegator;
