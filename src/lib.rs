//! # Pilum
//!
//! Write orchestration layer for full-text search indexes.
//!
//! Pilum sits between a document mapping layer and a mutable search index
//! resource that does not tolerate concurrent mutation. Callers submit
//! indexing work (add/update/delete a document) and index-management work
//! (create/drop/flush/optimize) from any number of threads; each logical
//! index gets a single serializing executor that batches adjacent indexing
//! work, keeps management work exclusive, and reports every item's outcome
//! asynchronously, tagged with composable diagnostic context.
//!
//! ## Features
//!
//! - One serializing executor per logical index, no locking in the writer
//! - Batched change-set application with count and latency bounds
//! - Per-item asynchronous completion handles with cancellation
//! - Typed failure taxonomy carrying event contexts
//! - Fail-fast closed state after unrecoverable failures, with explicit
//!   reopen

pub mod accessor;
pub mod document;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod reporting;
pub mod resource;
pub mod work;
pub mod writer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
