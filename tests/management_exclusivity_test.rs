//! Management work exclusivity and lifecycle scenarios.

use std::sync::Arc;
use std::time::Duration;

use pilum::document::Document;
use pilum::index::LogicalIndex;
use pilum::orchestrator::{CommitPolicy, OrchestratorConfig, WriteOrchestrator};
use pilum::resource::MemoryResourceFactory;
use pilum::work::{IndexingWork, ManagementOp, ManagementWork};
use pilum::writer::DocumentChange;

fn wide_batch_config() -> OrchestratorConfig {
    OrchestratorConfig {
        max_batch_wait: Duration::from_millis(500),
        ..Default::default()
    }
}

fn position(journal: &[String], predicate: impl Fn(&str) -> bool) -> usize {
    journal
        .iter()
        .position(|entry| predicate(entry))
        .unwrap_or_else(|| panic!("entry not found in journal: {journal:?}"))
}

#[test]
fn test_management_is_never_interleaved_with_indexing() {
    let factory = Arc::new(MemoryResourceFactory::new());
    let orchestrator = WriteOrchestrator::new(factory.clone(), wide_batch_config());
    let index = LogicalIndex::new("products");

    let before = orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
        )
        .unwrap();
    let optimize = orchestrator
        .submit_management(&index, ManagementWork::new(ManagementOp::Optimize))
        .unwrap();
    let after = orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-2", Document::new())),
        )
        .unwrap();

    before.wait().unwrap();
    optimize.wait().unwrap();
    after.wait().unwrap();

    let state = factory.state(&index).unwrap();
    let journal = state.lock().journal.clone();

    let doc1_applied = position(&journal, |e| e.starts_with("apply[") && e.contains("'doc-1'"));
    let optimized = position(&journal, |e| e == "manage[optimize]");
    let doc2_applied = position(&journal, |e| e.starts_with("apply[") && e.contains("'doc-2'"));

    assert!(doc1_applied < optimized, "journal: {journal:?}");
    assert!(optimized < doc2_applied, "journal: {journal:?}");

    orchestrator.shutdown().unwrap();
}

#[test]
fn test_drop_clears_index_and_next_work_reopens() {
    let factory = Arc::new(MemoryResourceFactory::new());
    let orchestrator = WriteOrchestrator::new(factory.clone(), wide_batch_config());
    let index = LogicalIndex::new("products");

    orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
        )
        .unwrap()
        .wait()
        .unwrap();

    orchestrator
        .submit_management(&index, ManagementWork::new(ManagementOp::Drop))
        .unwrap()
        .wait()
        .unwrap();

    {
        let state = factory.state(&index).unwrap();
        let state = state.lock();
        assert!(state.documents.is_empty());
        assert!(state.journal.contains(&"manage[drop]".to_string()));
        // Drop closes the writer.
        assert_eq!(state.close_calls, 1);
    }

    // The next submission lazily reopens a fresh writer.
    orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-2", Document::new())),
        )
        .unwrap()
        .wait()
        .unwrap();

    let state = factory.state(&index).unwrap();
    let state = state.lock();
    assert!(state.documents.contains_key("doc-2"));
    assert!(!state.documents.contains_key("doc-1"));
    assert_eq!(state.open_calls, 2);
    drop(state);

    orchestrator.shutdown().unwrap();
}

#[test]
fn test_manual_commit_policy_defers_durability_until_flush() {
    let factory = Arc::new(MemoryResourceFactory::new());
    let config = OrchestratorConfig {
        commit_policy: CommitPolicy::Manual,
        max_batch_wait: Duration::from_millis(500),
        ..Default::default()
    };
    let orchestrator = WriteOrchestrator::new(factory.clone(), config);
    let index = LogicalIndex::new("products");

    orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
        )
        .unwrap()
        .wait()
        .unwrap();

    {
        let state = factory.state(&index).unwrap();
        let state = state.lock();
        // Applied but not yet durable.
        assert!(!state.documents.contains_key("doc-1"));
        assert_eq!(state.staged.len(), 1);
        assert_eq!(state.commit_calls, 0);
    }

    orchestrator
        .submit_management(&index, ManagementWork::new(ManagementOp::Flush))
        .unwrap()
        .wait()
        .unwrap();

    let state = factory.state(&index).unwrap();
    let state = state.lock();
    assert!(state.documents.contains_key("doc-1"));
    assert!(state.staged.is_empty());
    drop(state);

    orchestrator.shutdown().unwrap();
}

#[test]
fn test_force_commit_goes_through_commit_path() {
    let factory = Arc::new(MemoryResourceFactory::new());
    let config = OrchestratorConfig {
        commit_policy: CommitPolicy::Manual,
        ..Default::default()
    };
    let orchestrator = WriteOrchestrator::new(factory.clone(), config);
    let index = LogicalIndex::new("products");

    orchestrator
        .submit_indexing(
            &index,
            IndexingWork::new(DocumentChange::add("doc-1", Document::new())),
        )
        .unwrap()
        .wait()
        .unwrap();
    orchestrator
        .submit_management(&index, ManagementWork::new(ManagementOp::ForceCommit))
        .unwrap()
        .wait()
        .unwrap();

    let state = factory.state(&index).unwrap();
    let state = state.lock();
    assert!(state.documents.contains_key("doc-1"));
    assert_eq!(state.commit_calls, 1);
    drop(state);

    orchestrator.shutdown().unwrap();
}
