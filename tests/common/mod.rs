//! Fixture resources for orchestrator scenario tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::bail;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use pilum::index::LogicalIndex;
use pilum::resource::{IndexResource, ResourceFactory};
use pilum::work::ManagementOp;
use pilum::writer::ChangeSet;

/// Resource whose `apply` blocks until a token arrives on the gate channel.
/// Only indexes matching `gated_index` block; others pass straight through.
#[derive(Debug)]
pub struct GatedResource {
    index: LogicalIndex,
    gated_index: String,
    gate: Receiver<()>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl IndexResource for GatedResource {
    fn open(&mut self) -> anyhow::Result<()> {
        self.journal.lock().push(format!("{}:open", self.index));
        Ok(())
    }

    fn apply(&mut self, changes: &ChangeSet) -> anyhow::Result<()> {
        if self.index.name() == self.gated_index {
            // Block until the test releases one apply.
            let _ = self.gate.recv();
        }
        self.journal
            .lock()
            .push(format!("{}:apply[{}]", self.index, changes.len()));
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        self.journal.lock().push(format!("{}:commit", self.index));
        Ok(())
    }

    fn manage(&mut self, op: &ManagementOp) -> anyhow::Result<()> {
        self.journal
            .lock()
            .push(format!("{}:manage[{op}]", self.index));
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.journal.lock().push(format!("{}:close", self.index));
        Ok(())
    }
}

/// Factory for [`GatedResource`] handles sharing one gate and journal.
#[derive(Debug)]
pub struct GatedFactory {
    gated_index: String,
    gate: Receiver<()>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl GatedFactory {
    /// Create a factory gating `gated_index`. Returns the factory, the
    /// sender releasing one blocked `apply` per token, and the journal.
    pub fn new(gated_index: &str) -> (Self, Sender<()>, Arc<Mutex<Vec<String>>>) {
        let (release, gate) = unbounded();
        let journal = Arc::new(Mutex::new(Vec::new()));
        (
            GatedFactory {
                gated_index: gated_index.to_string(),
                gate,
                journal: Arc::clone(&journal),
            },
            release,
            journal,
        )
    }
}

impl ResourceFactory for GatedFactory {
    fn create(&self, index: &LogicalIndex) -> anyhow::Result<Box<dyn IndexResource>> {
        Ok(Box::new(GatedResource {
            index: index.clone(),
            gated_index: self.gated_index.clone(),
            gate: self.gate.clone(),
            journal: Arc::clone(&self.journal),
        }))
    }
}

/// Resource with switchable failure injection for `apply` and `manage`.
#[derive(Debug)]
pub struct FlakyResource {
    fail_applies: Arc<AtomicBool>,
    fail_manage: Arc<AtomicBool>,
    applied: Arc<Mutex<Vec<String>>>,
}

impl IndexResource for FlakyResource {
    fn open(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn apply(&mut self, changes: &ChangeSet) -> anyhow::Result<()> {
        if self.fail_applies.load(Ordering::Acquire) {
            bail!("injected apply failure");
        }
        let mut applied = self.applied.lock();
        for change in changes.changes() {
            applied.push(change.document_id().to_string());
        }
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn manage(&mut self, _op: &ManagementOp) -> anyhow::Result<()> {
        if self.fail_manage.load(Ordering::Acquire) {
            bail!("injected manage failure");
        }
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Factory for [`FlakyResource`] handles sharing the failure switches.
#[derive(Debug, Default)]
pub struct FlakyFactory {
    pub fail_applies: Arc<AtomicBool>,
    pub fail_manage: Arc<AtomicBool>,
    pub applied: Arc<Mutex<Vec<String>>>,
}

impl ResourceFactory for FlakyFactory {
    fn create(&self, _index: &LogicalIndex) -> anyhow::Result<Box<dyn IndexResource>> {
        Ok(Box::new(FlakyResource {
            fail_applies: Arc::clone(&self.fail_applies),
            fail_manage: Arc::clone(&self.fail_manage),
            applied: Arc::clone(&self.applied),
        }))
    }
}
