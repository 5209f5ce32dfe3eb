//! Test utilities: journaled in-memory providers, a scripted VM and a processor harness.

mod state;
pub use state::*;

mod storage;
pub use storage::*;

mod vm;
pub use vm::*;

use crate::{
    BlockHeader, ForkSchedule, MemoryTracer, SpecId, Transaction, TransactionProcessor,
    TransactionReceipt,
};

/// Bundles the in-memory collaborators behind one processor entry point.
#[derive(Debug, Default)]
pub struct Harness {
    /// The account-level world state.
    pub state: MemoryState,
    /// The per-account slot storage.
    pub storage: MemoryStorage,
    /// The scripted VM.
    pub vm: MockVm,
    /// The fork schedule.
    pub specs: ForkSchedule,
    /// The trace collector.
    pub tracer: MemoryTracer,
}

impl Harness {
    /// Creates a harness with the given rule set active from genesis.
    pub fn new(spec_id: SpecId) -> Self {
        Self { specs: ForkSchedule::single(spec_id), ..Self::default() }
    }

    /// Applies one transaction and returns its receipt.
    pub fn execute(&mut self, tx: &Transaction, header: &mut BlockHeader) -> TransactionReceipt {
        TransactionProcessor::new(
            &mut self.state,
            &mut self.storage,
            &mut self.vm,
            &self.specs,
            &mut self.tracer,
        )
        .execute(tx, header)
    }
}
