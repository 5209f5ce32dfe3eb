//! The accumulated effect of one VM execution.

use std::collections::BTreeSet;

use alloy_primitives::{Address, Log};

/// The substate collected across the call tree of one transaction: the logs it emitted, the
/// accounts it scheduled for destruction and the gas it elected to refund.
///
/// The destroy set is ordered so that the destruction sweep and tests iterate deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSubstate {
    /// Set when the execution asked for its state changes to be thrown away. Forces the refund
    /// to zero.
    pub should_revert: bool,
    /// The logs emitted, in emission order.
    pub logs: Vec<Log>,
    /// The accounts scheduled for destruction at transaction commit.
    pub destroy_list: BTreeSet<Address>,
    /// The gas the VM elected to return to the sender, before the refund cap.
    pub refund: u64,
}

impl TransactionSubstate {
    /// Returns an empty substate carrying the revert flag, the shape both the revert and the
    /// caught-fault paths settle with.
    pub fn reverted() -> Self {
        Self { should_revert: true, ..Self::default() }
    }

    /// Appends a log entry.
    pub fn append_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Schedules an account for destruction. Returns `true` if it was not already scheduled.
    pub fn schedule_destruction(&mut self, address: Address) -> bool {
        self.destroy_list.insert(address)
    }

    /// Adds to the refund counter.
    pub fn add_refund(&mut self, gas: u64) {
        self.refund += gas;
    }
}
