//! A journaled in-memory storage provider for testing purposes.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::{ReleaseSpec, Snapshot, StorageProvider};

/// An in-memory [`StorageProvider`] backed by a journal of previous slot values.
///
/// Snapshot handles are indices into the journal; restoring rolls back every later write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: BTreeMap<(Address, U256), U256>,
    journal: Vec<((Address, U256), U256)>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a slot without going through the mutable trait accessor.
    pub fn slot(&self, address: &Address, index: U256) -> U256 {
        self.slots.get(&(*address, index)).copied().unwrap_or_default()
    }

    /// Returns the number of non-zero slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot holds a value.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all non-zero slots in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(Address, U256), &U256)> {
        self.slots.iter()
    }
}

impl StorageProvider for MemoryStorage {
    fn get(&mut self, address: &Address, index: U256) -> U256 {
        self.slot(address, index)
    }

    fn set(&mut self, address: &Address, index: U256, value: U256) {
        let key = (*address, index);
        let previous = self.slots.get(&key).copied().unwrap_or_default();
        self.journal.push((key, previous));
        if value.is_zero() {
            self.slots.remove(&key);
        } else {
            self.slots.insert(key, value);
        }
    }

    fn take_snapshot(&mut self) -> Snapshot {
        Snapshot::new(self.journal.len())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        assert!(snapshot.index() <= self.journal.len(), "unknown snapshot handle");
        while self.journal.len() > snapshot.index() {
            let ((address, index), previous) = self.journal.pop().expect("journal entry");
            if previous.is_zero() {
                self.slots.remove(&(address, index));
            } else {
                self.slots.insert((address, index), previous);
            }
        }
    }

    fn commit(&mut self, _spec: &ReleaseSpec) {
        self.journal.clear();
    }
}
