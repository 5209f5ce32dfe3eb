//! Interfaces of the world-state collaborators the processor drives.
//!
//! The processor consumes two independent stores: a [`StateProvider`] for accounts and code, and
//! a [`StorageProvider`] for per-account slot storage. Both support nested snapshot/restore over
//! a journal of reversible mutations; handles are opaque and only valid for the scope of one
//! `execute` call.
//!
//! Contract violations (balance underflow, restoring an unknown handle) are programmer errors:
//! implementations are expected to panic rather than report them, they are not part of the
//! transaction failure model.

use alloy_primitives::{Address, B256, U256};
use auto_impl::auto_impl;

use crate::ReleaseSpec;

/// An opaque snapshot handle.
///
/// Handles are monotonically assigned indices into the provider's journal; restoring to a handle
/// rolls back every later entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snapshot(usize);

impl Snapshot {
    /// Creates a handle from a journal index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the journal index the handle refers to.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The account-level world state consumed by the processor.
#[auto_impl(&mut, Box)]
pub trait StateProvider {
    /// Returns `true` if an account exists at the address.
    fn account_exists(&self, address: &Address) -> bool;

    /// Returns `true` if the account at the address is empty: zero balance, zero nonce, no code.
    fn is_empty_account(&self, address: &Address) -> bool;

    /// Creates an account with the given starting balance.
    fn create_account(&mut self, address: &Address, balance: U256);

    /// Returns the balance of the account, zero if absent.
    fn balance(&self, address: &Address) -> U256;

    /// Returns the nonce of the account, zero if absent.
    fn nonce(&self, address: &Address) -> u64;

    /// Increments the nonce of the account by one.
    fn increment_nonce(&mut self, address: &Address);

    /// Credits the account with the given amount.
    fn add_to_balance(&mut self, address: &Address, amount: U256, spec: &ReleaseSpec);

    /// Debits the account by the given amount. Driving the balance negative is a contract
    /// violation.
    fn subtract_from_balance(&mut self, address: &Address, amount: U256, spec: &ReleaseSpec);

    /// Stores a code image and returns its hash.
    fn update_code(&mut self, code: &[u8]) -> B256;

    /// Points the account at a previously stored code image.
    fn update_code_hash(&mut self, address: &Address, code_hash: B256, spec: &ReleaseSpec);

    /// Returns the code hash of the account, the empty-code hash if absent or code-less.
    fn code_hash(&self, address: &Address) -> B256;

    /// Deletes the account and everything it holds.
    fn delete_account(&mut self, address: &Address);

    /// Captures the current journal position.
    fn take_snapshot(&mut self) -> Snapshot;

    /// Rolls back every mutation recorded after the handle was taken.
    fn restore(&mut self, snapshot: Snapshot);

    /// Makes all pending mutations durable. Under EIP-158 rules this also clears touched empty
    /// accounts.
    fn commit(&mut self, spec: &ReleaseSpec);

    /// Returns the current world-state root.
    fn state_root(&self) -> B256;
}

/// The per-account slot storage consumed by the VM.
///
/// The processor itself only snapshots, restores and commits; the slot accessors exist for the
/// VM executing `SLOAD`/`SSTORE`.
#[auto_impl(&mut, Box)]
pub trait StorageProvider {
    /// Returns the value of a storage slot, zero if never written.
    fn get(&mut self, address: &Address, index: U256) -> U256;

    /// Writes a storage slot.
    fn set(&mut self, address: &Address, index: U256, value: U256);

    /// Captures the current journal position.
    fn take_snapshot(&mut self) -> Snapshot;

    /// Rolls back every write recorded after the handle was taken.
    fn restore(&mut self, snapshot: Snapshot);

    /// Makes all pending writes durable.
    fn commit(&mut self, spec: &ReleaseSpec);
}
