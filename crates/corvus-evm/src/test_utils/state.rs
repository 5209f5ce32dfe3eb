//! A journaled in-memory state provider for testing purposes.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

use crate::{constants::EMPTY_CODE_HASH, ReleaseSpec, Snapshot, StateProvider};

/// One account of the in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    /// The account balance in wei.
    pub balance: U256,
    /// The account nonce.
    pub nonce: u64,
    /// The hash of the account code.
    pub code_hash: B256,
}

impl Default for AccountEntry {
    fn default() -> Self {
        Self { balance: U256::ZERO, nonce: 0, code_hash: EMPTY_CODE_HASH }
    }
}

impl AccountEntry {
    /// Returns `true` for the canonical empty account: zero balance, zero nonce, no code.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code_hash == EMPTY_CODE_HASH
    }
}

/// A reversible mutation recorded in the journal.
#[derive(Debug, Clone)]
enum JournalEntry {
    Created { address: Address },
    Deleted { address: Address, account: AccountEntry },
    BalanceChanged { address: Address, previous: U256 },
    NonceChanged { address: Address, previous: u64 },
    CodeHashChanged { address: Address, previous: B256 },
}

/// An in-memory [`StateProvider`] backed by a journal of reversible mutations.
///
/// Snapshot handles are indices into the journal; restoring rolls back every later entry.
/// Committing makes the journal permanent and, under EIP-158 rules, clears touched empty
/// accounts. The state root is a commitment digest over the sorted account set, not a trie root.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    accounts: BTreeMap<Address, AccountEntry>,
    codes: BTreeMap<B256, Bytes>,
    journal: Vec<JournalEntry>,
    touched: BTreeSet<Address>,
}

impl MemoryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the balance for an account, materializing it when absent. Fixture setup only: the
    /// mutation is not journaled.
    pub fn set_account_balance(&mut self, address: Address, balance: U256) {
        self.accounts.entry(address).or_default().balance = balance;
    }

    /// Sets the balance for an account.
    pub fn account_balance(mut self, address: Address, balance: U256) -> Self {
        self.set_account_balance(address, balance);
        self
    }

    /// Sets the nonce for an account, materializing it when absent. Fixture setup only.
    pub fn set_account_nonce(&mut self, address: Address, nonce: u64) {
        self.accounts.entry(address).or_default().nonce = nonce;
    }

    /// Sets the nonce for an account.
    pub fn account_nonce(mut self, address: Address, nonce: u64) -> Self {
        self.set_account_nonce(address, nonce);
        self
    }

    /// Sets the code for an account, materializing it when absent. Fixture setup only.
    pub fn set_account_code(&mut self, address: Address, code: Bytes) {
        let code_hash = keccak256(&code);
        self.codes.insert(code_hash, code);
        self.accounts.entry(address).or_default().code_hash = code_hash;
    }

    /// Sets the code for an account.
    pub fn account_code(mut self, address: Address, code: Bytes) -> Self {
        self.set_account_code(address, code);
        self
    }

    /// Returns the account at the address, if any.
    pub fn account(&self, address: &Address) -> Option<&AccountEntry> {
        self.accounts.get(address)
    }

    /// Iterates over all accounts in address order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &AccountEntry)> {
        self.accounts.iter()
    }

    /// Returns the code image of the account, if it carries one.
    pub fn code(&self, address: &Address) -> Option<&Bytes> {
        let entry = self.accounts.get(address)?;
        if entry.code_hash == EMPTY_CODE_HASH {
            return None;
        }
        self.codes.get(&entry.code_hash)
    }

    fn entry_mut(&mut self, address: &Address) -> &mut AccountEntry {
        self.accounts.get_mut(address).expect("account must exist")
    }
}

impl StateProvider for MemoryState {
    fn account_exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn is_empty_account(&self, address: &Address) -> bool {
        self.accounts.get(address).is_none_or(AccountEntry::is_empty)
    }

    fn create_account(&mut self, address: &Address, balance: U256) {
        debug_assert!(!self.account_exists(address), "account already exists");
        self.accounts.insert(*address, AccountEntry { balance, ..AccountEntry::default() });
        self.journal.push(JournalEntry::Created { address: *address });
        self.touched.insert(*address);
    }

    fn balance(&self, address: &Address) -> U256 {
        self.accounts.get(address).map(|entry| entry.balance).unwrap_or_default()
    }

    fn nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|entry| entry.nonce).unwrap_or_default()
    }

    fn increment_nonce(&mut self, address: &Address) {
        let entry = self.entry_mut(address);
        let previous = entry.nonce;
        entry.nonce += 1;
        self.journal.push(JournalEntry::NonceChanged { address: *address, previous });
        self.touched.insert(*address);
    }

    fn add_to_balance(&mut self, address: &Address, amount: U256, _spec: &ReleaseSpec) {
        let entry = self.entry_mut(address);
        let previous = entry.balance;
        entry.balance = previous.checked_add(amount).expect("balance overflow");
        self.journal.push(JournalEntry::BalanceChanged { address: *address, previous });
        self.touched.insert(*address);
    }

    fn subtract_from_balance(&mut self, address: &Address, amount: U256, _spec: &ReleaseSpec) {
        let entry = self.entry_mut(address);
        let previous = entry.balance;
        entry.balance = previous.checked_sub(amount).expect("balance underflow");
        self.journal.push(JournalEntry::BalanceChanged { address: *address, previous });
        self.touched.insert(*address);
    }

    fn update_code(&mut self, code: &[u8]) -> B256 {
        let code_hash = keccak256(code);
        // Content-addressed, so an image orphaned by a later restore is harmless.
        self.codes.insert(code_hash, Bytes::from(code.to_vec()));
        code_hash
    }

    fn update_code_hash(&mut self, address: &Address, code_hash: B256, _spec: &ReleaseSpec) {
        let entry = self.entry_mut(address);
        let previous = entry.code_hash;
        entry.code_hash = code_hash;
        self.journal.push(JournalEntry::CodeHashChanged { address: *address, previous });
        self.touched.insert(*address);
    }

    fn code_hash(&self, address: &Address) -> B256 {
        self.accounts.get(address).map(|entry| entry.code_hash).unwrap_or(EMPTY_CODE_HASH)
    }

    fn delete_account(&mut self, address: &Address) {
        if let Some(account) = self.accounts.remove(address) {
            self.journal.push(JournalEntry::Deleted { address: *address, account });
        }
    }

    fn take_snapshot(&mut self) -> Snapshot {
        Snapshot::new(self.journal.len())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        assert!(snapshot.index() <= self.journal.len(), "unknown snapshot handle");
        while self.journal.len() > snapshot.index() {
            match self.journal.pop().expect("journal entry") {
                JournalEntry::Created { address } => {
                    self.accounts.remove(&address);
                }
                JournalEntry::Deleted { address, account } => {
                    self.accounts.insert(address, account);
                }
                JournalEntry::BalanceChanged { address, previous } => {
                    self.entry_mut(&address).balance = previous;
                }
                JournalEntry::NonceChanged { address, previous } => {
                    self.entry_mut(&address).nonce = previous;
                }
                JournalEntry::CodeHashChanged { address, previous } => {
                    self.entry_mut(&address).code_hash = previous;
                }
            }
        }
    }

    fn commit(&mut self, spec: &ReleaseSpec) {
        if spec.is_eip158_enabled {
            for address in core::mem::take(&mut self.touched) {
                if self.accounts.get(&address).is_some_and(AccountEntry::is_empty) {
                    self.accounts.remove(&address);
                }
            }
        }
        self.journal.clear();
        self.touched.clear();
    }

    fn state_root(&self) -> B256 {
        let mut preimage = Vec::with_capacity(self.accounts.len() * 92);
        for (address, entry) in &self.accounts {
            preimage.extend_from_slice(address.as_slice());
            preimage.extend_from_slice(&entry.balance.to_be_bytes::<32>());
            preimage.extend_from_slice(&entry.nonce.to_be_bytes());
            preimage.extend_from_slice(entry.code_hash.as_slice());
        }
        keccak256(preimage)
    }
}
