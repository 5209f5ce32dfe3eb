//! JSON types of the t8n tool: prestate allocation, block environment, transactions and the
//! transition result.

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use corvus_evm::{
    test_utils::{MemoryState, MemoryStorage},
    BlockHeader, StorageProvider, Transaction, TransactionReceipt, TransactionTrace,
};
use serde::{Deserialize, Serialize};

/// Account state information in the allocation files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    /// Account balance
    #[serde(default)]
    pub balance: U256,
    /// Account nonce (uses `alloy_serde::quantity` for standard Ethereum format)
    #[serde(default, with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// Account code (hex string with 0x prefix)
    #[serde(default)]
    pub code: Bytes,
    /// Storage slots
    #[serde(default)]
    pub storage: BTreeMap<U256, U256>,
}

/// The prestate and poststate allocation: accounts keyed by address.
pub type StateAlloc = BTreeMap<Address, AccountState>;

/// Builds the in-memory providers from an allocation.
pub fn load_state(alloc: StateAlloc) -> (MemoryState, MemoryStorage) {
    let mut state = MemoryState::new();
    let mut storage = MemoryStorage::new();
    for (address, account) in alloc {
        state.set_account_balance(address, account.balance);
        state.set_account_nonce(address, account.nonce);
        if !account.code.is_empty() {
            state.set_account_code(address, account.code);
        }
        for (slot, value) in account.storage {
            storage.set(&address, slot, value);
        }
    }
    (state, storage)
}

/// Dumps the in-memory providers back into an allocation.
pub fn dump_state(state: &MemoryState, storage: &MemoryStorage) -> StateAlloc {
    let mut alloc: StateAlloc = state
        .accounts()
        .map(|(address, entry)| {
            let account = AccountState {
                balance: entry.balance,
                nonce: entry.nonce,
                code: state.code(address).cloned().unwrap_or_default(),
                storage: BTreeMap::new(),
            };
            (*address, account)
        })
        .collect();
    for ((address, slot), value) in storage.iter() {
        if let Some(account) = alloc.get_mut(address) {
            account.storage.insert(*slot, *value);
        }
    }
    alloc
}

/// The block environment of the transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Env {
    /// The block number
    #[serde(default, with = "alloy_serde::quantity")]
    pub current_number: u64,
    /// The block beneficiary
    pub current_coinbase: Address,
    /// The block gas limit
    #[serde(with = "alloy_serde::quantity")]
    pub current_gas_limit: u64,
    /// Gas already used by earlier transactions in the block
    #[serde(default, with = "alloy_serde::quantity")]
    pub current_gas_used: u64,
}

impl From<Env> for BlockHeader {
    fn from(env: Env) -> Self {
        Self {
            number: env.current_number,
            beneficiary: env.current_coinbase,
            gas_limit: env.current_gas_limit,
            gas_used: env.current_gas_used,
        }
    }
}

/// One transaction of the transition input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// The recovered sender
    pub sender: Option<Address>,
    /// The recipient, absent for contract creations
    #[serde(default)]
    pub to: Option<Address>,
    /// The transferred value
    #[serde(default)]
    pub value: U256,
    /// The gas price
    #[serde(default)]
    pub gas_price: U256,
    /// The gas limit
    #[serde(with = "alloy_serde::quantity")]
    pub gas_limit: u64,
    /// The sender nonce
    #[serde(default, with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// The call data
    #[serde(default)]
    pub data: Bytes,
    /// The init code for contract creations
    #[serde(default)]
    pub init: Bytes,
    /// The transaction hash
    #[serde(default)]
    pub hash: B256,
}

impl From<TransactionInput> for Transaction {
    fn from(input: TransactionInput) -> Self {
        Self {
            sender: input.sender,
            to: input.to,
            value: input.value,
            gas_price: input.gas_price,
            gas_limit: input.gas_limit,
            nonce: input.nonce,
            data: input.data,
            init: input.init,
            hash: input.hash,
        }
    }
}

/// The result document of a transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResults {
    /// The receipts of the applied transactions, in order
    pub receipts: Vec<TransactionReceipt>,
    /// The total gas used by the block after the transition
    pub gas_used: u64,
    /// The world-state root after the transition
    pub state_root: B256,
    /// The collected traces keyed by transaction hash, present with `--trace`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traces: BTreeMap<B256, TransactionTrace>,
}

#[cfg(test)]
mod tests {
    use corvus_evm::StateProvider;

    use super::*;

    #[test]
    fn alloc_roundtrips_through_the_providers() {
        let address = Address::with_last_byte(0x11);
        let alloc: StateAlloc = serde_json::from_str(
            r#"{
                "0x0000000000000000000000000000000000000011": {
                    "balance": "0x64",
                    "nonce": "0x2",
                    "code": "0x6000",
                    "storage": { "0x1": "0x2a" }
                }
            }"#,
        )
        .unwrap();

        let (state, storage) = load_state(alloc);
        assert_eq!(state.balance(&address), U256::from(100));
        assert_eq!(state.nonce(&address), 2);
        assert_eq!(storage.slot(&address, U256::from(1)), U256::from(42));

        let dumped = dump_state(&state, &storage);
        let account = dumped.get(&address).unwrap();
        assert_eq!(account.balance, U256::from(100));
        assert_eq!(account.nonce, 2);
        assert_eq!(account.code, Bytes::from(vec![0x60, 0x00]));
        assert_eq!(account.storage.get(&U256::from(1)), Some(&U256::from(42)));
    }
}
