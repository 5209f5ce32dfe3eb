//! Transaction and block header inputs of the processor.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

/// A signed transaction, decoded and sender-recovered upstream.
///
/// The processor treats it as an immutable input. `sender` is `None` when upstream signature
/// recovery failed, which the processor rejects without touching state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The recovered sender, `None` if the signature was unrecoverable.
    pub sender: Option<Address>,
    /// The recipient, `None` for a contract-creation transaction.
    pub to: Option<Address>,
    /// The transferred value in wei.
    pub value: U256,
    /// The price paid per unit of gas.
    pub gas_price: U256,
    /// The gas limit of the transaction.
    pub gas_limit: u64,
    /// The sender nonce the transaction was signed with.
    pub nonce: u64,
    /// The call data, empty for contract creations.
    pub data: Bytes,
    /// The init code, present iff the transaction is a contract creation.
    pub init: Bytes,
    /// The transaction hash, computed upstream over the signed envelope.
    pub hash: TxHash,
}

impl Transaction {
    /// Returns `true` if the transaction creates a contract.
    pub const fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Returns the byte payload the intrinsic cost is charged over: the init code for creations,
    /// the call data otherwise.
    pub const fn payload(&self) -> &Bytes {
        if self.is_contract_creation() {
            &self.init
        } else {
            &self.data
        }
    }
}

/// The header of the block the transaction executes in.
///
/// Shared with the caller; the processor increments `gas_used` by the gas the transaction
/// actually spent and touches nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// The block number, input to hard-fork resolution.
    pub number: u64,
    /// The beneficiary credited with the transaction fees.
    pub beneficiary: Address,
    /// The gas limit of the whole block.
    pub gas_limit: u64,
    /// The running gas used by the transactions applied so far.
    pub gas_used: u64,
}

impl BlockHeader {
    /// Returns the gas still available to transactions in this block.
    pub const fn gas_remaining(&self) -> u64 {
        self.gas_limit - self.gas_used
    }
}
