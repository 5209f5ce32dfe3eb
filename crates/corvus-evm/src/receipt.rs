//! Receipt assembly.

use alloy_primitives::{Address, Bloom, Log, B256};
use serde::{Deserialize, Serialize};

use crate::bloom::logs_bloom;

/// Receipt status code of a successful transaction.
pub const STATUS_SUCCESS: u8 = 1;
/// Receipt status code of a failed transaction.
pub const STATUS_FAILURE: u8 = 0;

/// The observable record of one applied transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// [`STATUS_SUCCESS`] or [`STATUS_FAILURE`].
    pub status: u8,
    /// The running gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// The logs the transaction surfaced. Empty on failure and rejection.
    pub logs: Vec<Log>,
    /// The 2048-bit bloom over the surfaced logs.
    pub bloom: Bloom,
    /// The resolved recipient: the explicit recipient of a message call, the derived address of
    /// an admitted contract creation, `None` for a creation rejected before admission.
    pub recipient: Option<Address>,
    /// The world-state root after the transaction. Present only before status-code receipts
    /// activate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_state_root: Option<B256>,
}

impl TransactionReceipt {
    /// Returns `true` if the transaction succeeded.
    pub const fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Assembles a receipt, deriving the bloom from the surfaced logs.
pub fn build_receipt(
    status: u8,
    cumulative_gas_used: u64,
    logs: Vec<Log>,
    recipient: Option<Address>,
    post_state_root: Option<B256>,
) -> TransactionReceipt {
    let bloom = if logs.is_empty() { Bloom::ZERO } else { logs_bloom(&logs) };
    TransactionReceipt { status, cumulative_gas_used, logs, bloom, recipient, post_state_root }
}
