//! Intrinsic-cost and refund arithmetic.

use alloy_primitives::{Address, U256};

use crate::{ReleaseSpec, StateProvider, Transaction, TransactionSubstate};

/// Computes the intrinsic gas of a transaction: the cost charged for the envelope and its
/// payload before any bytecode executes.
///
/// The cost is the base transaction cost, plus the per-byte cost of the payload (zero bytes at
/// the zero-byte rate, the rest at the non-zero rate), plus the contract-creation surcharge once
/// the active spec enables it. Every constant comes from the [`ReleaseSpec`], so fork flags that
/// reprice any component are honored here.
pub fn intrinsic_gas(tx: &Transaction, spec: &ReleaseSpec) -> u64 {
    let payload = tx.payload();
    let zero_bytes = payload.iter().filter(|byte| **byte == 0).count() as u64;
    let non_zero_bytes = payload.len() as u64 - zero_bytes;

    let mut gas = spec.gas_transaction;
    gas = gas.saturating_add(zero_bytes.saturating_mul(spec.gas_tx_data_zero));
    gas = gas.saturating_add(non_zero_bytes.saturating_mul(spec.gas_tx_data_non_zero));
    if tx.is_contract_creation() {
        // `gas_tx_create` is zero until the surcharge fork activates.
        gas = gas.saturating_add(spec.gas_tx_create);
    }
    gas
}

/// Computes the gas refunded to the sender after execution.
///
/// The claim is the VM's refund counter plus the per-destruction refund, capped at half of the
/// gas actually consumed. A reverted execution forfeits the whole claim.
pub fn refund_amount(
    gas_limit: u64,
    unspent_gas: u64,
    substate: &TransactionSubstate,
    spec: &ReleaseSpec,
) -> u64 {
    if substate.should_revert {
        return 0;
    }
    let spent_gas = gas_limit - unspent_gas;
    let cap = spent_gas / 2;
    let claim = substate
        .refund
        .saturating_add((substate.destroy_list.len() as u64) * spec.gas_self_destruct_refund);
    cap.min(claim)
}

/// Settles the gas accounts of the sender after execution: credits the unspent gas plus the
/// refund back at the transaction's gas price and returns the gas actually charged.
pub fn settle_refund<S: StateProvider>(
    state: &mut S,
    sender: &Address,
    gas_price: U256,
    gas_limit: u64,
    unspent_gas: u64,
    substate: &TransactionSubstate,
    spec: &ReleaseSpec,
) -> u64 {
    let refund = refund_amount(gas_limit, unspent_gas, substate, spec);
    let returned = U256::from(unspent_gas + refund).saturating_mul(gas_price);
    state.add_to_balance(sender, returned, spec);
    gas_limit - unspent_gas - refund
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Bytes};

    use super::*;
    use crate::SpecId;

    fn byzantium() -> ReleaseSpec {
        ReleaseSpec::new(SpecId::BYZANTIUM)
    }

    #[test]
    fn plain_transfer_costs_the_base_fee() {
        let tx = Transaction {
            sender: Some(address!("0000000000000000000000000000000000100000")),
            to: Some(address!("0000000000000000000000000000000000100001")),
            ..Transaction::default()
        };
        assert_eq!(intrinsic_gas(&tx, &byzantium()), 21_000);
    }

    #[test]
    fn payload_bytes_are_charged_by_kind() {
        let tx = Transaction {
            to: Some(address!("0000000000000000000000000000000000100001")),
            data: Bytes::from(vec![0, 0, 0, 1, 2]),
            ..Transaction::default()
        };
        // 3 zero bytes at 4 gas, 2 non-zero bytes at 68 gas.
        assert_eq!(intrinsic_gas(&tx, &byzantium()), 21_000 + 3 * 4 + 2 * 68);
    }

    #[test]
    fn creation_surcharge_follows_the_fork_flag() {
        let tx = Transaction { init: Bytes::from(vec![1]), ..Transaction::default() };
        assert_eq!(intrinsic_gas(&tx, &ReleaseSpec::new(SpecId::FRONTIER)), 21_000 + 68);
        assert_eq!(intrinsic_gas(&tx, &byzantium()), 21_000 + 68 + 32_000);
    }

    #[test]
    fn refund_is_capped_at_half_the_spent_gas() {
        let substate = TransactionSubstate { refund: 1_000_000, ..TransactionSubstate::default() };
        assert_eq!(refund_amount(100_000, 20_000, &substate, &byzantium()), 40_000);
    }

    #[test]
    fn destructions_contribute_to_the_claim() {
        let mut substate = TransactionSubstate::default();
        substate.schedule_destruction(address!("0000000000000000000000000000000000100001"));
        assert_eq!(refund_amount(100_000, 0, &substate, &byzantium()), 24_000);
    }

    #[test]
    fn reverted_execution_forfeits_the_refund() {
        let mut substate = TransactionSubstate::reverted();
        substate.refund = 1_000_000;
        substate.schedule_destruction(address!("0000000000000000000000000000000000100001"));
        assert_eq!(refund_amount(100_000, 20_000, &substate, &byzantium()), 0);
    }
}
