//! End-to-end tests for the transaction processor over the in-memory providers.

use alloy_primitives::{address, b256, Address, Bytes, Log, U256};
use corvus_evm::{
    logs_bloom,
    test_utils::{Harness, MockExecution},
    BlockHeader, SpecId, StateProvider, StorageProvider, Transaction,
};

const ALICE: Address = address!("0000000000000000000000000000000000100000");
const BOB: Address = address!("0000000000000000000000000000000000100001");
const MINER: Address = address!("0000000000000000000000000000000000200000");

fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u128.pow(18))
}

fn header() -> BlockHeader {
    BlockHeader { number: 0, beneficiary: MINER, gas_limit: 8_000_000, gas_used: 0 }
}

fn transfer_tx(value: u64, gas_limit: u64) -> Transaction {
    Transaction {
        sender: Some(ALICE),
        to: Some(BOB),
        value: U256::from(value),
        gas_price: U256::from(1),
        gas_limit,
        nonce: 0,
        hash: b256!("00000000000000000000000000000000000000000000000000000000000000a1"),
        ..Transaction::default()
    }
}

fn funded_harness(spec_id: SpecId) -> Harness {
    let mut harness = Harness::new(spec_id);
    harness.state.set_account_balance(ALICE, ether(100));
    harness
}

#[test]
fn simple_transfer_succeeds() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::ZERO);
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(1, 21_000), &mut header);

    assert!(receipt.is_success());
    assert_eq!(receipt.cumulative_gas_used, 21_000);
    assert_eq!(receipt.recipient, Some(BOB));
    assert!(receipt.post_state_root.is_none());
    assert_eq!(header.gas_used, 21_000);

    assert_eq!(harness.state.balance(&ALICE), ether(100) - U256::from(1) - U256::from(21_000));
    assert_eq!(harness.state.balance(&BOB), U256::from(1));
    assert_eq!(harness.state.balance(&MINER), U256::from(21_000));
    assert_eq!(harness.state.nonce(&ALICE), 1);
}

#[test]
fn nonce_mismatch_yields_null_receipt() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let mut header = header();

    let mut tx = transfer_tx(1, 21_000);
    tx.nonce = 5;
    let receipt = harness.execute(&tx, &mut header);

    assert!(!receipt.is_success());
    assert_eq!(receipt.cumulative_gas_used, 0);
    assert!(receipt.logs.is_empty());
    assert_eq!(header.gas_used, 0);
    assert_eq!(harness.state.balance(&ALICE), ether(100));
    assert_eq!(harness.state.nonce(&ALICE), 0);
}

#[test]
fn unrecoverable_sender_yields_null_receipt() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let mut header = header();

    let mut tx = transfer_tx(1, 21_000);
    tx.sender = None;
    let receipt = harness.execute(&tx, &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, 0);
}

#[test]
fn gas_limit_below_intrinsic_yields_null_receipt() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(1, 20_999), &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, 0);
    assert_eq!(harness.state.nonce(&ALICE), 0);
}

#[test]
fn transaction_exceeding_remaining_block_gas_is_rejected() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let mut header = header();
    header.gas_used = header.gas_limit - 20_000;

    let receipt = harness.execute(&transfer_tx(1, 21_000), &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, header.gas_limit - 20_000);
}

#[test]
fn insufficient_balance_yields_null_receipt_and_materializes_sender() {
    let mut harness = Harness::new(SpecId::BYZANTIUM);
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(1, 21_000), &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, 0);
    // The absent sender is created with a zero balance before the checks run.
    assert!(harness.state.account_exists(&ALICE));
    assert_eq!(harness.state.balance(&ALICE), U256::ZERO);
    assert_eq!(harness.state.nonce(&ALICE), 0);
}

#[test]
fn out_of_gas_call_consumes_the_gas_limit() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    harness.vm.enqueue(MockExecution::success().with_gas_cost(200));
    let mut header = header();

    let gas_limit = 21_000 + 100;
    let receipt = harness.execute(&transfer_tx(1, gas_limit), &mut header);

    assert!(!receipt.is_success());
    assert!(receipt.logs.is_empty());
    assert_eq!(header.gas_used, gas_limit);
    // The fee covers the whole limit; the transfer itself was rolled back.
    assert_eq!(harness.state.balance(&ALICE), ether(100) - U256::from(gas_limit));
    assert_eq!(harness.state.balance(&BOB), U256::from(7));
    assert_eq!(harness.state.nonce(&ALICE), 1);
}

#[test]
fn revert_discards_logs_and_returns_unspent_gas() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    let log = |marker: u8| {
        Log::new_unchecked(BOB, Vec::new(), Bytes::from(vec![marker]))
    };
    harness.vm.enqueue(
        MockExecution::revert()
            .with_gas_cost(300)
            .with_log(log(1))
            .with_log(log(2))
            .with_refund(10_000),
    );
    let mut header = header();

    let gas_limit = 21_000 + 1_000;
    let receipt = harness.execute(&transfer_tx(1, gas_limit), &mut header);

    assert!(!receipt.is_success());
    assert!(receipt.logs.is_empty());
    assert!(receipt.bloom.is_zero());
    // 700 of the 1000 execution gas came back; the refund counter was forfeited.
    assert_eq!(header.gas_used, 21_000 + 300);
    assert_eq!(harness.state.balance(&ALICE), ether(100) - U256::from(21_000 + 300));
    assert_eq!(harness.state.balance(&BOB), U256::from(7));
}

#[test]
fn successful_call_surfaces_logs_and_bloom() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    let log = Log::new_unchecked(
        BOB,
        vec![b256!("00000000000000000000000000000000000000000000000000000000000000aa")],
        Bytes::from(vec![1, 2, 3]),
    );
    harness.vm.enqueue(MockExecution::success().with_log(log.clone()));
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(0, 30_000), &mut header);

    assert!(receipt.is_success());
    assert_eq!(receipt.logs, vec![log.clone()]);
    assert_eq!(receipt.bloom, logs_bloom([&log]));
}

#[test]
fn revert_restores_vm_state_and_storage_writes() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    harness.storage.set(&BOB, U256::from(1), U256::from(10));
    harness.vm.enqueue(
        MockExecution::revert()
            .with_storage_write(BOB, U256::from(1), U256::from(99))
            .with_storage_write(BOB, U256::from(2), U256::from(5)),
    );
    let mut header = header();

    harness.execute(&transfer_tx(3, 30_000), &mut header);

    assert_eq!(harness.storage.slot(&BOB, U256::from(1)), U256::from(10));
    assert_eq!(harness.storage.slot(&BOB, U256::from(2)), U256::ZERO);
    assert_eq!(harness.state.balance(&BOB), U256::from(7));
}

#[test]
fn successful_storage_writes_survive_commit() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    harness.vm.enqueue(
        MockExecution::success().with_storage_write(BOB, U256::from(1), U256::from(42)),
    );
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(0, 30_000), &mut header);

    assert!(receipt.is_success());
    assert_eq!(harness.storage.slot(&BOB, U256::from(1)), U256::from(42));
}

#[test]
fn value_is_conserved_across_the_participants() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    let before = harness.state.balance(&ALICE) +
        harness.state.balance(&BOB) +
        harness.state.balance(&MINER);
    let mut header = header();

    harness.execute(&transfer_tx(5, 21_000), &mut header);

    let after = harness.state.balance(&ALICE) +
        harness.state.balance(&BOB) +
        harness.state.balance(&MINER);
    assert_eq!(before, after);
}

#[test]
fn pre_byzantium_receipts_carry_the_state_root() {
    let mut harness = funded_harness(SpecId::SPURIOUS_DRAGON);
    harness.state.set_account_balance(BOB, U256::from(7));
    let mut header = header();

    let receipt = harness.execute(&transfer_tx(1, 21_000), &mut header);

    assert!(receipt.is_success());
    assert_eq!(receipt.post_state_root, Some(harness.state.state_root()));

    // Null receipts carry one as well.
    let mut stale = transfer_tx(1, 21_000);
    stale.nonce = 99;
    let rejected = harness.execute(&stale, &mut header);
    assert!(rejected.post_state_root.is_some());
}

#[test]
fn precompile_call_enters_the_vm() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let mut header = header();

    let mut tx = transfer_tx(1, 25_000);
    tx.to = Some(address!("0000000000000000000000000000000000000004"));
    let receipt = harness.execute(&tx, &mut header);

    assert!(receipt.is_success());
    assert_eq!(
        harness.state.balance(&address!("0000000000000000000000000000000000000004")),
        U256::from(1)
    );
}

#[test]
fn trace_records_the_spent_gas() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    let mut header = header();

    let tx = transfer_tx(1, 21_000);
    harness.execute(&tx, &mut header);

    let trace = harness.tracer.trace(&tx.hash).expect("trace saved");
    assert_eq!(trace.gas, 21_000);
    assert!(!trace.failed);
}

#[test]
fn gas_used_delta_matches_the_receipt() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_balance(BOB, U256::from(7));
    let mut header = header();

    let first = harness.execute(&transfer_tx(1, 21_000), &mut header);
    assert_eq!(first.cumulative_gas_used, header.gas_used);

    let mut second_tx = transfer_tx(1, 21_000);
    second_tx.nonce = 1;
    let second = harness.execute(&second_tx, &mut header);
    assert_eq!(second.cumulative_gas_used, 42_000);
    assert_eq!(header.gas_used, 42_000);
}
