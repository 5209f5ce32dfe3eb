//! End-to-end tests for contract-creation transactions.

use alloy_primitives::{address, b256, keccak256, Address, Bytes, U256};
use corvus_evm::{
    intrinsic_gas,
    test_utils::{Harness, MockExecution},
    BlockHeader, ReleaseSpec, SpecId, StateProvider, Transaction,
};

const ALICE: Address = address!("0000000000000000000000000000000000100000");
const MINER: Address = address!("0000000000000000000000000000000000200000");

fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u128.pow(18))
}

fn header() -> BlockHeader {
    BlockHeader { number: 0, beneficiary: MINER, gas_limit: 8_000_000, gas_used: 0 }
}

fn creation_tx(init: Vec<u8>, gas_limit: u64) -> Transaction {
    Transaction {
        sender: Some(ALICE),
        to: None,
        value: U256::ZERO,
        gas_price: U256::from(1),
        gas_limit,
        nonce: 0,
        init: Bytes::from(init),
        hash: b256!("00000000000000000000000000000000000000000000000000000000000000c1"),
        ..Transaction::default()
    }
}

fn funded_harness(spec_id: SpecId) -> Harness {
    let mut harness = Harness::new(spec_id);
    harness.state.set_account_balance(ALICE, ether(100));
    harness
}

#[test]
fn creation_installs_the_returned_code_and_charges_the_deposit() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    let deployed: Bytes = Bytes::from(vec![0x60u8; 10]);
    harness.vm.enqueue(MockExecution::success().with_output(deployed.clone()));
    let mut header = header();

    let tx = creation_tx(vec![0x60, 0x00], 100_000);
    let intrinsic = intrinsic_gas(&tx, &ReleaseSpec::new(SpecId::BYZANTIUM));
    let receipt = harness.execute(&tx, &mut header);

    assert!(receipt.is_success());
    let contract = ALICE.create(0);
    assert_eq!(receipt.recipient, Some(contract));

    // 10 deposited bytes at 200 gas each.
    assert_eq!(header.gas_used, intrinsic + 2_000);
    assert_eq!(harness.state.code(&contract), Some(&deployed));
    assert_eq!(harness.state.code_hash(&contract), keccak256(&deployed));
}

#[test]
fn creation_recipient_derives_from_the_pre_increment_nonce() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.state.set_account_nonce(ALICE, 3);
    harness.vm.enqueue(MockExecution::success().with_output(vec![1u8]));
    let mut header = header();

    let mut tx = creation_tx(Vec::new(), 100_000);
    tx.nonce = 3;
    let receipt = harness.execute(&tx, &mut header);

    assert!(receipt.is_success());
    assert_eq!(receipt.recipient, Some(ALICE.create(3)));
    assert_eq!(harness.state.nonce(&ALICE), 4);
}

#[test]
fn oversized_code_fails_the_creation_under_the_size_cap() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.vm.enqueue(MockExecution::success().with_output(vec![0u8; 0x6001]));
    let mut header = header();

    let gas_limit = 8_000_000;
    let receipt = harness.execute(&creation_tx(Vec::new(), gas_limit), &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, gas_limit);
    let contract = ALICE.create(0);
    assert!(harness.state.code(&contract).is_none());
    assert!(!harness.state.account_exists(&contract));
}

#[test]
fn unaffordable_deposit_is_fatal_once_eip2_is_active() {
    let mut harness = funded_harness(SpecId::HOMESTEAD);
    harness.vm.enqueue(MockExecution::success().with_output(vec![0u8; 100]));
    let mut header = header();

    // Enough to run, not enough for the 20_000 gas deposit.
    let tx = creation_tx(Vec::new(), 21_000 + 32_000 + 1_000);
    let receipt = harness.execute(&tx, &mut header);

    assert!(!receipt.is_success());
    assert_eq!(header.gas_used, tx.gas_limit);
    assert!(harness.state.code(&ALICE.create(0)).is_none());
}

#[test]
fn unaffordable_deposit_installs_empty_code_before_eip2() {
    let mut harness = funded_harness(SpecId::FRONTIER);
    harness.vm.enqueue(MockExecution::success().with_output(vec![0u8; 100]));
    let mut header = header();

    // No creation surcharge on Frontier, and the failed deposit is not fatal.
    let tx = creation_tx(Vec::new(), 21_000 + 1_000);
    let intrinsic = intrinsic_gas(&tx, &ReleaseSpec::new(SpecId::FRONTIER));
    assert_eq!(intrinsic, 21_000);
    let receipt = harness.execute(&tx, &mut header);

    assert!(receipt.is_success());
    // The contract exists with an empty code image and the deposit was not charged.
    let contract = ALICE.create(0);
    assert!(harness.state.account_exists(&contract));
    assert!(harness.state.code(&contract).is_none());
    assert_eq!(header.gas_used, intrinsic);
}

#[test]
fn creation_value_endows_the_new_contract() {
    let mut harness = funded_harness(SpecId::BYZANTIUM);
    harness.vm.enqueue(MockExecution::success().with_output(vec![1u8]));
    let mut header = header();

    let mut tx = creation_tx(Vec::new(), 100_000);
    tx.value = U256::from(1_234);
    let receipt = harness.execute(&tx, &mut header);

    assert!(receipt.is_success());
    assert_eq!(harness.state.balance(&ALICE.create(0)), U256::from(1_234));
}
