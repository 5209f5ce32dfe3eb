//! The transaction-level executor.

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::{debug, trace};

use crate::{
    gas, precompiles,
    receipt::{build_receipt, STATUS_FAILURE, STATUS_SUCCESS},
    BlockEnv, BlockHeader, CodeInfo, EvmState, ExecutionEnvironment, ExecutionType, ReleaseSpec,
    Snapshot, SpecProvider, StateProvider, StorageProvider, Tracer, Transaction,
    TransactionReceipt, TransactionSubstate, TransactionTrace, VirtualMachine, VmOutcome,
};

/// Applies single signed transactions against world state.
///
/// The processor validates the transaction, debits the sender, drives the VM under snapshot
/// protection over both state stores, settles gas and fees, and produces the receipt. It borrows
/// its collaborators for its own lifetime and holds nothing across calls.
///
/// A transaction-level failure is never an error: every call to [`execute`](Self::execute)
/// returns a well-formed receipt. Rejections before VM entry yield the null receipt, which
/// contributes nothing to the block's gas.
#[derive(Debug)]
pub struct TransactionProcessor<'a, S, U, V, P, T> {
    state: &'a mut S,
    storage: &'a mut U,
    vm: &'a mut V,
    spec_provider: &'a P,
    tracer: &'a mut T,
}

impl<'a, S, U, V, P, T> TransactionProcessor<'a, S, U, V, P, T>
where
    S: StateProvider,
    U: StorageProvider,
    V: VirtualMachine<S, U>,
    P: SpecProvider,
    T: Tracer,
{
    /// Creates a processor over the given collaborators.
    pub fn new(
        state: &'a mut S,
        storage: &'a mut U,
        vm: &'a mut V,
        spec_provider: &'a P,
        tracer: &'a mut T,
    ) -> Self {
        Self { state, storage, vm, spec_provider, tracer }
    }

    /// Applies one transaction in the context of `header` and returns its receipt.
    ///
    /// `header.gas_used` is incremented by the gas the transaction spent; nothing else on the
    /// header is touched.
    pub fn execute(&mut self, tx: &Transaction, header: &mut BlockHeader) -> TransactionReceipt {
        let spec = self.spec_provider.spec(header.number);
        let gas_limit = tx.gas_limit;
        let gas_price = tx.gas_price;

        // An unrecoverable signature never reaches state.
        let Some(sender) = tx.sender else {
            trace!(tx = %tx.hash, "rejecting transaction without a recoverable sender");
            return self.null_receipt(header, tx.to, &spec);
        };

        let intrinsic_gas = gas::intrinsic_gas(tx, &spec);
        trace!(tx = %tx.hash, intrinsic_gas, gas_limit, "executing transaction");

        if gas_limit < intrinsic_gas {
            trace!(tx = %tx.hash, "rejecting transaction with gas limit below intrinsic cost");
            return self.null_receipt(header, tx.to, &spec);
        }

        if gas_limit > header.gas_remaining() {
            trace!(tx = %tx.hash, "rejecting transaction exceeding the remaining block gas");
            return self.null_receipt(header, tx.to, &spec);
        }

        // Absent senders are materialized with a zero balance before the balance and nonce
        // checks, which both read current values.
        if !self.state.account_exists(&sender) {
            self.state.create_account(&sender, U256::ZERO);
        }

        let required_balance =
            U256::from(intrinsic_gas).saturating_mul(gas_price).saturating_add(tx.value);
        if required_balance > self.state.balance(&sender) {
            trace!(tx = %tx.hash, "rejecting transaction with insufficient sender balance");
            return self.null_receipt(header, tx.to, &spec);
        }

        if tx.nonce != self.state.nonce(&sender) {
            trace!(tx = %tx.hash, tx_nonce = tx.nonce, "rejecting transaction with wrong nonce");
            return self.null_receipt(header, tx.to, &spec);
        }

        // Admission: the nonce increment and the gas pre-debit survive any later revert.
        self.state.increment_nonce(&sender);
        self.state.subtract_from_balance(
            &sender,
            U256::from(gas_limit).saturating_mul(gas_price),
            &spec,
        );
        self.state.commit(&spec);

        let mut unspent_gas = gas_limit - intrinsic_gas;

        // For creations the recipient derives from the nonce value before the admission
        // increment, which equals the validated transaction nonce.
        let recipient = tx.to.unwrap_or_else(|| sender.create(tx.nonce));

        // TODO: reject creations whose derived address is already occupied by a non-empty
        // account. Needs consensus-test coverage before it can be enabled.
        // if tx.is_contract_creation() &&
        //     self.state.account_exists(&recipient) &&
        //     !self.state.is_empty_account(&recipient)
        // {
        //     return self.null_receipt(header, Some(recipient), &spec);
        // }

        let snapshot = self.state.take_snapshot();
        let storage_snapshot = self.storage.take_snapshot();

        self.state.subtract_from_balance(&sender, tx.value, &spec);

        let execution_type = if precompiles::is_precompile(&recipient, &spec) {
            ExecutionType::DirectPrecompile
        } else if tx.is_contract_creation() {
            ExecutionType::DirectCreate
        } else {
            ExecutionType::Transaction
        };
        let code = match execution_type {
            ExecutionType::DirectPrecompile => CodeInfo::precompile(recipient),
            ExecutionType::DirectCreate => CodeInfo::inline(tx.init.clone()),
            ExecutionType::Transaction => self.vm.cached_code_info(self.state, &recipient),
        };

        let env = ExecutionEnvironment {
            value: tx.value,
            transfer_value: tx.value,
            sender,
            executing_account: recipient,
            block: BlockEnv::from(&*header),
            gas_price,
            input_data: tx.data.clone(),
            code,
            originator: sender,
        };
        let mut evm_state = EvmState::new(unspent_gas, env, execution_type);

        let mut trace = self.tracer.is_tracing_enabled().then(TransactionTrace::default);

        let outcome =
            self.vm.run(self.state, self.storage, &mut evm_state, &spec, trace.as_mut());

        // Both rollback paths settle with an empty reverted substate: no logs or destructions
        // survive, and the refund claim is forfeited.
        let mut substate = TransactionSubstate::reverted();
        let mut status = STATUS_FAILURE;
        let mut output = Bytes::new();

        match outcome {
            VmOutcome::Fault(fault) => {
                debug!(tx = %tx.hash, %fault, "execution fault, gas limit consumed");
                unspent_gas = 0;
                self.rollback(snapshot, storage_snapshot);
            }
            VmOutcome::Revert { substate: _ } => {
                debug!(tx = %tx.hash, "execution reverted");
                unspent_gas = evm_state.gas_available;
                self.rollback(snapshot, storage_snapshot);
            }
            VmOutcome::Success { output: returned, substate: collected } => {
                unspent_gas = evm_state.gas_available;
                let mut creation_failed = false;

                if tx.is_contract_creation() {
                    let code_len = returned.len();
                    let mut deposit_cost =
                        (code_len as u64).saturating_mul(spec.gas_code_deposit);
                    if spec.is_eip170_enabled && code_len > spec.max_code_size {
                        // Oversized code can never be deposited, whatever gas remains.
                        deposit_cost = u64::MAX;
                    }

                    if unspent_gas < deposit_cost {
                        if spec.is_eip2_enabled {
                            debug!(tx = %tx.hash, "code deposit unaffordable, creation fails");
                            unspent_gas = 0;
                            self.rollback(snapshot, storage_snapshot);
                            creation_failed = true;
                        }
                        // Before the fatal-creation rule the contract simply keeps an empty
                        // code image and the deposit is not charged.
                    } else {
                        unspent_gas -= deposit_cost;
                        let code_hash = self.state.update_code(&returned);
                        self.state.update_code_hash(&recipient, code_hash, &spec);
                    }
                }

                if !creation_failed {
                    debug!(tx = %tx.hash, logs = collected.logs.len(), "execution succeeded");
                    substate = collected;
                    output = returned;
                    status = STATUS_SUCCESS;
                }
            }
        }

        let spent_gas = gas::settle_refund(
            self.state,
            &sender,
            gas_price,
            gas_limit,
            unspent_gas,
            &substate,
            &spec,
        );
        header.gas_used += spent_gas;

        // The sweep runs after refund settlement so every destruction counted toward the claim.
        for address in &substate.destroy_list {
            self.state.delete_account(address);
        }

        // A beneficiary that destroyed itself burns the fee.
        let beneficiary = header.beneficiary;
        if !substate.destroy_list.contains(&beneficiary) {
            let fee = U256::from(spent_gas).saturating_mul(gas_price);
            if self.state.account_exists(&beneficiary) {
                self.state.add_to_balance(&beneficiary, fee, &spec);
            } else {
                self.state.create_account(&beneficiary, fee);
            }
        }

        self.storage.commit(&spec);
        self.state.commit(&spec);

        if let Some(mut trace) = trace {
            trace.gas = spent_gas;
            trace.failed = status == STATUS_FAILURE;
            trace.return_value = output;
            self.tracer.save_trace(tx.hash, trace);
        }

        let TransactionSubstate { logs, .. } = substate;
        build_receipt(
            status,
            header.gas_used,
            logs,
            Some(recipient),
            self.post_state_root(&spec),
        )
    }

    /// Restores both stores to the snapshots taken before VM entry.
    fn rollback(&mut self, snapshot: Snapshot, storage_snapshot: Snapshot) {
        self.storage.restore(storage_snapshot);
        self.state.restore(snapshot);
    }

    /// Builds the canonical rejection receipt: empty logs, empty bloom, no contribution to the
    /// block's gas.
    fn null_receipt(
        &self,
        header: &BlockHeader,
        recipient: Option<Address>,
        spec: &ReleaseSpec,
    ) -> TransactionReceipt {
        build_receipt(
            STATUS_FAILURE,
            header.gas_used,
            Vec::new(),
            recipient,
            self.post_state_root(spec),
        )
    }

    /// Returns the state root for receipts that still carry one.
    fn post_state_root(&self, spec: &ReleaseSpec) -> Option<B256> {
        (!spec.is_eip658_enabled).then(|| self.state.state_root())
    }
}
