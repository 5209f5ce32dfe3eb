//! The call/return contract between the processor and the virtual machine.
//!
//! The interpreter itself is a collaborator behind the [`VirtualMachine`] trait: the processor
//! hands it a scoped [`EvmState`] carrying the available gas and the resolved execution
//! environment, and receives a tagged [`VmOutcome`] back. Interpreter faults are data, not
//! exceptions.

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::{
    constants::EMPTY_CODE_HASH, BlockHeader, ReleaseSpec, StateProvider, StorageProvider,
    TransactionSubstate, TransactionTrace,
};

/// How the processor entered the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionType {
    /// An ordinary message call.
    Transaction,
    /// A contract creation executing init code.
    DirectCreate,
    /// A call to a precompiled contract.
    DirectPrecompile,
}

/// Resolved code for one execution: either the cached code of an existing account, the inline
/// init image of a contract creation, or a sentinel identifying a precompile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeInfo {
    /// The code image to execute. Empty for code-less accounts and precompiles.
    pub code: Bytes,
    /// The hash of the code image.
    pub code_hash: B256,
    /// Set when the executing account is a precompile; the VM dispatches natively on it.
    pub precompile: Option<Address>,
}

impl CodeInfo {
    /// Resolved code of an account without code.
    pub const fn empty() -> Self {
        Self { code: Bytes::new(), code_hash: EMPTY_CODE_HASH, precompile: None }
    }

    /// An inline code image, hashed on construction. Used for contract-creation init code.
    pub fn inline(code: Bytes) -> Self {
        let code_hash = alloy_primitives::keccak256(&code);
        Self { code, code_hash, precompile: None }
    }

    /// Cached code of an existing account, identified by its stored hash.
    pub const fn cached(code: Bytes, code_hash: B256) -> Self {
        Self { code, code_hash, precompile: None }
    }

    /// The sentinel image of a precompiled contract.
    pub const fn precompile(address: Address) -> Self {
        Self { code: Bytes::new(), code_hash: EMPTY_CODE_HASH, precompile: Some(address) }
    }

    /// Returns `true` if there is no code to execute and no precompile to dispatch to.
    pub fn is_empty(&self) -> bool {
        self.precompile.is_none() && self.code_hash == EMPTY_CODE_HASH
    }
}

/// The block context visible to the executing code, snapshotted from the header at entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockEnv {
    /// The block number.
    pub number: u64,
    /// The block beneficiary.
    pub beneficiary: Address,
    /// The block gas limit.
    pub gas_limit: u64,
}

impl From<&BlockHeader> for BlockEnv {
    fn from(header: &BlockHeader) -> Self {
        Self { number: header.number, beneficiary: header.beneficiary, gas_limit: header.gas_limit }
    }
}

/// The environment one transaction executes in, built per transaction and handed to the VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    /// The apparent value of the call.
    pub value: U256,
    /// The value actually moved to the executing account.
    pub transfer_value: U256,
    /// The immediate caller.
    pub sender: Address,
    /// The account whose context the code runs in.
    pub executing_account: Address,
    /// The block context.
    pub block: BlockEnv,
    /// The effective gas price of the transaction.
    pub gas_price: U256,
    /// The input data of the call.
    pub input_data: Bytes,
    /// The resolved code to execute.
    pub code: CodeInfo,
    /// The transaction originator.
    pub originator: Address,
}

/// The scoped execution state of one VM entry.
///
/// It owns the gas available to the execution; the VM draws it down and the processor reads the
/// remainder back after the call. Ownership guarantees the gas accounting is released on every
/// exit path.
#[derive(Debug)]
pub struct EvmState {
    /// The gas still available to the execution.
    pub gas_available: u64,
    /// The environment the code executes in.
    pub env: ExecutionEnvironment,
    /// How the VM was entered.
    pub execution_type: ExecutionType,
}

impl EvmState {
    /// Creates the execution state for one VM entry.
    pub const fn new(
        gas_available: u64,
        env: ExecutionEnvironment,
        execution_type: ExecutionType,
    ) -> Self {
        Self { gas_available, env, execution_type }
    }
}

/// A failure signalled by the interpreter. The transaction consumes its whole gas limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum VmFault {
    /// The execution ran out of gas.
    #[error("out of gas")]
    OutOfGas,
    /// The execution hit an invalid or undefined instruction.
    #[error("invalid instruction")]
    InvalidInstruction,
    /// The operand stack grew past its limit.
    #[error("stack overflow")]
    StackOverflow,
    /// An instruction consumed more operands than the stack held.
    #[error("stack underflow")]
    StackUnderflow,
    /// Gas arithmetic overflowed.
    #[error("gas overflow")]
    GasOverflow,
}

/// The tagged result of one VM entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmOutcome {
    /// The execution ran to completion and its state changes stand.
    Success {
        /// The bytes returned by the execution; the deployed code image for creations.
        output: Bytes,
        /// The substate collected across the call tree.
        substate: TransactionSubstate,
    },
    /// The execution asked for its state changes to be thrown away. Unspent gas is still
    /// returned to the sender.
    Revert {
        /// The substate collected before the revert; the processor discards its logs and
        /// destroy set.
        substate: TransactionSubstate,
    },
    /// The interpreter faulted. Remaining gas is deemed zero.
    Fault(VmFault),
}

/// The virtual machine collaborator.
///
/// `run` executes the code resolved into `evm_state.env` against the providers and reports the
/// remaining gas through the [`EvmState`] handle. `cached_code_info` resolves the code of an
/// existing account for message calls.
pub trait VirtualMachine<S: StateProvider, U: StorageProvider> {
    /// Runs one execution to completion.
    fn run(
        &mut self,
        state: &mut S,
        storage: &mut U,
        evm_state: &mut EvmState,
        spec: &ReleaseSpec,
        trace: Option<&mut TransactionTrace>,
    ) -> VmOutcome;

    /// Resolves the cached code of the account at the address.
    fn cached_code_info(&mut self, state: &S, address: &Address) -> CodeInfo;
}

/// A [`VirtualMachine`] that executes no bytecode.
///
/// Value transfers and calls to code-less accounts succeed with an empty substate, creations
/// deploy an empty code image, and anything that would actually interpret bytecode faults. It
/// backs tooling that only exercises the transaction-level accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVm;

impl<S: StateProvider, U: StorageProvider> VirtualMachine<S, U> for NullVm {
    fn run(
        &mut self,
        state: &mut S,
        _storage: &mut U,
        evm_state: &mut EvmState,
        spec: &ReleaseSpec,
        _trace: Option<&mut TransactionTrace>,
    ) -> VmOutcome {
        if evm_state.execution_type == ExecutionType::Transaction &&
            !evm_state.env.code.is_empty()
        {
            return VmOutcome::Fault(VmFault::InvalidInstruction);
        }

        // The transfer credit is the VM's side of the value movement; the processor already
        // debited the sender under snapshot protection.
        credit_transfer_value(state, &evm_state.env, spec);

        VmOutcome::Success { output: Bytes::new(), substate: TransactionSubstate::default() }
    }

    fn cached_code_info(&mut self, state: &S, address: &Address) -> CodeInfo {
        let code_hash = state.code_hash(address);
        // The code bytes are irrelevant here: any non-empty image faults in `run`.
        CodeInfo::cached(Bytes::new(), code_hash)
    }
}

/// Credits the executing account with the transfer value, materializing it when absent.
///
/// Shared by [`VirtualMachine`] implementations: the recipient side of a value transfer is the
/// VM's responsibility, performed inside the snapshot scope so rollback undoes it.
pub fn credit_transfer_value<S: StateProvider>(
    state: &mut S,
    env: &ExecutionEnvironment,
    spec: &ReleaseSpec,
) {
    if state.account_exists(&env.executing_account) {
        state.add_to_balance(&env.executing_account, env.transfer_value, spec);
    } else {
        state.create_account(&env.executing_account, env.transfer_value);
    }
}
