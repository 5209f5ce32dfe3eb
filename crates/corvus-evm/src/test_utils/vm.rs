//! A scripted virtual machine for testing purposes.

use std::collections::{BTreeMap, VecDeque};

use alloy_primitives::{Address, Bytes, Log, U256};

use crate::{
    credit_transfer_value, CodeInfo, EvmState, ReleaseSpec, StateProvider, StorageProvider,
    TransactionSubstate, TransactionTrace, VirtualMachine, VmFault, VmOutcome,
};

/// The outcome a [`MockExecution`] settles with.
#[derive(Debug, Clone)]
enum PlannedOutcome {
    Success { output: Bytes, substate: TransactionSubstate },
    Revert { substate: TransactionSubstate },
    Fault(VmFault),
}

/// One scripted VM execution: the gas it consumes, the state it touches and the outcome it
/// reports.
#[derive(Debug, Clone)]
pub struct MockExecution {
    gas_cost: u64,
    storage_writes: Vec<(Address, U256, U256)>,
    outcome: PlannedOutcome,
}

impl MockExecution {
    /// A successful execution with no output, consuming no gas.
    pub fn success() -> Self {
        Self {
            gas_cost: 0,
            storage_writes: Vec::new(),
            outcome: PlannedOutcome::Success {
                output: Bytes::new(),
                substate: TransactionSubstate::default(),
            },
        }
    }

    /// An execution that reverts.
    pub fn revert() -> Self {
        Self {
            gas_cost: 0,
            storage_writes: Vec::new(),
            outcome: PlannedOutcome::Revert { substate: TransactionSubstate::reverted() },
        }
    }

    /// An execution that faults.
    pub fn fault(fault: VmFault) -> Self {
        Self { gas_cost: 0, storage_writes: Vec::new(), outcome: PlannedOutcome::Fault(fault) }
    }

    /// Sets the gas the execution consumes. Consuming more than is available turns the
    /// execution into an out-of-gas fault.
    pub fn with_gas_cost(mut self, gas: u64) -> Self {
        self.gas_cost = gas;
        self
    }

    /// Sets the bytes the execution returns.
    ///
    /// # Panics
    ///
    /// Panics when the planned outcome is not a success.
    pub fn with_output(mut self, output: impl Into<Bytes>) -> Self {
        match &mut self.outcome {
            PlannedOutcome::Success { output: slot, .. } => *slot = output.into(),
            _ => panic!("only a successful execution returns output"),
        }
        self
    }

    /// Appends a log to the collected substate.
    pub fn with_log(mut self, log: Log) -> Self {
        self.substate_mut().append_log(log);
        self
    }

    /// Schedules an account for destruction in the collected substate.
    pub fn with_destruction(mut self, address: Address) -> Self {
        self.substate_mut().schedule_destruction(address);
        self
    }

    /// Adds to the refund counter of the collected substate.
    pub fn with_refund(mut self, gas: u64) -> Self {
        self.substate_mut().add_refund(gas);
        self
    }

    /// Records a storage write the execution performs before settling.
    pub fn with_storage_write(mut self, address: Address, index: U256, value: U256) -> Self {
        self.storage_writes.push((address, index, value));
        self
    }

    fn substate_mut(&mut self) -> &mut TransactionSubstate {
        match &mut self.outcome {
            PlannedOutcome::Success { substate, .. } | PlannedOutcome::Revert { substate } => {
                substate
            }
            PlannedOutcome::Fault(_) => panic!("a faulted execution carries no substate"),
        }
    }
}

/// A [`VirtualMachine`] that replays scripted executions in order.
///
/// Every `run` pops the next [`MockExecution`]; with the script exhausted it behaves like an
/// empty successful execution. The transfer credit and scripted storage writes happen inside
/// the processor's snapshot scope, so rollback paths undo them like real VM effects.
#[derive(Debug, Clone, Default)]
pub struct MockVm {
    executions: VecDeque<MockExecution>,
    code_overrides: BTreeMap<Address, CodeInfo>,
}

impl MockVm {
    /// Creates a VM with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an execution to the script.
    pub fn plan(mut self, execution: MockExecution) -> Self {
        self.enqueue(execution);
        self
    }

    /// Appends an execution to the script.
    pub fn enqueue(&mut self, execution: MockExecution) {
        self.executions.push_back(execution);
    }

    /// Overrides the cached code resolved for an address.
    pub fn code_override(mut self, address: Address, code: CodeInfo) -> Self {
        self.code_overrides.insert(address, code);
        self
    }
}

impl<S: StateProvider, U: StorageProvider> VirtualMachine<S, U> for MockVm {
    fn run(
        &mut self,
        state: &mut S,
        storage: &mut U,
        evm_state: &mut EvmState,
        spec: &ReleaseSpec,
        _trace: Option<&mut TransactionTrace>,
    ) -> VmOutcome {
        let execution = self.executions.pop_front().unwrap_or_else(MockExecution::success);

        if execution.gas_cost > evm_state.gas_available {
            evm_state.gas_available = 0;
            return VmOutcome::Fault(VmFault::OutOfGas);
        }
        evm_state.gas_available -= execution.gas_cost;

        if let PlannedOutcome::Fault(fault) = &execution.outcome {
            evm_state.gas_available = 0;
            return VmOutcome::Fault(*fault);
        }

        credit_transfer_value(state, &evm_state.env, spec);
        for (address, index, value) in &execution.storage_writes {
            storage.set(address, *index, *value);
        }

        match execution.outcome {
            PlannedOutcome::Success { output, substate } => VmOutcome::Success { output, substate },
            PlannedOutcome::Revert { substate } => VmOutcome::Revert { substate },
            PlannedOutcome::Fault(_) => unreachable!("handled above"),
        }
    }

    fn cached_code_info(&mut self, state: &S, address: &Address) -> CodeInfo {
        self.code_overrides.get(address).cloned().unwrap_or_else(|| {
            let code_hash = state.code_hash(address);
            CodeInfo::cached(Bytes::new(), code_hash)
        })
    }
}
