use clap::Parser;
use corvus_evm::{
    test_utils::{MemoryState, MemoryStorage},
    BlockHeader, ForkSchedule, MemoryTracer, NoopTracer, NullVm, SpecId, StateProvider, Tracer,
    Transaction, TransactionProcessor,
};
use tracing::{debug, info};

use crate::t8n::{
    dump_state, load_json, load_state, write_json, Env, Result, StateAlloc, TransactionInput,
    TransitionResults,
};

/// Executes a full state transition
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Collect per-transaction traces and embed them in the result document.
    #[arg(long)]
    pub trace: bool,

    /// Determines where to put the `alloc` of the post-state.
    /// `stdout` - into the stdout output
    /// <file> - into the file <file>
    #[arg(long = "output.alloc", default_value = "alloc.json")]
    pub output_alloc: String,

    /// Determines where to put the `result` (receipts, state root) of the transition.
    /// `stdout` - into the stdout output
    /// <file> - into the file <file>
    #[arg(long = "output.result", default_value = "result.json")]
    pub output_result: String,

    /// File name of where to find the prestate alloc to use.
    #[arg(long = "input.alloc", default_value = "alloc.json")]
    pub input_alloc: String,

    /// File name of where to find the prestate env to use.
    #[arg(long = "input.env", default_value = "env.json")]
    pub input_env: String,

    /// File name of where to find the transactions to apply.
    #[arg(long = "input.txs", default_value = "txs.json")]
    pub input_txs: String,

    /// Name of ruleset to use.
    #[arg(long = "state.fork", default_value_t = SpecId::BYZANTIUM)]
    pub fork: SpecId,
}

impl Cmd {
    /// Execute the state transition in three main steps:
    /// 1. Load inputs (alloc, env, txs)
    /// 2. Run the transaction processor over every transaction
    /// 3. Output results
    pub fn run(&self) -> Result<()> {
        let alloc: StateAlloc = load_json(&self.input_alloc)?;
        let env: Env = load_json(&self.input_env)?;
        let txs: Vec<TransactionInput> = load_json(&self.input_txs)?;
        info!(fork = %self.fork, txs = txs.len(), "running state transition");

        let (mut state, mut storage) = load_state(alloc);
        let mut header: BlockHeader = env.into();
        let specs = ForkSchedule::single(self.fork);
        let mut vm = NullVm;

        let mut results = TransitionResults::default();
        if self.trace {
            let mut tracer = MemoryTracer::new();
            self.apply(&mut state, &mut storage, &mut vm, &specs, &mut tracer, &txs, &mut header, &mut results);
            for tx in &txs {
                if let Some(trace) = tracer.trace(&tx.hash) {
                    results.traces.insert(tx.hash, trace.clone());
                }
            }
        } else {
            let mut tracer = NoopTracer;
            self.apply(&mut state, &mut storage, &mut vm, &specs, &mut tracer, &txs, &mut header, &mut results);
        }

        results.gas_used = header.gas_used;
        results.state_root = state.state_root();

        write_json(&results, &self.output_result)?;
        write_json(&dump_state(&state, &storage), &self.output_alloc)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply<T: Tracer>(
        &self,
        state: &mut MemoryState,
        storage: &mut MemoryStorage,
        vm: &mut NullVm,
        specs: &ForkSchedule,
        tracer: &mut T,
        txs: &[TransactionInput],
        header: &mut BlockHeader,
        results: &mut TransitionResults,
    ) {
        let mut processor = TransactionProcessor::new(state, storage, vm, specs, tracer);
        for input in txs {
            let tx: Transaction = input.clone().into();
            debug!(tx = %tx.hash, "applying transaction");
            let receipt = processor.execute(&tx, header);
            results.receipts.push(receipt);
        }
    }
}
