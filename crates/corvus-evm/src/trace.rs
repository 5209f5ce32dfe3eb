//! Transaction tracing hooks.

use std::collections::HashMap;

use alloy_primitives::{Bytes, TxHash};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

/// The summary trace of one applied transaction.
///
/// The processor only allocates one when the tracer is enabled, fills it after settlement and
/// hands it off keyed by the transaction hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTrace {
    /// The gas the transaction actually spent.
    pub gas: u64,
    /// Whether the transaction failed.
    pub failed: bool,
    /// The bytes the execution returned.
    pub return_value: Bytes,
}

/// Sink for transaction traces.
#[auto_impl(&mut, Box)]
pub trait Tracer {
    /// Returns `true` if traces should be collected. The processor skips all trace bookkeeping
    /// otherwise.
    fn is_tracing_enabled(&self) -> bool;

    /// Stores the trace of an applied transaction.
    fn save_trace(&mut self, tx_hash: TxHash, trace: TransactionTrace);
}

/// A [`Tracer`] that collects nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl NoopTracer {
    /// Consumes and wraps `self` into a boxed instance of the [`Tracer`] trait.
    pub fn boxed(self) -> Box<dyn Tracer> {
        Box::new(self)
    }
}

impl Tracer for NoopTracer {
    fn is_tracing_enabled(&self) -> bool {
        false
    }

    fn save_trace(&mut self, _tx_hash: TxHash, _trace: TransactionTrace) {}
}

/// A [`Tracer`] that keeps every trace in memory, keyed by transaction hash.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracer {
    traces: HashMap<TxHash, TransactionTrace>,
}

impl MemoryTracer {
    /// Creates an empty tracer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trace saved for a transaction, if any.
    pub fn trace(&self, tx_hash: &TxHash) -> Option<&TransactionTrace> {
        self.traces.get(tx_hash)
    }

    /// Returns the number of saved traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns `true` if no trace was saved.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl Tracer for MemoryTracer {
    fn is_tracing_enabled(&self) -> bool {
        true
    }

    fn save_trace(&mut self, tx_hash: TxHash, trace: TransactionTrace) {
        self.traces.insert(tx_hash, trace);
    }
}
