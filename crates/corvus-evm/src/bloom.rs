//! Log-bloom derivation for receipts.

use alloy_primitives::{Bloom, BloomInput, Log};

/// Folds a sequence of logs into a 2048-bit bloom filter.
///
/// For every log, the logger address and each topic are accrued through the standard
/// three-position folding scheme: three 11-bit positions taken from the first six bytes of the
/// KECCAK-256 hash of the item, reduced modulo 2048. The fold is purely additive, so the bloom
/// of a log set is the union of the blooms of its members; the empty set yields the zero bloom.
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for log in logs {
        accrue_log(&mut bloom, log);
    }
    bloom
}

/// Accrues a single log entry into the bloom.
fn accrue_log(bloom: &mut Bloom, log: &Log) {
    bloom.accrue(BloomInput::Raw(log.address.as_slice()));
    for topic in log.topics() {
        bloom.accrue(BloomInput::Raw(topic.as_slice()));
    }
}
