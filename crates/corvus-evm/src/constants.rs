//! Constants for the Corvus transaction processor.
//!
//! It groups the constants by the hard fork that introduced them as sub-modules.

use alloy_primitives::{b256, B256};

/// KECCAK-256 hash of the empty byte string, the code hash of an account without code.
pub const EMPTY_CODE_HASH: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// Constants active since the `Frontier` launch spec.
pub mod frontier {
    /// The base cost charged for every transaction before any bytecode executes.
    pub const GAS_TRANSACTION: u64 = 21_000;
    /// The cost per zero byte of transaction payload.
    pub const GAS_TX_DATA_ZERO: u64 = 4;
    /// The cost per non-zero byte of transaction payload.
    pub const GAS_TX_DATA_NON_ZERO: u64 = 68;
    /// The cost per byte of code deposited by a contract creation.
    pub const GAS_CODE_DEPOSIT: u64 = 200;
    /// The gas refunded for every account scheduled for destruction.
    pub const GAS_SELF_DESTRUCT_REFUND: u64 = 24_000;
    /// The number of precompiled contracts in the launch spec.
    pub const PRECOMPILE_COUNT: u8 = 4;
}

/// Constants introduced by the `Homestead` fork.
pub mod homestead {
    /// The surcharge for a contract-creation transaction.
    pub const GAS_TX_CREATE: u64 = 32_000;
}

/// Constants introduced by the `SpuriousDragon` fork.
pub mod spurious_dragon {
    /// The maximum size of deployed contract code.
    pub const MAX_CODE_SIZE: usize = 0x6000;
}

/// Constants introduced by the `Byzantium` fork.
pub mod byzantium {
    /// The number of precompiled contracts after the modexp and pairing additions.
    pub const PRECOMPILE_COUNT: u8 = 8;
}
