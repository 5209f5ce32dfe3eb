//! Definitions of the hard-fork rule sets driving the transaction processor.

use core::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::BlockNumber;
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Spec id, naming the hard forks the transaction processor distinguishes.
///
/// Forks are cumulative: a later fork carries every rule of the earlier ones. Forks that only
/// reprice interpreter opcodes (e.g. `TangerineWhistle`) are invisible at this layer and share the
/// id of their predecessor.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms, missing_docs)]
#[non_exhaustive]
pub enum SpecId {
    /// The launch rule set.
    FRONTIER,
    /// The `Homestead` fork: contract creation surcharge, creation failure is fatal (EIP-2).
    HOMESTEAD,
    /// The `SpuriousDragon` fork: empty-account clearing (EIP-158) and the deployed code size
    /// cap (EIP-170).
    SPURIOUS_DRAGON,
    /// The `Byzantium` fork: status-code-only receipts (EIP-658) and four more precompiles.
    #[default]
    BYZANTIUM,
}

/// String identifiers for the hard forks.
#[allow(missing_docs)]
pub mod name {
    /// The string identifier for the `Frontier` rule set.
    pub const FRONTIER: &str = "Frontier";
    /// The string identifier for the `Homestead` fork.
    pub const HOMESTEAD: &str = "Homestead";
    /// The string identifier for the `SpuriousDragon` fork.
    pub const SPURIOUS_DRAGON: &str = "SpuriousDragon";
    /// The string identifier for the `Byzantium` fork.
    pub const BYZANTIUM: &str = "Byzantium";
}

impl SpecId {
    /// Checks if one given [`SpecId`] is enabled in the current [`SpecId`].
    ///
    /// Rule sets are backward compatible, so an earlier fork is always enabled in a later one.
    pub const fn is_enabled(self, other: Self) -> bool {
        other as u8 <= self as u8
    }
}

impl From<SpecId> for &'static str {
    fn from(spec_id: SpecId) -> Self {
        match spec_id {
            SpecId::FRONTIER => name::FRONTIER,
            SpecId::HOMESTEAD => name::HOMESTEAD,
            SpecId::SPURIOUS_DRAGON => name::SPURIOUS_DRAGON,
            SpecId::BYZANTIUM => name::BYZANTIUM,
        }
    }
}

/// The error returned when parsing an unknown hard-fork name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown hardfork")]
pub struct UnknownHardfork;

impl FromStr for SpecId {
    type Err = UnknownHardfork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            name::FRONTIER => Ok(Self::FRONTIER),
            name::HOMESTEAD => Ok(Self::HOMESTEAD),
            name::SPURIOUS_DRAGON => Ok(Self::SPURIOUS_DRAGON),
            name::BYZANTIUM => Ok(Self::BYZANTIUM),
            _ => Err(UnknownHardfork),
        }
    }
}

impl Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{}", s)
    }
}

/// The rule set active for one transaction: the fork flags the processor branches on and the
/// constants they select.
///
/// Built once per transaction from the block number through a [`SpecProvider`] and treated as
/// immutable for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseSpec {
    /// Contract-creation surcharge is charged and a failed code deposit fails the whole
    /// transaction.
    pub is_eip2_enabled: bool,
    /// Empty accounts are cleared on commit.
    pub is_eip158_enabled: bool,
    /// Deployed code is capped at [`constants::spurious_dragon::MAX_CODE_SIZE`].
    pub is_eip170_enabled: bool,
    /// Receipts carry a status code instead of a post-transaction state root.
    pub is_eip658_enabled: bool,
    /// Base cost of a transaction.
    pub gas_transaction: u64,
    /// Cost per zero byte of payload.
    pub gas_tx_data_zero: u64,
    /// Cost per non-zero byte of payload.
    pub gas_tx_data_non_zero: u64,
    /// Contract-creation surcharge, zero before it is enabled.
    pub gas_tx_create: u64,
    /// Cost per byte of deposited contract code.
    pub gas_code_deposit: u64,
    /// Gas refunded per destroyed account.
    pub gas_self_destruct_refund: u64,
    /// Maximum size of deployed contract code.
    pub max_code_size: usize,
    /// Number of recognized precompiled contracts.
    pub precompile_count: u8,
}

impl ReleaseSpec {
    /// Returns the rule set for a given [`SpecId`].
    pub const fn new(spec_id: SpecId) -> Self {
        let is_homestead = spec_id.is_enabled(SpecId::HOMESTEAD);
        let is_spurious_dragon = spec_id.is_enabled(SpecId::SPURIOUS_DRAGON);
        let is_byzantium = spec_id.is_enabled(SpecId::BYZANTIUM);

        Self {
            is_eip2_enabled: is_homestead,
            is_eip158_enabled: is_spurious_dragon,
            is_eip170_enabled: is_spurious_dragon,
            is_eip658_enabled: is_byzantium,
            gas_transaction: constants::frontier::GAS_TRANSACTION,
            gas_tx_data_zero: constants::frontier::GAS_TX_DATA_ZERO,
            gas_tx_data_non_zero: constants::frontier::GAS_TX_DATA_NON_ZERO,
            gas_tx_create: if is_homestead { constants::homestead::GAS_TX_CREATE } else { 0 },
            gas_code_deposit: constants::frontier::GAS_CODE_DEPOSIT,
            gas_self_destruct_refund: constants::frontier::GAS_SELF_DESTRUCT_REFUND,
            max_code_size: constants::spurious_dragon::MAX_CODE_SIZE,
            precompile_count: if is_byzantium {
                constants::byzantium::PRECOMPILE_COUNT
            } else {
                constants::frontier::PRECOMPILE_COUNT
            },
        }
    }
}

impl From<SpecId> for ReleaseSpec {
    fn from(spec_id: SpecId) -> Self {
        Self::new(spec_id)
    }
}

/// Resolves the rule set applicable at a block number.
#[auto_impl(&, Box, Arc)]
pub trait SpecProvider {
    /// Returns the [`SpecId`] of the fork active at the given block number.
    fn spec_id(&self, number: BlockNumber) -> SpecId;

    /// Returns the full [`ReleaseSpec`] active at the given block number.
    fn spec(&self, number: BlockNumber) -> ReleaseSpec {
        ReleaseSpec::new(self.spec_id(number))
    }
}

/// A block-number fork activation schedule.
///
/// The schedule maps each fork to the first block it is active at. Forks absent from the schedule
/// never activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkSchedule {
    /// Fork activations, sorted by activation block.
    activations: Vec<(SpecId, BlockNumber)>,
}

impl ForkSchedule {
    /// Creates the mainnet activation schedule.
    pub fn mainnet() -> Self {
        Self {
            activations: vec![
                (SpecId::FRONTIER, 0),
                (SpecId::HOMESTEAD, 1_150_000),
                (SpecId::SPURIOUS_DRAGON, 2_675_000),
                (SpecId::BYZANTIUM, 4_370_000),
            ],
        }
    }

    /// Creates a schedule with a single rule set active from genesis. Useful for tests and
    /// fixed-fork tooling.
    pub fn single(spec_id: SpecId) -> Self {
        Self { activations: vec![(spec_id, 0)] }
    }

    /// Inserts an activation into the schedule. An existing activation for the same fork is
    /// overwritten.
    pub fn insert(&mut self, spec_id: SpecId, block: BlockNumber) {
        self.activations.retain(|(id, _)| *id != spec_id);
        self.activations.push((spec_id, block));
        self.activations.sort_by_key(|(_, block)| *block);
    }
}

impl Default for ForkSchedule {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl SpecProvider for ForkSchedule {
    fn spec_id(&self, number: BlockNumber) -> SpecId {
        self.activations
            .iter()
            .take_while(|(_, block)| *block <= number)
            .map(|(id, _)| *id)
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_ordering_is_cumulative() {
        assert!(SpecId::BYZANTIUM.is_enabled(SpecId::FRONTIER));
        assert!(SpecId::BYZANTIUM.is_enabled(SpecId::SPURIOUS_DRAGON));
        assert!(!SpecId::FRONTIER.is_enabled(SpecId::HOMESTEAD));
    }

    #[test]
    fn mainnet_schedule_resolves_forks() {
        let schedule = ForkSchedule::mainnet();
        assert_eq!(schedule.spec_id(0), SpecId::FRONTIER);
        assert_eq!(schedule.spec_id(1_149_999), SpecId::FRONTIER);
        assert_eq!(schedule.spec_id(1_150_000), SpecId::HOMESTEAD);
        assert_eq!(schedule.spec_id(2_675_000), SpecId::SPURIOUS_DRAGON);
        assert_eq!(schedule.spec_id(10_000_000), SpecId::BYZANTIUM);
    }

    #[test]
    fn release_spec_flags_follow_forks() {
        let frontier = ReleaseSpec::new(SpecId::FRONTIER);
        assert!(!frontier.is_eip2_enabled);
        assert_eq!(frontier.gas_tx_create, 0);

        let homestead = ReleaseSpec::new(SpecId::HOMESTEAD);
        assert!(homestead.is_eip2_enabled);
        assert!(!homestead.is_eip658_enabled);
        assert_eq!(homestead.gas_tx_create, 32_000);

        let byzantium = ReleaseSpec::new(SpecId::BYZANTIUM);
        assert!(byzantium.is_eip170_enabled);
        assert!(byzantium.is_eip658_enabled);
        assert_eq!(byzantium.precompile_count, 8);
    }

    #[test]
    fn spec_id_roundtrips_through_name() {
        for spec_id in
            [SpecId::FRONTIER, SpecId::HOMESTEAD, SpecId::SPURIOUS_DRAGON, SpecId::BYZANTIUM]
        {
            assert_eq!(spec_id.to_string().parse::<SpecId>(), Ok(spec_id));
        }
        assert_eq!("Atlantis".parse::<SpecId>(), Err(UnknownHardfork));
    }
}
