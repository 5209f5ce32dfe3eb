//! Precompiled-contract address recognition.
//!
//! The processor only needs to know that an address is precompiled so it can select the
//! precompile entry path; the native implementations live in the VM.

use alloy_primitives::Address;

use crate::ReleaseSpec;

/// Returns `true` if the address names a precompiled contract under the active spec.
///
/// Precompiles occupy the low address range `0x01..=N`, where `N` grows with the forks that
/// introduce new ones.
pub fn is_precompile(address: &Address, spec: &ReleaseSpec) -> bool {
    let bytes = address.as_slice();
    if bytes[..19].iter().any(|byte| *byte != 0) {
        return false;
    }
    (1..=spec.precompile_count).contains(&bytes[19])
}
