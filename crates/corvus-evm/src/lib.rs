//! The transaction processor of the Corvus execution client.
//!
//! Applies single signed transactions against world state: intrinsic-cost validation, sender
//! admission, snapshot-protected VM execution, code-deposit semantics for creations, gas refund
//! settlement and receipt assembly, all parameterized by hard-fork rule sets. The interpreter,
//! trie persistence, transaction decoding and signer recovery are collaborators behind the
//! traits defined here.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod bloom;
pub use bloom::*;

mod gas;
pub use gas::*;

mod precompiles;
pub use precompiles::*;

mod processor;
pub use processor::*;

mod receipt;
pub use receipt::*;

mod spec;
pub use spec::*;

mod state;
pub use state::*;

mod substate;
pub use substate::*;

mod trace;
pub use trace::*;

mod transaction;
pub use transaction::*;

mod vm;
pub use vm::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
