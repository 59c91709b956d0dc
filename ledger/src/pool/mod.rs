//! # Pool Module
//!
//! The UTXO set and everything that writes to it.
//!
//! ```text
//! utxo_set.rs - UtxoSet (ordered store, owner queries, state root) and UtxoView
//! apply.rs    - apply_transaction, the only state transition
//! shared.rs   - SharedLedger, validate-and-apply under one lock
//! ```

pub mod apply;
pub mod shared;
pub mod utxo_set;

pub use apply::{apply_transaction, AppliedTransaction};
pub use shared::{Rejected, SharedLedger};
pub use utxo_set::{UtxoSet, UtxoView};
