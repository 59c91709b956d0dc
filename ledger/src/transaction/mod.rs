//! # Transaction Module
//!
//! Value types, construction, signing, and validation of ledger
//! transactions. A [`Transaction`] consumes existing UTXOs and creates new
//! ones; nothing else changes the UTXO set.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      - UtxoId, Utxo, TransactionInput, TransactionOutput
//! signing.rs    - Canonical signing payload and per-input signing
//! builder.rs    - Transaction, UnsignedTransaction, TransactionBuilder
//! validation.rs - Validator with accumulating rule checks
//! ```
//!
//! ## Design Decisions
//!
//! - Amounts are `u64` in the smallest unit. Sums are taken as `u128` so a
//!   transaction with many large outputs cannot wrap.
//! - Inputs never carry an owner. The owner is read from the UTXO set at
//!   validation time.
//! - Every input signs the same payload, which covers id, input references,
//!   outputs, and timestamp, but no signature.

pub mod builder;
pub mod signing;
pub mod types;
pub mod validation;

pub use builder::{create_transaction, BuildError, Transaction, TransactionBuilder, UnsignedTransaction};
pub use signing::{sign_transaction, signing_payload};
pub use types::{TransactionInput, TransactionOutput, Utxo, UtxoId};
pub use validation::{
    validate_transaction, ErrorDetail, ValidationError, ValidationErrorKind, ValidationResult,
    Validator,
};
