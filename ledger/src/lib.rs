// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # UTXO Ledger Core Library
//!
//! A single-node ledger that keeps a set of unspent transaction outputs and
//! decides which proposed transactions are allowed to change it. No blocks,
//! no mempool, no peers: just the state machine that every UTXO chain has
//! at its center.
//!
//! ## Architecture
//!
//! - **crypto**: Ed25519 keys and the [`SignatureService`] seam.
//! - **transaction**: Value types, signing payload, builder, and validator.
//! - **pool**: The UTXO set, the pool mutator, and a lock-guarded shared ledger.
//! - **codec**: Compact binary wire format for transactions.
//! - **config**: Protocol constants and validation policy.
//!
//! ## Lifecycle
//!
//! ```text
//! TransactionBuilder ──sign──▶ Transaction ──validate(&UtxoSet)──▶ ValidationResult
//!                                                   │ valid
//!                                                   ▼
//!                                      apply_transaction(&mut UtxoSet)
//! ```
//!
//! Validation never mutates. Application never validates. Callers that share
//! a set across threads go through [`SharedLedger::submit`], which does both
//! under one lock.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod pool;
pub mod transaction;

pub use codec::{decode_transaction, encode_transaction, CodecError};
pub use config::ValidationConfig;
pub use crypto::{Ed25519Service, KeyPair, SignatureError, SignatureService};
pub use pool::{apply_transaction, AppliedTransaction, Rejected, SharedLedger, UtxoSet, UtxoView};
pub use transaction::{
    create_transaction, validate_transaction, BuildError, Transaction, TransactionBuilder,
    TransactionInput, TransactionOutput, Utxo, UtxoId, ValidationError, ValidationErrorKind,
    ValidationResult, Validator,
};
