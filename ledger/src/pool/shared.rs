//! Thread-safe ledger: a UTXO set behind a lock plus the validator that
//! guards it.
//!
//! Validation and application are separate steps on a bare [`UtxoSet`]. Two
//! threads that each validate against the same state and then apply could
//! both spend one UTXO. [`SharedLedger::submit`] closes that gap by holding
//! the write lock across both steps. Reads take the shared lock and never
//! block one another.

use parking_lot::RwLock;
use thiserror::Error;

use super::apply::{apply_transaction, AppliedTransaction};
use super::utxo_set::UtxoSet;
use crate::config::STATE_ROOT_LENGTH;
use crate::crypto::{Ed25519Service, SignatureService};
use crate::transaction::{Transaction, Utxo, ValidationResult, Validator};

/// A submission the validator refused. The set was not touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction {tx_id} rejected with {} validation error(s)", .result.errors.len())]
pub struct Rejected {
    pub tx_id: String,
    pub result: ValidationResult,
}

/// A [`UtxoSet`] shared between threads.
pub struct SharedLedger<S = Ed25519Service> {
    state: RwLock<UtxoSet>,
    validator: Validator<S>,
}

impl SharedLedger<Ed25519Service> {
    /// Ledger over `set` with Ed25519 signatures and the strict policy.
    pub fn new(set: UtxoSet) -> Self {
        Self::with_validator(set, Validator::new(Ed25519Service))
    }
}

impl<S: SignatureService> SharedLedger<S> {
    pub fn with_validator(set: UtxoSet, validator: Validator<S>) -> Self {
        Self {
            state: RwLock::new(set),
            validator,
        }
    }

    /// Validate `tx` and, if it passes, apply it, all under one write lock.
    ///
    /// Of any number of concurrent submissions spending the same UTXO, at
    /// most one is accepted.
    pub fn submit(&self, tx: &Transaction) -> Result<AppliedTransaction, Rejected> {
        let mut state = self.state.write();

        let result = self.validator.validate(tx, &*state);
        if !result.valid {
            tracing::warn!(
                tx_id = %tx.id,
                kinds = ?result.kinds(),
                "transaction rejected"
            );
            return Err(Rejected {
                tx_id: tx.id.clone(),
                result,
            });
        }

        Ok(apply_transaction(tx, &mut state))
    }

    /// Validate against the current state without applying.
    pub fn validate(&self, tx: &Transaction) -> ValidationResult {
        self.validator.validate(tx, &*self.state.read())
    }

    /// Independent copy of the current state.
    pub fn snapshot(&self) -> UtxoSet {
        self.state.read().clone_snapshot()
    }

    pub fn balance(&self, public_key: &str) -> u128 {
        self.state.read().balance(public_key)
    }

    /// Copy of the UTXO at (`tx_id`, `output_index`), if unspent.
    pub fn get(&self, tx_id: &str, output_index: u32) -> Option<Utxo> {
        self.state.read().get(tx_id, output_index).cloned()
    }

    pub fn utxos_for_owner(&self, public_key: &str) -> Vec<Utxo> {
        self.state.read().utxos_for_owner(public_key)
    }

    pub fn state_root(&self) -> [u8; STATE_ROOT_LENGTH] {
        self.state.read().state_root()
    }

    pub fn into_inner(self) -> UtxoSet {
        self.state.into_inner()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
