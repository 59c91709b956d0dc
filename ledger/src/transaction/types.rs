//! Core value types: UTXO identifiers, UTXO records, inputs, and outputs.
//!
//! All of these are immutable once constructed. Inputs carry a [`UtxoId`]
//! reference, never the UTXO itself, so the UTXO set stays the single
//! authoritative copy of every record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::UTXO_KEY_SEPARATOR;

// ---------------------------------------------------------------------------
// UtxoId
// ---------------------------------------------------------------------------

/// Identifies one spendable output: the transaction that created it and the
/// output's position in that transaction.
///
/// Ordering is by `tx_id`, then `output_index`. The state root relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_id: String,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: impl Into<String>, output_index: u32) -> Self {
        Self {
            tx_id: tx_id.into(),
            output_index,
        }
    }

    /// Textual key form, `tx_id:output_index`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.tx_id, UTXO_KEY_SEPARATOR, self.output_index)
    }
}

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// An unspent transaction output as recorded in the UTXO set.
///
/// `owner` is the hex-encoded public key that must sign to spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub id: UtxoId,
    pub amount: u64,
    pub owner: String,
}

impl Utxo {
    pub fn new(id: UtxoId, amount: u64, owner: impl Into<String>) -> Self {
        Self {
            id,
            amount,
            owner: owner.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionInput
// ---------------------------------------------------------------------------

/// A reference to the UTXO being spent plus the signature authorizing it.
///
/// There is no owner field. Whoever validates the input looks the owner up
/// in the UTXO set; a caller-supplied owner could be forged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub utxo_ref: UtxoId,
    /// Hex-encoded signature over the transaction's signing payload.
    pub signature: String,
}

// ---------------------------------------------------------------------------
// TransactionOutput
// ---------------------------------------------------------------------------

/// A new UTXO-to-be: an amount and the public key that will own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub amount: u64,
    pub recipient: String,
}

impl TransactionOutput {
    pub fn new(amount: u64, recipient: impl Into<String>) -> Self {
        Self {
            amount,
            recipient: recipient.into(),
        }
    }
}
