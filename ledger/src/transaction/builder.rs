//! Transaction construction.
//!
//! Construction is strictly two-phase:
//!
//! 1. **Allocate identity**: pick a fresh UUID and a timestamp. The result
//!    is an [`UnsignedTransaction`], whose signing payload is now fixed.
//! 2. **Sign**: every input signs that payload with its own key, producing a
//!    [`Transaction`].
//!
//! The id is never derived from the signatures, and the signatures never
//! cover themselves, so there is no self-reference to untangle.
//!
//! The builder does not validate. An unbalanced transaction, or one spending
//! someone else's UTXO, builds fine; rejecting it is the validator's job.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::signing::{sign_transaction, signing_payload};
use super::types::{TransactionInput, TransactionOutput, Utxo, UtxoId};
use crate::crypto::{SignatureError, SignatureService};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that abort transaction construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The signature service refused the private key for one input.
    #[error("failed to sign input {input_index}: {source}")]
    Signing {
        input_index: usize,
        #[source]
        source: SignatureError,
    },

    /// A different number of private keys than inputs was supplied.
    #[error("expected {inputs} private keys, got {keys}")]
    KeyCountMismatch { inputs: usize, keys: usize },
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A signed transaction.
///
/// `id` doubles as the `tx_id` of every UTXO this transaction creates, so it
/// must never be reused. The builder assigns a UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Unix milliseconds at construction.
    pub timestamp: u64,
}

impl Transaction {
    /// The bytes every input signature covers.
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload(
            &self.id,
            self.inputs.iter().map(|input| &input.utxo_ref),
            &self.outputs,
            self.timestamp,
        )
    }

    /// References of all inputs, in input order.
    pub fn utxo_refs(&self) -> impl Iterator<Item = &UtxoId> {
        self.inputs.iter().map(|input| &input.utxo_ref)
    }

    /// Sum of output amounts. Widened so it cannot overflow.
    pub fn total_output(&self) -> u128 {
        self.outputs.iter().map(|o| o.amount as u128).sum()
    }
}

/// A transaction whose identity is fixed but whose inputs are not yet
/// signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub id: String,
    pub inputs: Vec<UtxoId>,
    pub outputs: Vec<TransactionOutput>,
    pub timestamp: u64,
}

impl UnsignedTransaction {
    /// Allocate a fresh id and the current timestamp.
    pub fn new(inputs: Vec<UtxoId>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            inputs,
            outputs,
            timestamp: now_millis(),
        }
    }

    /// Same bytes [`Transaction::signing_payload`] yields after signing.
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload(&self.id, self.inputs.iter(), &self.outputs, self.timestamp)
    }
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for signed transactions.
///
/// # Usage
///
/// ```
/// use utxo_ledger::crypto::{Ed25519Service, SignatureService};
/// use utxo_ledger::pool::UtxoSet;
/// use utxo_ledger::transaction::TransactionBuilder;
///
/// let service = Ed25519Service;
/// let alice = service.generate_keypair();
/// let bob = service.generate_keypair();
///
/// let pool = UtxoSet::from_genesis([(alice.public_key.clone(), 1_000)]);
/// let coin = pool.utxos_for_owner(&alice.public_key)[0].clone();
///
/// let tx = TransactionBuilder::new()
///     .input(&coin, &alice.private_key)
///     .output(300, &bob.public_key)
///     .output(700, &alice.public_key)
///     .sign(&service)
///     .unwrap();
/// assert_eq!(tx.inputs.len(), 1);
/// ```
///
/// `id` and `timestamp` default to a fresh UUID and the current time; tests
/// can pin them.
#[derive(Default)]
pub struct TransactionBuilder {
    id: Option<String>,
    timestamp: Option<u64>,
    inputs: Vec<(UtxoId, String)>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spend `utxo`, signing with `private_key`.
    pub fn input(self, utxo: &Utxo, private_key: &str) -> Self {
        self.input_ref(utxo.id.clone(), private_key)
    }

    /// Spend the UTXO at `utxo_ref` without holding its record.
    pub fn input_ref(mut self, utxo_ref: UtxoId, private_key: &str) -> Self {
        self.inputs.push((utxo_ref, private_key.to_string()));
        self
    }

    /// Pay `amount` to `recipient`.
    pub fn output(mut self, amount: u64, recipient: &str) -> Self {
        self.outputs.push(TransactionOutput::new(amount, recipient));
        self
    }

    /// Append several outputs at once.
    pub fn outputs(mut self, outputs: impl IntoIterator<Item = TransactionOutput>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// Pin the transaction id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Pin the timestamp (Unix milliseconds).
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Fix the identity without signing.
    ///
    /// Returns the unsigned transaction and the private keys in input order.
    pub fn build_unsigned(self) -> (UnsignedTransaction, Vec<String>) {
        let (refs, keys): (Vec<UtxoId>, Vec<String>) = self.inputs.into_iter().unzip();
        let mut unsigned = UnsignedTransaction::new(refs, self.outputs);
        if let Some(id) = self.id {
            unsigned.id = id;
        }
        if let Some(timestamp) = self.timestamp {
            unsigned.timestamp = timestamp;
        }
        (unsigned, keys)
    }

    /// Allocate identity, then sign every input.
    pub fn sign<S>(self, service: &S) -> Result<Transaction, BuildError>
    where
        S: SignatureService + ?Sized,
    {
        let (unsigned, keys) = self.build_unsigned();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        sign_transaction(unsigned, &keys, service)
    }
}

/// Assemble and sign a transaction spending `inputs` into `outputs`.
///
/// Each input pairs the UTXO being spent with the private key that signs
/// for it. No validation is performed.
pub fn create_transaction<S>(
    service: &S,
    inputs: &[(&Utxo, &str)],
    outputs: &[TransactionOutput],
) -> Result<Transaction, BuildError>
where
    S: SignatureService + ?Sized,
{
    inputs
        .iter()
        .fold(TransactionBuilder::new(), |builder, (utxo, key)| {
            builder.input(utxo, key)
        })
        .outputs(outputs.iter().cloned())
        .sign(service)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
