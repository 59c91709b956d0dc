//! Signing payload construction and per-input signing.
//!
//! The payload is the canonical byte form of a transaction's non-signature
//! fields. The builder signs it, the validator recomputes it, and both go
//! through [`signing_payload`] so they cannot drift apart.
//!
//! Layout (all integers little-endian, all strings `u32` length-prefixed
//! UTF-8):
//!
//! ```text
//! domain_tag
//! id
//! input_count: u32   { tx_id, output_index: u32 } * input_count
//! output_count: u32  { amount: u64, recipient }   * output_count
//! timestamp: u64
//! ```
//!
//! Length prefixes rather than separators keep the encoding injective: no two
//! different transactions share a payload, whatever bytes their strings hold.

use super::builder::{BuildError, Transaction, UnsignedTransaction};
use super::types::{TransactionInput, TransactionOutput, UtxoId};
use crate::config::SIGNING_DOMAIN_TAG;
use crate::crypto::SignatureService;

/// Builds the canonical signing payload.
pub fn signing_payload<'a, I>(
    id: &str,
    utxo_refs: I,
    outputs: &[TransactionOutput],
    timestamp: u64,
) -> Vec<u8>
where
    I: ExactSizeIterator<Item = &'a UtxoId>,
{
    let mut buf = Vec::with_capacity(128 + utxo_refs.len() * 48 + outputs.len() * 80);

    buf.extend_from_slice(SIGNING_DOMAIN_TAG);
    put_str(&mut buf, id);

    buf.extend_from_slice(&(utxo_refs.len() as u32).to_le_bytes());
    for utxo_ref in utxo_refs {
        put_str(&mut buf, &utxo_ref.tx_id);
        buf.extend_from_slice(&utxo_ref.output_index.to_le_bytes());
    }

    buf.extend_from_slice(&(outputs.len() as u32).to_le_bytes());
    for output in outputs {
        buf.extend_from_slice(&output.amount.to_le_bytes());
        put_str(&mut buf, &output.recipient);
    }

    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Signs every input of `unsigned` and returns the finished transaction.
///
/// `private_keys[i]` signs input `i`. All inputs sign the same payload. If
/// any key is malformed the whole call fails and nothing is returned.
pub fn sign_transaction<S>(
    unsigned: UnsignedTransaction,
    private_keys: &[&str],
    service: &S,
) -> Result<Transaction, BuildError>
where
    S: SignatureService + ?Sized,
{
    if private_keys.len() != unsigned.inputs.len() {
        return Err(BuildError::KeyCountMismatch {
            inputs: unsigned.inputs.len(),
            keys: private_keys.len(),
        });
    }

    let payload = unsigned.signing_payload();

    let mut inputs = Vec::with_capacity(unsigned.inputs.len());
    for (input_index, (utxo_ref, key)) in unsigned.inputs.into_iter().zip(private_keys).enumerate()
    {
        let signature = service
            .sign(&payload, key)
            .map_err(|source| BuildError::Signing {
                input_index,
                source,
            })?;
        inputs.push(TransactionInput {
            utxo_ref,
            signature,
        });
    }

    tracing::debug!(
        tx_id = %unsigned.id,
        inputs = inputs.len(),
        outputs = unsigned.outputs.len(),
        "transaction signed"
    );

    Ok(Transaction {
        id: unsigned.id,
        inputs,
        outputs: unsigned.outputs,
        timestamp: unsigned.timestamp,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
