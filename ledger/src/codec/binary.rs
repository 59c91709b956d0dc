//! Compact binary transaction encoding.
//!
//! All integers are big-endian. Strings are UTF-8. Signatures travel as raw
//! bytes and are hex-encoded again on decode.
//!
//! ```text
//! id_len: u8          id
//! timestamp: u64
//! input_count: u8     { tx_id_len: u8  tx_id  output_index: u32  sig_len: u16  sig }
//! output_count: u8    { amount: u64  recipient_len: u16  recipient }
//! ```
//!
//! Decoding is strict: every byte must be consumed, and any truncation or
//! invalid UTF-8 is an error. Decoded signatures are lowercase hex, so a
//! transaction round-trips exactly when its signatures already are.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{MAX_WIRE_FIELD_LENGTH, MAX_WIRE_ID_LENGTH, MAX_WIRE_INPUTS, MAX_WIRE_OUTPUTS};
use crate::transaction::{Transaction, TransactionInput, TransactionOutput, UtxoId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CodecError {
    /// A field is longer than its length prefix can express.
    #[error("{field} is {len} bytes, wire limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{count} inputs exceed the wire limit of 255")]
    TooManyInputs { count: usize },

    #[error("{count} outputs exceed the wire limit of 255")]
    TooManyOutputs { count: usize },

    #[error("input {input_index}: signature is not valid hex")]
    InvalidSignatureHex {
        input_index: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("truncated {field}: need {needed} bytes, {remaining} left")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("{count} trailing bytes after transaction")]
    TrailingBytes { count: usize },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `tx` in the wire format.
pub fn encode_transaction(tx: &Transaction) -> Result<Bytes, CodecError> {
    if tx.inputs.len() > MAX_WIRE_INPUTS {
        return Err(CodecError::TooManyInputs {
            count: tx.inputs.len(),
        });
    }
    if tx.outputs.len() > MAX_WIRE_OUTPUTS {
        return Err(CodecError::TooManyOutputs {
            count: tx.outputs.len(),
        });
    }

    let mut buf = BytesMut::with_capacity(
        1 + tx.id.len() + 8 + 2 + tx.inputs.len() * 112 + tx.outputs.len() * 74,
    );

    put_short(&mut buf, "transaction id", tx.id.as_bytes())?;
    buf.put_u64(tx.timestamp);

    buf.put_u8(tx.inputs.len() as u8);
    for (input_index, input) in tx.inputs.iter().enumerate() {
        put_short(&mut buf, "input tx id", input.utxo_ref.tx_id.as_bytes())?;
        buf.put_u32(input.utxo_ref.output_index);

        let signature = hex::decode(&input.signature)
            .map_err(|source| CodecError::InvalidSignatureHex {
                input_index,
                source,
            })?;
        put_long(&mut buf, "signature", &signature)?;
    }

    buf.put_u8(tx.outputs.len() as u8);
    for output in &tx.outputs {
        buf.put_u64(output.amount);
        put_long(&mut buf, "recipient", output.recipient.as_bytes())?;
    }

    Ok(buf.freeze())
}

fn put_short(buf: &mut BytesMut, field: &'static str, bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.len() > MAX_WIRE_ID_LENGTH {
        return Err(CodecError::FieldTooLong {
            field,
            len: bytes.len(),
            max: MAX_WIRE_ID_LENGTH,
        });
    }
    buf.put_u8(bytes.len() as u8);
    buf.put_slice(bytes);
    Ok(())
}

fn put_long(buf: &mut BytesMut, field: &'static str, bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.len() > MAX_WIRE_FIELD_LENGTH {
        return Err(CodecError::FieldTooLong {
            field,
            len: bytes.len(),
            max: MAX_WIRE_FIELD_LENGTH,
        });
    }
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a transaction from `bytes`. The whole slice must be one
/// transaction.
pub fn decode_transaction(mut bytes: &[u8]) -> Result<Transaction, CodecError> {
    let buf = &mut bytes;

    let id_len = take_u8(buf, "id length")?;
    let id = take_string(buf, "transaction id", usize::from(id_len))?;
    let timestamp = need(buf, "timestamp", 8)?.get_u64();

    let input_count = take_u8(buf, "input count")?;
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        let tx_id_len = take_u8(buf, "input tx id length")?;
        let tx_id = take_string(buf, "input tx id", usize::from(tx_id_len))?;
        let output_index = need(buf, "output index", 4)?.get_u32();
        let sig_len = need(buf, "signature length", 2)?.get_u16();
        let signature = hex::encode(take_slice(buf, "signature", usize::from(sig_len))?);
        inputs.push(TransactionInput {
            utxo_ref: UtxoId::new(tx_id, output_index),
            signature,
        });
    }

    let output_count = take_u8(buf, "output count")?;
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        let amount = need(buf, "amount", 8)?.get_u64();
        let recipient_len = need(buf, "recipient length", 2)?.get_u16();
        let recipient = take_string(buf, "recipient", usize::from(recipient_len))?;
        outputs.push(TransactionOutput { amount, recipient });
    }

    if buf.has_remaining() {
        return Err(CodecError::TrailingBytes {
            count: buf.remaining(),
        });
    }

    Ok(Transaction {
        id,
        inputs,
        outputs,
        timestamp,
    })
}

/// Ensure `n` bytes remain, then hand the buffer back for reading.
fn need<'a, 'b>(
    buf: &'a mut &'b [u8],
    field: &'static str,
    n: usize,
) -> Result<&'a mut &'b [u8], CodecError> {
    if buf.remaining() < n {
        return Err(CodecError::Truncated {
            field,
            needed: n,
            remaining: buf.remaining(),
        });
    }
    Ok(buf)
}

fn take_u8(buf: &mut &[u8], field: &'static str) -> Result<u8, CodecError> {
    Ok(need(buf, field, 1)?.get_u8())
}

fn take_slice<'b>(buf: &mut &'b [u8], field: &'static str, n: usize) -> Result<&'b [u8], CodecError> {
    need(buf, field, n)?;
    let data: &'b [u8] = *buf;
    let (head, tail) = data.split_at(n);
    *buf = tail;
    Ok(head)
}

fn take_string(buf: &mut &[u8], field: &'static str, n: usize) -> Result<String, CodecError> {
    let raw = take_slice(buf, field, n)?;
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8 { field })
}

// ---------------------------------------------------------------------------
// Efficiency report
// ---------------------------------------------------------------------------

/// Size comparison between the JSON and binary forms of one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingEfficiency {
    pub json_size: usize,
    pub binary_size: usize,
    /// `(json - binary) / json`, as a percentage with one decimal, e.g.
    /// `"61.3%"`.
    pub savings: String,
}

impl EncodingEfficiency {
    pub fn savings_ratio(&self) -> f64 {
        if self.json_size == 0 {
            return 0.0;
        }
        (self.json_size as f64 - self.binary_size as f64) / self.json_size as f64
    }
}

/// Compare the JSON and binary sizes of `tx`.
pub fn encoding_efficiency(tx: &Transaction) -> Result<EncodingEfficiency, CodecError> {
    let json_size = serde_json::to_vec(tx)?.len();
    let binary_size = encode_transaction(tx)?.len();

    let mut report = EncodingEfficiency {
        json_size,
        binary_size,
        savings: String::new(),
    };
    report.savings = format!("{:.1}%", report.savings_ratio() * 100.0);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
