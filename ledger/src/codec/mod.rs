//! # Wire Codec
//!
//! Compact binary encoding for moving transactions between processes. JSON
//! (via serde) stays available for humans; this format is for the wire.

pub mod binary;

pub use binary::{
    decode_transaction, encode_transaction, encoding_efficiency, CodecError, EncodingEfficiency,
};
