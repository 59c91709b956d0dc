//! # Cryptographic Primitives
//!
//! Ed25519 keys and the signature-service seam the ledger core calls
//! through. Nothing here is hand-rolled: `keys` wraps ed25519-dalek, and
//! `signatures` adapts it to the string-typed contract the data model uses.

pub mod keys;
pub mod signatures;

pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use signatures::{Ed25519Service, KeyPair, SignatureError, SignatureService};
