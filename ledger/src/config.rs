//! # Protocol Configuration & Constants
//!
//! Every fixed number the ledger relies on lives here, together with the
//! one piece of validation policy that is allowed to vary between
//! deployments.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Transaction id shared by every genesis UTXO. Output indices start at 0
/// and follow the iteration order of the genesis allocation.
pub const GENESIS_TX_ID: &str = "genesis";

/// Separator used in the textual `tx_id:output_index` key form.
pub const UTXO_KEY_SEPARATOR: char = ':';

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Domain tag prepended to every signing payload. A signature produced for
/// this ledger can never be replayed as a signature over some other
/// message format that happens to share a byte layout.
pub const SIGNING_DOMAIN_TAG: &[u8] = b"utxo-ledger/tx/v1";

/// Signing algorithm used by the bundled signature service.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Ed25519 secret key length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// State root length in bytes (BLAKE3 digest).
pub const STATE_ROOT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Wire format limits
// ---------------------------------------------------------------------------

/// Longest transaction id (and UTXO reference tx id) the wire format can
/// carry: one length byte.
pub const MAX_WIRE_ID_LENGTH: usize = u8::MAX as usize;

/// Maximum inputs per encoded transaction: one count byte.
pub const MAX_WIRE_INPUTS: usize = u8::MAX as usize;

/// Maximum outputs per encoded transaction: one count byte.
pub const MAX_WIRE_OUTPUTS: usize = u8::MAX as usize;

/// Longest signature (raw bytes) or recipient the wire format can carry:
/// two length bytes.
pub const MAX_WIRE_FIELD_LENGTH: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// Validation policy
// ---------------------------------------------------------------------------

/// Tunable validation policy.
///
/// The only knob is how zero-amount outputs are treated. The default is
/// strict: an output must carry a positive amount, otherwise the validator
/// reports `NEGATIVE_AMOUNT`. A validator instance applies one policy to
/// every output it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept outputs whose amount is exactly zero.
    pub allow_zero_amount_outputs: bool,
}

impl ValidationConfig {
    /// Strict policy: every output amount must be > 0.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient policy: zero-amount outputs pass the positivity check.
    pub fn allow_zero_amounts() -> Self {
        Self {
            allow_zero_amount_outputs: true,
        }
    }
}
