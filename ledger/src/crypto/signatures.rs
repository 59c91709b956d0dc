//! # Signature Service
//!
//! The ledger core never touches curve arithmetic. It talks to a
//! [`SignatureService`]: generate a keypair, sign a payload, verify a
//! signature. Keys and signatures cross this boundary as hex strings, the
//! same form the data model stores them in, so any asymmetric scheme that
//! can round-trip through hex can be dropped in.
//!
//! [`Ed25519Service`] is the implementation shipped with the crate.
//!
//! ## Contract
//!
//! - `sign` fails loudly on a malformed private key. A transaction cannot be
//!   half-signed, so the builder propagates this immediately.
//! - `verify` never fails. Malformed keys or signatures are just `false`.
//! - Implementations hold no mutable state and are safe to call from any
//!   thread.

use thiserror::Error;

use super::keys::{KeyError, Keypair, PublicKey, Signature};

/// Errors during signing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed private key: {0}")]
    MalformedPrivateKey(#[source] KeyError),
}

/// A freshly generated keypair in string form.
///
/// `public_key` is what goes into `Utxo::owner` and
/// `TransactionOutput::recipient`. `private_key` is what the builder needs
/// to spend. `Debug` is implemented by hand so the private half never ends up
/// in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Asymmetric signature primitives consumed by the builder and the
/// validator.
pub trait SignatureService: Send + Sync {
    /// Generate a new keypair.
    fn generate_keypair(&self) -> KeyPair;

    /// Sign `payload` with `private_key`, returning the encoded signature.
    fn sign(&self, payload: &[u8], private_key: &str) -> Result<String, SignatureError>;

    /// Check `signature` over `payload` against `public_key`.
    fn verify(&self, payload: &[u8], signature: &str, public_key: &str) -> bool;
}

/// Ed25519 signature service. Keys are 32-byte hex strings, signatures are
/// 64-byte hex strings.
///
/// # Example
///
/// ```
/// use utxo_ledger::crypto::{Ed25519Service, SignatureService};
///
/// let service = Ed25519Service;
/// let alice = service.generate_keypair();
/// let sig = service.sign(b"payload", &alice.private_key).unwrap();
/// assert!(service.verify(b"payload", &sig, &alice.public_key));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Service;

impl SignatureService for Ed25519Service {
    fn generate_keypair(&self) -> KeyPair {
        let kp = Keypair::generate();
        KeyPair {
            public_key: kp.public_key().to_hex(),
            private_key: kp.secret_key_hex(),
        }
    }

    fn sign(&self, payload: &[u8], private_key: &str) -> Result<String, SignatureError> {
        let kp = Keypair::from_hex(private_key).map_err(SignatureError::MalformedPrivateKey)?;
        Ok(kp.sign(payload).to_hex())
    }

    fn verify(&self, payload: &[u8], signature: &str, public_key: &str) -> bool {
        let Ok(public_key) = PublicKey::from_hex(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_hex(signature) else {
            return false;
        };
        public_key.verify(payload, &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let service = Ed25519Service;
        let kp = service.generate_keypair();
        let sig = service.sign(b"hello, ledger", &kp.private_key).unwrap();
        assert!(service.verify(b"hello, ledger", &sig, &kp.public_key));
    }

    #[test]
    fn test_wrong_key_fails() {
        let service = Ed25519Service;
        let alice = service.generate_keypair();
        let bob = service.generate_keypair();
        let sig = service.sign(b"msg", &alice.private_key).unwrap();
        assert!(!service.verify(b"msg", &sig, &bob.public_key));
    }

    #[test]
    fn test_wrong_message_fails() {
        let service = Ed25519Service;
        let kp = service.generate_keypair();
        let sig = service.sign(b"correct", &kp.private_key).unwrap();
        assert!(!service.verify(b"tampered", &sig, &kp.public_key));
    }

    #[test]
    fn malformed_private_key_is_an_error() {
        let service = Ed25519Service;
        let err = service.sign(b"msg", "not a key").unwrap_err();
        assert_eq!(
            err,
            SignatureError::MalformedPrivateKey(KeyError::InvalidSecretKey)
        );
    }

    #[test]
    fn verify_returns_false_on_garbage() {
        let service = Ed25519Service;
        let kp = service.generate_keypair();
        let sig = service.sign(b"msg", &kp.private_key).unwrap();

        assert!(!service.verify(b"msg", "zz", &kp.public_key));
        assert!(!service.verify(b"msg", &sig[..64], &kp.public_key));
        assert!(!service.verify(b"msg", &sig, "not-a-public-key"));
        assert!(!service.verify(b"msg", &sig, ""));
    }

    #[test]
    fn generated_keypairs_are_distinct() {
        let service = Ed25519Service;
        let a = service.generate_keypair();
        let b = service.generate_keypair();
        assert_ne!(a.public_key, b.public_key);
        assert_eq!(a.public_key.len(), 64);
        assert_eq!(a.private_key.len(), 64);
    }

    #[test]
    fn keypair_debug_redacts_private_key() {
        let kp = Ed25519Service.generate_keypair();
        let debug = format!("{:?}", kp);
        assert!(debug.contains(&kp.public_key));
        assert!(!debug.contains(&kp.private_key));
    }

    #[test]
    fn service_is_usable_across_threads() {
        let service = Ed25519Service;
        let kp = service.generate_keypair();
        let sig = service.sign(b"shared", &kp.private_key).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sig = sig.clone();
                let pk = kp.public_key.clone();
                std::thread::spawn(move || Ed25519Service.verify(b"shared", &sig, &pk))
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
