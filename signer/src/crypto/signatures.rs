//! # Signing Backends
//!
//! Witness production goes through the [`SigningBackend`] trait so the
//! engine never touches key bytes directly. The default backend,
//! [`Ed25519Bip32Backend`], signs in-process with derived extended keys.
//! Hardware wallets or a remote signer plug in by implementing the same
//! trait.
//!
//! ## Strictness
//!
//! Verification uses `ed25519-dalek`'s strict mode. Every signature this
//! crate produces passes it, and the ledger rejects the malleable ones
//! anyway.

use super::keys::{PrivateKey, PublicKey, Signature};

/// Anything that can produce an Ed25519 signature for one key.
///
/// Implementations must be deterministic for a given message; the witness
/// engine relies on that to make signing idempotent.
pub trait SigningBackend: Send + Sync {
    /// Verification key that goes into the witness.
    fn public_key(&self) -> PublicKey;

    /// Signature over `message` (a 32-byte transaction hash in practice).
    fn sign(&self, message: &[u8]) -> Signature;
}

/// In-process backend holding a derived extended secret.
#[derive(Clone, Debug)]
pub struct Ed25519Bip32Backend {
    key: PrivateKey,
}

impl Ed25519Bip32Backend {
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }
}

impl From<PrivateKey> for Ed25519Bip32Backend {
    fn from(key: PrivateKey) -> Self {
        Self::new(key)
    }
}

impl SigningBackend for Ed25519Bip32Backend {
    fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        self.key.sign(message)
    }
}

impl SigningBackend for PrivateKey {
    fn public_key(&self) -> PublicKey {
        PrivateKey::public_key(self)
    }

    fn sign(&self, message: &[u8]) -> Signature {
        PrivateKey::sign(self, message)
    }
}

/// Verify an Ed25519 signature against a public key and message.
///
/// Returns `true` if the signature is valid, `false` otherwise. No reason
/// is given for a rejection.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::XPrv;

    fn backend(index: u32) -> Ed25519Bip32Backend {
        let root = XPrv::from_bip39_entropy(&[7u8; 16], b"");
        Ed25519Bip32Backend::new(root.derive(index).to_raw_key().unwrap())
    }

    #[test]
    fn test_backend_sign_and_verify() {
        let signer = backend(0);
        let hash = [0xabu8; 32];
        let sig = signer.sign(&hash);
        assert!(verify(&signer.public_key(), &hash, &sig));
    }

    #[test]
    fn test_verify_rejects_tampered_message() {
        let signer = backend(0);
        let sig = signer.sign(b"original");
        assert!(!verify(&signer.public_key(), b"tampered", &sig));
    }

    #[test]
    fn test_verify_rejects_bit_flipped_signature() {
        let signer = backend(1);
        let mut bytes = *signer.sign(b"msg").as_bytes();
        bytes[10] ^= 0x01;
        assert!(!verify(
            &signer.public_key(),
            b"msg",
            &Signature::from_bytes(bytes)
        ));
    }

    #[test]
    fn test_backend_is_object_safe() {
        let backends: Vec<Box<dyn SigningBackend>> = vec![Box::new(backend(0)), Box::new(backend(1))];
        let keys: Vec<_> = backends.iter().map(|b| b.public_key()).collect();
        assert_ne!(keys[0], keys[1]);
    }
}
