//! # Extended Keys
//!
//! Ed25519-BIP32 key material: extended private keys ([`XPrv`]), extended
//! public keys ([`XPub`]), the terminal signing key ([`PrivateKey`]) and the
//! raw verification key ([`PublicKey`]).
//!
//! An extended private key is 96 bytes:
//!
//! ```text
//! +----------------+----------------+----------------+
//! |   kL (32 B)    |   kR (32 B)    | chain code (32)|
//! +----------------+----------------+----------------+
//!   secret scalar    nonce prefix     derivation salt
//! ```
//!
//! Derivation follows scheme V2 of the Ed25519-BIP32 paper (little-endian
//! index serialization, `kL' = kL + 8·trunc28(ZL)`, `kR' = kR + ZR`).
//!
//! ## Security considerations
//!
//! - Secret bytes are zeroized on drop.
//! - `Debug` never prints secret bytes. If you add logging to this module,
//!   log public keys or nothing.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::hazmat::{raw_sign, ExpandedSecretKey};
use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

use crate::config::{HARDENED_OFFSET, ICARUS_PBKDF2_ROUNDS, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Extended private key length (kL ‖ kR ‖ chain code).
pub const XPRV_LENGTH: usize = 96;

/// Extended public key length (point ‖ chain code).
pub const XPUB_LENGTH: usize = 64;

/// Extended Ed25519 secret length (kL ‖ kR).
pub const EXTENDED_SECRET_LENGTH: usize = 64;

pub const CHAIN_CODE_LENGTH: usize = 32;

type HmacSha512 = Hmac<Sha512>;

/// Errors that can occur during key operations.
///
/// Deliberately terse about secret contents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid extended private key: {0}")]
    InvalidXPrv(&'static str),

    #[error("hardened index {0:#010x} cannot be derived from a public key")]
    HardenedPublicDerivation(u32),

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid hex encoding")]
    InvalidHex,
}

// ---------------------------------------------------------------------------
// XPrv
// ---------------------------------------------------------------------------

/// Extended private key: 64-byte extended Ed25519 secret plus chain code.
pub struct XPrv([u8; XPRV_LENGTH]);

impl XPrv {
    /// Icarus master key generation from BIP-39 entropy.
    ///
    /// `PBKDF2-HMAC-SHA512(password = passphrase, salt = entropy, 4096, 96)`
    /// followed by the Ed25519-BIP32 clamping. Same entropy and passphrase,
    /// same key, every time.
    pub fn from_bip39_entropy(entropy: &[u8], passphrase: &[u8]) -> Self {
        let mut bytes = [0u8; XPRV_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha512>(passphrase, entropy, ICARUS_PBKDF2_ROUNDS, &mut bytes);
        let xprv = Self::normalize_bytes(bytes);
        bytes.zeroize();
        xprv
    }

    /// Clamp arbitrary bytes into a valid root key: lowest 3 bits of kL
    /// cleared, highest 3 bits set to `0b010`.
    pub fn normalize_bytes(mut bytes: [u8; XPRV_LENGTH]) -> Self {
        bytes[0] &= 0b1111_1000;
        bytes[31] &= 0b0001_1111;
        bytes[31] |= 0b0100_0000;
        Self(bytes)
    }

    /// Accept raw bytes only if they carry the root-key bit pattern.
    pub fn from_bytes_verified(bytes: [u8; XPRV_LENGTH]) -> Result<Self, KeyError> {
        if bytes[31] & 0b1110_0000 != 0b0100_0000 {
            return Err(KeyError::InvalidXPrv("expected 3 highest bits to be 0b010"));
        }
        if bytes[0] & 0b0000_0111 != 0 {
            return Err(KeyError::InvalidXPrv("expected 3 lowest bits to be 0b000"));
        }
        Ok(Self(bytes))
    }

    /// Derive the child at `index`. Indices at or above `0x80000000` take
    /// the hardened branch, everything else the soft branch.
    pub fn derive(&self, index: u32) -> XPrv {
        let (kl, kr, chain_code) = self.split();
        let serialized = index.to_le_bytes();

        let (mut z, mut i) = if is_hardened(index) {
            (
                hmac_sha512(chain_code, &[&[0x00], kl, kr, &serialized]),
                hmac_sha512(chain_code, &[&[0x01], kl, kr, &serialized]),
            )
        } else {
            let public = point_of_scalar(kl);
            (
                hmac_sha512(chain_code, &[&[0x02], &public, &serialized]),
                hmac_sha512(chain_code, &[&[0x03], &public, &serialized]),
            )
        };

        let mut out = [0u8; XPRV_LENGTH];
        out[0..32].copy_from_slice(&add_28_mul8(kl, &z[0..32]));
        out[32..64].copy_from_slice(&add_256bits(kr, &z[32..64]));
        out[64..96].copy_from_slice(&i[32..64]);
        z.zeroize();
        i.zeroize();

        XPrv(out)
    }

    /// Derive along a whole path, first segment first.
    pub fn derive_path(&self, path: &[u32]) -> XPrv {
        path.iter()
            .fold(self.clone(), |key, &index| key.derive(index))
    }

    /// The matching extended public key.
    pub fn public(&self) -> XPub {
        let (kl, _, chain_code) = self.split();
        let mut out = [0u8; XPUB_LENGTH];
        out[0..32].copy_from_slice(&point_of_scalar(kl));
        out[32..64].copy_from_slice(chain_code);
        XPub(out)
    }

    /// Strip the chain code, keeping only the signing material.
    pub fn to_raw_key(&self) -> Result<PrivateKey, KeyError> {
        let mut secret = [0u8; EXTENDED_SECRET_LENGTH];
        secret.copy_from_slice(&self.0[0..64]);
        PrivateKey::from_extended_bytes(secret)
    }

    pub fn chain_code(&self) -> &[u8] {
        &self.0[64..96]
    }

    /// Raw 96 bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; XPRV_LENGTH] {
        &self.0
    }

    fn split(&self) -> (&[u8], &[u8], &[u8]) {
        (&self.0[0..32], &self.0[32..64], &self.0[64..96])
    }
}

impl Clone for XPrv {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl Drop for XPrv {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl PartialEq for XPrv {
    /// Compared through the public half, which is what identifies a key.
    fn eq(&self, other: &Self) -> bool {
        self.public() == other.public()
    }
}

impl Eq for XPrv {}

impl fmt::Debug for XPrv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XPrv(pub={})", hex::encode(&self.public().0[0..32]))
    }
}

// ---------------------------------------------------------------------------
// XPub
// ---------------------------------------------------------------------------

/// Extended public key: Ed25519 point plus chain code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct XPub([u8; XPUB_LENGTH]);

impl XPub {
    pub fn from_bytes(bytes: [u8; XPUB_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Soft derivation from the public side. Hardened indices need the
    /// private key and are rejected.
    pub fn derive(&self, index: u32) -> Result<XPub, KeyError> {
        if is_hardened(index) {
            return Err(KeyError::HardenedPublicDerivation(index));
        }
        let point = &self.0[0..32];
        let chain_code = &self.0[32..64];
        let serialized = index.to_le_bytes();

        let z = hmac_sha512(chain_code, &[&[0x02], point, &serialized]);
        let i = hmac_sha512(chain_code, &[&[0x03], point, &serialized]);

        let parent = decompress(point)?;
        let tweak = add_28_mul8(&[0u8; 32], &z[0..32]);
        let child = parent + EdwardsPoint::mul_base(&Scalar::from_bytes_mod_order(tweak));

        let mut out = [0u8; XPUB_LENGTH];
        out[0..32].copy_from_slice(&child.compress().to_bytes());
        out[32..64].copy_from_slice(&i[32..64]);
        Ok(XPub(out))
    }

    pub fn public_key(&self) -> PublicKey {
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(&self.0[0..32]);
        PublicKey(bytes)
    }

    pub fn chain_code(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for XPub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XPub({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// Terminal signing key: the 64-byte extended Ed25519 secret of a derived
/// node, chain code removed.
///
/// Not `Serialize`. Writing a private key anywhere should take effort.
pub struct PrivateKey {
    secret: [u8; EXTENDED_SECRET_LENGTH],
    verifying_key: VerifyingKey,
}

impl PrivateKey {
    /// Wrap an extended secret (kL ‖ kR). The public key is recomputed from
    /// kL so the pair can never disagree.
    pub fn from_extended_bytes(secret: [u8; EXTENDED_SECRET_LENGTH]) -> Result<Self, KeyError> {
        let public = point_of_scalar(&secret[0..32]);
        let verifying_key =
            VerifyingKey::from_bytes(&public).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self {
            secret,
            verifying_key,
        })
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.verifying_key.to_bytes())
    }

    /// Ed25519 signature with the extended secret: the nonce is derived
    /// from kR, the scalar is kL. Deterministic.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let mut scalar_bytes = [0u8; 32];
        let mut hash_prefix = [0u8; 32];
        scalar_bytes.copy_from_slice(&self.secret[0..32]);
        hash_prefix.copy_from_slice(&self.secret[32..64]);

        let expanded = ExpandedSecretKey {
            scalar: Scalar::from_bytes_mod_order(scalar_bytes),
            hash_prefix,
        };
        scalar_bytes.zeroize();
        hash_prefix.zeroize();

        let signature = raw_sign::<Sha512>(&expanded, message, &self.verifying_key);
        Signature(signature.to_bytes())
    }
}

impl Clone for PrivateKey {
    /// Cloning is allowed but every copy is another thing to wipe.
    fn clone(&self) -> Self {
        Self {
            secret: self.secret,
            verifying_key: self.verifying_key,
        }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// Raw 32-byte Ed25519 verification key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Length-checked construction from a byte slice, e.g. a decoded witness.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidLength {
                expected: PUBLIC_KEY_LENGTH,
                got: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Strict Ed25519 verification. `false` for bad points, bad signatures
    /// and everything in between.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let signature = DalekSignature::from_bytes(&signature.0);
        verifying_key.verify_strict(message, &signature).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidHex)?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidLength {
                expected: SIGNATURE_LENGTH,
                got: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

// ---------------------------------------------------------------------------
// Arithmetic helpers
// ---------------------------------------------------------------------------

fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// `kL·B`, compressed. kL is used as an integer, not re-clamped.
fn point_of_scalar(kl: &[u8]) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(kl);
    let scalar = Scalar::from_bytes_mod_order(bytes);
    bytes.zeroize();
    EdwardsPoint::mul_base(&scalar).compress().to_bytes()
}

fn decompress(bytes: &[u8]) -> Result<EdwardsPoint, KeyError> {
    let compressed =
        CompressedEdwardsY::from_slice(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
    compressed.decompress().ok_or(KeyError::InvalidPublicKey)
}

/// `x + 8·trunc28(y)` over little-endian 256-bit integers.
fn add_28_mul8(x: &[u8], y: &[u8]) -> [u8; 32] {
    let mut carry: u16 = 0;
    let mut out = [0u8; 32];
    for i in 0..28 {
        let r = x[i] as u16 + ((y[i] as u16) << 3) + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
    for i in 28..32 {
        let r = x[i] as u16 + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
    out
}

/// `x + y mod 2^256`, little-endian.
fn add_256bits(x: &[u8], y: &[u8]) -> [u8; 32] {
    let mut carry: u16 = 0;
    let mut out = [0u8; 32];
    for i in 0..32 {
        let r = x[i] as u16 + y[i] as u16 + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ed25519-BIP32 V2 reference vectors: a root key, its first hardened
    // child, and that child's signature over "Hello World".
    const D1: &str = "f8a29231ee38d6c5bf715d5bac21c750577aa3798b22d79d65bf97d6fadea15adcd1ee1abdf78bd4be64731a12deb94d3671784112eb6f364b871851fd1c9a247384db9ad6003bbd08b3b1ddc0d07a597293ff85e961bf252b331262eddfad0d";
    const D1_H0: &str = "60d399da83ef80d8d4f8d223239efdc2b8fef387e1b5219137ffb4e8fbdea15adc9366b7d003af37c11396de9a83734e30e05e851efa32745c9cd7b42712c890608763770eddf77248ab652984b21b849760d1da74a6f5bd633ce41adceef07a";
    const D1_H0_SIGNATURE: &str = "90194d57cde4fdadd01eb7cf161780c277e129fc7135b97779a3268837e4cd2e9444b9bb91c0e84d23bba870df3c4bda91a110ef735638fa7a34ea2046d4be04";

    fn xprv_from_hex(s: &str) -> XPrv {
        let bytes: [u8; XPRV_LENGTH] = hex::decode(s).unwrap().try_into().unwrap();
        XPrv::from_bytes_verified(bytes).unwrap()
    }

    #[test]
    fn test_hardened_derivation_vector() {
        let root = xprv_from_hex(D1);
        let child = root.derive(HARDENED_OFFSET);
        assert_eq!(hex::encode(child.as_bytes()), D1_H0);
    }

    #[test]
    fn test_signature_vector() {
        let key = xprv_from_hex(D1_H0).to_raw_key().unwrap();
        let signature = key.sign(b"Hello World");
        assert_eq!(signature.to_hex(), D1_H0_SIGNATURE);
        assert!(key.public_key().verify(b"Hello World", &signature));
    }

    #[test]
    fn test_soft_derivation_matches_public_derivation() {
        let root = xprv_from_hex(D1);
        for index in [0u32, 1, 2, 0x1000_0000, HARDENED_OFFSET - 1] {
            let from_private = root.derive(index).public();
            let from_public = root.public().derive(index).unwrap();
            assert_eq!(from_private, from_public, "index {index:#x}");
        }
    }

    #[test]
    fn test_public_derivation_rejects_hardened() {
        let root = xprv_from_hex(D1);
        assert_eq!(
            root.public().derive(HARDENED_OFFSET + 5),
            Err(KeyError::HardenedPublicDerivation(HARDENED_OFFSET + 5))
        );
    }

    #[test]
    fn test_root_key_from_zero_entropy() {
        // BIP-39 "abandon ... about" is sixteen zero bytes of entropy.
        let root = XPrv::from_bip39_entropy(&[0u8; 16], b"");
        assert_eq!(
            hex::encode(root.as_bytes()),
            "60ce7dbec3616e9fc17e0c32578b3f380337b1b61a1f3cb9651aee30670e6f53\
             970419a23a2e4e4082d12bf78faa8645dfc882cee2ae7179e2b07fe88098abb2\
             072310084784c7308182dbbdb1449b2706586f1ff5cbf13d15e9b6e78c15f067"
        );
        assert!(XPrv::from_bytes_verified(*root.as_bytes()).is_ok());
    }

    #[test]
    fn test_passphrase_changes_root_key() {
        let plain = XPrv::from_bip39_entropy(&[0u8; 16], b"");
        let salted = XPrv::from_bip39_entropy(&[0u8; 16], b"foo");
        assert_ne!(plain.as_bytes(), salted.as_bytes());
    }

    #[test]
    fn test_from_bytes_verified_rejects_unclamped() {
        let mut bytes = [0u8; XPRV_LENGTH];
        bytes[31] = 0b1100_0000;
        assert!(XPrv::from_bytes_verified(bytes).is_err());
        bytes[31] = 0b0100_0000;
        bytes[0] = 0b0000_0001;
        assert!(XPrv::from_bytes_verified(bytes).is_err());
    }

    #[test]
    fn test_derive_path_equals_stepwise() {
        let root = xprv_from_hex(D1);
        let path = [HARDENED_OFFSET + 1852, HARDENED_OFFSET + 1815, 7];
        let stepwise = root.derive(path[0]).derive(path[1]).derive(path[2]);
        assert_eq!(root.derive_path(&path).as_bytes(), stepwise.as_bytes());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let key = xprv_from_hex(D1).derive(3).to_raw_key().unwrap();
        assert_eq!(key.sign(b"tx body hash"), key.sign(b"tx body hash"));
        assert_ne!(key.sign(b"tx body hash"), key.sign(b"other hash"));
    }

    #[test]
    fn test_chain_codes() {
        let root = xprv_from_hex(D1);
        assert_eq!(root.public().chain_code(), root.chain_code());
        assert_eq!(hex::encode(root.chain_code()), &D1[128..192]);

        let hardened = root.derive(HARDENED_OFFSET);
        assert_eq!(hex::encode(hardened.chain_code()), &D1_H0[128..192]);

        let soft_private = root.derive(9);
        let soft_public = root.public().derive(9).unwrap();
        assert_eq!(soft_public.chain_code(), soft_private.chain_code());
        assert_ne!(soft_private.chain_code(), root.chain_code());
    }

    #[test]
    fn test_wiping_scratch_buffers_leaves_keys_usable() {
        let root = xprv_from_hex(D1);
        let key = root.derive(HARDENED_OFFSET).to_raw_key().unwrap();
        for _ in 0..3 {
            assert_eq!(key.sign(b"Hello World").to_hex(), D1_H0_SIGNATURE);
        }
        // Deriving twice from the same parent still gives the same child.
        assert_eq!(
            hex::encode(root.derive(HARDENED_OFFSET).as_bytes()),
            D1_H0
        );
    }

    #[test]
    fn test_signature_fails_with_wrong_key() {
        let a = xprv_from_hex(D1).derive(0).to_raw_key().unwrap();
        let b = xprv_from_hex(D1).derive(1).to_raw_key().unwrap();
        let sig = a.sign(b"payload");
        assert!(!b.public_key().verify(b"payload", &sig));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let xprv = xprv_from_hex(D1);
        let debug = format!("{:?}", xprv);
        assert!(debug.starts_with("XPrv(pub="));
        assert!(!debug.contains(&D1[..64]));

        let raw = xprv.to_raw_key().unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.starts_with("PrivateKey(pub="));
        assert!(!debug.contains(&D1[..64]));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = xprv_from_hex(D1).to_raw_key().unwrap().public_key();
        assert_eq!(PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(PublicKey::from_hex("abcd").is_err());
        assert_eq!(PublicKey::from_hex("zz"), Err(KeyError::InvalidHex));
    }
}
