//! # Transaction Module
//!
//! Decoding, inspection, signing and re-encoding of externally crafted
//! Cardano transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    Envelope, body view, witness set, transaction hash
//! codec.rs    Hex/CBOR decode and encode, structural inspection
//! signers.rs  Which of our keys a body needs witnesses from
//! signing.rs  Hash, witness, reassemble
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Decode**: [`codec::decode`] validates the hex, then the CBOR.
//! 2. **Hash**: [`signing::hash_body`] over the body bytes as received.
//! 3. **Witness**: one vkey witness per required key.
//! 4. **Reassemble**: original body, merged witness set, original
//!    validity flag and auxiliary data.
//! 5. **Encode** and hand the bytes to a relay.

pub mod codec;
pub mod signers;
pub mod signing;
pub mod types;

pub use codec::{decode, decode_bytes, encode, encode_bytes, inspect, MalformedReason};
pub use signers::{required_signers, KeyRole};
pub use signing::{
    hash_body, reassemble, sign_envelope, sign_with_hash, witness, witness_all,
    SignedTransaction, SigningStage,
};
pub use types::{
    StructuralSummary, TransactionBody, TransactionEnvelope, TransactionHash, VKeyWitness,
    WitnessSet,
};

use std::convert::Infallible;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("malformed transaction envelope: {reason}")]
    MalformedEnvelope { reason: MalformedReason },

    #[error("transaction hash mismatch: expected {expected}, body hashes to {actual}")]
    HashMismatch {
        expected: TransactionHash,
        actual: TransactionHash,
    },

    #[error("no signing keys supplied")]
    NoSigningKeys,

    #[error("failed to encode transaction: {0}")]
    Encode(String),
}

impl From<MalformedReason> for TransactionError {
    fn from(reason: MalformedReason) -> Self {
        Self::MalformedEnvelope { reason }
    }
}

impl From<minicbor::encode::Error<Infallible>> for TransactionError {
    fn from(err: minicbor::encode::Error<Infallible>) -> Self {
        Self::Encode(err.to_string())
    }
}

/// Hand-built CBOR transactions for unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use minicbor::data::Tag;
    use minicbor::Encoder;

    use crate::crypto::keys::PublicKey;
    use crate::wallet::address::KeyHash;

    pub const INPUT_TX_ID: [u8; 32] = [0x11; 32];

    pub struct BodySpec {
        pub fee: u64,
        pub ttl: Option<u64>,
        /// `(kind, stake key hash)` pairs, encoded with a key-hash credential.
        pub certificates: Vec<(u64, [u8; 28])>,
        /// `(reward address bytes, amount)` pairs.
        pub withdrawals: Vec<(Vec<u8>, u64)>,
        pub required_signers: Vec<[u8; 28]>,
        pub output_address: Vec<u8>,
    }

    impl Default for BodySpec {
        fn default() -> Self {
            let mut output_address = vec![0x00];
            output_address.extend_from_slice(&[0x22; 56]);
            Self {
                fee: 170_000,
                ttl: Some(50_000_000),
                certificates: Vec::new(),
                withdrawals: Vec::new(),
                required_signers: Vec::new(),
                output_address,
            }
        }
    }

    pub fn body(spec: &BodySpec) -> Vec<u8> {
        let entries = 3
            + spec.ttl.is_some() as u64
            + !spec.certificates.is_empty() as u64
            + !spec.withdrawals.is_empty() as u64
            + !spec.required_signers.is_empty() as u64;

        let mut e = Encoder::new(Vec::new());
        e.map(entries).unwrap();

        e.u64(0).unwrap();
        e.tag(Tag::new(258)).unwrap();
        e.array(1).unwrap();
        e.array(2).unwrap().bytes(&INPUT_TX_ID).unwrap().u64(1).unwrap();

        e.u64(1).unwrap();
        e.array(2).unwrap();
        e.array(2)
            .unwrap()
            .bytes(&spec.output_address)
            .unwrap()
            .u64(2_000_000)
            .unwrap();
        // Post-Alonzo map output with a multi-asset value.
        e.map(2).unwrap();
        e.u64(0).unwrap().bytes(&spec.output_address).unwrap();
        e.u64(1).unwrap().array(2).unwrap().u64(1_500_000).unwrap();
        e.map(1).unwrap().bytes(&[0x33; 28]).unwrap();
        e.map(1).unwrap().bytes(b"TOKEN").unwrap().u64(5).unwrap();

        e.u64(2).unwrap().u64(spec.fee).unwrap();
        if let Some(ttl) = spec.ttl {
            e.u64(3).unwrap().u64(ttl).unwrap();
        }
        if !spec.certificates.is_empty() {
            e.u64(4).unwrap();
            e.array(spec.certificates.len() as u64).unwrap();
            for (kind, hash) in &spec.certificates {
                e.array(2).unwrap().u64(*kind).unwrap();
                e.array(2).unwrap().u64(0).unwrap().bytes(hash).unwrap();
            }
        }
        if !spec.withdrawals.is_empty() {
            e.u64(5).unwrap();
            e.map(spec.withdrawals.len() as u64).unwrap();
            for (address, amount) in &spec.withdrawals {
                e.bytes(address).unwrap().u64(*amount).unwrap();
            }
        }
        if !spec.required_signers.is_empty() {
            e.u64(14).unwrap();
            e.array(spec.required_signers.len() as u64).unwrap();
            for hash in &spec.required_signers {
                e.bytes(hash).unwrap();
            }
        }
        e.into_writer()
    }

    /// `[body, {}, true, null]`.
    pub fn unsigned_envelope(body: &[u8]) -> Vec<u8> {
        let mut out = vec![0x84];
        out.extend_from_slice(body);
        out.extend_from_slice(&[0xa0, 0xf5, 0xf6]);
        out
    }

    /// `[body, {0: [[vkey, sig]], 1: [native script]}, true, {0: metadata}]`.
    pub fn partially_signed_envelope(body: &[u8], vkey: &PublicKey, sig: &[u8; 64]) -> Vec<u8> {
        let mut e = Encoder::new(Vec::new());
        e.array(4).unwrap();
        e.writer_mut().extend_from_slice(body);
        e.map(2).unwrap();
        e.u64(0).unwrap();
        e.array(1).unwrap();
        e.array(2).unwrap().bytes(vkey.as_bytes()).unwrap().bytes(sig).unwrap();
        e.u64(1).unwrap();
        e.array(1).unwrap();
        e.array(2).unwrap().u64(0).unwrap().bytes(&[0x44; 28]).unwrap();
        e.bool(true).unwrap();
        e.map(1).unwrap().u64(674).unwrap().str("memo").unwrap();
        e.into_writer()
    }

    pub fn key_hash(bytes: [u8; 28]) -> KeyHash {
        KeyHash::from_bytes(bytes)
    }
}
