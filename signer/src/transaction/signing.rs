//! Witness production and reassembly.
//!
//! Signing is a separate step from crafting because the keys are never
//! available to whoever built the body. The signed data is the Blake2b-256
//! hash of the body exactly as received; reassembly never touches the body
//! bytes, so that hash stays valid in the signed transaction.
//!
//! ```text
//! BodyReceived -> Hashed -> Witnessed -> Reassembled -> Submitted -> Confirmed
//!                                                                \-> Pending
//! ```

use serde::Serialize;
use std::fmt;

use crate::crypto::hash::blake2b_256;
use crate::crypto::signatures::SigningBackend;
use crate::transaction::codec::{encode, encode_bytes};
use crate::transaction::types::{
    TransactionBody, TransactionEnvelope, TransactionHash, VKeyWitness, WitnessSet,
};
use crate::transaction::TransactionError;

/// Where a transaction is in its signing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningStage {
    BodyReceived,
    Hashed,
    Witnessed,
    Reassembled,
    Submitted,
    Confirmed,
    Pending,
}

impl fmt::Display for SigningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BodyReceived => "body_received",
            Self::Hashed => "hashed",
            Self::Witnessed => "witnessed",
            Self::Reassembled => "reassembled",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
        };
        f.write_str(name)
    }
}

/// Blake2b-256 of the body's original bytes.
pub fn hash_body(body: &TransactionBody) -> TransactionHash {
    TransactionHash::from_bytes(blake2b_256(body.raw_bytes()))
}

/// One vkey witness: the backend's public key and its signature over `hash`.
pub fn witness(hash: &TransactionHash, signer: &dyn SigningBackend) -> VKeyWitness {
    VKeyWitness {
        vkey: signer.public_key(),
        signature: signer.sign(hash.as_bytes()),
    }
}

/// One witness per signer, in the order given. Duplicates are kept.
pub fn witness_all(hash: &TransactionHash, signers: &[&dyn SigningBackend]) -> WitnessSet {
    WitnessSet::from_vkey_witnesses(signers.iter().map(|s| witness(hash, *s)).collect())
}

/// Attach new vkey witnesses to an envelope.
///
/// Witnesses already present in the envelope come first, the new ones are
/// appended. Non-vkey witness entries, the validity flag and the auxiliary
/// data are carried over unchanged.
pub fn reassemble(envelope: &TransactionEnvelope, witnesses: WitnessSet) -> TransactionEnvelope {
    let mut merged = envelope.witness_set.clone();
    merged.vkey_witnesses.extend(witnesses.vkey_witnesses);
    merged.others.extend(witnesses.others);

    TransactionEnvelope {
        body: envelope.body.clone(),
        witness_set: merged,
        is_valid: envelope.is_valid,
        auxiliary_data: envelope.auxiliary_data.clone(),
    }
}

/// A reassembled transaction and the hash its witnesses cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub envelope: TransactionEnvelope,
    pub hash: TransactionHash,
}

impl SignedTransaction {
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        encode_bytes(&self.envelope)
    }

    pub fn to_hex(&self) -> Result<String, TransactionError> {
        encode(&self.envelope)
    }

    /// Every vkey witness in the envelope verifies against the hash.
    pub fn witnesses_verify(&self) -> bool {
        self.envelope
            .witness_set
            .vkey_witnesses
            .iter()
            .all(|w| w.verifies(&self.hash))
    }
}

/// Hash, witness with every signer, reassemble.
pub fn sign_envelope(
    envelope: &TransactionEnvelope,
    signers: &[&dyn SigningBackend],
) -> Result<SignedTransaction, TransactionError> {
    if signers.is_empty() {
        return Err(TransactionError::NoSigningKeys);
    }
    tracing::debug!(stage = %SigningStage::BodyReceived, "signing transaction");

    let hash = hash_body(&envelope.body);
    tracing::debug!(stage = %SigningStage::Hashed, tx_hash = %hash, "body hashed");

    let witnesses = witness_all(&hash, signers);
    tracing::debug!(
        stage = %SigningStage::Witnessed,
        tx_hash = %hash,
        witnesses = witnesses.vkey_count(),
        "witnesses produced"
    );

    let signed = reassemble(envelope, witnesses);
    tracing::info!(
        stage = %SigningStage::Reassembled,
        tx_hash = %hash,
        vkey_witnesses = signed.witness_set.vkey_count(),
        "transaction signed"
    );

    Ok(SignedTransaction {
        envelope: signed,
        hash,
    })
}

/// [`sign_envelope`], refusing to sign unless the body hashes to
/// `expected`. Use when the crafting service reports the hash it computed.
pub fn sign_with_hash(
    envelope: &TransactionEnvelope,
    signers: &[&dyn SigningBackend],
    expected: &TransactionHash,
) -> Result<SignedTransaction, TransactionError> {
    let actual = hash_body(&envelope.body);
    if &actual != expected {
        tracing::warn!(%expected, %actual, "refusing to sign: transaction hash mismatch");
        return Err(TransactionError::HashMismatch {
            expected: *expected,
            actual,
        });
    }
    sign_envelope(envelope, signers)
}
