//! Core type definitions for Cardano transaction envelopes.
//!
//! Only the parts of a transaction the signer needs to understand are
//! modelled. The body is kept as the exact bytes received, next to a
//! read-only view of the fields used for inspection and required-signer
//! resolution. Auxiliary data and unknown witness kinds stay opaque.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TX_HASH_LENGTH;
use crate::crypto::keys::{PublicKey, Signature};
use crate::wallet::address::KeyHash;

// ---------------------------------------------------------------------------
// TransactionHash
// ---------------------------------------------------------------------------

/// Blake2b-256 of the transaction body. Also the transaction id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHash([u8; TX_HASH_LENGTH]);

impl TransactionHash {
    pub const fn from_bytes(bytes: [u8; TX_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", self.to_hex())
    }
}

/// Error for a transaction id that is not 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transaction hash '{0}': expected 64 hex characters")]
pub struct InvalidTransactionHash(pub String);

impl FromStr for TransactionHash {
    type Err = InvalidTransactionHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        hex::decode(trimmed)
            .ok()
            .and_then(|bytes| <[u8; TX_HASH_LENGTH]>::try_from(bytes).ok())
            .map(Self)
            .ok_or_else(|| InvalidTransactionHash(trimmed.to_string()))
    }
}

impl Serialize for TransactionHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Witnesses
// ---------------------------------------------------------------------------

/// `[vkey, signature]` over the transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VKeyWitness {
    pub vkey: PublicKey,
    pub signature: Signature,
}

impl VKeyWitness {
    /// Check the signature against a transaction hash.
    pub fn verifies(&self, hash: &TransactionHash) -> bool {
        self.vkey.verify(hash.as_bytes(), &self.signature)
    }
}

/// A witness-set entry this crate does not interpret (scripts, datums,
/// redeemers, bootstrap witnesses). Re-emitted byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWitnessEntry {
    pub key: u64,
    pub value: Vec<u8>,
}

/// Witness set: vkey witnesses plus everything else, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessSet {
    pub vkey_witnesses: Vec<VKeyWitness>,
    /// The vkey witnesses were wrapped in a set tag (258).
    pub(crate) vkey_tagged: bool,
    /// Key 0 appeared in the input, even if its array was empty.
    pub(crate) vkey_present: bool,
    pub(crate) others: Vec<RawWitnessEntry>,
}

impl WitnessSet {
    pub fn from_vkey_witnesses(vkey_witnesses: Vec<VKeyWitness>) -> Self {
        Self {
            vkey_witnesses,
            ..Self::default()
        }
    }

    pub fn vkey_count(&self) -> usize {
        self.vkey_witnesses.len()
    }

    pub fn other_entries(&self) -> &[RawWitnessEntry] {
        &self.others
    }

    pub fn is_empty(&self) -> bool {
        self.vkey_witnesses.is_empty() && self.others.is_empty()
    }

    /// Public keys that already signed, in order.
    pub fn signers(&self) -> impl Iterator<Item = &PublicKey> {
        self.vkey_witnesses.iter().map(|w| &w.vkey)
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub transaction_id: TransactionHash,
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Raw address bytes.
    pub address: Vec<u8>,
    pub lovelace: u64,
    pub has_multi_assets: bool,
}

/// Stake credential named by a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StakeCredential {
    KeyHash(KeyHash),
    ScriptHash(KeyHash),
}

/// Certificate kinds, by their CBOR tag in the certificate array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CertificateKind {
    StakeRegistration,
    StakeDeregistration,
    StakeDelegation,
    PoolRegistration,
    PoolRetirement,
    GenesisKeyDelegation,
    MoveInstantaneousRewards,
    StakeRegistrationWithDeposit,
    StakeDeregistrationWithRefund,
    VoteDelegation,
    StakeAndVoteDelegation,
    StakeRegistrationAndDelegation,
    VoteRegistrationAndDelegation,
    StakeVoteRegistrationAndDelegation,
    CommitteeHotAuth,
    CommitteeColdResign,
    DRepRegistration,
    DRepDeregistration,
    DRepUpdate,
    Unknown(u64),
}

impl CertificateKind {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => Self::StakeRegistration,
            1 => Self::StakeDeregistration,
            2 => Self::StakeDelegation,
            3 => Self::PoolRegistration,
            4 => Self::PoolRetirement,
            5 => Self::GenesisKeyDelegation,
            6 => Self::MoveInstantaneousRewards,
            7 => Self::StakeRegistrationWithDeposit,
            8 => Self::StakeDeregistrationWithRefund,
            9 => Self::VoteDelegation,
            10 => Self::StakeAndVoteDelegation,
            11 => Self::StakeRegistrationAndDelegation,
            12 => Self::VoteRegistrationAndDelegation,
            13 => Self::StakeVoteRegistrationAndDelegation,
            14 => Self::CommitteeHotAuth,
            15 => Self::CommitteeColdResign,
            16 => Self::DRepRegistration,
            17 => Self::DRepDeregistration,
            18 => Self::DRepUpdate,
            other => Self::Unknown(other),
        }
    }

    /// The certificate's second element is a stake credential.
    pub fn names_stake_credential(self) -> bool {
        matches!(
            self,
            Self::StakeRegistration
                | Self::StakeDeregistration
                | Self::StakeDelegation
                | Self::StakeRegistrationWithDeposit
                | Self::StakeDeregistrationWithRefund
                | Self::VoteDelegation
                | Self::StakeAndVoteDelegation
                | Self::StakeRegistrationAndDelegation
                | Self::VoteRegistrationAndDelegation
                | Self::StakeVoteRegistrationAndDelegation
        )
    }

    /// The ledger demands a witness from the named stake credential.
    /// Plain Shelley registration is the one exception.
    pub fn requires_stake_witness(self) -> bool {
        self.names_stake_credential() && self != Self::StakeRegistration
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub kind: CertificateKind,
    pub stake_credential: Option<StakeCredential>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Raw reward address bytes.
    pub reward_address: Vec<u8>,
    pub amount: u64,
}

/// Transaction body: original bytes plus a decoded view.
///
/// The bytes are the source of truth. They are what gets hashed and what
/// gets re-emitted; the view is never serialized back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    pub(crate) raw: Vec<u8>,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub fee: u64,
    pub ttl: Option<u64>,
    pub certificates: Vec<Certificate>,
    pub withdrawals: Vec<Withdrawal>,
    pub required_signers: Vec<KeyHash>,
}

impl TransactionBody {
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// CBOR `null`, the encoding of absent auxiliary data.
pub(crate) const CBOR_NULL: u8 = 0xf6;

/// `[body, witness_set, is_valid, auxiliary_data]`, or the three-element
/// form without the validity flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub body: TransactionBody,
    pub witness_set: WitnessSet,
    pub is_valid: Option<bool>,
    pub(crate) auxiliary_data: Vec<u8>,
}

impl TransactionEnvelope {
    pub fn has_auxiliary_data(&self) -> bool {
        self.auxiliary_data.as_slice() != [CBOR_NULL]
    }

    /// Auxiliary data as received (`f6` when absent).
    pub fn auxiliary_data_bytes(&self) -> &[u8] {
        &self.auxiliary_data
    }
}

// ---------------------------------------------------------------------------
// Inspection output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSummary {
    /// Bech32 when the address is a Shelley address, hex otherwise.
    pub address: String,
    pub amount: u64,
    pub multi_asset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake_credential: Option<StakeCredential>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSummary {
    pub address: String,
    pub amount: u64,
}

/// Diagnostic view of an envelope, ready for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralSummary {
    pub tx_hash: TransactionHash,
    pub fee: u64,
    pub ttl: Option<u64>,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<OutputSummary>,
    pub certificates: Vec<CertificateSummary>,
    pub withdrawals: Vec<WithdrawalSummary>,
    pub required_signers: Vec<KeyHash>,
    pub auxiliary_data: bool,
    pub witness_set: bool,
    pub vkey_witnesses: usize,
    pub is_valid: Option<bool>,
}
