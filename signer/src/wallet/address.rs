//! Credentials and Shelley addresses.
//!
//! Only the two shapes this wallet produces are modelled:
//!
//! | kind   | header        | payload                              | bytes |
//! |--------|---------------|--------------------------------------|-------|
//! | base   | `0b0000_nnnn` | payment key hash ‖ stake key hash    | 57    |
//! | reward | `0b1110_nnnn` | stake key hash                       | 29    |
//!
//! `nnnn` is the network id. Any other Shelley address can still be rendered
//! to bech32 with [`bech32_from_bytes`] for display purposes.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{
    NetworkContext, BASE_ADDRESS_HEADER, KEY_HASH_LENGTH, REWARD_ADDRESS_HEADER,
};
use crate::crypto::hash::blake2b_224;
use crate::crypto::keys::PublicKey;

const BASE_ADDRESS_LENGTH: usize = 1 + 2 * KEY_HASH_LENGTH;
const REWARD_ADDRESS_LENGTH: usize = 1 + KEY_HASH_LENGTH;

/// Header type nibbles (CIP-19). 0..=7 are payment addresses, 8 is Byron,
/// 14 and 15 are reward addresses.
const BYRON_TYPE: u8 = 0b1000;
const REWARD_KEY_TYPE: u8 = 0b1110;
const REWARD_SCRIPT_TYPE: u8 = 0b1111;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("bech32 error: {0}")]
    Bech32(String),

    #[error("unexpected address prefix: expected '{expected}', got '{got}'")]
    InvalidHrp { expected: String, got: String },

    #[error("invalid {kind} address length: expected {expected} bytes, got {got}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unsupported address header {0:#04x}")]
    UnsupportedHeader(u8),

    #[error("empty address")]
    Empty,

    #[error("expected a {expected} credential, got a {got} credential")]
    CredentialRole {
        expected: CredentialRole,
        got: CredentialRole,
    },
}

// ---------------------------------------------------------------------------
// Key hashes and credentials
// ---------------------------------------------------------------------------

/// Blake2b-224 digest of a verification key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHash([u8; KEY_HASH_LENGTH]);

impl KeyHash {
    pub fn of(public_key: &PublicKey) -> Self {
        Self(blake2b_224(public_key.as_bytes()))
    }

    pub fn from_bytes(bytes: [u8; KEY_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Option<Self> {
        slice.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", self.to_hex())
    }
}

impl Serialize for KeyHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Self::try_from_slice(&bytes)
            .ok_or_else(|| serde::de::Error::custom("key hash must be 28 bytes"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialRole {
    Payment,
    Stake,
}

impl fmt::Display for CredentialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => f.write_str("payment"),
            Self::Stake => f.write_str("stake"),
        }
    }
}

/// A key hash tagged with the role it plays in an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    pub role: CredentialRole,
    pub key_hash: KeyHash,
}

impl Credential {
    pub fn from_public_key(role: CredentialRole, public_key: &PublicKey) -> Self {
        Self {
            role,
            key_hash: KeyHash::of(public_key),
        }
    }

    pub fn payment(public_key: &PublicKey) -> Self {
        Self::from_public_key(CredentialRole::Payment, public_key)
    }

    pub fn stake(public_key: &PublicKey) -> Self {
        Self::from_public_key(CredentialRole::Stake, public_key)
    }

    fn expect_role(&self, expected: CredentialRole) -> Result<&KeyHash, AddressError> {
        if self.role != expected {
            return Err(AddressError::CredentialRole {
                expected,
                got: self.role,
            });
        }
        Ok(&self.key_hash)
    }
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Base {
        network_id: u8,
        payment: KeyHash,
        stake: KeyHash,
    },
    Reward {
        network_id: u8,
        stake: KeyHash,
    },
}

impl Address {
    pub fn network_id(&self) -> u8 {
        match self {
            Self::Base { network_id, .. } | Self::Reward { network_id, .. } => *network_id,
        }
    }

    /// Stake key hash carried by the address, base or reward.
    pub fn stake_key_hash(&self) -> &KeyHash {
        match self {
            Self::Base { stake, .. } | Self::Reward { stake, .. } => stake,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Base {
                network_id,
                payment,
                stake,
            } => {
                let mut out = Vec::with_capacity(BASE_ADDRESS_LENGTH);
                out.push(BASE_ADDRESS_HEADER | (network_id & 0x0f));
                out.extend_from_slice(payment.as_bytes());
                out.extend_from_slice(stake.as_bytes());
                out
            }
            Self::Reward { network_id, stake } => {
                let mut out = Vec::with_capacity(REWARD_ADDRESS_LENGTH);
                out.push(REWARD_ADDRESS_HEADER | (network_id & 0x0f));
                out.extend_from_slice(stake.as_bytes());
                out
            }
        }
    }

    /// Parse the raw bytes of a key-hash base or reward address.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let header = *bytes.first().ok_or(AddressError::Empty)?;
        let network_id = header & 0x0f;
        match header & 0xf0 {
            BASE_ADDRESS_HEADER => {
                check_length("base", BASE_ADDRESS_LENGTH, bytes.len())?;
                Ok(Self::Base {
                    network_id,
                    payment: hash_at(bytes, 1),
                    stake: hash_at(bytes, 1 + KEY_HASH_LENGTH),
                })
            }
            REWARD_ADDRESS_HEADER => {
                check_length("reward", REWARD_ADDRESS_LENGTH, bytes.len())?;
                Ok(Self::Reward {
                    network_id,
                    stake: hash_at(bytes, 1),
                })
            }
            _ => Err(AddressError::UnsupportedHeader(header)),
        }
    }

    pub fn hrp(&self) -> &'static str {
        match self {
            Self::Base { network_id, .. } => payment_hrp(*network_id),
            Self::Reward { network_id, .. } => stake_hrp(*network_id),
        }
    }

    pub fn to_bech32(&self) -> Result<String, AddressError> {
        encode_bech32(self.hrp(), &self.to_bytes())
    }

    /// Parse a bech32 address, checking the prefix against the header.
    pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(s.trim()).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let address = Self::from_bytes(&data)?;
        if hrp.as_str() != address.hrp() {
            return Err(AddressError::InvalidHrp {
                expected: address.hrp().to_string(),
                got: hrp.to_string(),
            });
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str(&hex::encode(self.to_bytes())),
        }
    }
}

/// Base address for a payment and a stake credential.
pub fn base_address(
    ctx: &NetworkContext,
    payment: &Credential,
    stake: &Credential,
) -> Result<Address, AddressError> {
    Ok(Address::Base {
        network_id: ctx.network_id(),
        payment: *payment.expect_role(CredentialRole::Payment)?,
        stake: *stake.expect_role(CredentialRole::Stake)?,
    })
}

/// Reward address for a stake credential.
pub fn reward_address(ctx: &NetworkContext, stake: &Credential) -> Result<Address, AddressError> {
    Ok(Address::Reward {
        network_id: ctx.network_id(),
        stake: *stake.expect_role(CredentialRole::Stake)?,
    })
}

/// Bech32 rendering of any Shelley-era address from its raw bytes.
///
/// Byron addresses and garbage yield `None`; callers fall back to hex.
pub fn bech32_from_bytes(bytes: &[u8]) -> Option<String> {
    let header = *bytes.first()?;
    let network_id = header & 0x0f;
    let hrp = match header >> 4 {
        BYRON_TYPE => return None,
        REWARD_KEY_TYPE | REWARD_SCRIPT_TYPE => stake_hrp(network_id),
        0..=7 => payment_hrp(network_id),
        _ => return None,
    };
    encode_bech32(hrp, bytes).ok()
}

/// True when a reward address (raw bytes) carries `stake` as a key hash.
pub fn reward_address_matches(bytes: &[u8], stake: &KeyHash) -> bool {
    matches!(Address::from_bytes(bytes), Ok(Address::Reward { stake: s, .. }) if &s == stake)
}

fn payment_hrp(network_id: u8) -> &'static str {
    if network_id == 1 {
        "addr"
    } else {
        "addr_test"
    }
}

fn stake_hrp(network_id: u8) -> &'static str {
    if network_id == 1 {
        "stake"
    } else {
        "stake_test"
    }
}

fn encode_bech32(hrp: &str, data: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(hrp).map_err(|e| AddressError::Bech32(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AddressError::Bech32(e.to_string()))
}

fn check_length(kind: &'static str, expected: usize, got: usize) -> Result<(), AddressError> {
    if expected != got {
        return Err(AddressError::InvalidLength {
            kind,
            expected,
            got,
        });
    }
    Ok(())
}

fn hash_at(bytes: &[u8], offset: usize) -> KeyHash {
    let mut out = [0u8; KEY_HASH_LENGTH];
    out.copy_from_slice(&bytes[offset..offset + KEY_HASH_LENGTH]);
    KeyHash(out)
}
