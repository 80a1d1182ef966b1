//! CIP-1852 key derivation.
//!
//! ```text
//! m / 1852' / 1815' / 0' / role / index
//!       |       |      |     |      |
//!   purpose   coin  account  |   address index (payment) or 0 (stake)
//!                            0 = external payment, 2 = staking
//! ```
//!
//! The account is fixed at `0'` and every payment address shares stake key
//! `2/0`. Keys are recreated from the mnemonic on every run; nothing here
//! caches or persists key material.

use std::fmt;

use crate::config::{
    COIN_TYPE, DEFAULT_ACCOUNT, HARDENED_OFFSET, PURPOSE, ROLE_EXTERNAL, ROLE_STAKING,
    STAKE_KEY_INDEX,
};
use crate::crypto::keys::{PrivateKey, PublicKey, XPrv};
use crate::wallet::mnemonic::{mnemonic_to_entropy, word_count};
use crate::wallet::WalletError;

/// Mark an index as hardened.
pub const fn harden(index: u32) -> u32 {
    index | HARDENED_OFFSET
}

/// Five-segment CIP-1852 path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationPath([u32; 5]);

impl DerivationPath {
    /// External payment key at `address_index`.
    pub fn payment(address_index: u32) -> Result<Self, WalletError> {
        let index = check_index(address_index)?;
        Ok(Self([
            harden(PURPOSE),
            harden(COIN_TYPE),
            harden(DEFAULT_ACCOUNT),
            ROLE_EXTERNAL,
            index,
        ]))
    }

    /// The single staking key of the account.
    pub fn stake() -> Self {
        Self([
            harden(PURPOSE),
            harden(COIN_TYPE),
            harden(DEFAULT_ACCOUNT),
            ROLE_STAKING,
            STAKE_KEY_INDEX,
        ])
    }

    pub fn segments(&self) -> &[u32; 5] {
        &self.0
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in self.0 {
            if segment >= HARDENED_OFFSET {
                write!(f, "/{}'", segment - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{segment}")?;
            }
        }
        Ok(())
    }
}

/// Root key from entropy (Icarus).
pub fn root_key(entropy: &[u8], passphrase: &str) -> XPrv {
    XPrv::from_bip39_entropy(entropy, passphrase.as_bytes())
}

/// Walk `path` from `root`.
pub fn derive(root: &XPrv, path: &DerivationPath) -> XPrv {
    root.derive_path(path.segments())
}

/// Accept an address index supplied as a signed integer (CLI flag, JSON
/// field). Negative values and values at or above `2^31` are rejected.
pub fn address_index_from_signed(index: i64) -> Result<u32, WalletError> {
    u32::try_from(index)
        .ok()
        .filter(|i| *i < HARDENED_OFFSET)
        .ok_or(WalletError::InvalidDerivationIndex(index))
}

fn check_index(index: u32) -> Result<u32, WalletError> {
    if index >= HARDENED_OFFSET {
        return Err(WalletError::InvalidDerivationIndex(index as i64));
    }
    Ok(index)
}

/// A terminal signing key with its public half and the path it came from.
#[derive(Clone)]
pub struct KeyPair {
    pub path: DerivationPath,
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    fn from_root(root: &XPrv, path: DerivationPath) -> Result<Self, WalletError> {
        let private = derive(root, &path).to_raw_key()?;
        let public = private.public_key();
        Ok(Self {
            path,
            private,
            public,
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("path", &self.path.to_string())
            .field("public", &self.public.to_hex())
            .finish_non_exhaustive()
    }
}

/// Payment and stake keys for one address index.
#[derive(Debug, Clone)]
pub struct AddressKeys {
    pub address_index: u32,
    pub payment: KeyPair,
    pub stake: KeyPair,
}

/// Derive payment key `0/address_index` and the stake key from a mnemonic.
///
/// Deterministic: the same phrase and index give the same keys on every
/// call.
pub fn derive_address_keys(mnemonic: &str, address_index: u32) -> Result<AddressKeys, WalletError> {
    derive_address_keys_with_passphrase(mnemonic, "", address_index)
}

/// Same as [`derive_address_keys`] with a BIP-39 passphrase mixed into the
/// root key.
pub fn derive_address_keys_with_passphrase(
    mnemonic: &str,
    passphrase: &str,
    address_index: u32,
) -> Result<AddressKeys, WalletError> {
    let payment_path = DerivationPath::payment(address_index)?;
    let entropy = mnemonic_to_entropy(mnemonic)?;
    let root = root_key(&entropy, passphrase);

    let keys = AddressKeys {
        address_index,
        payment: KeyPair::from_root(&root, payment_path)?,
        stake: KeyPair::from_root(&root, DerivationPath::stake())?,
    };

    tracing::debug!(
        words = word_count(mnemonic),
        address_index,
        payment_path = %keys.payment.path,
        "derived address keys"
    );
    Ok(keys)
}
