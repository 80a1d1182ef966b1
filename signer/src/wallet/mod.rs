//! # Wallet
//!
//! From recovery phrase to keys and addresses:
//!
//! - [`mnemonic`]: BIP-39 validation and entropy extraction.
//! - [`derivation`]: Icarus root key and CIP-1852 paths.
//! - [`address`]: credentials, base and reward addresses.
//!
//! The wallet holds a single account. Every run starts over from the phrase.

pub mod address;
pub mod derivation;
pub mod mnemonic;

pub use address::{base_address, reward_address, Address, AddressError, Credential, KeyHash};
pub use derivation::{
    address_index_from_signed, derive_address_keys, derive_address_keys_with_passphrase,
    AddressKeys, DerivationPath, KeyPair,
};
pub use mnemonic::{mnemonic_to_entropy, MnemonicError};

use thiserror::Error;

use crate::config::NetworkContext;
use crate::crypto::keys::KeyError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error("invalid derivation index {0}: must be between 0 and 2^31 - 1")]
    InvalidDerivationIndex(i64),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

impl AddressKeys {
    pub fn payment_credential(&self) -> Credential {
        Credential::payment(&self.payment.public)
    }

    pub fn stake_credential(&self) -> Credential {
        Credential::stake(&self.stake.public)
    }

    /// Base address combining this index's payment key with the stake key.
    pub fn base_address(&self, ctx: &NetworkContext) -> Result<Address, WalletError> {
        Ok(base_address(
            ctx,
            &self.payment_credential(),
            &self.stake_credential(),
        )?)
    }

    pub fn reward_address(&self, ctx: &NetworkContext) -> Result<Address, WalletError> {
        Ok(reward_address(ctx, &self.stake_credential())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    #[test]
    fn test_mnemonic_to_addresses_mainnet() {
        let keys = derive_address_keys(ABANDON_ABOUT, 0).unwrap();
        let ctx = NetworkContext::new(Network::Mainnet);
        assert_eq!(
            keys.payment_credential().key_hash.to_hex(),
            "0fdc780023d8be7c9ff3a6bdc0d8d3b263bd0cc12448c40948efbf42"
        );
        assert_eq!(
            keys.stake_credential().key_hash.to_hex(),
            "e557890352095f1cf6fd2b7d1a28e3c3cb029f48cf34ff890a28d176"
        );
        assert_eq!(
            keys.base_address(&ctx).unwrap().to_string(),
            "addr1qy8ac7qqy0vtulyl7wntmsxc6wex80gvcyjy33qffrhm7sh927ysx5sftuw0dlft05dz3c7revpf7jx0xnlcjz3g69mq4afdhv"
        );
        assert_eq!(
            keys.reward_address(&ctx).unwrap().to_string(),
            "stake1u8j40zgr2gy4788kl54h6x3gu0pukq5lfr8nflufpg5dzaskqlx2l"
        );
    }

    #[test]
    fn test_mnemonic_to_addresses_testnets() {
        let keys = derive_address_keys(ABANDON_ABOUT, 0).unwrap();
        for network in [Network::Preprod, Network::Preview] {
            let ctx = NetworkContext::new(network);
            assert_eq!(
                keys.base_address(&ctx).unwrap().to_string(),
                "addr_test1qq8ac7qqy0vtulyl7wntmsxc6wex80gvcyjy33qffrhm7sh927ysx5sftuw0dlft05dz3c7revpf7jx0xnlcjz3g69mqkt5dmn"
            );
            assert_eq!(
                keys.reward_address(&ctx).unwrap().to_string(),
                "stake_test1urj40zgr2gy4788kl54h6x3gu0pukq5lfr8nflufpg5dzas324ywz"
            );
        }
    }

    #[test]
    fn test_second_index_keyhash() {
        let keys = derive_address_keys(ABANDON_ABOUT, 1).unwrap();
        assert_eq!(
            keys.payment_credential().key_hash.to_hex(),
            "047a68b1455233e294da486bf72792b8fa848d30d001fa2cdb8268f4"
        );
    }
}
