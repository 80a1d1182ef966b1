//! Required-signer resolution.
//!
//! The crafting service does not say which keys must witness a body, so the
//! answer is read off the body itself. Inputs are always spent from the
//! payment credential. The stake key is needed when the body touches the
//! stake credential in a way the ledger authorizes by witness:
//!
//! - a certificate that requires one (everything that names the credential
//!   except plain Shelley registration),
//! - a withdrawal from our reward address,
//! - an explicit entry in the required-signers set.

use serde::Serialize;
use std::fmt;

use crate::crypto::signatures::SigningBackend;
use crate::transaction::types::{StakeCredential, TransactionBody};
use crate::wallet::address::{reward_address_matches, KeyHash};
use crate::wallet::derivation::{AddressKeys, KeyPair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Payment,
    Stake,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => f.write_str("payment"),
            Self::Stake => f.write_str("stake"),
        }
    }
}

/// Keys from `keys` that must witness `body`, payment first.
pub fn required_signers(body: &TransactionBody, keys: &AddressKeys) -> Vec<KeyRole> {
    let stake = KeyHash::of(&keys.stake.public);
    let mut roles = vec![KeyRole::Payment];

    let certificate = body.certificates.iter().any(|c| {
        c.kind.requires_stake_witness()
            && c.stake_credential == Some(StakeCredential::KeyHash(stake))
    });
    let withdrawal = body
        .withdrawals
        .iter()
        .any(|w| reward_address_matches(&w.reward_address, &stake));
    let listed = body.required_signers.contains(&stake);

    if certificate || withdrawal || listed {
        roles.push(KeyRole::Stake);
    }

    tracing::debug!(
        certificate,
        withdrawal,
        listed,
        signers = roles.len(),
        "resolved required signers"
    );
    roles
}

impl AddressKeys {
    pub fn key_for(&self, role: KeyRole) -> &KeyPair {
        match role {
            KeyRole::Payment => &self.payment,
            KeyRole::Stake => &self.stake,
        }
    }

    /// Signing backends for `roles`, in the same order.
    pub fn signers_for(&self, roles: &[KeyRole]) -> Vec<&dyn SigningBackend> {
        roles
            .iter()
            .map(|role| &self.key_for(*role).private as &dyn SigningBackend)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Network, NetworkContext};
    use crate::transaction::codec::decode_bytes;
    use crate::transaction::fixtures::{self, BodySpec};
    use crate::wallet::derivation::derive_address_keys;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    fn body_for(spec: &BodySpec) -> TransactionBody {
        decode_bytes(&fixtures::unsigned_envelope(&fixtures::body(spec)))
            .unwrap()
            .body
    }

    fn keys() -> AddressKeys {
        derive_address_keys(ABANDON_ABOUT, 0).unwrap()
    }

    fn stake_hash(keys: &AddressKeys) -> [u8; 28] {
        *KeyHash::of(&keys.stake.public).as_bytes()
    }

    #[test]
    fn test_payment_only_body() {
        let body = body_for(&BodySpec::default());
        assert_eq!(required_signers(&body, &keys()), vec![KeyRole::Payment]);
    }

    #[test]
    fn test_delegation_needs_stake_key() {
        let keys = keys();
        let mut spec = BodySpec::default();
        spec.certificates = vec![(0, stake_hash(&keys)), (2, stake_hash(&keys))];
        assert_eq!(
            required_signers(&body_for(&spec), &keys),
            vec![KeyRole::Payment, KeyRole::Stake]
        );
    }

    #[test]
    fn test_plain_registration_does_not_need_stake_key() {
        let keys = keys();
        let mut spec = BodySpec::default();
        spec.certificates = vec![(0, stake_hash(&keys))];
        assert_eq!(required_signers(&body_for(&spec), &keys), vec![KeyRole::Payment]);
    }

    #[test]
    fn test_foreign_credential_is_ignored() {
        let keys = keys();
        let mut spec = BodySpec::default();
        spec.certificates = vec![(2, [0x99; 28])];
        assert_eq!(required_signers(&body_for(&spec), &keys), vec![KeyRole::Payment]);
    }

    #[test]
    fn test_withdrawal_needs_stake_key() {
        let keys = keys();
        let reward = keys
            .reward_address(&NetworkContext::new(Network::Preview))
            .unwrap()
            .to_bytes();
        let mut spec = BodySpec::default();
        spec.withdrawals = vec![(reward, 5_000_000)];
        assert_eq!(
            required_signers(&body_for(&spec), &keys),
            vec![KeyRole::Payment, KeyRole::Stake]
        );
    }

    #[test]
    fn test_required_signers_entry_needs_stake_key() {
        let keys = keys();
        let mut spec = BodySpec::default();
        spec.required_signers = vec![stake_hash(&keys)];
        assert_eq!(
            required_signers(&body_for(&spec), &keys),
            vec![KeyRole::Payment, KeyRole::Stake]
        );
    }

    #[test]
    fn test_signers_for_follows_roles() {
        let keys = keys();
        let signers = keys.signers_for(&[KeyRole::Payment, KeyRole::Stake]);
        assert_eq!(signers.len(), 2);
        assert_eq!(signers[0].public_key(), keys.payment.public);
        assert_eq!(signers[1].public_key(), keys.stake.public);
    }
}
