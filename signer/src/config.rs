//! # Network Configuration & Constants
//!
//! Every magic number the signer depends on lives here: derivation path
//! constants, address header nibbles, digest sizes, relay endpoints and
//! timeouts. If you're hardcoding one of these somewhere else, move it here.
//!
//! The [`NetworkContext`] replaces the "read `CARDANO_NETWORK` once and cache
//! it in a module global" habit. It is a plain value: build it at the edge of
//! the program and pass it to the address builder and the relay clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Offset that marks a derivation index as hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// CIP-1852 purpose. Shelley-era wallets all live under `1852'`.
pub const PURPOSE: u32 = 1852;

/// SLIP-44 coin type registered for ada.
pub const COIN_TYPE: u32 = 1815;

/// The single account this engine manages.
pub const DEFAULT_ACCOUNT: u32 = 0;

/// Role for external (receiving) payment keys.
pub const ROLE_EXTERNAL: u32 = 0;

/// Role for staking keys.
pub const ROLE_STAKING: u32 = 2;

/// Every payment address links to stake key `2/0`.
pub const STAKE_KEY_INDEX: u32 = 0;

/// PBKDF2 iteration count for Icarus master key generation.
pub const ICARUS_PBKDF2_ROUNDS: u32 = 4096;

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Blake2b-224 output, the size of every key hash on chain.
pub const KEY_HASH_LENGTH: usize = 28;

/// Blake2b-256 output, the size of a transaction id.
pub const TX_HASH_LENGTH: usize = 32;

/// Raw Ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Smallest byte length a well-formed envelope can have:
/// `[{0: [], 1: [], 2: 0}, {}, null]` encodes to 10 bytes.
pub const MIN_ENVELOPE_BYTES: usize = 10;

// ---------------------------------------------------------------------------
// Address headers
// ---------------------------------------------------------------------------

/// Base address with key-hash payment and key-hash stake credentials.
pub const BASE_ADDRESS_HEADER: u8 = 0b0000_0000;

/// Reward (stake) address with a key-hash credential.
pub const REWARD_ADDRESS_HEADER: u8 = 0b1110_0000;

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Default HTTP timeout for submission and status calls.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default staking API location (a local development server).
pub const DEFAULT_STAKING_API_URL: &str = "http://localhost:3000";

/// Delay before the first confirmation check. Blocks arrive every ~20s.
pub const CONFIRMATION_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on the wait between two confirmation checks.
pub const CONFIRMATION_MAX_DELAY: Duration = Duration::from_secs(60);

/// How many status checks the confirmation poller performs before giving up.
pub const CONFIRMATION_MAX_ATTEMPTS: u32 = 8;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Errors raised while interpreting network configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown network '{0}': expected one of mainnet, preprod, preview")]
    UnknownNetwork(String),
}

/// The closed set of networks the signer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    /// Binary network id carried in every address header.
    pub fn network_id(self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Preprod | Self::Preview => 0,
        }
    }

    /// Lowercase name, also the URL segment used by the hosted relay.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Preprod => "preprod",
            Self::Preview => "preview",
        }
    }

    pub fn is_mainnet(self) -> bool {
        matches!(self, Self::Mainnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "preprod" => Ok(Self::Preprod),
            "preview" => Ok(Self::Preview),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Everything network-dependent, resolved once per invocation.
///
/// Construct with [`NetworkContext::new`] and pass by reference. Nothing in
/// the crate reads the network from the environment on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    network: Network,
    relay_url: String,
}

impl NetworkContext {
    /// Context for `network` with the hosted relay's default URL.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            relay_url: default_relay_url(network),
        }
    }

    /// Replace the relay base URL (self-hosted relay, test server, ...).
    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn network_id(&self) -> u8 {
        self.network.network_id()
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Bech32 prefix for payment (base) addresses.
    pub fn payment_hrp(&self) -> &'static str {
        if self.network.is_mainnet() {
            "addr"
        } else {
            "addr_test"
        }
    }

    /// Bech32 prefix for reward (stake) addresses.
    pub fn stake_hrp(&self) -> &'static str {
        if self.network.is_mainnet() {
            "stake"
        } else {
            "stake_test"
        }
    }
}

/// Hosted relay base URL for a network.
pub fn default_relay_url(network: Network) -> String {
    format!("https://cardano-{}.blockfrost.io/api/v0", network.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_ids() {
        assert_eq!(Network::Mainnet.network_id(), 1);
        assert_eq!(Network::Preprod.network_id(), 0);
        assert_eq!(Network::Preview.network_id(), 0);
    }

    #[test]
    fn test_parse_network_names() {
        assert_eq!("mainnet".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!(" Preprod ".parse::<Network>(), Ok(Network::Preprod));
        assert_eq!("preview".parse::<Network>(), Ok(Network::Preview));
        assert_eq!(
            "testnet".parse::<Network>(),
            Err(ConfigError::UnknownNetwork("testnet".into()))
        );
    }

    #[test]
    fn test_relay_url_per_network() {
        let ctx = NetworkContext::new(Network::Preprod);
        assert_eq!(
            ctx.relay_url(),
            "https://cardano-preprod.blockfrost.io/api/v0"
        );
        let ctx = NetworkContext::new(Network::Preview).with_relay_url("http://127.0.0.1:9999/");
        assert_eq!(ctx.relay_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_hrps() {
        let main = NetworkContext::new(Network::Mainnet);
        assert_eq!(main.payment_hrp(), "addr");
        assert_eq!(main.stake_hrp(), "stake");
        let test = NetworkContext::new(Network::Preview);
        assert_eq!(test.payment_hrp(), "addr_test");
        assert_eq!(test.stake_hrp(), "stake_test");
    }

    #[test]
    fn test_confirmation_constants_sanity() {
        assert!(CONFIRMATION_INITIAL_DELAY < CONFIRMATION_MAX_DELAY);
        assert!(CONFIRMATION_MAX_ATTEMPTS > 0);
    }
}
