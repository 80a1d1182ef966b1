//! # CLI Interface
//!
//! Command-line structure for `cardano-signer`, via `clap` derive. Every
//! setting has an environment fallback so the binary can be driven from a
//! `.env`-style deployment without flags.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::convert::Infallible;
use std::fmt;
use zeroize::Zeroizing;

use cardano_signer::config::DEFAULT_STAKING_API_URL;
use cardano_signer::{Network, TransactionHash};

use crate::logging::LogFormat;

/// Cardano HD signer.
///
/// Derives payment and stake keys from a BIP-39 mnemonic, witnesses
/// transactions crafted elsewhere and hands them to a relay.
#[derive(Parser, Debug)]
#[command(
    name = "cardano-signer",
    about = "Cardano HD key derivation, transaction signing and submission",
    version,
    propagate_version = true
)]
pub struct SignerCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Network: mainnet, preprod or preview.
    #[arg(long, env = "CARDANO_NETWORK", default_value = "preview", global = true)]
    pub network: Network,

    /// Log format on stderr.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Per-request timeout for relay calls, in seconds.
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the public keys and addresses for an address index.
    Addresses(AddressesArgs),
    /// Decode a transaction and print its structure.
    Inspect(InspectArgs),
    /// Witness a transaction and print the signed hex.
    Sign(SignArgs),
    /// Submit an already signed transaction.
    Submit(SubmitArgs),
    /// Sign, then submit.
    SignAndSubmit(SignAndSubmitArgs),
    /// Look up a submitted transaction.
    Status(StatusArgs),
    /// Check that the relay is up.
    Health(RelayArgs),
}

/// Mnemonic and address index.
#[derive(Args)]
pub struct KeyArgs {
    /// BIP-39 mnemonic (12, 15, 18, 21 or 24 words). Never logged.
    #[arg(long, env = "CARDANO_MNEMONIC", hide_env_values = true, value_parser = secret)]
    pub mnemonic: Zeroizing<String>,

    /// Address index (the last, soft, path segment).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub address_index: i64,
}

/// Parsed secrets live in a buffer that is wiped on drop.
fn secret(value: &str) -> Result<Zeroizing<String>, Infallible> {
    Ok(Zeroizing::new(value.to_string()))
}

impl fmt::Debug for KeyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyArgs")
            .field("mnemonic", &"<redacted>")
            .field("address_index", &self.address_index)
            .finish()
    }
}

#[derive(Args, Debug)]
pub struct AddressesArgs {
    #[command(flatten)]
    pub keys: KeyArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Transaction CBOR, hex encoded.
    #[arg(long)]
    pub tx: String,
}

/// Which keys witness the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignerSelection {
    /// Read the required keys off the body.
    Auto,
    /// Payment key only.
    Payment,
    /// Payment and stake keys.
    #[value(name = "payment+stake")]
    PaymentStake,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    /// Unsigned transaction CBOR, hex encoded.
    #[arg(long)]
    pub tx: String,

    #[arg(long, value_enum, default_value_t = SignerSelection::Auto)]
    pub signers: SignerSelection,

    /// Refuse to sign unless the body hashes to this id.
    #[arg(long)]
    pub expected_hash: Option<TransactionHash>,
}

/// Where to send transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Via {
    /// Hosted relay, raw CBOR.
    Blockfrost,
    /// The staking API, JSON.
    Api,
}

#[derive(Args, Debug)]
pub struct RelayArgs {
    #[arg(long, value_enum, default_value_t = Via::Blockfrost)]
    pub via: Via,

    /// Hosted relay project id.
    #[arg(long, env = "BLOCKFROST_API_KEY", hide_env_values = true)]
    pub blockfrost_api_key: Option<String>,

    /// Hosted relay base URL. Defaults to the public endpoint for the network.
    #[arg(long, env = "BLOCKFROST_URL")]
    pub blockfrost_url: Option<String>,

    /// Staking API base URL.
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_STAKING_API_URL)]
    pub api_base_url: String,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Signed transaction CBOR, hex encoded.
    #[arg(long)]
    pub tx: String,

    #[command(flatten)]
    pub relay: RelayArgs,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct SignAndSubmitArgs {
    #[command(flatten)]
    pub sign: SignArgs,

    #[command(flatten)]
    pub relay: RelayArgs,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Poll until the transaction is in a block (or polling gives up).
    #[arg(long)]
    pub wait: bool,

    /// Maximum status checks while waiting.
    #[arg(long, default_value_t = cardano_signer::config::CONFIRMATION_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Transaction id (64 hex characters).
    pub hash: TransactionHash,

    #[command(flatten)]
    pub relay: RelayArgs,
}
