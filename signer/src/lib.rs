// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cardano Signer Core Library
//!
//! Everything between a recovery phrase and a confirmed transaction on a
//! Cardano network, minus the parts somebody else already does better
//! (coin selection, fee estimation, script evaluation). Those arrive from an
//! external crafting service as an unsigned transaction; our job is to sign
//! it correctly and get it on chain.
//!
//! ## Architecture
//!
//! - **config**: Network catalogue and protocol constants. No ambient state:
//!   callers build a [`NetworkContext`] once and hand it to whoever needs it.
//! - **crypto**: Blake2b digests, Ed25519-BIP32 extended keys and the
//!   pluggable [`SigningBackend`].
//! - **wallet**: BIP-39 entropy, CIP-1852 derivation paths and address
//!   construction.
//! - **transaction**: CBOR envelope codec, structural inspection, required
//!   signer resolution and the witness engine.
//! - **relay**: Submission and status clients plus the confirmation poller.
//! - **error**: The crate-wide error taxonomy.
//!
//! ## Ground rules
//!
//! 1. Body bytes are sacred. We hash and re-emit exactly what we received.
//! 2. Key material never reaches a log line, a `Debug` impl or the disk.
//! 3. A failed submission is reported, never retried behind the caller's back.

pub mod config;
pub mod crypto;
pub mod error;
pub mod relay;
pub mod transaction;
pub mod wallet;

pub use config::{Network, NetworkContext};
pub use crypto::signatures::{Ed25519Bip32Backend, SigningBackend};
pub use error::{Outcome, Phase, SignerError};
pub use relay::{TxRelay, TxStatus};
pub use transaction::{TransactionEnvelope, TransactionHash};
pub use wallet::{derive_address_keys, AddressKeys};
