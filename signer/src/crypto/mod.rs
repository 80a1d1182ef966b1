//! # Cryptographic Primitives
//!
//! The foundation of everything security-related in the signer:
//!
//! - **Blake2b-224 / Blake2b-256**: key hashes and transaction ids, exactly
//!   as the ledger computes them.
//! - **Ed25519-BIP32**: extended keys with hierarchical derivation
//!   (derivation scheme V2, the only one Shelley wallets use).
//! - **Ed25519 signatures** over extended secrets, verified with the stock
//!   strict verifier.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Field arithmetic, point operations and signing come from
//! `curve25519-dalek` / `ed25519-dalek`, HMAC and PBKDF2 from RustCrypto.
//! The only arithmetic done here is the BIP32-Ed25519 child key tweak, which
//! is two little-endian additions.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{blake2b_224, blake2b_256};
pub use keys::{KeyError, PrivateKey, PublicKey, Signature, XPrv, XPub};
pub use signatures::{verify, Ed25519Bip32Backend, SigningBackend};
