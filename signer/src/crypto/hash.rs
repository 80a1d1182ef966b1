//! # Hashing Utilities
//!
//! The ledger uses exactly two digests, both from the Blake2b family:
//!
//! - **Blake2b-224**: hashes verification keys into 28-byte credentials.
//! - **Blake2b-256**: hashes transaction bodies into 32-byte transaction ids.
//!   That id is also the message every witness signs.
//!
//! Nothing else. If you find yourself reaching for SHA-256 to identify a
//! transaction, the relay will politely reject everything you send it.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};

use crate::config::{KEY_HASH_LENGTH, TX_HASH_LENGTH};

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;

/// Blake2b with a 224-bit output.
///
/// # Example
///
/// ```
/// use cardano_signer::crypto::blake2b_224;
///
/// assert_eq!(blake2b_224(b"verification key").len(), 28);
/// ```
pub fn blake2b_224(data: &[u8]) -> [u8; KEY_HASH_LENGTH] {
    let digest = Blake2b224::digest(data);
    let mut out = [0u8; KEY_HASH_LENGTH];
    out.copy_from_slice(&digest);
    out
}

/// Blake2b with a 256-bit output.
pub fn blake2b_256(data: &[u8]) -> [u8; TX_HASH_LENGTH] {
    let digest = Blake2b256::digest(data);
    let mut out = [0u8; TX_HASH_LENGTH];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b_256_empty_vector() {
        // RFC 7693 parameters, 32-byte digest of the empty string.
        assert_eq!(
            hex::encode(blake2b_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_blake2b_224_empty_vector() {
        assert_eq!(
            hex::encode(blake2b_224(b"")),
            "836cc68931c2e4e3e838602eca1902591d216837bafddfe6f0c8cb07"
        );
    }

    #[test]
    fn test_digests_are_deterministic() {
        let body = b"\xa3\x00\x80\x01\x80\x02\x00";
        assert_eq!(blake2b_256(body), blake2b_256(body));
        assert_ne!(blake2b_256(body), blake2b_256(b"\xa0"));
    }
}
