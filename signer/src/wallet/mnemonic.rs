//! BIP-39 recovery phrase handling.
//!
//! Only the English wordlist is accepted. The phrase is validated (word
//! count, wordlist membership, checksum) and turned into the raw entropy the
//! Icarus root key is computed from. The BIP-39 seed is never used.

use bip39::{Language, Mnemonic};
use thiserror::Error;
use zeroize::Zeroizing;

/// Word counts BIP-39 defines.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("invalid word count: {0} (must be 12, 15, 18, 21, or 24)")]
    InvalidWordCount(usize),

    /// Unknown word or checksum mismatch. The phrase itself is never
    /// included in the message.
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),
}

/// Validate a recovery phrase and return its entropy.
///
/// Leading, trailing and repeated whitespace is ignored. The returned buffer
/// is wiped when dropped.
///
/// # Example
///
/// ```
/// use cardano_signer::wallet::mnemonic::mnemonic_to_entropy;
///
/// let phrase = "abandon abandon abandon abandon abandon abandon \
///               abandon abandon abandon abandon abandon about";
/// assert_eq!(mnemonic_to_entropy(phrase).unwrap().as_slice(), &[0u8; 16]);
/// ```
pub fn mnemonic_to_entropy(phrase: &str) -> Result<Zeroizing<Vec<u8>>, MnemonicError> {
    let normalized = normalize(phrase);
    let words = word_count(&normalized);
    if !VALID_WORD_COUNTS.contains(&words) {
        return Err(MnemonicError::InvalidWordCount(words));
    }

    let mnemonic = Mnemonic::parse_in(Language::English, normalized.as_str())
        .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))?;

    tracing::debug!(words, "mnemonic accepted");
    Ok(Zeroizing::new(mnemonic.to_entropy()))
}

/// Number of words in a phrase, the only thing about it that may be logged.
pub fn word_count(phrase: &str) -> usize {
    phrase.split_whitespace().count()
}

/// Lowercased words joined by single spaces, built in one wiped buffer.
fn normalize(phrase: &str) -> Zeroizing<String> {
    // Wordlist words are ASCII, so lowercasing never grows a valid phrase.
    let mut out = Zeroizing::new(String::with_capacity(phrase.len()));
    for word in phrase.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}
