//! Crate-wide error taxonomy.
//!
//! Each module has its own error enum; [`SignerError`] wraps them for
//! callers that drive the whole pipeline. Two questions can be asked of any
//! failure: in which [`Phase`] did it happen, and is it safe to try again
//! ([`Outcome`]).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::crypto::keys::KeyError;
use crate::relay::{Operation, RelayError};
use crate::transaction::TransactionError;
use crate::wallet::WalletError;

/// Pipeline step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Derivation,
    Decode,
    Signing,
    Submission,
    Status,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Derivation => f.write_str("derivation"),
            Self::Decode => f.write_str("decode"),
            Self::Signing => f.write_str("signing"),
            Self::Submission => f.write_str("submission"),
            Self::Status => f.write_str("status"),
        }
    }
}

/// What a failure means for the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing reached the network. Safe to fix and retry.
    NothingSent,
    /// The transaction may be on its way. Check status before resubmitting.
    SubmittedStatusUnknown,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl SignerError {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Wallet(_) | Self::Key(_) => Phase::Derivation,
            Self::Transaction(TransactionError::MalformedEnvelope { .. }) => Phase::Decode,
            Self::Transaction(_) => Phase::Signing,
            Self::Relay(err) => match err {
                RelayError::StatusCheckFailed { .. } => Phase::Status,
                RelayError::Timeout { operation, .. }
                | RelayError::Unreachable { operation, .. }
                | RelayError::InvalidResponse { operation, .. } => match operation {
                    Operation::Submit => Phase::Submission,
                    Operation::Status | Operation::Health => Phase::Status,
                },
                RelayError::SigningKeyMismatch { .. }
                | RelayError::SubmissionError { .. }
                | RelayError::SubmissionInterrupted { .. }
                | RelayError::Client(_) => Phase::Submission,
            },
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Relay(err) if err.maybe_submitted() => Outcome::SubmittedStatusUnknown,
            _ => Outcome::NothingSent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::MalformedReason;
    use std::time::Duration;

    #[test]
    fn test_phases() {
        let decode: SignerError = TransactionError::from(MalformedReason::Empty).into();
        assert_eq!(decode.phase(), Phase::Decode);
        assert_eq!(decode.outcome(), Outcome::NothingSent);

        let derivation: SignerError = WalletError::InvalidDerivationIndex(-1).into();
        assert_eq!(derivation.phase(), Phase::Derivation);

        let signing: SignerError = TransactionError::NoSigningKeys.into();
        assert_eq!(signing.phase(), Phase::Signing);
    }

    #[test]
    fn test_rejection_is_nothing_sent() {
        let err: SignerError = RelayError::SigningKeyMismatch {
            body: "MissingVKeyWitnessesUTXOW".into(),
        }
        .into();
        assert_eq!(err.phase(), Phase::Submission);
        assert_eq!(err.outcome(), Outcome::NothingSent);
    }

    #[test]
    fn test_submit_timeout_is_unknown() {
        let err: SignerError = RelayError::Timeout {
            operation: Operation::Submit,
            after: Duration::from_secs(30),
        }
        .into();
        assert_eq!(err.phase(), Phase::Submission);
        assert_eq!(err.outcome(), Outcome::SubmittedStatusUnknown);
    }

    #[test]
    fn test_status_failure() {
        let err: SignerError = RelayError::StatusCheckFailed {
            detail: "boom".into(),
        }
        .into();
        assert_eq!(err.phase(), Phase::Status);
        assert_eq!(err.outcome(), Outcome::SubmittedStatusUnknown);
        assert_eq!(err.to_string(), "status check failed: boom");
    }
}
