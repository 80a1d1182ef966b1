//! # Relay
//!
//! Getting a signed transaction onto the network and finding out whether it
//! made it into a block.
//!
//! - [`blockfrost::BlockfrostRelay`]: hosted relay, raw CBOR submission.
//! - [`staking_api::StakingApiRelay`]: the staking API that crafted the
//!   transaction, JSON submission.
//! - [`confirm::wait_for_confirmation`]: bounded polling with backoff.
//!
//! Submissions are never retried here. A rejected transaction is reported
//! with the relay's own words, and a submission whose fate is unknown is
//! reported as such so the caller does not resend blindly.

pub mod blockfrost;
pub mod confirm;
pub mod staking_api;

pub use blockfrost::BlockfrostRelay;
pub use confirm::{wait_for_confirmation, ConfirmationOutcome, PollPolicy};
pub use staking_api::StakingApiRelay;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::transaction::TransactionHash;

/// Upper bound on connection setup, whatever the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fragments of ledger rejections caused by missing or wrong witnesses.
const WITNESS_REJECTION_MARKERS: [&str; 5] = [
    "missingvkeywitnesses",
    "invalidwitnesses",
    "missing witness",
    "invalid witness",
    "missing vkey witness",
];

/// The relay call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Submit,
    Status,
    Health,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => f.write_str("submit"),
            Self::Status => f.write_str("status"),
            Self::Health => f.write_str("health"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The ledger rejected the witnesses: a key that should have signed
    /// did not, or signed something else.
    #[error("transaction rejected for missing or invalid witnesses: {body}")]
    SigningKeyMismatch { body: String },

    #[error("submission rejected with HTTP {code}: {body}")]
    SubmissionError { code: u16, body: String },

    #[error("status check failed: {detail}")]
    StatusCheckFailed { detail: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },

    /// No connection was made. Nothing reached the relay.
    #[error("{operation} failed: relay unreachable: {detail}")]
    Unreachable { operation: Operation, detail: String },

    /// The request broke off after it was sent.
    #[error("submission interrupted: {detail}")]
    SubmissionInterrupted { detail: String },

    #[error("unexpected {operation} response: {detail}")]
    InvalidResponse { operation: Operation, detail: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl RelayError {
    /// Whether the transaction may have reached the relay.
    pub fn maybe_submitted(&self) -> bool {
        match self {
            Self::Timeout { operation, .. } => *operation != Operation::Health,
            Self::Unreachable { operation, .. } => *operation == Operation::Status,
            Self::SubmissionInterrupted { .. } | Self::StatusCheckFailed { .. } => true,
            Self::InvalidResponse { operation, .. } => *operation != Operation::Health,
            Self::SigningKeyMismatch { .. } | Self::SubmissionError { .. } | Self::Client(_) => {
                false
            }
        }
    }
}

/// Confirmation state of a submitted transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatus {
    pub confirmed: bool,
    /// Block hash or height, as the relay reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    /// Lovelace, as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<String>,
}

impl TxStatus {
    /// Not (yet) in a block.
    pub fn pending() -> Self {
        Self::default()
    }
}

/// Somewhere a signed transaction can be sent.
#[async_trait]
pub trait TxRelay: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Submit a binary transaction, returning the id the relay assigned.
    async fn submit(&self, tx: &[u8]) -> Result<TransactionHash, RelayError>;

    /// Look a transaction up. Unknown transactions are pending, not errors.
    async fn status(&self, hash: &TransactionHash) -> Result<TxStatus, RelayError>;

    /// Whether the relay answers its health endpoint.
    async fn health(&self) -> Result<bool, RelayError>;
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .build()
        .map_err(|e| RelayError::Client(e.to_string()))
}

/// Map a transport failure to the error that says what we know about it.
pub(crate) fn transport_error(
    operation: Operation,
    timeout: Duration,
    err: reqwest::Error,
) -> RelayError {
    if err.is_timeout() {
        return RelayError::Timeout {
            operation,
            after: timeout,
        };
    }
    if err.is_connect() {
        return RelayError::Unreachable {
            operation,
            detail: err.to_string(),
        };
    }
    match operation {
        Operation::Submit => RelayError::SubmissionInterrupted {
            detail: err.to_string(),
        },
        Operation::Status | Operation::Health => RelayError::StatusCheckFailed {
            detail: err.to_string(),
        },
    }
}

/// A non-2xx submission response.
pub(crate) fn classify_rejection(code: u16, body: String) -> RelayError {
    let lower = body.to_lowercase();
    let witness_problem = WITNESS_REJECTION_MARKERS
        .iter()
        .any(|marker| lower.contains(marker));
    if (400..500).contains(&code) && witness_problem {
        RelayError::SigningKeyMismatch { body }
    } else {
        RelayError::SubmissionError { code, body }
    }
}

/// Transaction id from a submission response, bare or JSON-quoted.
pub(crate) fn parse_returned_hash(
    operation: Operation,
    raw: &str,
) -> Result<TransactionHash, RelayError> {
    let text = serde_json::from_str::<String>(raw)
        .unwrap_or_else(|_| raw.trim().trim_matches('"').to_string());
    text.parse::<TransactionHash>()
        .map_err(|e| RelayError::InvalidResponse {
            operation,
            detail: e.to_string(),
        })
}
