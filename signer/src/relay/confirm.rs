//! Confirmation polling.
//!
//! A bounded loop: wait, ask, double the wait (up to a cap), ask again.
//! Failed status checks are logged and polling continues. The poller never
//! returns an error, because an error after a submission invites a resend;
//! when nothing could be learned the outcome is [`ConfirmationOutcome::Unknown`].

use serde::Serialize;
use std::time::Duration;

use super::{TxRelay, TxStatus};
use crate::config::{CONFIRMATION_INITIAL_DELAY, CONFIRMATION_MAX_ATTEMPTS, CONFIRMATION_MAX_DELAY};
use crate::transaction::signing::SigningStage;
use crate::transaction::TransactionHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
    pub backoff_factor: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: CONFIRMATION_INITIAL_DELAY,
            max_delay: CONFIRMATION_MAX_DELAY,
            max_attempts: CONFIRMATION_MAX_ATTEMPTS,
            backoff_factor: 2,
        }
    }
}

impl PollPolicy {
    /// Delay that follows `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_factor.max(1))
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ConfirmationOutcome {
    /// In a block.
    Confirmed { status: TxStatus, attempts: u32 },
    /// Answered every time we asked (or some of the times), never in a block.
    Pending { status: TxStatus, attempts: u32 },
    /// Every status check failed. The transaction may or may not be on chain.
    Unknown { attempts: u32, last_error: String },
}

impl ConfirmationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn stage(&self) -> SigningStage {
        match self {
            Self::Confirmed { .. } => SigningStage::Confirmed,
            Self::Pending { .. } | Self::Unknown { .. } => SigningStage::Pending,
        }
    }
}

/// Poll `relay` until `hash` is in a block or `policy` runs out of attempts.
pub async fn wait_for_confirmation(
    relay: &dyn TxRelay,
    hash: &TransactionHash,
    policy: &PollPolicy,
) -> ConfirmationOutcome {
    let mut delay = policy.initial_delay;
    let mut last_status = None;
    let mut last_error = String::from("no status check was made");

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(delay).await;

        match relay.status(hash).await {
            Ok(status) if status.confirmed => {
                tracing::info!(
                    relay = relay.name(),
                    tx_hash = %hash,
                    attempt,
                    block = status.block.as_deref().unwrap_or_default(),
                    stage = %SigningStage::Confirmed,
                    "transaction confirmed"
                );
                return ConfirmationOutcome::Confirmed {
                    status,
                    attempts: attempt,
                };
            }
            Ok(status) => {
                tracing::debug!(relay = relay.name(), tx_hash = %hash, attempt, "not confirmed yet");
                last_status = Some(status);
            }
            Err(err) => {
                tracing::warn!(
                    relay = relay.name(),
                    tx_hash = %hash,
                    attempt,
                    error = %err,
                    "status check failed, will retry"
                );
                last_error = err.to_string();
            }
        }

        delay = policy.next_delay(delay);
    }

    let attempts = policy.max_attempts;
    match last_status {
        Some(status) => {
            tracing::warn!(tx_hash = %hash, attempts, stage = %SigningStage::Pending, "transaction still pending");
            ConfirmationOutcome::Pending { status, attempts }
        }
        None => {
            tracing::warn!(tx_hash = %hash, attempts, "confirmation status unknown");
            ConfirmationOutcome::Unknown {
                attempts,
                last_error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted status answers, then keeps saying "pending".
    struct ScriptedRelay {
        answers: Mutex<VecDeque<Result<TxStatus, RelayError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedRelay {
        fn new(answers: Vec<Result<TxStatus, RelayError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TxRelay for ScriptedRelay {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn submit(&self, _tx: &[u8]) -> Result<TransactionHash, RelayError> {
            unreachable!("the poller never submits")
        }

        async fn status(&self, _hash: &TransactionHash) -> Result<TxStatus, RelayError> {
            *self.calls.lock().unwrap() += 1;
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TxStatus::pending()))
        }

        async fn health(&self) -> Result<bool, RelayError> {
            Ok(true)
        }
    }

    fn confirmed() -> TxStatus {
        TxStatus {
            confirmed: true,
            block: Some("b10c".into()),
            ..TxStatus::default()
        }
    }

    fn failure() -> RelayError {
        RelayError::StatusCheckFailed {
            detail: "connection reset".into(),
        }
    }

    const HASH: TransactionHash = TransactionHash::from_bytes([9u8; 32]);

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = PollPolicy {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
            backoff_factor: 2,
        };
        let mut delay = policy.initial_delay;
        let mut seen = vec![];
        for _ in 0..4 {
            delay = policy.next_delay(delay);
            seen.push(delay.as_secs());
        }
        assert_eq!(seen, vec![10, 20, 30, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_pending() {
        let relay = ScriptedRelay::new(vec![Ok(TxStatus::pending()), Ok(confirmed())]);
        let outcome = wait_for_confirmation(&relay, &HASH, &PollPolicy::default()).await;
        assert!(outcome.is_confirmed());
        assert!(matches!(outcome, ConfirmationOutcome::Confirmed { attempts: 2, .. }));
        assert_eq!(relay.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_polling() {
        let relay = ScriptedRelay::new(vec![Err(failure()), Err(failure()), Ok(confirmed())]);
        let outcome = wait_for_confirmation(&relay, &HASH, &PollPolicy::default()).await;
        assert_eq!(outcome.stage(), SigningStage::Confirmed);
        assert_eq!(relay.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_pending() {
        let relay = ScriptedRelay::new(vec![Err(failure())]);
        let policy = PollPolicy {
            max_attempts: 3,
            ..PollPolicy::default()
        };
        let outcome = wait_for_confirmation(&relay, &HASH, &policy).await;
        assert_eq!(
            outcome,
            ConfirmationOutcome::Pending {
                status: TxStatus::pending(),
                attempts: 3
            }
        );
        assert_eq!(relay.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_is_unknown() {
        let relay = ScriptedRelay::new(vec![Err(failure()), Err(failure())]);
        let policy = PollPolicy {
            max_attempts: 2,
            ..PollPolicy::default()
        };
        let outcome = wait_for_confirmation(&relay, &HASH, &policy).await;
        match outcome {
            ConfirmationOutcome::Unknown {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("connection reset"));
            }
            other => panic!("expected unknown outcome, got {other:?}"),
        }
    }
}
