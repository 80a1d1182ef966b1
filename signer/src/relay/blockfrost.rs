//! Hosted relay client (Blockfrost-compatible HTTP API).
//!
//! ```text
//! POST {base}/tx/submit      body: raw CBOR, Content-Type: application/cbor
//! GET  {base}/txs/{hash}     404 while the transaction is not on chain
//! GET  {base}/health         {"is_healthy": true}
//! ```
//!
//! Every request carries the `project_id` header.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{
    build_client, classify_rejection, parse_returned_hash, transport_error, Operation,
    RelayError, TxRelay, TxStatus,
};
use crate::config::NetworkContext;
use crate::transaction::TransactionHash;

const PROJECT_ID_HEADER: &str = "project_id";

#[derive(Debug, Deserialize)]
struct TxDetails {
    block: Option<String>,
    block_height: Option<u64>,
    block_time: Option<i64>,
    slot: Option<u64>,
    fees: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Health {
    is_healthy: bool,
}

#[derive(Debug, Clone)]
pub struct BlockfrostRelay {
    base_url: String,
    project_id: String,
    timeout: Duration,
    client: Client,
}

impl BlockfrostRelay {
    /// Client for the relay URL of `ctx`.
    pub fn new(
        ctx: &NetworkContext,
        project_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = build_client(timeout)?;
        tracing::info!(network = %ctx.network(), url = ctx.relay_url(), "relay client initialized");
        Ok(Self {
            base_url: ctx.relay_url().to_string(),
            project_id: project_id.into(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TxRelay for BlockfrostRelay {
    fn name(&self) -> &'static str {
        "blockfrost"
    }

    async fn submit(&self, tx: &[u8]) -> Result<TransactionHash, RelayError> {
        let url = format!("{}/tx/submit", self.base_url);
        tracing::debug!(%url, bytes = tx.len(), "submitting transaction");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/cbor")
            .header(PROJECT_ID_HEADER, &self.project_id)
            .body(tx.to_vec())
            .send()
            .await
            .map_err(|e| transport_error(Operation::Submit, self.timeout, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(Operation::Submit, self.timeout, e))?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %text, "submission rejected");
            return Err(classify_rejection(status.as_u16(), text));
        }

        let hash = parse_returned_hash(Operation::Submit, &text)?;
        tracing::info!(tx_hash = %hash, "transaction submitted");
        Ok(hash)
    }

    async fn status(&self, hash: &TransactionHash) -> Result<TxStatus, RelayError> {
        let url = format!("{}/txs/{}", self.base_url, hash);
        tracing::debug!(%url, "checking transaction status");

        let response = self
            .client
            .get(&url)
            .header(PROJECT_ID_HEADER, &self.project_id)
            .send()
            .await
            .map_err(|e| transport_error(Operation::Status, self.timeout, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(tx_hash = %hash, "transaction not found yet");
                return Ok(TxStatus::pending());
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::StatusCheckFailed {
                    detail: format!("HTTP {}: {}", status.as_u16(), body),
                });
            }
            _ => {}
        }

        let details: TxDetails = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(Operation::Status, self.timeout, e)
            } else {
                RelayError::StatusCheckFailed {
                    detail: e.to_string(),
                }
            }
        })?;

        Ok(TxStatus {
            confirmed: details.block.is_some(),
            block: details.block,
            block_height: details.block_height,
            block_time: details.block_time,
            slot: details.slot,
            fees: details.fees,
        })
    }

    async fn health(&self) -> Result<bool, RelayError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(PROJECT_ID_HEADER, &self.project_id)
            .send()
            .await
            .map_err(|e| transport_error(Operation::Health, self.timeout, e))?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "relay health check failed");
            return Ok(false);
        }
        let health: Health = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(Operation::Health, self.timeout, e)
            } else {
                RelayError::InvalidResponse {
                    operation: Operation::Health,
                    detail: e.to_string(),
                }
            }
        })?;
        Ok(health.is_healthy)
    }
}
