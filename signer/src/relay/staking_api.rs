//! Staking API client.
//!
//! The same service that crafts unsigned transactions also relays signed
//! ones. Requests are JSON and carry the `api-key` header.
//!
//! ```text
//! POST {base}/cardano/submit      {"signedTx": "<hex>"} -> {"txHash": "<hex>"}
//! GET  {base}/cardano/tx/{hash}   {"block", "blockTime", "slot", "fees"}
//! GET  {base}/health
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{
    build_client, classify_rejection, parse_returned_hash, transport_error, Operation,
    RelayError, TxRelay, TxStatus,
};
use crate::transaction::TransactionHash;

const API_KEY_HEADER: &str = "api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    signed_tx: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    tx_hash: String,
}

/// Numbers and strings both occur in the wild for these fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxStatusResponse {
    block: Option<Value>,
    block_time: Option<i64>,
    slot: Option<u64>,
    fees: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct StakingApiRelay {
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl StakingApiRelay {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = build_client(timeout)?;
        tracing::info!(url = %base_url, "staking API client initialized");
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl TxRelay for StakingApiRelay {
    fn name(&self) -> &'static str {
        "staking-api"
    }

    async fn submit(&self, tx: &[u8]) -> Result<TransactionHash, RelayError> {
        let url = format!("{}/cardano/submit", self.base_url);
        let signed_tx = hex::encode(tx);
        tracing::debug!(%url, bytes = tx.len(), "submitting transaction");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&SubmitRequest {
                signed_tx: &signed_tx,
            })
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

        let parsed: SubmitResponse =
            serde_json::from_str(&text).map_err(|e| RelayError::InvalidResponse {
                operation: Operation::Submit,
                detail: e.to_string(),
            })?;
        let hash = parse_returned_hash(Operation::Submit, &parsed.tx_hash)?;
        tracing::info!(tx_hash = %hash, "transaction submitted");
        Ok(hash)
    }

    async fn status(&self, hash: &TransactionHash) -> Result<TxStatus, RelayError> {
        let url = format!("{}/cardano/tx/{}", self.base_url, hash);
        tracing::debug!(%url, "checking transaction status");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(Operation::Status, self.timeout, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(TxStatus::pending()),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::StatusCheckFailed {
                    detail: format!("HTTP {}: {}", status.as_u16(), body),
                });
            }
            _ => {}
        }

        let parsed: TxStatusResponse =
            response
                .json()
                .await
                .map_err(|e| RelayError::StatusCheckFailed {
                    detail: e.to_string(),
                })?;

        let block_height = parsed.block.as_ref().and_then(Value::as_u64);
        let block = parsed.block.and_then(value_to_string);
        Ok(TxStatus {
            confirmed: block.is_some(),
            block,
            block_height,
            block_time: parsed.block_time,
            slot: parsed.slot,
            fees: parsed.fees.and_then(value_to_string),
        })
    }

    async fn health(&self) -> Result<bool, RelayError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(Operation::Health, self.timeout, e))?;
        let healthy = response.status().is_success();
        tracing::debug!(status = response.status().as_u16(), healthy, "health check");
        Ok(healthy)
    }
}
