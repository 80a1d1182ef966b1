// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cardano Signer CLI
//!
//! Entry point for the `cardano-signer` binary. Parses arguments, installs
//! logging, builds the network context and runs one command:
//!
//! - `addresses`       public keys, base and reward address for an index
//! - `inspect`         structural summary of a transaction
//! - `sign`            witness a transaction, print the signed hex
//! - `submit`          send a signed transaction to a relay
//! - `sign-and-submit` both of the above
//! - `status`          look a transaction up
//! - `health`          relay health endpoint
//!
//! Command output is JSON on stdout. Logs go to stderr.

mod cli;
mod logging;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;
use std::time::Duration;

use cardano_signer::relay::{
    wait_for_confirmation, BlockfrostRelay, ConfirmationOutcome, PollPolicy, StakingApiRelay,
    TxRelay, TxStatus,
};
use cardano_signer::transaction::{
    decode, hash_body, inspect, required_signers, sign_envelope, sign_with_hash, KeyRole,
    SignedTransaction, SigningStage,
};
use cardano_signer::wallet::address_index_from_signed;
use cardano_signer::{
    derive_address_keys, AddressKeys, NetworkContext, SignerError, TransactionHash,
};

use cli::{Commands, KeyArgs, RelayArgs, SignArgs, SignerCli, SignerSelection, Via, WaitArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = SignerCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Everything the commands share.
struct Session {
    network: NetworkContext,
    timeout: Duration,
}

async fn run(cli: SignerCli) -> Result<()> {
    let ctx = Session {
        network: NetworkContext::new(cli.global.network),
        timeout: Duration::from_secs(cli.global.timeout_secs),
    };
    tracing::debug!(network = %cli.global.network, timeout_secs = cli.global.timeout_secs, "configuration loaded");

    match cli.command {
        Commands::Addresses(args) => addresses(&ctx, &args.keys),
        Commands::Inspect(args) => inspect_tx(&args.tx),
        Commands::Sign(args) => {
            let (signed, roles) = sign(&args)?;
            print_json(&signed_report(&signed, &roles)?)
        }
        Commands::Submit(args) => {
            let envelope = decode(&args.tx)
                .map_err(SignerError::from)
                .context("signed transaction could not be decoded")?;
            let signed = SignedTransaction {
                hash: hash_body(&envelope.body),
                envelope,
            };
            let relay = build_relay(&ctx, &args.relay)?;
            submit(relay.as_ref(), &signed, &args.wait).await
        }
        Commands::SignAndSubmit(args) => {
            let (signed, roles) = sign(&args.sign)?;
            tracing::info!(tx_hash = %signed.hash, signers = roles.len(), "signed, submitting");
            let relay = build_relay(&ctx, &args.relay)?;
            submit(relay.as_ref(), &signed, &args.wait).await
        }
        Commands::Status(args) => {
            let relay = build_relay(&ctx, &args.relay)?;
            let status = relay
                .status(&args.hash)
                .await
                .map_err(SignerError::from)
                .with_context(|| format!("status check for {} failed", args.hash))?;
            print_json(&status_report(&args.hash, &status))
        }
        Commands::Health(args) => {
            let relay = build_relay(&ctx, &args)?;
            let healthy = relay
                .health()
                .await
                .map_err(SignerError::from)
                .context("health check failed")?;
            print_json(&json!({ "relay": relay.name(), "healthy": healthy }))?;
            if healthy {
                Ok(())
            } else {
                Err(anyhow!("relay {} reports unhealthy", relay.name()))
            }
        }
    }
}

fn derive_keys(args: &KeyArgs) -> Result<AddressKeys> {
    let index = address_index_from_signed(args.address_index).map_err(SignerError::from)?;
    derive_address_keys(&args.mnemonic, index)
        .map_err(SignerError::from)
        .context("key derivation failed")
}

fn addresses(ctx: &Session, args: &KeyArgs) -> Result<()> {
    let keys = derive_keys(args)?;
    let base = keys.base_address(&ctx.network).map_err(SignerError::from)?;
    let reward = keys.reward_address(&ctx.network).map_err(SignerError::from)?;

    print_json(&json!({
        "network": ctx.network.network(),
        "addressIndex": keys.address_index,
        "payment": {
            "path": keys.payment.path.to_string(),
            "publicKey": keys.payment.public.to_hex(),
            "keyHash": keys.payment_credential().key_hash,
        },
        "stake": {
            "path": keys.stake.path.to_string(),
            "publicKey": keys.stake.public.to_hex(),
            "keyHash": keys.stake_credential().key_hash,
        },
        "baseAddress": base.to_string(),
        "rewardAddress": reward.to_string(),
    }))
}

fn inspect_tx(tx: &str) -> Result<()> {
    let envelope = decode(tx)
        .map_err(SignerError::from)
        .context("transaction could not be decoded")?;
    print_json(&inspect(&envelope))
}

fn sign(args: &SignArgs) -> Result<(SignedTransaction, Vec<KeyRole>)> {
    let envelope = decode(&args.tx)
        .map_err(SignerError::from)
        .context("unsigned transaction could not be decoded")?;
    let keys = derive_keys(&args.keys)?;

    let roles = match args.signers {
        SignerSelection::Auto => required_signers(&envelope.body, &keys),
        SignerSelection::Payment => vec![KeyRole::Payment],
        SignerSelection::PaymentStake => vec![KeyRole::Payment, KeyRole::Stake],
    };
    let signers = keys.signers_for(&roles);

    let signed = match &args.expected_hash {
        Some(expected) => sign_with_hash(&envelope, &signers, expected),
        None => sign_envelope(&envelope, &signers),
    }
    .map_err(SignerError::from)
    .context("signing failed")?;

    Ok((signed, roles))
}

fn build_relay(ctx: &Session, args: &RelayArgs) -> Result<Box<dyn TxRelay>> {
    let relay: Box<dyn TxRelay> = match args.via {
        Via::Blockfrost => {
            let project_id = args
                .blockfrost_api_key
                .as_deref()
                .context("BLOCKFROST_API_KEY (or --blockfrost-api-key) is required for --via blockfrost")?;
            let network = match &args.blockfrost_url {
                Some(url) => ctx.network.clone().with_relay_url(url.as_str()),
                None => ctx.network.clone(),
            };
            Box::new(
                BlockfrostRelay::new(&network, project_id, ctx.timeout)
                    .map_err(SignerError::from)?,
            )
        }
        Via::Api => {
            let api_key = args
                .api_key
                .as_deref()
                .context("API_KEY (or --api-key) is required for --via api")?;
            Box::new(
                StakingApiRelay::new(args.api_base_url.as_str(), api_key, ctx.timeout)
                    .map_err(SignerError::from)?,
            )
        }
    };
    Ok(relay)
}

async fn submit(relay: &dyn TxRelay, signed: &SignedTransaction, wait: &WaitArgs) -> Result<()> {
    let bytes = signed
        .to_bytes()
        .map_err(SignerError::from)
        .context("failed to encode signed transaction")?;

    let returned = relay
        .submit(&bytes)
        .await
        .map_err(SignerError::from)
        .with_context(|| format!("submission of {} via {} failed", signed.hash, relay.name()))?;
    if returned != signed.hash {
        tracing::warn!(local = %signed.hash, relay = %returned, "relay reported a different transaction id");
    }
    tracing::info!(tx_hash = %returned, stage = %SigningStage::Submitted, relay = relay.name(), "submitted");

    if !wait.wait {
        return print_json(&json!({
            "txHash": returned,
            "stage": SigningStage::Submitted,
        }));
    }

    let policy = PollPolicy {
        max_attempts: wait.max_attempts,
        ..PollPolicy::default()
    };
    let outcome = wait_for_confirmation(relay, &returned, &policy).await;
    match &outcome {
        ConfirmationOutcome::Confirmed { .. } => {}
        ConfirmationOutcome::Pending { attempts, .. } => {
            tracing::warn!(tx_hash = %returned, attempts, "submitted but not confirmed yet; check again with `status`");
        }
        ConfirmationOutcome::Unknown { attempts, last_error } => {
            tracing::warn!(tx_hash = %returned, attempts, error = %last_error, "submitted, confirmation status unknown; do not resubmit blindly");
        }
    }

    print_json(&json!({
        "txHash": returned,
        "stage": outcome.stage(),
        "confirmation": outcome,
    }))
}

fn signed_report(signed: &SignedTransaction, roles: &[KeyRole]) -> Result<serde_json::Value> {
    let hex_tx = signed
        .to_hex()
        .map_err(SignerError::from)
        .context("failed to encode signed transaction")?;
    Ok(json!({
        "txHash": signed.hash,
        "signers": roles,
        "vkeyWitnesses": signed.envelope.witness_set.vkey_count(),
        "signedTx": hex_tx,
    }))
}

fn status_report(hash: &TransactionHash, status: &TxStatus) -> serde_json::Value {
    let block_time = status
        .block_time
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339());
    json!({
        "txHash": hash,
        "status": status,
        "blockTimeUtc": block_time,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Log the failure with what it means for the transaction.
fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<SignerError>() {
        Some(signer_err) => {
            tracing::error!(
                phase = %signer_err.phase(),
                outcome = ?signer_err.outcome(),
                "{err:#}"
            );
        }
        None => tracing::error!("{err:#}"),
    }
}
