//! Transaction signing, submission, and commit monitoring.
//!
//! # Responsibilities
//! - Define the signing seam the gateway submits through
//! - Build, sign and broadcast transactions with a local key
//! - Wait for commit and surface contract aborts as errors

use serde::Serialize;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, timeout};

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{
    AccountAddress, ChainError, ChainResult, EntryFunctionPayload, PendingTransaction,
    TransactionConfig, TransactionHash, TransactionOutcome,
};
use crate::blockchain::wallet::LocalWallet;

/// Signs a transaction for `sender` and submits it to the chain.
///
/// This is the only way the gateway mutates chain state, so wallet
/// integrations (browser bridges, hardware keys, test doubles) plug in here.
pub trait TransactionSigner {
    fn sign_and_submit(
        &self,
        sender: &AccountAddress,
        payload: EntryFunctionPayload,
    ) -> impl Future<Output = ChainResult<PendingTransaction>> + Send;
}

/// Unsigned transaction in the node's JSON submission format.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRequest {
    pub sender: AccountAddress,
    #[serde(with = "crate::blockchain::types::u64_string")]
    pub sequence_number: u64,
    #[serde(with = "crate::blockchain::types::u64_string")]
    pub max_gas_amount: u64,
    #[serde(with = "crate::blockchain::types::u64_string")]
    pub gas_unit_price: u64,
    #[serde(with = "crate::blockchain::types::u64_string")]
    pub expiration_timestamp_secs: u64,
    pub payload: EntryFunctionPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionSignature {
    Ed25519Signature { public_key: String, signature: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedSubmission {
    #[serde(flatten)]
    pub request: SubmissionRequest,
    pub signature: TransactionSignature,
}

/// Signer backed by a key held in this process.
#[derive(Debug)]
pub struct LocalSigner {
    client: NodeClient,
    wallet: LocalWallet,
    config: TransactionConfig,
}

impl LocalSigner {
    pub fn new(client: NodeClient, wallet: LocalWallet, config: TransactionConfig) -> Self {
        Self {
            client,
            wallet,
            config,
        }
    }

    /// Get the wallet address.
    pub fn address(&self) -> AccountAddress {
        self.wallet.address()
    }

    async fn build(&self, payload: EntryFunctionPayload) -> ChainResult<SubmissionRequest> {
        let sender = self.wallet.address();
        let account = self.client.account(&sender).await?;

        let gas_unit_price = match self.config.gas_unit_price {
            Some(price) => price,
            None => self.client.estimate_gas_price().await?,
        };

        Ok(SubmissionRequest {
            sender,
            sequence_number: account.sequence_number,
            max_gas_amount: self.config.max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs: expiration_timestamp(self.config.expiration_secs),
            payload,
        })
    }

    async fn submit(&self, payload: EntryFunctionPayload) -> ChainResult<PendingTransaction> {
        let request = self.build(payload).await?;
        let signing_message = self.client.encode_submission(&request).await?;

        let signed = SignedSubmission {
            signature: TransactionSignature::Ed25519Signature {
                public_key: self.wallet.public_key_hex(),
                signature: self.wallet.sign(&signing_message),
            },
            request,
        };

        let pending = self.client.submit_transaction(&signed).await?;
        tracing::info!(
            hash = %pending.hash,
            sender = %signed.request.sender,
            sequence_number = signed.request.sequence_number,
            function = %signed.request.payload.function,
            "Transaction submitted"
        );

        if self.config.wait_for_commit {
            let outcome = wait_for_commit(&self.client, &pending.hash, &self.config).await?;
            tracing::info!(hash = %pending.hash, version = outcome.version, "Transaction committed");
        }

        Ok(pending)
    }
}

impl TransactionSigner for LocalSigner {
    async fn sign_and_submit(
        &self,
        sender: &AccountAddress,
        payload: EntryFunctionPayload,
    ) -> ChainResult<PendingTransaction> {
        if *sender != self.wallet.address() {
            return Err(ChainError::Wallet(format!(
                "Sender {} does not match wallet address {}",
                sender,
                self.wallet.address()
            )));
        }
        self.submit(payload).await
    }
}

/// Unix seconds `expiration_secs` from now, saturating at `u64::MAX`.
fn expiration_timestamp(expiration_secs: u64) -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .saturating_add(expiration_secs)
}

/// Wait for a transaction to be committed.
///
/// A committed but unsuccessful transaction becomes `ChainError::Aborted`
/// carrying the VM status, which embeds any contract abort code.
pub async fn wait_for_commit(
    client: &NodeClient,
    hash: &TransactionHash,
    config: &TransactionConfig,
) -> ChainResult<TransactionOutcome> {
    let timeout_duration = Duration::from_secs(config.confirmation_timeout_secs);
    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    let result = timeout(timeout_duration, async {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            match client.transaction_by_hash(hash).await? {
                Some(outcome) if outcome.success => return Ok(outcome),
                Some(outcome) => {
                    return Err(ChainError::Aborted {
                        vm_status: outcome.vm_status,
                    })
                }
                None => tracing::debug!(hash = %hash, "Transaction pending"),
            }
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => Err(ChainError::ConfirmationTimeout(
            hash.clone(),
            config.confirmation_timeout_secs,
        )),
    }
}
