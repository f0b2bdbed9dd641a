//! Node REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Talk to the fullnode REST API (`/v1`)
//! - Query chain state (ledger info, accounts, resources, view functions)
//! - Encode and submit signed transactions, look up their outcome
//! - Bound every request by the configured timeout
//!
//! Each request goes to the configured node exactly once.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{
    AccountAddress, AccountInfo, ChainError, ChainResult, LedgerInfo, NetworkConfig,
    PendingTransaction, TransactionHash, TransactionOutcome, ViewRequest,
};
use crate::observability::metrics;

/// REST client for one fullnode.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base: Url,
    config: NetworkConfig,
    timeout_duration: Duration,
}

#[derive(Deserialize)]
struct NodeErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Deserialize)]
struct GasEstimate {
    gas_estimate: u64,
}

#[derive(Deserialize)]
struct TransactionByHash {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl NodeClient {
    /// Create a new node client.
    ///
    /// The chain id is checked when configured, but a mismatch or an
    /// unreachable node only logs a warning so reads can degrade gracefully.
    pub async fn new(config: NetworkConfig) -> ChainResult<Self> {
        let client = Self::build(config)?;

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    node_url = %client.config.node_url,
                    chain_id = ?client.config.chain_id,
                    "Node client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Node client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Create a client without contacting the node.
    pub fn build(config: NetworkConfig) -> ChainResult<Self> {
        let base = Url::parse(&config.node_url).map_err(|e| {
            ChainError::Rpc(format!("Invalid node URL '{}': {}", config.node_url, e))
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
            config,
        })
    }

    /// Verify the connected chain id matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let info = self.ledger_info().await?;
        if info.chain_id != expected {
            return Err(ChainError::ChainMismatch {
                expected,
                actual: info.chain_id,
            });
        }
        Ok(())
    }

    /// Get ledger metadata from the node index.
    pub async fn ledger_info(&self) -> ChainResult<LedgerInfo> {
        let body = self
            .send("ledger_info", |base| Ok(self.http.get(endpoint(base, &[])?)))
            .await?;
        decode("ledger_info", &body)
    }

    /// Execute a view function and return its raw return values.
    pub async fn view(&self, request: &ViewRequest) -> ChainResult<Vec<serde_json::Value>> {
        let body = self
            .send("view", |base| {
                Ok(self.http.post(endpoint(base, &["view"])?).json(request))
            })
            .await?;
        decode("view", &body)
    }

    /// Get sequence number and authentication key of an account.
    pub async fn account(&self, address: &AccountAddress) -> ChainResult<AccountInfo> {
        let address = address.to_string();
        let body = self
            .send("account", |base| {
                Ok(self.http.get(endpoint(base, &["accounts", &address])?))
            })
            .await?;
        decode("account", &body)
    }

    /// Get one resource stored under an account. `None` if it does not exist.
    pub async fn account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &str,
    ) -> ChainResult<Option<serde_json::Value>> {
        let address = address.to_string();
        let result = self
            .send("account_resource", |base| {
                let url = endpoint(base, &["accounts", &address, "resource", resource_type])?;
                Ok(self.http.get(url))
            })
            .await;

        match result {
            Ok(body) => decode("account_resource", &body).map(Some),
            Err(ChainError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the node's gas unit price estimate in octas.
    pub async fn estimate_gas_price(&self) -> ChainResult<u64> {
        let body = self
            .send("estimate_gas_price", |base| {
                Ok(self.http.get(endpoint(base, &["estimate_gas_price"])?))
            })
            .await?;
        let estimate: GasEstimate = decode("estimate_gas_price", &body)?;
        Ok(estimate.gas_estimate)
    }

    /// Ask the node for the signing message of an unsigned transaction.
    pub async fn encode_submission<T: Serialize>(&self, request: &T) -> ChainResult<Vec<u8>> {
        let body = self
            .send("encode_submission", |base| {
                let url = endpoint(base, &["transactions", "encode_submission"])?;
                Ok(self.http.post(url).json(request))
            })
            .await?;
        let encoded: String = decode("encode_submission", &body)?;
        let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
        hex::decode(digits).map_err(|e| ChainError::Decode(format!("encode_submission: {}", e)))
    }

    /// Submit a signed transaction to the primary node.
    pub async fn submit_transaction<T: Serialize>(
        &self,
        signed: &T,
    ) -> ChainResult<PendingTransaction> {
        let body = self
            .send("submit_transaction", |base| {
                Ok(self.http.post(endpoint(base, &["transactions"])?).json(signed))
            })
            .await?;
        decode("submit_transaction", &body)
    }

    /// Look up a transaction. `None` while it is unknown or still pending.
    pub async fn transaction_by_hash(
        &self,
        hash: &TransactionHash,
    ) -> ChainResult<Option<TransactionOutcome>> {
        let result = self
            .send("transaction_by_hash", |base| {
                let url = endpoint(base, &["transactions", "by_hash", &hash.0])?;
                Ok(self.http.get(url))
            })
            .await;

        let body = match result {
            Ok(body) => body,
            Err(ChainError::Api { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let txn: TransactionByHash = decode("transaction_by_hash", &body)?;
        if txn.kind == "pending_transaction" {
            return Ok(None);
        }

        let version = txn
            .version
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|e| ChainError::Decode(format!("transaction version: {}", e)))?;

        Ok(Some(TransactionOutcome {
            success: txn.success.unwrap_or(false),
            vm_status: txn.vm_status.unwrap_or_default(),
            version,
        }))
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.ledger_info().await.is_ok();
        metrics::record_node_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Send one request to the node and return the body of a 2xx response.
    ///
    /// A non-2xx answer becomes `ChainError::Api`. Transport failures and
    /// timeouts are returned as they are; nothing is resent.
    async fn send<F>(&self, name: &'static str, make: F) -> ChainResult<String>
    where
        F: FnOnce(&Url) -> ChainResult<RequestBuilder>,
    {
        let request = make(&self.base)?;
        let start = Instant::now();
        let result = timeout(self.timeout_duration, async {
            let response = request
                .send()
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            Ok::<_, ChainError>((status, body))
        })
        .await;
        metrics::record_node_request(name, start);

        match result {
            Ok(Ok((status, body))) if status.is_success() => Ok(body),
            Ok(Ok((status, body))) => Err(api_error(status, &body)),
            Ok(Err(e)) => {
                tracing::warn!(request = name, error = %e, "Node request failed");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(request = name, "Node request timed out");
                Err(ChainError::Timeout(self.config.request_timeout_secs))
            }
        }
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("node_url", &self.config.node_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

/// Append path segments to an endpoint base, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> ChainResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ChainError::Rpc(format!("Node URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn api_error(status: StatusCode, body: &str) -> ChainError {
    match serde_json::from_str::<NodeErrorBody>(body) {
        Ok(err) => ChainError::Api {
            status: status.as_u16(),
            message: err.message,
            error_code: err.error_code,
        },
        Err(_) => ChainError::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
            error_code: None,
        },
    }
}

fn decode<T: DeserializeOwned>(name: &str, body: &str) -> ChainResult<T> {
    serde_json::from_str(body).map_err(|e| ChainError::Decode(format!("{}: {}", name, e)))
}
