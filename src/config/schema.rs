//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::gateway::types::VotePack;

/// Root configuration for the contest gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Node endpoints and request limits.
    pub network: NetworkConfig,

    /// Where the contest contract lives.
    pub contract: ContractConfig,

    /// Gas and confirmation settings for submitted transactions.
    pub transactions: TransactionConfig,

    /// Read-only API listener.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Vote pack catalog offered to users.
    pub packs: Vec<VotePack>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            contract: ContractConfig::default(),
            transactions: TransactionConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
            packs: VotePack::default_catalog(),
        }
    }
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// REST endpoint of the fullnode, including the `/v1` prefix.
    pub node_url: String,

    /// Expected chain id; skipped when unset.
    pub chain_id: Option<u8>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_url: "https://fullnode.testnet.aptoslabs.com/v1".to_string(),
            chain_id: Some(2), // testnet
            request_timeout_secs: 10,
        }
    }
}

/// Contest contract location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Publisher address of the contract. Absence is a recognized state.
    pub address: Option<String>,

    /// Move module exposing the contest functions.
    pub module: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: None,
            module: "geomi_voting".to_string(),
        }
    }
}

/// Transaction building and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Upper bound on gas units a transaction may consume.
    pub max_gas_amount: u64,

    /// Gas unit price in octas; ask the node for an estimate when unset.
    pub gas_unit_price: Option<u64>,

    /// Seconds from now until the transaction expires.
    pub expiration_secs: u64,

    /// Block until the transaction is committed.
    pub wait_for_commit: bool,

    /// How long to wait for a commit in seconds.
    pub confirmation_timeout_secs: u64,

    /// Polling interval while waiting in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 20_000,
            gas_unit_price: None,
            expiration_secs: 60,
            wait_for_commit: true,
            confirmation_timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
