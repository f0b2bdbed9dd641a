//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and cross-field rules and
//! returns every problem found, not just the first. A missing contract
//! address is not an error; the gateway then serves empty reads and rejects
//! writes.

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::blockchain::types::AccountAddress;
use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid URL for {field}: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("invalid contract address '{0}'")]
    InvalidContractAddress(String),

    #[error("empty contract module name")]
    EmptyModule,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("invalid socket address for {field}: '{value}'")]
    InvalidBindAddress { field: &'static str, value: String },

    #[error("duplicate vote pack id '{0}'")]
    DuplicatePack(String),

    #[error("vote pack '{0}' must grant votes and have a positive price")]
    InvalidPack(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url("network.node_url", &config.network.node_url, &mut errors);
    if config.network.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("network.request_timeout_secs"));
    }

    if let Some(address) = &config.contract.address {
        if address.parse::<AccountAddress>().is_err() {
            errors.push(ValidationError::InvalidContractAddress(address.clone()));
        }
    }
    if config.contract.module.trim().is_empty() {
        errors.push(ValidationError::EmptyModule);
    }

    let tx = &config.transactions;
    if tx.max_gas_amount == 0 {
        errors.push(ValidationError::ZeroValue("transactions.max_gas_amount"));
    }
    if tx.expiration_secs == 0 {
        errors.push(ValidationError::ZeroValue("transactions.expiration_secs"));
    }
    if tx.wait_for_commit && tx.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroValue("transactions.poll_interval_ms"));
    }
    if tx.wait_for_commit && tx.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("transactions.confirmation_timeout_secs"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidBindAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let mut seen = HashSet::new();
    for pack in &config.packs {
        if !seen.insert(pack.id.as_str()) {
            errors.push(ValidationError::DuplicatePack(pack.id.clone()));
        }
        if pack.votes == 0 || !(pack.price.is_finite() && pack.price > 0.0) {
            errors.push(ValidationError::InvalidPack(pack.id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}
