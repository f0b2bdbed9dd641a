//! Chain-specific types and error definitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::{NetworkConfig, TransactionConfig};

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address.
///
/// Parses both the long form and short forms such as `0x1` or `0xABC`,
/// which are left-padded with zeros. Always displays in the long form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// The framework address `0x1`.
    pub const ONE: Self = {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = 1;
        Self(bytes)
    };

    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Hex representation with the `0x` prefix, zero-padded to 64 digits.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountAddress {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(ChainError::InvalidAddress(s.to_string()));
        }

        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|_| ChainError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_hex_literal())
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fully qualified entry or view function: `<address>::<module>::<function>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub function: String,
}

impl EntryFunctionId {
    pub fn new(address: AccountAddress, module: &str, function: &str) -> Self {
        Self {
            address,
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}

impl fmt::Display for EntryFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.function)
    }
}

impl Serialize for EntryFunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An argument to an entry or view function, in the node's JSON encoding.
///
/// `u64` values travel as decimal strings; JSON numbers lose precision above 2^53.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValue {
    U64(u64),
    Bool(bool),
    String(String),
    Address(AccountAddress),
}

impl Serialize for MoveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MoveValue::U64(v) => serializer.collect_str(v),
            MoveValue::Bool(b) => serializer.serialize_bool(*b),
            MoveValue::String(s) => serializer.serialize_str(s),
            MoveValue::Address(a) => a.serialize(serializer),
        }
    }
}

/// Payload of a transaction calling an entry function.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<MoveValue>,
}

impl EntryFunctionPayload {
    pub fn new(function: EntryFunctionId, arguments: Vec<MoveValue>) -> Self {
        Self {
            kind: "entry_function_payload",
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Body of a read-only view call.
#[derive(Debug, Clone, Serialize)]
pub struct ViewRequest {
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<MoveValue>,
}

impl ViewRequest {
    pub fn new(function: EntryFunctionId, arguments: Vec<MoveValue>) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }

    pub fn with_type_argument(mut self, type_argument: &str) -> Self {
        self.type_arguments.push(type_argument.to_string());
        self
    }
}

/// Hex-encoded transaction hash as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub String);

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transaction accepted into the node's mempool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: TransactionHash,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default, with = "option_u64_string")]
    pub sequence_number: Option<u64>,
}

/// The committed result of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub success: bool,
    pub vm_status: String,
    pub version: u64,
}

/// On-chain sequence number and key of an account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    #[serde(with = "u64_string")]
    pub sequence_number: u64,
    pub authentication_key: String,
}

/// Ledger metadata from the node index endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    #[serde(with = "u64_string")]
    pub ledger_version: u64,
    /// Microseconds since the unix epoch.
    #[serde(with = "u64_string")]
    pub ledger_timestamp: u64,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport-level failure talking to the node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Node request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with an error body.
    #[error("Node rejected request ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    /// Transaction was committed but the contract aborted it.
    #[error("Transaction aborted: {vm_status}")]
    Aborted { vm_status: String },

    /// Key loading, derivation or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// A response could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Contract address missing from configuration.
    #[error("Contract address is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid account address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction was not committed within the confirmation window.
    #[error("Transaction {0} not committed after {1} seconds")]
    ConfirmationTimeout(TransactionHash, u64),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u8, actual: u8 },
}

impl ChainError {
    /// True when the node gave no answer at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChainError::Rpc(_) | ChainError::Timeout(_))
    }
}

/// Result type for blockchain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Serde adapter for `u64` values carried as decimal strings.
pub mod u64_string {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct U64Visitor;

        impl<'de> Visitor<'de> for U64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a u64 as a decimal string or number")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(U64Visitor)
    }
}

mod option_u64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| s.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}
