//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed by value to the client, gateway and server constructors
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, resolve_config_with, ConfigError};
pub use schema::{
    ContractConfig, GatewayConfig, NetworkConfig, ObservabilityConfig, ServerConfig,
    TransactionConfig,
};
