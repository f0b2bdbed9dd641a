//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key), [network] config
//!     → wallet.rs (key loading, address derivation, signing)
//!     → client.rs (node REST access with timeouts)
//!     → transaction.rs (build, sign, broadcast, wait for commit)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All node calls have configurable timeouts
//! - Graceful degradation when the node is unreachable

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::NodeClient;
pub use transaction::{LocalSigner, TransactionSigner};
pub use types::{AccountAddress, ChainError, ChainResult, TransactionHash};
pub use wallet::LocalWallet;
