//! Contest gateway subsystem.
//!
//! # Data Flow
//! ```text
//! caller intent (register, suggest, vote, buy, read)
//!     → service.rs (entry-function payload or view request)
//!     → blockchain::TransactionSigner / blockchain::NodeClient
//!     → types.rs (parse Move JSON into application types)
//!     → abort.rs (caller-side mapping of contract errors to messages)
//! ```

pub mod abort;
pub mod service;
pub mod types;

pub use abort::{describe_failure, ContestAbort};
pub use service::{ConfigurationStatus, ContestGateway};
pub use types::{NameSuggestion, PrizePool, UserAccount, VotePack};
