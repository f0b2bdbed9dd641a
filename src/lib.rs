//! Gateway to the mascot-naming contest contract.
//!
//! The contract owns every rule (registration, vote accounting, prize pool,
//! voting period). This crate builds its transactions, runs its view calls,
//! and serves the results to the dApp views.

pub mod blockchain;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use gateway::ContestGateway;
pub use http::HttpServer;
