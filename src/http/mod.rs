//! Read-only HTTP API for the contest views.
//!
//! # Data Flow
//! ```text
//! client request
//!     → server.rs (Axum router, request ID, tracing, timeout)
//!     → handlers.rs (parse path/query, call the gateway)
//!     → response.rs (JSON errors for bad input)
//! ```
//!
//! Gateway reads fail open, so handlers answer with empty data rather than
//! 5xx when the node or contract is unavailable.

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
