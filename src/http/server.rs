//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the read-only contest API
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until a shutdown signal arrives

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::gateway::{ContestGateway, VotePack};
use crate::http::handlers::*;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::signals::shutdown_signal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ContestGateway>,
    pub packs: Arc<Vec<VotePack>>,
}

impl AppState {
    pub fn new(gateway: ContestGateway, packs: Vec<VotePack>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            packs: Arc::new(packs),
        }
    }
}

/// HTTP server for the contest API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            router: build_router(config, state),
        }
    }

    /// Consume the server and return its router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/api/status", get(get_status))
        .route("/api/suggestions", get(get_suggestions))
        .route("/api/suggestions/by/{address}", get(get_user_suggestions))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/accounts/{address}", get(get_account))
        .route("/api/accounts/{address}/balance", get(get_balance))
        .route("/api/prize-pool", get(get_prize_pool))
        .route("/api/voting-end-time", get(get_voting_end_time))
        .route("/api/packs", get(get_packs))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
