use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::types::AccountAddress;
use crate::gateway::{ConfigurationStatus, NameSuggestion, PrizePool, VotePack};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

const DEFAULT_LEADERBOARD_SIZE: usize = 10;
const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub configuration: ConfigurationStatus,
    pub node_healthy: bool,
    pub contract_deployed: bool,
}

#[derive(Serialize)]
pub struct VotingEndTime {
    pub end_time: u64,
    /// `None` while the end time is unknown.
    pub open: Option<bool>,
}

#[derive(Serialize)]
pub struct Balance {
    pub address: AccountAddress,
    pub balance: f64,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

pub async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    metrics::record_api_request("status");
    let (node_healthy, contract_deployed) = tokio::join!(
        state.gateway.client().is_healthy(),
        state.gateway.is_contract_deployed()
    );

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        configuration: state.gateway.configuration_status(),
        node_healthy,
        contract_deployed,
    })
}

pub async fn get_suggestions(State(state): State<AppState>) -> Json<Vec<NameSuggestion>> {
    metrics::record_api_request("suggestions");
    Json(state.gateway.get_suggestions().await)
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Json<Vec<NameSuggestion>> {
    metrics::record_api_request("leaderboard");
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .min(MAX_LEADERBOARD_SIZE);
    Json(state.gateway.get_leaderboard(limit).await)
}

pub async fn get_user_suggestions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<NameSuggestion>>, ApiError> {
    metrics::record_api_request("user_suggestions");
    let address: AccountAddress = address.parse()?;
    Ok(Json(state.gateway.get_user_suggestions(&address).await))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    metrics::record_api_request("account");
    let address: AccountAddress = address.parse()?;

    let response = match state.gateway.get_user_account(&address).await {
        Some(account) => Json(json!({ "registered": true, "account": account })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "registered": false })),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Balance>, ApiError> {
    metrics::record_api_request("balance");
    let address: AccountAddress = address.parse()?;
    let balance = state.gateway.get_account_balance(&address).await;
    Ok(Json(Balance { address, balance }))
}

pub async fn get_prize_pool(State(state): State<AppState>) -> Json<PrizePool> {
    metrics::record_api_request("prize_pool");
    Json(state.gateway.get_prize_pool().await)
}

pub async fn get_voting_end_time(State(state): State<AppState>) -> Json<VotingEndTime> {
    metrics::record_api_request("voting_end_time");
    let end_time = state.gateway.get_voting_end_time().await;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    Json(VotingEndTime {
        end_time,
        open: (end_time > 0).then_some(now < end_time),
    })
}

pub async fn get_packs(State(state): State<AppState>) -> Json<Vec<VotePack>> {
    Json(state.packs.as_ref().clone())
}
