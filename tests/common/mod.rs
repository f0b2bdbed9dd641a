//! Shared utilities for integration testing: an in-memory fullnode that
//! speaks the subset of the REST API the gateway uses, and runs a toy
//! version of the contest contract.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use contest_gateway::blockchain::types::{
    AccountAddress, ChainError, ChainResult, EntryFunctionPayload, NetworkConfig,
    PendingTransaction, TransactionHash,
};
use contest_gateway::blockchain::{NodeClient, TransactionSigner};
use contest_gateway::config::ContractConfig;
use contest_gateway::gateway::service::COIN_STORE;
use contest_gateway::ContestGateway;

pub const CONTRACT: &str = "0xabc";
pub const CHAIN_ID: u8 = 4;

#[derive(Debug, Clone)]
pub struct MockSuggestion {
    pub id: u64,
    pub name: String,
    pub free_votes: u64,
    pub boost_votes: u64,
    pub submitted_by: AccountAddress,
    pub timestamp: u64,
}

impl MockSuggestion {
    fn to_move_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "name": self.name,
            "free_votes": self.free_votes.to_string(),
            "boost_votes": self.boost_votes.to_string(),
            "total_votes": (self.free_votes + self.boost_votes).to_string(),
            "submitted_by": self.submitted_by.to_string(),
            "timestamp": self.timestamp.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockAccount {
    pub free_votes_remaining: u64,
    pub boost_votes_owned: u64,
    pub total_spent: u64,
    pub free_voted: BTreeSet<u64>,
    pub suggestions_count: u64,
}

impl MockAccount {
    fn to_move_json(&self) -> Value {
        json!({
            "free_votes_remaining": self.free_votes_remaining.to_string(),
            "boost_votes_owned": self.boost_votes_owned.to_string(),
            "total_spent": self.total_spent.to_string(),
            "free_voted_names": self.free_voted.iter().map(u64::to_string).collect::<Vec<_>>(),
            "suggestions_count": self.suggestions_count.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct NodeState {
    pub suggestions: Vec<MockSuggestion>,
    pub accounts: HashMap<AccountAddress, MockAccount>,
    pub prize_pool_octas: u64,
    pub contributors: u64,
    pub voting_end_time: u64,
    /// Balances held in a CoinStore resource.
    pub coin_balances: HashMap<AccountAddress, u64>,
    /// Balances only visible through the `0x1::coin::balance` view.
    pub fa_balances: HashMap<AccountAddress, u64>,
    pub sequence_numbers: HashMap<AccountAddress, u64>,
    pub transactions: HashMap<String, Value>,
    pub fail_views: bool,
    pub requests: usize,
}

impl NodeState {
    pub fn add_suggestion(&mut self, name: &str, free: u64, boost: u64, by: AccountAddress) -> u64 {
        let id = self.suggestions.len() as u64;
        self.suggestions.push(MockSuggestion {
            id,
            name: name.to_string(),
            free_votes: free,
            boost_votes: boost,
            submitted_by: by,
            timestamp: 1_700_000_000 + id,
        });
        id
    }

    /// Create an on-chain account with a CoinStore balance.
    pub fn fund(&mut self, address: AccountAddress, octas: u64) {
        self.sequence_numbers.entry(address).or_insert(0);
        self.coin_balances.insert(address, octas);
    }
}

type Shared = Arc<Mutex<NodeState>>;

pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests
    }

    pub fn client(&self) -> NodeClient {
        node_client(&self.url())
    }

    pub fn gateway(&self) -> ContestGateway {
        gateway_with_contract(self.client(), Some(CONTRACT))
    }
}

pub fn node_client(url: &str) -> NodeClient {
    NodeClient::build(NetworkConfig {
        node_url: url.to_string(),
        chain_id: Some(CHAIN_ID),
        request_timeout_secs: 5,
    })
    .unwrap()
}

pub fn gateway_with_contract(client: NodeClient, contract: Option<&str>) -> ContestGateway {
    let config = ContractConfig {
        address: contract.map(str::to_string),
        ..Default::default()
    };
    ContestGateway::new(client, &config).unwrap()
}

/// Start a mock fullnode on an ephemeral port.
pub async fn start_mock_node() -> MockNode {
    let state: Shared = Arc::new(Mutex::new(NodeState::default()));

    let app = Router::new()
        .route("/v1", get(ledger_info))
        .route("/v1/view", post(view))
        .route("/v1/estimate_gas_price", get(estimate_gas_price))
        .route("/v1/accounts/{address}", get(account))
        .route("/v1/accounts/{address}/resource/{*resource}", get(resource))
        .route("/v1/transactions", post(submit))
        .route("/v1/transactions/encode_submission", post(encode_submission))
        .route("/v1/transactions/by_hash/{hash}", get(by_hash))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, state }
}

fn lock(state: &Shared) -> MutexGuard<'_, NodeState> {
    let mut guard = state.lock().unwrap();
    guard.requests += 1;
    guard
}

fn node_error(status: StatusCode, message: &str, code: &str) -> Response {
    (status, Json(json!({ "message": message, "error_code": code }))).into_response()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn abort_status(code: &str) -> String {
    format!("Move abort in {}::geomi_voting: {}(0x1): ", CONTRACT, code)
}

async fn ledger_info(State(state): State<Shared>) -> Json<Value> {
    let _guard = lock(&state);
    Json(json!({
        "chain_id": CHAIN_ID,
        "epoch": "1",
        "ledger_version": "100",
        "ledger_timestamp": (now_secs() * 1_000_000).to_string(),
        "block_height": "10",
        "node_role": "full_node",
    }))
}

async fn estimate_gas_price(State(state): State<Shared>) -> Json<Value> {
    let _guard = lock(&state);
    Json(json!({ "gas_estimate": 100 }))
}

async fn view(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let st = lock(&state);
    if st.fail_views {
        return node_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error", "internal_error");
    }

    let function = body["function"].as_str().unwrap_or_default().to_string();
    let arg_address = || -> Option<AccountAddress> {
        body["arguments"][0].as_str().and_then(|s| s.parse().ok())
    };

    if function.starts_with(&format!("{}::coin::balance", AccountAddress::ONE)) {
        return match arg_address().and_then(|a| st.fa_balances.get(&a)) {
            Some(balance) => Json(json!([balance.to_string()])).into_response(),
            None => node_error(StatusCode::BAD_REQUEST, "account not found", "invalid_input"),
        };
    }

    let contract: AccountAddress = CONTRACT.parse().unwrap();
    let prefix = format!("{}::geomi_voting::", contract);
    let Some(name) = function.strip_prefix(&prefix) else {
        return node_error(StatusCode::BAD_REQUEST, "module not found", "invalid_input");
    };

    match name {
        "get_suggestions" => {
            let list: Vec<Value> = st.suggestions.iter().map(MockSuggestion::to_move_json).collect();
            Json(json!([list])).into_response()
        }
        "get_user_account" => match arg_address().and_then(|a| st.accounts.get(&a)) {
            Some(account) => Json(json!([account.to_move_json()])).into_response(),
            None => node_error(
                StatusCode::BAD_REQUEST,
                &abort_status("E_USER_NOT_REGISTERED"),
                "invalid_input",
            ),
        },
        "get_prize_pool" => Json(json!([
            st.prize_pool_octas.to_string(),
            st.contributors.to_string()
        ]))
        .into_response(),
        "get_voting_end_time" => Json(json!([st.voting_end_time.to_string()])).into_response(),
        _ => node_error(StatusCode::BAD_REQUEST, "function not found", "invalid_input"),
    }
}

async fn account(State(state): State<Shared>, Path(address): Path<String>) -> Response {
    let st = lock(&state);
    let Ok(address) = address.parse::<AccountAddress>() else {
        return node_error(StatusCode::BAD_REQUEST, "invalid address", "invalid_input");
    };
    match st.sequence_numbers.get(&address) {
        Some(seq) => Json(json!({
            "sequence_number": seq.to_string(),
            "authentication_key": address.to_string(),
        }))
        .into_response(),
        None => node_error(StatusCode::NOT_FOUND, "Account not found", "account_not_found"),
    }
}

async fn resource(
    State(state): State<Shared>,
    Path((address, resource)): Path<(String, String)>,
) -> Response {
    let st = lock(&state);
    let balance = address
        .parse::<AccountAddress>()
        .ok()
        .and_then(|a| st.coin_balances.get(&a));

    match balance {
        Some(balance) if resource == COIN_STORE => Json(json!({
            "type": COIN_STORE,
            "data": { "coin": { "value": balance.to_string() }, "frozen": false },
        }))
        .into_response(),
        _ => node_error(StatusCode::NOT_FOUND, "Resource not found", "resource_not_found"),
    }
}

async fn encode_submission(State(state): State<Shared>, Json(body): Json<Value>) -> Json<String> {
    let _guard = lock(&state);
    Json(format!("0x{}", hex::encode(serde_json::to_vec(&body).unwrap())))
}

async fn submit(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut st = lock(&state);

    if body["signature"]["type"] != "ed25519_signature" {
        return node_error(StatusCode::BAD_REQUEST, "missing signature", "invalid_input");
    }
    let Some(sender) = body["sender"].as_str().and_then(|s| s.parse::<AccountAddress>().ok())
    else {
        return node_error(StatusCode::BAD_REQUEST, "invalid sender", "invalid_input");
    };
    let Some(seq) = st.sequence_numbers.get_mut(&sender) else {
        return node_error(StatusCode::BAD_REQUEST, "Account not found", "account_not_found");
    };
    let sequence_number = *seq;
    *seq += 1;

    let function = body["payload"]["function"].as_str().unwrap_or_default();
    let name = function.rsplit("::").next().unwrap_or_default().to_string();
    let args = body["payload"]["arguments"].as_array().cloned().unwrap_or_default();
    let outcome = apply(&mut st, sender, &name, &args);

    let hash = format!("0x{:064x}", st.transactions.len() + 1);
    let version = st.transactions.len() + 100;
    let (success, vm_status) = match outcome {
        Ok(()) => (true, "Executed successfully".to_string()),
        Err(code) => (false, abort_status(code)),
    };
    st.transactions.insert(
        hash.clone(),
        json!({
            "type": "user_transaction",
            "hash": hash,
            "success": success,
            "vm_status": vm_status,
            "version": version.to_string(),
        }),
    );

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "hash": hash,
            "sender": sender.to_string(),
            "sequence_number": sequence_number.to_string(),
        })),
    )
        .into_response()
}

async fn by_hash(State(state): State<Shared>, Path(hash): Path<String>) -> Response {
    let st = lock(&state);
    match st.transactions.get(&hash) {
        Some(txn) => Json(txn.clone()).into_response(),
        None => node_error(StatusCode::NOT_FOUND, "Transaction not found", "transaction_not_found"),
    }
}

/// Toy contest contract. Returns the abort code on failure.
fn apply(
    st: &mut NodeState,
    sender: AccountAddress,
    function: &str,
    args: &[Value],
) -> Result<(), &'static str> {
    let arg_u64 = |i: usize| args.get(i).and_then(Value::as_str).and_then(|s| s.parse::<u64>().ok());
    let voting_over = st.voting_end_time != 0 && now_secs() > st.voting_end_time;

    match function {
        "initialize" => {
            st.voting_end_time = now_secs() + arg_u64(0).ok_or("E_INVALID_ARGUMENT")?;
            Ok(())
        }
        "register_user" => {
            if st.accounts.contains_key(&sender) {
                return Err("E_ALREADY_REGISTERED");
            }
            st.accounts.insert(
                sender,
                MockAccount {
                    free_votes_remaining: 1,
                    ..Default::default()
                },
            );
            Ok(())
        }
        "suggest_name" => {
            if voting_over {
                return Err("E_VOTING_ENDED");
            }
            let name = args.first().and_then(Value::as_str).ok_or("E_EMPTY_NAME")?;
            if st.suggestions.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
                return Err("E_DUPLICATE_NAME");
            }
            let account = st.accounts.get_mut(&sender).ok_or("E_USER_NOT_REGISTERED")?;
            account.suggestions_count += 1;
            st.add_suggestion(name, 0, 0, sender);
            Ok(())
        }
        "cast_vote" => {
            if voting_over {
                return Err("E_VOTING_ENDED");
            }
            let id = arg_u64(0).ok_or("E_INVALID_ARGUMENT")?;
            let boost = args.get(1).and_then(Value::as_bool).ok_or("E_INVALID_ARGUMENT")?;
            let account = st.accounts.get_mut(&sender).ok_or("E_USER_NOT_REGISTERED")?;
            if boost {
                if account.boost_votes_owned == 0 {
                    return Err("E_INSUFFICIENT_PAYMENT");
                }
                account.boost_votes_owned -= 1;
            } else if !account.free_voted.insert(id) {
                return Err("E_ALREADY_VOTED_FREE");
            }
            let suggestion = st
                .suggestions
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or("E_SUGGESTION_NOT_FOUND")?;
            if boost {
                suggestion.boost_votes += 1;
            } else {
                suggestion.free_votes += 1;
            }
            Ok(())
        }
        "purchase_vote_pack" => {
            let amount = arg_u64(1).ok_or("E_INVALID_ARGUMENT")?;
            let account = st.accounts.get_mut(&sender).ok_or("E_USER_NOT_REGISTERED")?;
            account.boost_votes_owned += 10;
            account.total_spent += amount;
            st.prize_pool_octas += amount;
            st.contributors += 1;
            Ok(())
        }
        _ => Err("E_UNKNOWN_FUNCTION"),
    }
}

/// Signer that records payloads instead of submitting them.
#[derive(Default)]
pub struct RecordingSigner {
    pub calls: Mutex<Vec<(AccountAddress, Value)>>,
}

impl RecordingSigner {
    pub fn calls(&self) -> Vec<(AccountAddress, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TransactionSigner for RecordingSigner {
    async fn sign_and_submit(
        &self,
        sender: &AccountAddress,
        payload: EntryFunctionPayload,
    ) -> ChainResult<PendingTransaction> {
        let payload = serde_json::to_value(&payload).unwrap();
        self.calls.lock().unwrap().push((*sender, payload));
        Ok(PendingTransaction {
            hash: TransactionHash("0xfeed".to_string()),
            sender: Some(sender.to_string()),
            sequence_number: Some(0),
        })
    }
}

/// Signer standing in for a wallet whose user declines every request.
pub struct RejectingSigner;

impl TransactionSigner for RejectingSigner {
    async fn sign_and_submit(
        &self,
        _sender: &AccountAddress,
        _payload: EntryFunctionPayload,
    ) -> ChainResult<PendingTransaction> {
        Err(ChainError::Wallet("User rejected the request".to_string()))
    }
}
