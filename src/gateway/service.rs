//! Contest contract gateway.
//!
//! Turns application intents into entry-function transactions or view
//! calls against the contest module, and reshapes results into
//! [`crate::gateway::types`].
//!
//! # Failure policy
//! - Mutations fail closed: any error reaches the caller, and a missing
//!   contract address is rejected before any network I/O.
//! - Reads fail open: errors are logged and replaced with an empty list,
//!   `None`, or zero so views can render a "no data" state.
//!
//! Nothing is retried or cached; the contract is the source of truth and
//! callers re-fetch after every mutation.

use serde::Serialize;
use serde_json::Value;

use crate::blockchain::client::NodeClient;
use crate::blockchain::transaction::TransactionSigner;
use crate::blockchain::types::{
    u64_string, AccountAddress, ChainError, ChainResult, EntryFunctionId, EntryFunctionPayload,
    MoveValue, TransactionHash, ViewRequest,
};
use crate::config::ContractConfig;
use crate::config::loader::CONTRACT_ADDRESS_ENV_VAR;
use crate::gateway::types::{
    apt_to_octas, octas_to_apt, sort_by_votes, MoveSuggestion, MoveUserAccount, NameSuggestion,
    PrizePool, UserAccount,
};
use crate::observability::metrics;

/// Coin store holding an account's native balance.
pub const COIN_STORE: &str = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>";

/// Native coin type tag.
pub const APTOS_COIN: &str = "0x1::aptos_coin::AptosCoin";

/// Whether the gateway knows where the contract is.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationStatus {
    pub configured: bool,
    pub contract_address: Option<AccountAddress>,
    pub module: String,
    pub error: Option<String>,
}

/// Client for the contest contract.
#[derive(Debug, Clone)]
pub struct ContestGateway {
    client: NodeClient,
    contract: Option<AccountAddress>,
    module: String,
}

impl ContestGateway {
    /// Create a gateway from an explicit contract configuration.
    ///
    /// An absent address is accepted and puts the gateway in its degraded
    /// state; a malformed one is an error.
    pub fn new(client: NodeClient, config: &ContractConfig) -> ChainResult<Self> {
        let contract = config
            .address
            .as_deref()
            .map(str::parse::<AccountAddress>)
            .transpose()?;

        match &contract {
            Some(address) => tracing::info!(contract = %address, module = %config.module, "Contract address loaded"),
            None => tracing::error!(
                env_var = CONTRACT_ADDRESS_ENV_VAR,
                "Contract address is not set; writes will fail and reads return empty data"
            ),
        }

        Ok(Self {
            client,
            contract,
            module: config.module.clone(),
        })
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    pub fn contract_address(&self) -> Option<AccountAddress> {
        self.contract
    }

    pub fn is_configured(&self) -> bool {
        self.contract.is_some()
    }

    pub fn configuration_status(&self) -> ConfigurationStatus {
        ConfigurationStatus {
            configured: self.is_configured(),
            contract_address: self.contract,
            module: self.module.clone(),
            error: (!self.is_configured()).then(not_configured_message),
        }
    }

    fn function(&self, name: &str) -> ChainResult<EntryFunctionId> {
        let address = self
            .contract
            .ok_or_else(|| ChainError::NotConfigured(not_configured_message()))?;
        Ok(EntryFunctionId::new(address, &self.module, name))
    }

    // Mutations

    /// Start the voting period. Admin only.
    pub async fn initialize<S: TransactionSigner>(
        &self,
        admin: &AccountAddress,
        voting_duration_secs: u64,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        self.submit(admin, "initialize", vec![MoveValue::U64(voting_duration_secs)], signer)
            .await
    }

    pub async fn register_user<S: TransactionSigner>(
        &self,
        user: &AccountAddress,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        self.submit(user, "register_user", Vec::new(), signer).await
    }

    pub async fn suggest_name<S: TransactionSigner>(
        &self,
        user: &AccountAddress,
        name: &str,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        self.submit(user, "suggest_name", vec![MoveValue::String(name.to_string())], signer)
            .await
    }

    pub async fn cast_vote<S: TransactionSigner>(
        &self,
        user: &AccountAddress,
        suggestion_id: u64,
        is_boost_vote: bool,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        let args = vec![MoveValue::U64(suggestion_id), MoveValue::Bool(is_boost_vote)];
        self.submit(user, "cast_vote", args, signer).await
    }

    /// Buy a vote pack, paying `apt_amount` (display units).
    pub async fn purchase_vote_pack<S: TransactionSigner>(
        &self,
        user: &AccountAddress,
        pack_id: &str,
        apt_amount: f64,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        let function = self.function("purchase_vote_pack")?;
        let octas = apt_to_octas(apt_amount)?;
        let args = vec![MoveValue::String(pack_id.to_string()), MoveValue::U64(octas)];
        self.submit_to(user, function, args, signer).await
    }

    async fn submit<S: TransactionSigner>(
        &self,
        sender: &AccountAddress,
        name: &str,
        args: Vec<MoveValue>,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        let function = self.function(name)?;
        self.submit_to(sender, function, args, signer).await
    }

    async fn submit_to<S: TransactionSigner>(
        &self,
        sender: &AccountAddress,
        function: EntryFunctionId,
        args: Vec<MoveValue>,
        signer: &S,
    ) -> ChainResult<TransactionHash> {
        let name = function.function.clone();
        let payload = EntryFunctionPayload::new(function, args);

        match signer.sign_and_submit(sender, payload).await {
            Ok(pending) => {
                metrics::record_transaction(&name, true);
                tracing::info!(function = %name, sender = %sender, hash = %pending.hash, "Contest transaction submitted");
                Ok(pending.hash)
            }
            Err(e) => {
                metrics::record_transaction(&name, false);
                tracing::warn!(function = %name, sender = %sender, error = %e, "Contest transaction failed");
                Err(e)
            }
        }
    }

    // Views

    /// All suggestions, most votes first. Empty on any failure.
    pub async fn get_suggestions(&self) -> Vec<NameSuggestion> {
        match self.try_get_suggestions().await {
            Ok(list) => list,
            Err(e) => {
                log_view_failure("get_suggestions", &e);
                Vec::new()
            }
        }
    }

    /// Suggestions submitted by `user`, most votes first.
    pub async fn get_user_suggestions(&self, user: &AccountAddress) -> Vec<NameSuggestion> {
        let mut list = self.get_suggestions().await;
        list.retain(|s| s.submitted_by == *user);
        list
    }

    /// The `limit` most-voted suggestions.
    pub async fn get_leaderboard(&self, limit: usize) -> Vec<NameSuggestion> {
        let mut list = self.get_suggestions().await;
        list.truncate(limit);
        list
    }

    async fn try_get_suggestions(&self) -> ChainResult<Vec<NameSuggestion>> {
        let values = self.view("get_suggestions", Vec::new()).await?;
        let raw: Vec<MoveSuggestion> = from_first("get_suggestions", values)?;
        let mut list: Vec<NameSuggestion> = raw.into_iter().map(NameSuggestion::from).collect();
        sort_by_votes(&mut list);
        Ok(list)
    }

    /// Account of a registered user; `None` when unregistered or on failure.
    pub async fn get_user_account(&self, user: &AccountAddress) -> Option<UserAccount> {
        let result = async {
            let values = self
                .view("get_user_account", vec![MoveValue::Address(*user)])
                .await?;
            let raw: MoveUserAccount = from_first("get_user_account", values)?;
            Ok::<_, ChainError>(UserAccount::from(raw))
        }
        .await;

        match result {
            Ok(account) => Some(account),
            // The contract aborts the view for unknown users.
            Err(e) if is_unregistered(&e) => {
                tracing::debug!(user = %user, error = %e, "No user account, treating as unregistered");
                None
            }
            Err(e) => {
                log_view_failure("get_user_account", &e);
                None
            }
        }
    }

    /// Prize pool in display units. Zero on any failure.
    pub async fn get_prize_pool(&self) -> PrizePool {
        let result = async {
            let values = self.view("get_prize_pool", Vec::new()).await?;
            match values.as_slice() {
                [total, contributors, ..] => Ok(PrizePool::from_octas(
                    value_u64("get_prize_pool", total)?,
                    value_u64("get_prize_pool", contributors)?,
                )),
                _ => Err(ChainError::Decode(format!(
                    "get_prize_pool: expected 2 values, got {}",
                    values.len()
                ))),
            }
        }
        .await;

        result.unwrap_or_else(|e| {
            log_view_failure("get_prize_pool", &e);
            PrizePool::default()
        })
    }

    /// Unix seconds at which voting closes. Zero on any failure.
    pub async fn get_voting_end_time(&self) -> u64 {
        let result = async {
            let values = self.view("get_voting_end_time", Vec::new()).await?;
            let first = values
                .first()
                .ok_or_else(|| ChainError::Decode("get_voting_end_time: empty result".into()))?;
            value_u64("get_voting_end_time", first)
        }
        .await;

        result.unwrap_or_else(|e| {
            log_view_failure("get_voting_end_time", &e);
            0
        })
    }

    /// True only when the suggestions view actually answers.
    pub async fn is_contract_deployed(&self) -> bool {
        match self.try_get_suggestions().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Contract deployment check failed");
                false
            }
        }
    }

    /// Native coin balance in display units. Zero on any failure.
    pub async fn get_account_balance(&self, address: &AccountAddress) -> f64 {
        match self.try_account_balance_octas(address).await {
            Ok(octas) => octas_to_apt(octas),
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Error fetching account balance");
                0.0
            }
        }
    }

    async fn try_account_balance_octas(&self, address: &AccountAddress) -> ChainResult<u64> {
        if let Some(resource) = self.client.account_resource(address, COIN_STORE).await? {
            let value = resource
                .pointer("/data/coin/value")
                .ok_or_else(|| ChainError::Decode("CoinStore: missing data.coin.value".into()))?;
            return value_u64("CoinStore", value);
        }

        // Accounts migrated to fungible assets have no CoinStore resource.
        let request = ViewRequest::new(
            EntryFunctionId::new(AccountAddress::ONE, "coin", "balance"),
            vec![MoveValue::Address(*address)],
        )
        .with_type_argument(APTOS_COIN);
        let values = self.client.view(&request).await?;
        let first = values
            .first()
            .ok_or_else(|| ChainError::Decode("coin::balance: empty result".into()))?;
        value_u64("coin::balance", first)
    }

    async fn view(&self, name: &str, args: Vec<MoveValue>) -> ChainResult<Vec<Value>> {
        let request = ViewRequest::new(self.function(name)?, args);
        let result = self.client.view(&request).await;
        metrics::record_view_call(name, result.is_ok());
        result
    }
}

fn not_configured_message() -> String {
    format!(
        "Contract address not set. Please check the {} environment variable or [contract].address.",
        CONTRACT_ADDRESS_ENV_VAR
    )
}

/// A client-side rejection of the account view, as opposed to a node outage.
fn is_unregistered(error: &ChainError) -> bool {
    matches!(error, ChainError::Api { status: 400..=499, .. })
}

fn log_view_failure(name: &str, error: &ChainError) {
    match error {
        ChainError::NotConfigured(_) => {
            tracing::error!(function = name, "Contract address is not configured")
        }
        e => tracing::warn!(function = name, error = %e, "View call failed, returning default"),
    }
}

fn from_first<T: serde::de::DeserializeOwned>(name: &str, values: Vec<Value>) -> ChainResult<T> {
    let first = values
        .into_iter()
        .next()
        .ok_or_else(|| ChainError::Decode(format!("{}: empty result", name)))?;
    serde_json::from_value(first).map_err(|e| ChainError::Decode(format!("{}: {}", name, e)))
}

fn value_u64(name: &str, value: &Value) -> ChainResult<u64> {
    u64_string::deserialize(value).map_err(|e| ChainError::Decode(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;

    fn unconfigured() -> ContestGateway {
        let client = NodeClient::build(NetworkConfig {
            node_url: "http://127.0.0.1:1/v1".to_string(),
            chain_id: None,
            ..Default::default()
        })
        .unwrap();
        ContestGateway::new(client, &ContractConfig::default()).unwrap()
    }

    #[test]
    fn test_configuration_status() {
        let gateway = unconfigured();
        let status = gateway.configuration_status();
        assert!(!status.configured);
        assert!(status.error.unwrap().contains(CONTRACT_ADDRESS_ENV_VAR));
    }

    #[test]
    fn test_rejects_malformed_contract_address() {
        let client = NodeClient::build(NetworkConfig::default()).unwrap();
        let config = ContractConfig {
            address: Some("0xnope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ContestGateway::new(client, &config),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_value_u64_accepts_strings_and_numbers() {
        assert_eq!(value_u64("t", &Value::from("250000000")).unwrap(), 250_000_000);
        assert_eq!(value_u64("t", &Value::from(3u64)).unwrap(), 3);
        assert!(value_u64("t", &Value::from("-1")).is_err());
    }

    #[test]
    fn test_only_client_errors_mean_unregistered() {
        let api = |status| ChainError::Api {
            status,
            message: "Move abort: E_USER_NOT_REGISTERED".to_string(),
            error_code: None,
        };
        assert!(is_unregistered(&api(400)));
        assert!(is_unregistered(&api(404)));
        assert!(!is_unregistered(&api(500)));
        assert!(!is_unregistered(&api(503)));
        assert!(!is_unregistered(&ChainError::Timeout(10)));
    }

    #[tokio::test]
    async fn test_reads_degrade_without_contract() {
        let gateway = unconfigured();
        assert!(gateway.get_suggestions().await.is_empty());
        assert!(gateway.get_user_account(&AccountAddress::ONE).await.is_none());
        assert_eq!(gateway.get_prize_pool().await, PrizePool::default());
        assert_eq!(gateway.get_voting_end_time().await, 0);
        assert!(!gateway.is_contract_deployed().await);
    }
}
