use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

use contest_gateway::blockchain::{
    AccountAddress, ChainResult, LocalSigner, LocalWallet, NodeClient, TransactionHash,
};
use contest_gateway::config::{resolve_config_with, ConfigError, GatewayConfig};
use contest_gateway::gateway::describe_failure;
use contest_gateway::gateway::types::{find_pack, validate_suggestion_name};
use contest_gateway::observability::logging;
use contest_gateway::ContestGateway;

#[derive(Parser)]
#[command(name = "contest-cli")]
#[command(about = "Take part in the mascot naming contest from a terminal", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "CONTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the node REST endpoint
    #[arg(long)]
    node_url: Option<String>,

    /// Override the contract address
    #[arg(long)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new account key
    Keygen,
    /// Show the address of the key in CONTEST_PRIVATE_KEY
    Address,
    /// Open the voting period (contract admin only)
    Initialize {
        /// Voting period length in seconds
        duration_secs: u64,
    },
    /// Register the signing account as a participant
    Register,
    /// Suggest a mascot name
    Suggest { name: String },
    /// Vote for a suggestion
    Vote {
        /// Suggestion id
        id: u64,
        /// Spend a boost vote instead of the free vote
        #[arg(long)]
        boost: bool,
    },
    /// Buy a vote pack from the catalog
    Buy {
        /// Pack id, see `packs`
        pack: String,
        /// Pay this many APT instead of the catalog price
        #[arg(long)]
        amount: Option<f64>,
    },
    /// List the vote pack catalog
    Packs,
    /// List suggestions, most votes first
    Suggestions {
        /// Only suggestions made by the signing account
        #[arg(long)]
        mine: bool,
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a participant account (default: the signing account)
    Account { address: Option<String> },
    /// Show the prize pool
    Pool,
    /// Show an APT balance (default: the signing account)
    Balance { address: Option<String> },
    /// Show when voting closes
    EndTime,
    /// Check configuration, node and contract
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;
    logging::init_cli_logging(&config.observability.log_level);

    match cli.command {
        Commands::Keygen => {
            let wallet = LocalWallet::generate();
            print_json(&json!({
                "address": wallet.address(),
                "public_key": wallet.public_key_hex(),
                "private_key": wallet.private_key_hex(),
            }))?;
            return Ok(());
        }
        Commands::Packs => {
            print_json(&config.packs)?;
            return Ok(());
        }
        _ => {}
    }

    let client = NodeClient::new(config.network.clone()).await?;
    let gateway = ContestGateway::new(client.clone(), &config.contract)?;
    let signer = || -> ChainResult<LocalSigner> {
        let wallet = LocalWallet::from_env()?;
        Ok(LocalSigner::new(client.clone(), wallet, config.transactions.clone()))
    };

    match cli.command {
        Commands::Keygen | Commands::Packs => unreachable!("handled above"),
        Commands::Address => {
            print_json(&json!({ "address": LocalWallet::from_env()?.address() }))?;
        }
        Commands::Initialize { duration_secs } => {
            let signer = signer()?;
            let result = gateway
                .initialize(&signer.address(), duration_secs, &signer)
                .await;
            report(result)?;
        }
        Commands::Register => {
            let signer = signer()?;
            report(gateway.register_user(&signer.address(), &signer).await)?;
        }
        Commands::Suggest { name } => {
            let name = match validate_suggestion_name(&name) {
                Ok(name) => name,
                Err(e) => fail(&e.to_string()),
            };
            let signer = signer()?;
            report(gateway.suggest_name(&signer.address(), &name, &signer).await)?;
        }
        Commands::Vote { id, boost } => {
            let signer = signer()?;
            report(gateway.cast_vote(&signer.address(), id, boost, &signer).await)?;
        }
        Commands::Buy { pack, amount } => {
            let amount = match (find_pack(&config.packs, &pack), amount) {
                (_, Some(amount)) => amount,
                (Some(entry), None) => entry.price,
                (None, None) => fail(&format!("Unknown vote pack '{}'", pack)),
            };
            let signer = signer()?;
            report(
                gateway
                    .purchase_vote_pack(&signer.address(), &pack, amount, &signer)
                    .await,
            )?;
        }
        Commands::Suggestions { mine, limit } => {
            let mut list = if mine {
                let wallet = LocalWallet::from_env()?;
                gateway.get_user_suggestions(&wallet.address()).await
            } else {
                gateway.get_suggestions().await
            };
            if let Some(limit) = limit {
                list.truncate(limit);
            }
            print_json(&list)?;
        }
        Commands::Account { address } => {
            let address = resolve_address(address)?;
            match gateway.get_user_account(&address).await {
                Some(account) => print_json(&json!({ "registered": true, "account": account }))?,
                None => print_json(&json!({ "registered": false }))?,
            }
        }
        Commands::Pool => {
            print_json(&gateway.get_prize_pool().await)?;
        }
        Commands::Balance { address } => {
            let address = resolve_address(address)?;
            let balance = gateway.get_account_balance(&address).await;
            print_json(&json!({ "address": address, "balance": balance }))?;
        }
        Commands::EndTime => {
            print_json(&json!({ "end_time": gateway.get_voting_end_time().await }))?;
        }
        Commands::Status => {
            let (node_healthy, contract_deployed) =
                tokio::join!(client.is_healthy(), gateway.is_contract_deployed());
            print_json(&json!({
                "configuration": gateway.configuration_status(),
                "node_healthy": node_healthy,
                "contract_deployed": contract_deployed,
            }))?;
        }
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    resolve_config_with(cli.config.as_deref(), |config| {
        if let Some(url) = &cli.node_url {
            config.network.node_url = url.clone();
        }
        if let Some(contract) = &cli.contract {
            config.contract.address = Some(contract.clone());
        }
    })
}

fn resolve_address(address: Option<String>) -> ChainResult<AccountAddress> {
    match address {
        Some(address) => address.parse(),
        None => Ok(LocalWallet::from_env()?.address()),
    }
}

fn report(result: ChainResult<TransactionHash>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(hash) => print_json(&json!({ "hash": hash })),
        Err(e) => {
            tracing::debug!(error = %e, "Transaction failed");
            fail(&describe_failure(&e))
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
