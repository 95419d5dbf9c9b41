//! BIDI command line
//!
//! One subcommand per deployment or token operation:
//! - bidi deploy-hello / create-token / deploy-collection
//! - bidi set-allowance / balance
//! - bidi mint / redeem / list
//! - bidi collections
//! - bidi convert (offline)

use bidi_codec::EntityId;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bidi_scripts::artifacts::{self, load_bytecode};
use bidi_scripts::commands::{collections, convert, deploy, nft, token};
use bidi_scripts::{Config, Context, MirrorClient, RelayLedger};

#[derive(Parser)]
#[command(name = "bidi")]
#[command(about = "Deploy and operate the BIDI token and NFT collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the HelloWorld contract
    DeployHello {
        /// Constructor greeting
        #[arg(long, default_value = deploy::DEFAULT_GREETING)]
        message: String,
    },

    /// Deploy the BIDI token contract
    CreateToken,

    /// Deploy the NFT collection bound to the deployed token
    DeployCollection,

    /// Approve the NFT collection to spend operator BIDI
    SetAllowance {
        /// Amount in whole tokens, e.g. 1000 or 1,000.5
        amount: String,
    },

    /// Show the BIDI balance of an account (the operator by default)
    Balance { account: Option<EntityId> },

    /// Mint an NFT locking BIDI for a recipient
    Mint {
        recipient: EntityId,
        /// Amount in whole tokens
        amount: String,
        /// NFT contract, instead of the deployed one
        contract: Option<EntityId>,
    },

    /// Redeem an NFT, releasing its locked BIDI
    Redeem { token_id: u64 },

    /// List the tokens of a collection
    List { contract: Option<EntityId> },

    /// List contracts created by the operator
    Collections,

    /// Offline ID, address and amount conversions
    Convert {
        #[command(subcommand)]
        command: ConvertCommands,
    },
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Entity ID to long-zero EVM address
    IdToAddress { id: EntityId },

    /// EVM address to entity ID
    AddressToId {
        address: String,
        /// Read the whole address as one account number
        #[arg(long)]
        legacy: bool,
    },

    /// Whole tokens to raw units
    ToUnits { amount: String },

    /// Raw units to whole tokens
    FromUnits { raw: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Convert { command } = &cli.command {
        return run_convert(command);
    }

    let config = Config::load()?;
    tracing::debug!(config = ?config, "Configuration loaded");

    if let Commands::Collections = &cli.command {
        let mirror = MirrorClient::new(&config.mirror_node_url);
        collections::list_collections(&mirror, &config.explorer(), &config.operator_id).await?;
        info!("Contract fetch completed");
        return Ok(());
    }

    let ledger = RelayLedger::new(&config)?;
    let ctx = Context::new(&ledger, &config);

    match &cli.command {
        Commands::DeployHello { message } => {
            let bytecode = load_bytecode(&config.artifacts_dir, artifacts::HELLO_WORLD)?;
            deploy::deploy_hello_world(&ctx, &bytecode, message).await?;
            info!("Deployment completed successfully");
        }
        Commands::CreateToken => {
            let bytecode = load_bytecode(&config.artifacts_dir, artifacts::TOKEN)?;
            deploy::create_token(&ctx, &bytecode).await?;
            info!("Token contract deployment completed successfully");
        }
        Commands::DeployCollection => {
            let bytecode = load_bytecode(&config.artifacts_dir, artifacts::COLLECTION)?;
            deploy::deploy_collection(&ctx, &bytecode).await?;
            info!("NFT collection deployment completed successfully");
        }
        Commands::SetAllowance { amount } => {
            token::set_allowance(&ctx, amount).await?;
            info!("Allowance setting completed successfully");
        }
        Commands::Balance { account } => {
            let report = token::check_balance(&ctx, *account).await?;
            println!("BIDI token balance: {}", report.balance);
            if let Some(allowance) = report.allowance {
                println!("Current NFT contract allowance: {}", allowance);
            }
        }
        Commands::Mint {
            recipient,
            amount,
            contract,
        } => {
            nft::mint(&ctx, *recipient, amount, *contract).await?;
            info!("NFT minting completed successfully");
        }
        Commands::Redeem { token_id } => {
            nft::redeem(&ctx, *token_id).await?;
            info!("Redemption completed successfully");
        }
        Commands::List { contract } => {
            nft::list(&ctx, *contract).await?;
        }
        Commands::Collections | Commands::Convert { .. } => {}
    }

    Ok(())
}

fn run_convert(command: &ConvertCommands) -> Result<()> {
    match command {
        ConvertCommands::IdToAddress { id } => {
            println!("{}", convert::id_to_address(id)?);
        }
        ConvertCommands::AddressToId { address, legacy } => {
            println!("{}", convert::address_to_id(address, *legacy)?);
        }
        ConvertCommands::ToUnits { amount } => {
            let (raw, grouped) = convert::to_units(amount)?;
            println!("{}", raw);
            info!(grouped = %grouped, "Raw token units");
        }
        ConvertCommands::FromUnits { raw } => {
            println!("{}", convert::from_units(raw));
        }
    }
    Ok(())
}
