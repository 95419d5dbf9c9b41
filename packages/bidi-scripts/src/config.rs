//! Configuration for the BIDI commands
//!
//! Loaded once in `main` from the environment (and `.env` when present) and
//! passed to each command explicitly.

use bidi_codec::EntityId;
use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::ContractStore;

const DEFAULT_MIRROR_NODE_URL: &str = "https://testnet.mirrornode.hedera.com";
const DEFAULT_JSON_RPC_URL: &str = "https://testnet.hashio.io/api";
const DEFAULT_CHAIN_ID: u64 = 296;
const DEFAULT_EXPLORER_URL: &str = "https://hashscan.io/testnet";
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
const DEFAULT_TOKEN_CONTRACT_FILE: &str = "token-contract-id.txt";
const DEFAULT_NFT_CONTRACT_FILE: &str = "nft-contract-id.txt";
const DEFAULT_CONFIRMATION_DELAY_MS: u64 = 2000;

/// Command configuration
#[derive(Clone)]
pub struct Config {
    /// Account paying for and signing every transaction
    pub operator_id: EntityId,
    /// Operator signing key (hex). Only required by commands that submit
    /// transactions.
    pub operator_key: Option<String>,
    pub mirror_node_url: String,
    pub json_rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
    /// Root of the compiled contract artifacts
    pub artifacts_dir: PathBuf,
    pub token_contract_file: PathBuf,
    pub nft_contract_file: PathBuf,
    /// Wait between a create transaction and reading its results back
    pub confirmation_delay: Duration,
}

/// Custom Debug that redacts the operator key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("operator_id", &self.operator_id)
            .field(
                "operator_key",
                &self.operator_key.as_ref().map(|_| "<redacted>"),
            )
            .field("mirror_node_url", &self.mirror_node_url)
            .field("json_rpc_url", &self.json_rpc_url)
            .field("chain_id", &self.chain_id)
            .field("explorer_url", &self.explorer_url)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("token_contract_file", &self.token_contract_file)
            .field("nft_contract_file", &self.nft_contract_file)
            .field("confirmation_delay", &self.confirmation_delay)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let operator_id = env::var("OPERATOR_ACCOUNT_ID")
            .map_err(|_| eyre!("Environment variable OPERATOR_ACCOUNT_ID must be present"))?
            .parse::<EntityId>()
            .wrap_err("OPERATOR_ACCOUNT_ID must be an entity ID like 0.0.1234")?;

        let chain_id = match env::var("CHAIN_ID") {
            Ok(v) => v.parse().wrap_err("CHAIN_ID must be a valid u64")?,
            Err(_) => DEFAULT_CHAIN_ID,
        };

        let confirmation_delay_ms = env::var("CONFIRMATION_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONFIRMATION_DELAY_MS);

        Ok(Self {
            operator_id,
            operator_key: env::var("OPERATOR_PRIVATE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            mirror_node_url: env_or("MIRROR_NODE_URL", DEFAULT_MIRROR_NODE_URL),
            json_rpc_url: env_or("JSON_RPC_URL", DEFAULT_JSON_RPC_URL),
            chain_id,
            explorer_url: env_or("EXPLORER_URL", DEFAULT_EXPLORER_URL),
            artifacts_dir: env_or("ARTIFACTS_DIR", DEFAULT_ARTIFACTS_DIR).into(),
            token_contract_file: env_or("TOKEN_CONTRACT_ID_FILE", DEFAULT_TOKEN_CONTRACT_FILE)
                .into(),
            nft_contract_file: env_or("NFT_CONTRACT_ID_FILE", DEFAULT_NFT_CONTRACT_FILE).into(),
            confirmation_delay: Duration::from_millis(confirmation_delay_ms),
        })
    }

    /// The operator key, or an error for commands that must sign
    pub fn require_operator_key(&self) -> Result<&str> {
        self.operator_key.as_deref().ok_or_else(|| {
            eyre!(
                "Environment variables OPERATOR_PRIVATE_KEY and OPERATOR_ACCOUNT_ID must be present"
            )
        })
    }

    pub fn contract_store(&self) -> ContractStore {
        ContractStore::new(&self.token_contract_file, &self.nft_contract_file)
    }

    pub fn explorer(&self) -> Explorer {
        Explorer::new(&self.explorer_url)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Builds block-explorer links for logged results
#[derive(Debug, Clone)]
pub struct Explorer {
    base_url: String,
}

impl Explorer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn file(&self, id: &EntityId) -> String {
        format!("{}/file/{}", self.base_url, id)
    }

    pub fn contract(&self, id: &EntityId) -> String {
        format!("{}/contract/{}", self.base_url, id)
    }

    pub fn transaction(&self, transaction_id: &str) -> String {
        format!("{}/transaction/{}", self.base_url, transaction_id)
    }
}
