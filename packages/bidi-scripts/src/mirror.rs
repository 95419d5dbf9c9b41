//! Mirror Node Client
//!
//! Read-only REST queries against the mirror node: contract creations by an
//! account, contract metadata and storage, and account EVM addresses.

use bidi_codec::{decode_null_terminated_hex, EntityId, EvmAddress};
use chrono::DateTime;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Shown in place of a collection name or symbol that could not be read
pub const UNAVAILABLE: &str = "Unable to fetch";

/// Follow at most this many `links.next` pages in one listing
const MAX_PAGES: usize = 20;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsPage {
    #[serde(default)]
    pub transactions: Vec<TransactionSummary>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSummary {
    /// Entity created by the transaction (the new contract)
    pub entity_id: Option<EntityId>,
    pub consensus_timestamp: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractInfo {
    pub contract_id: EntityId,
    #[serde(default)]
    pub evm_address: Option<String>,
    #[serde(default)]
    pub admin_key: Option<serde_json::Value>,
    #[serde(default, alias = "auto_renew_account_id")]
    pub auto_renew_account: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractState {
    #[serde(default)]
    pub state: Vec<StateEntry>,
}

/// One storage slot, both fields hex encoded
#[derive(Debug, Clone, Deserialize)]
pub struct StateEntry {
    pub slot: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub account: EntityId,
    #[serde(default)]
    pub evm_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "_status")]
    status: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    #[serde(default)]
    messages: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Mirror node REST client
#[derive(Debug, Clone)]
pub struct MirrorClient {
    base_url: String,
    client: Client,
}

impl MirrorClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Successful contract-create transactions paid for by `account`, newest first
    pub async fn contract_creations(&self, account: &EntityId) -> Result<Vec<TransactionSummary>> {
        let mut path = format!(
            "/api/v1/transactions?account.id={}&transactiontype=CONTRACTCREATEINSTANCE&order=desc&result=SUCCESS",
            account
        );
        let mut transactions = Vec::new();

        for _ in 0..MAX_PAGES {
            let page: TransactionsPage = self.get(&path).await?;
            transactions.extend(page.transactions);

            match page.links.next {
                Some(next) => path = next,
                None => return Ok(transactions),
            }
        }

        debug!(pages = MAX_PAGES, "Stopped following mirror node pages");
        Ok(transactions)
    }

    pub async fn contract(&self, id: &EntityId) -> Result<ContractInfo> {
        self.get(&format!("/api/v1/contracts/{}", id)).await
    }

    /// Look a contract up by its EVM address (for contracts created over JSON-RPC)
    pub async fn contract_by_evm_address(&self, address: &EvmAddress) -> Result<ContractInfo> {
        self.get(&format!("/api/v1/contracts/{}", address)).await
    }

    pub async fn contract_state(&self, id: &EntityId) -> Result<ContractState> {
        self.get(&format!("/api/v1/contracts/{}/state", id)).await
    }

    pub async fn account(&self, id: &EntityId) -> Result<AccountInfo> {
        self.get(&format!("/api/v1/accounts/{}", id)).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Mirror node request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach mirror node at {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!(
                "Mirror node query failed: {} - {}",
                status,
                error_messages(&body)
            ));
        }

        response
            .json()
            .await
            .wrap_err_with(|| format!("Failed to parse mirror node response from {}", url))
    }
}

// ============================================================================
// Formatting Helpers
// ============================================================================

/// Extract the `_status.messages` of a mirror error body, or the raw body
fn error_messages(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.status.messages.is_empty() => parsed
            .status
            .messages
            .into_iter()
            .map(|m| m.message)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.to_string(),
    }
}

/// Collection name and symbol from contract storage
///
/// The name lives in the first slot ending in `0`, the symbol in the first
/// slot ending in `1`. Missing or undecodable slots read as [`UNAVAILABLE`].
pub fn collection_labels(state: &[StateEntry]) -> (String, String) {
    let label = |suffix: char| {
        state
            .iter()
            .find(|s| s.slot.ends_with(suffix))
            .and_then(|s| decode_null_terminated_hex(&s.value).ok())
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    };
    (label('0'), label('1'))
}

/// Render a `seconds.nanos` consensus timestamp as UTC
pub fn format_timestamp(timestamp: &str) -> String {
    let (secs, nanos) = timestamp.split_once('.').unwrap_or((timestamp, "0"));

    let parsed = secs.parse::<i64>().ok().and_then(|secs| {
        let nanos = format!("{:0<9}", nanos).get(..9)?.parse::<u32>().ok()?;
        DateTime::from_timestamp(secs, nanos)
    });

    match parsed {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => timestamp.to_string(),
    }
}

/// Render a contract admin key the way the explorer summarises it
pub fn format_admin_key(key: Option<&serde_json::Value>) -> String {
    match key {
        None | Some(serde_json::Value::Null) => "None".to_string(),
        Some(serde_json::Value::Object(map)) => match map.get("_type") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            _ => serde_json::Value::Object(map.clone()).to_string(),
        },
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
