//! Collections created by an account, from the mirror node

use bidi_codec::EntityId;
use eyre::Result;
use tracing::{info, warn};

use crate::config::Explorer;
use crate::mirror::{
    collection_labels, format_admin_key, format_timestamp, ContractInfo, ContractState,
    MirrorClient, TransactionSummary, UNAVAILABLE,
};

/// Displayed summary of one created contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub contract_id: EntityId,
    pub name: String,
    pub symbol: String,
    pub created: String,
    /// `None` when the contract record itself could not be fetched
    pub details: Option<ContractDetails>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDetails {
    pub admin_key: String,
    pub auto_renew_account: String,
    pub file_id: String,
}

pub fn summarize(
    contract_id: EntityId,
    tx: &TransactionSummary,
    contract: Option<&ContractInfo>,
    state: Option<&ContractState>,
    explorer: &Explorer,
) -> CollectionSummary {
    let (name, symbol) = match state {
        Some(state) => collection_labels(&state.state),
        None => (UNAVAILABLE.to_string(), UNAVAILABLE.to_string()),
    };

    let details = contract.map(|c| ContractDetails {
        admin_key: format_admin_key(c.admin_key.as_ref()),
        auto_renew_account: c
            .auto_renew_account
            .clone()
            .unwrap_or_else(|| "None".to_string()),
        file_id: c.file_id.clone().unwrap_or_else(|| "None".to_string()),
    });

    CollectionSummary {
        contract_id,
        name,
        symbol,
        created: format_timestamp(&tx.consensus_timestamp),
        details,
        link: explorer.contract(&contract_id),
    }
}

/// List every contract `account` created, newest first
///
/// A contract whose record or storage cannot be read is still listed, with
/// the missing parts marked unavailable.
pub async fn list_collections(
    mirror: &MirrorClient,
    explorer: &Explorer,
    account: &EntityId,
) -> Result<Vec<CollectionSummary>> {
    info!(account = %account, "Fetching contracts from account");
    let creations = mirror.contract_creations(account).await?;

    if creations.is_empty() {
        info!("No contracts found for this account");
        return Ok(Vec::new());
    }
    info!(count = creations.len(), "Found contracts");

    let mut summaries = Vec::with_capacity(creations.len());
    for tx in &creations {
        let Some(contract_id) = tx.entity_id else {
            warn!(timestamp = %tx.consensus_timestamp, "Contract create without entity ID");
            continue;
        };

        let contract = mirror.contract(&contract_id).await;
        let state = match &contract {
            Ok(_) => mirror
                .contract_state(&contract_id)
                .await
                .map_err(|e| warn!(contract_id = %contract_id, error = %e, "Error fetching contract state"))
                .ok(),
            Err(_) => None,
        };

        let summary = summarize(
            contract_id,
            tx,
            contract.as_ref().ok(),
            state.as_ref(),
            explorer,
        );
        log_summary(&summary);
        summaries.push(summary);
    }

    Ok(summaries)
}

fn log_summary(summary: &CollectionSummary) {
    match &summary.details {
        Some(details) => info!(
            contract_id = %summary.contract_id,
            name = %summary.name,
            symbol = %summary.symbol,
            created = %summary.created,
            admin_key = %details.admin_key,
            auto_renew_account = %details.auto_renew_account,
            file_id = %details.file_id,
            link = %summary.link,
            "Collection"
        ),
        None => info!(
            contract_id = %summary.contract_id,
            created = %summary.created,
            link = %summary.link,
            "Collection [additional details unavailable]"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::StateEntry;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn creation(id: u128) -> TransactionSummary {
        TransactionSummary {
            entity_id: Some(EntityId::from_num(id)),
            consensus_timestamp: "1700000000.000000000".to_string(),
            transaction_id: None,
        }
    }

    fn explorer() -> Explorer {
        Explorer::new("https://hashscan.io/testnet")
    }

    #[test]
    fn test_summarize_full_record() {
        let id = EntityId::from_num(5001);
        let contract = ContractInfo {
            contract_id: id,
            evm_address: None,
            admin_key: Some(json!({"_type": "ED25519", "key": "abcd"})),
            auto_renew_account: None,
            file_id: Some("0.0.5000".to_string()),
        };
        let state = ContractState {
            state: vec![
                StateEntry {
                    slot: "0x00".to_string(),
                    value: "0x4249444900".to_string(),
                },
                StateEntry {
                    slot: "0x01".to_string(),
                    value: "0x424e4654".to_string(),
                },
            ],
        };

        let summary = summarize(id, &creation(5001), Some(&contract), Some(&state), &explorer());

        assert_eq!(summary.name, "BIDI");
        assert_eq!(summary.symbol, "BNFT");
        assert_eq!(summary.created, "2023-11-14 22:13:20 UTC");
        assert_eq!(summary.link, "https://hashscan.io/testnet/contract/0.0.5001");
        assert_eq!(
            summary.details,
            Some(ContractDetails {
                admin_key: "ED25519".to_string(),
                auto_renew_account: "None".to_string(),
                file_id: "0.0.5000".to_string(),
            })
        );
    }

    #[test]
    fn test_summarize_without_record() {
        let id = EntityId::from_num(5002);
        let summary = summarize(id, &creation(5002), None, None, &explorer());

        assert_eq!(summary.name, UNAVAILABLE);
        assert_eq!(summary.symbol, UNAVAILABLE);
        assert!(summary.details.is_none());
    }

    /// Serve canned mirror responses, 404 for anything unknown
    async fn serve(routes: Vec<(&'static str, serde_json::Value)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();

                let (status, body) = match routes.iter().find(|(p, _)| path.starts_with(p)) {
                    Some((_, body)) => ("200 OK", body.to_string()),
                    None => (
                        "404 Not Found",
                        json!({"_status": {"messages": [{"message": "Not found"}]}}).to_string(),
                    ),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_list_collections_from_mirror() {
        let base = serve(vec![
            (
                "/api/v1/transactions",
                json!({
                    "transactions": [
                        {"entity_id": "0.0.5001", "consensus_timestamp": "1700000000.000000000"},
                        {"entity_id": "0.0.5002", "consensus_timestamp": "1700000100.000000000"}
                    ],
                    "links": {"next": null}
                }),
            ),
            (
                "/api/v1/contracts/0.0.5001/state",
                json!({"state": [{"slot": "0x0", "value": "0x4249444900"}]}),
            ),
            (
                "/api/v1/contracts/0.0.5001",
                json!({"contract_id": "0.0.5001", "admin_key": null, "file_id": "0.0.5000"}),
            ),
        ])
        .await;

        let mirror = MirrorClient::new(&base);
        let summaries = list_collections(&mirror, &explorer(), &EntityId::from_num(1001))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "BIDI");
        assert_eq!(summaries[0].symbol, UNAVAILABLE);
        assert_eq!(
            summaries[0].details.as_ref().map(|d| d.admin_key.as_str()),
            Some("None")
        );
        assert!(summaries[1].details.is_none());
    }

    #[tokio::test]
    async fn test_list_collections_propagates_listing_error() {
        let base = serve(vec![]).await;
        let mirror = MirrorClient::new(&base);

        let err = list_collections(&mirror, &explorer(), &EntityId::from_num(1001))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Not found"));
    }
}
