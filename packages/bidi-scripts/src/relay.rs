//! JSON-RPC Relay Ledger
//!
//! Implements [`Ledger`] on top of the network's Ethereum JSON-RPC relay
//! using alloy, with the mirror node filling in what the relay cannot answer
//! (account EVM addresses, the entity ID of a new contract).
//!
//! # Transaction Building
//!
//! Uses Alloy's `ProviderBuilder::with_recommended_fillers()` to populate
//! nonce, gas price and chain ID. Contracts are addressed by their long-zero
//! EVM address.
//!
//! The relay has no file service: appended chunks are staged in the
//! [`BytecodeFile`] and submitted together with the create transaction.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use bidi_codec::{EntityId, EvmAddress};
use eyre::{eyre, Result, WrapErr};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::ledger::{BytecodeFile, ContractCreate, Ledger, TxOutcome};
use crate::mirror::MirrorClient;

/// Ledger backed by the JSON-RPC relay and the mirror node
pub struct RelayLedger {
    rpc_url: String,
    signer: PrivateKeySigner,
    operator: EntityId,
    chain_id: u64,
    mirror: MirrorClient,
    confirmation_delay: Duration,
}

impl RelayLedger {
    pub fn new(config: &Config) -> Result<Self> {
        let key = config.require_operator_key()?;
        let signer: PrivateKeySigner = key.parse().wrap_err("Invalid operator private key")?;

        info!(
            operator = %config.operator_id,
            signer = %signer.address(),
            rpc_url = %config.json_rpc_url,
            chain_id = config.chain_id,
            "Relay ledger initialized"
        );

        Ok(Self {
            rpc_url: config.json_rpc_url.clone(),
            signer,
            operator: config.operator_id,
            chain_id: config.chain_id,
            mirror: MirrorClient::new(&config.mirror_node_url),
            confirmation_delay: config.confirmation_delay,
        })
    }

    /// Sign, send and wait for a transaction receipt
    async fn send(&self, tx: TransactionRequest) -> Result<(String, TransactionReceipt)> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().wrap_err("Invalid RPC URL")?);

        let pending = provider
            .send_transaction(tx.with_chain_id(self.chain_id))
            .await
            .map_err(|e| eyre!("Failed to send transaction: {}", e))?;

        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, "Transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get receipt: {}", e))?;

        Ok((format!("0x{:x}", tx_hash), receipt))
    }
}

#[async_trait]
impl Ledger for RelayLedger {
    fn operator(&self) -> EntityId {
        self.operator
    }

    async fn create_file(&self) -> Result<BytecodeFile> {
        Ok(BytecodeFile::default())
    }

    async fn append_file(&self, file: &mut BytecodeFile, contents: &[u8]) -> Result<()> {
        file.contents.extend_from_slice(contents);
        Ok(())
    }

    async fn create_contract(
        &self,
        file: &BytecodeFile,
        request: ContractCreate,
    ) -> Result<EntityId> {
        if request.admin_key {
            warn!("Admin keys cannot be set through the JSON-RPC relay; deploying without one");
        }

        let text = std::str::from_utf8(&file.contents).wrap_err("Bytecode is not text")?;
        let text = text.trim();
        let mut code = hex::decode(text.strip_prefix("0x").unwrap_or(text))
            .wrap_err("Bytecode is not valid hex")?;
        code.extend_from_slice(&request.constructor_args);

        let tx = TransactionRequest::default()
            .with_deploy_code(code)
            .with_gas_limit(request.gas);
        let (tx_hash, receipt) = self.send(tx).await?;

        if !receipt.status() {
            return Err(eyre!("Contract create transaction {} reverted", tx_hash));
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| eyre!("Receipt for {} has no contract address", tx_hash))?;

        // The mirror node trails consensus by a few seconds
        tokio::time::sleep(self.confirmation_delay).await;

        let info = self
            .mirror
            .contract_by_evm_address(&from_alloy(address))
            .await
            .wrap_err_with(|| format!("Failed to resolve contract ID for {}", address))?;

        Ok(info.contract_id)
    }

    async fn account_evm_address(&self, account: &EntityId) -> Result<EvmAddress> {
        let info = self
            .mirror
            .account(account)
            .await
            .wrap_err_with(|| format!("Could not get EVM address for account {}", account))?;

        match info.evm_address {
            Some(addr) => addr
                .parse()
                .wrap_err_with(|| format!("Mirror node returned a bad EVM address: {}", addr)),
            None => Ok(account.to_evm_address()?),
        }
    }

    async fn call(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<Bytes> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().wrap_err("Invalid RPC URL")?);

        let tx = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(to_alloy(&contract.to_evm_address()?))
            .with_input(data)
            .with_gas_limit(gas);

        provider
            .call(&tx)
            .await
            .map_err(|e| eyre!("Contract call to {} failed: {}", contract, e))
    }

    async fn execute(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<TxOutcome> {
        let tx = TransactionRequest::default()
            .with_to(to_alloy(&contract.to_evm_address()?))
            .with_input(data)
            .with_gas_limit(gas);

        let (transaction_id, receipt) = self.send(tx).await?;

        Ok(TxOutcome {
            transaction_id,
            success: receipt.status(),
        })
    }
}

fn to_alloy(address: &EvmAddress) -> Address {
    Address::from(address.0)
}

fn from_alloy(address: Address) -> EvmAddress {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(address.as_slice());
    EvmAddress(bytes)
}
