//! Ledger Seam
//!
//! The commands talk to the network only through [`Ledger`], whose methods
//! mirror the SDK operations the deployment and token scripts perform:
//! upload bytecode to a file, create a contract from it, query and execute
//! contract functions, and look up account EVM addresses.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use bidi_codec::{EntityId, EvmAddress};
use eyre::Result;

/// Bytecode being uploaded for a contract create
#[derive(Debug, Clone, Default)]
pub struct BytecodeFile {
    /// File assigned by the ledger's file service, if it has one
    pub id: Option<EntityId>,
    /// Hex bytecode appended so far
    pub contents: Vec<u8>,
}

/// Parameters of a contract create transaction
#[derive(Debug, Clone)]
pub struct ContractCreate {
    pub gas: u64,
    /// ABI-encoded constructor arguments
    pub constructor_args: Bytes,
    /// Make the operator key the contract's admin key
    pub admin_key: bool,
}

/// Result of a state-changing transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub transaction_id: String,
    pub success: bool,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Account that signs and pays for transactions
    fn operator(&self) -> EntityId;

    async fn create_file(&self) -> Result<BytecodeFile>;

    async fn append_file(&self, file: &mut BytecodeFile, contents: &[u8]) -> Result<()>;

    async fn create_contract(&self, file: &BytecodeFile, request: ContractCreate)
        -> Result<EntityId>;

    /// EVM address contracts see for this account
    async fn account_evm_address(&self, account: &EntityId) -> Result<EvmAddress>;

    /// Read-only contract query, returning the ABI-encoded result
    async fn call(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<Bytes>;

    async fn execute(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<TxOutcome>;
}
