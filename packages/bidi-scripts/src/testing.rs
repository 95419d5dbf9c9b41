//! In-memory Ledger for tests
//!
//! [`MockLedger`] records every file append, contract create, query and
//! transaction so command tests can assert on what would have been sent.
//! Query results are scripted per `(contract, calldata)` pair; a query with
//! no scripted result fails the way a reverted contract call does.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use bidi_codec::{EntityId, EvmAddress};
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ledger::{BytecodeFile, ContractCreate, Ledger, TxOutcome};

/// A contract create as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCreate {
    pub file: EntityId,
    pub bytecode: Vec<u8>,
    pub request: ContractCreate,
    pub contract: EntityId,
}

/// A query or transaction as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub contract: EntityId,
    pub data: Bytes,
    pub gas: u64,
}

#[derive(Default)]
struct MockState {
    next_num: u128,
    appended_chunks: Vec<usize>,
    creates: Vec<RecordedCreate>,
    calls: Vec<RecordedCall>,
    executes: Vec<RecordedCall>,
    responses: HashMap<(EntityId, Bytes), Bytes>,
    account_addresses: HashMap<EntityId, EvmAddress>,
    fail_executes: bool,
}

pub struct MockLedger {
    operator: EntityId,
    state: Mutex<MockState>,
}

impl MockLedger {
    /// First entity number handed out for files and contracts
    pub const FIRST_ENTITY_NUM: u128 = 5000;

    pub fn new(operator: EntityId) -> Self {
        Self {
            operator,
            state: Mutex::new(MockState {
                next_num: Self::FIRST_ENTITY_NUM,
                ..Default::default()
            }),
        }
    }

    /// Script the result of a read-only query
    pub fn respond(&self, contract: EntityId, data: impl Into<Bytes>, result: impl Into<Bytes>) {
        self.lock()
            .responses
            .insert((contract, data.into()), result.into());
    }

    /// EVM address to report for an account instead of its long-zero form
    pub fn set_account_address(&self, account: EntityId, address: EvmAddress) {
        self.lock().account_addresses.insert(account, address);
    }

    /// Make every subsequent transaction report an unsuccessful receipt
    pub fn fail_executes(&self) {
        self.lock().fail_executes = true;
    }

    pub fn appended_chunks(&self) -> Vec<usize> {
        self.lock().appended_chunks.clone()
    }

    pub fn creates(&self) -> Vec<RecordedCreate> {
        self.lock().creates.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn executes(&self) -> Vec<RecordedCall> {
        self.lock().executes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_entity(state: &mut MockState) -> EntityId {
        let id = EntityId::from_num(state.next_num);
        state.next_num += 1;
        id
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn operator(&self) -> EntityId {
        self.operator
    }

    async fn create_file(&self) -> Result<BytecodeFile> {
        let mut state = self.lock();
        let id = Self::next_entity(&mut state);
        Ok(BytecodeFile {
            id: Some(id),
            contents: Vec::new(),
        })
    }

    async fn append_file(&self, file: &mut BytecodeFile, contents: &[u8]) -> Result<()> {
        if file.id.is_none() {
            return Err(eyre!("Append to a file that was never created"));
        }
        self.lock().appended_chunks.push(contents.len());
        file.contents.extend_from_slice(contents);
        Ok(())
    }

    async fn create_contract(
        &self,
        file: &BytecodeFile,
        request: ContractCreate,
    ) -> Result<EntityId> {
        let file_id = file.id.ok_or_else(|| eyre!("INVALID_FILE_ID"))?;
        let mut state = self.lock();
        let contract = Self::next_entity(&mut state);
        state.creates.push(RecordedCreate {
            file: file_id,
            bytecode: file.contents.clone(),
            request,
            contract,
        });
        Ok(contract)
    }

    async fn account_evm_address(&self, account: &EntityId) -> Result<EvmAddress> {
        if let Some(address) = self.lock().account_addresses.get(account) {
            return Ok(*address);
        }
        Ok(account.to_evm_address()?)
    }

    async fn call(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<Bytes> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            contract: *contract,
            data: data.clone(),
            gas,
        });
        state
            .responses
            .get(&(*contract, data))
            .cloned()
            .ok_or_else(|| eyre!("CONTRACT_REVERT_EXECUTED"))
    }

    async fn execute(&self, contract: &EntityId, data: Bytes, gas: u64) -> Result<TxOutcome> {
        let mut state = self.lock();
        let index = state.executes.len();
        state.executes.push(RecordedCall {
            contract: *contract,
            data,
            gas,
        });
        Ok(TxOutcome {
            transaction_id: format!("{}@1700000000.{:09}", self.operator, index),
            success: !state.fail_executes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entities_are_sequential() {
        let ledger = MockLedger::new(EntityId::from_num(2));
        let mut file = ledger.create_file().await.unwrap();
        ledger.append_file(&mut file, b"6080").await.unwrap();

        let contract = ledger
            .create_contract(
                &file,
                ContractCreate {
                    gas: 100,
                    constructor_args: Bytes::new(),
                    admin_key: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(file.id, Some(EntityId::from_num(5000)));
        assert_eq!(contract, EntityId::from_num(5001));
        assert_eq!(ledger.creates()[0].bytecode, b"6080");
    }

    #[tokio::test]
    async fn test_unscripted_call_reverts() {
        let ledger = MockLedger::new(EntityId::from_num(2));
        let contract = EntityId::from_num(9);
        ledger.respond(contract, vec![1u8], vec![2u8]);

        assert_eq!(
            ledger.call(&contract, Bytes::from(vec![1u8]), 10).await.unwrap(),
            Bytes::from(vec![2u8])
        );
        assert!(ledger.call(&contract, Bytes::from(vec![3u8]), 10).await.is_err());
        assert_eq!(ledger.calls().len(), 2);
    }
}
