//! Command implementations
//!
//! Each command runs against any [`Ledger`], so the same code drives the
//! JSON-RPC relay in `main` and the recording mock in tests.

pub mod collections;
pub mod convert;
pub mod deploy;
pub mod nft;
pub mod token;

use eyre::{eyre, Result};
use tracing::info;

use crate::config::{Config, Explorer};
use crate::ledger::{Ledger, TxOutcome};
use crate::store::ContractStore;

/// Gas for read-only contract queries
pub const QUERY_GAS: u64 = 100_000;

/// Gas for state-changing contract calls and large contract creates
pub const EXECUTE_GAS: u64 = 1_000_000;

/// What every ledger command needs besides its own arguments
pub struct Context<'a, L: Ledger + ?Sized> {
    pub ledger: &'a L,
    pub store: ContractStore,
    pub explorer: Explorer,
}

impl<'a, L: Ledger + ?Sized> Context<'a, L> {
    pub fn new(ledger: &'a L, config: &Config) -> Self {
        Self {
            ledger,
            store: config.contract_store(),
            explorer: config.explorer(),
        }
    }
}

/// Fail on an unsuccessful receipt, otherwise log the transaction link
pub(crate) fn ensure_success(explorer: &Explorer, outcome: &TxOutcome, action: &str) -> Result<()> {
    if !outcome.success {
        return Err(eyre!(
            "{} transaction {} failed",
            action,
            outcome.transaction_id
        ));
    }

    info!(
        transaction_id = %outcome.transaction_id,
        link = %explorer.transaction(&outcome.transaction_id),
        "{} succeeded",
        action
    );
    Ok(())
}
