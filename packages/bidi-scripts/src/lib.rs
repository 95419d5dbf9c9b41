//! BIDI Scripts
//!
//! Deployment and operation commands for the BIDI token and its NFT
//! redemption collection:
//! - **Deploy** - upload bytecode in chunks and create contracts
//! - **Token** - approve the collection, read balances and allowances
//! - **NFT** - mint, redeem and list collection tokens
//! - **Collections** - contracts created by the operator, via the mirror node
//!
//! Commands talk to the network through the [`Ledger`] trait. [`RelayLedger`]
//! implements it over the JSON-RPC relay; tests use `testing::MockLedger`.

pub mod artifacts;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod ledger;
pub mod mirror;
pub mod relay;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use commands::Context;
pub use config::{Config, Explorer};
pub use ledger::{BytecodeFile, ContractCreate, Ledger, TxOutcome};
pub use mirror::MirrorClient;
pub use relay::RelayLedger;
pub use store::ContractStore;
