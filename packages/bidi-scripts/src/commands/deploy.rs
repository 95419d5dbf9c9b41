//! Contract deployment: bytecode upload and contract creation

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolValue;
use bidi_codec::{chunk, chunk_count, EntityId, MAX_CHUNK_SIZE};
use eyre::{eyre, Result};
use tracing::info;

use super::{Context, EXECUTE_GAS};
use crate::config::Explorer;
use crate::ledger::{BytecodeFile, ContractCreate, Ledger};

/// Gas for the HelloWorld create
pub const HELLO_WORLD_GAS: u64 = 500_000;

pub const DEFAULT_GREETING: &str = "Hello from Hedera!";

/// Create a bytecode file and append the hex bytecode to it in chunks of at
/// most [`MAX_CHUNK_SIZE`] characters
pub async fn upload_bytecode<L: Ledger + ?Sized>(
    ledger: &L,
    explorer: &Explorer,
    bytecode: &str,
) -> Result<BytecodeFile> {
    let mut file = ledger.create_file().await?;
    if let Some(id) = &file.id {
        info!(file_id = %id, "Bytecode file created");
    }

    let payload = bytecode.as_bytes();
    let total = chunk_count(payload.len(), MAX_CHUNK_SIZE);
    for (i, piece) in chunk(payload, MAX_CHUNK_SIZE)?.enumerate() {
        info!("Uploading chunk {} of {}...", i + 1, total);
        ledger.append_file(&mut file, piece).await?;
    }

    if let Some(id) = &file.id {
        info!(link = %explorer.file(id), "Bytecode uploaded");
    }
    Ok(file)
}

async fn create<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    file: &BytecodeFile,
    request: ContractCreate,
    label: &str,
) -> Result<EntityId> {
    info!("Creating {} contract...", label);
    let contract = ctx
        .ledger
        .create_contract(file, request)
        .await
        .map_err(|e| eyre!("Failed to create {} contract: {}", label, e))?;

    info!(
        contract_id = %contract,
        link = %ctx.explorer.contract(&contract),
        "{} contract created",
        label
    );
    Ok(contract)
}

/// Deploy the HelloWorld contract with a greeting constructor argument
pub async fn deploy_hello_world<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    bytecode: &str,
    message: &str,
) -> Result<EntityId> {
    info!(message, "Starting deployment process");
    let file = upload_bytecode(ctx.ledger, &ctx.explorer, bytecode).await?;

    let request = ContractCreate {
        gas: HELLO_WORLD_GAS,
        constructor_args: Bytes::from((message.to_string(),).abi_encode_params()),
        admin_key: false,
    };
    create(ctx, &file, request, "HelloWorld").await
}

/// Deploy the BIDI token contract and record its ID in the contract store
pub async fn create_token<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    bytecode: &str,
) -> Result<EntityId> {
    info!("Starting token contract deployment");
    let file = upload_bytecode(ctx.ledger, &ctx.explorer, bytecode).await?;

    let request = ContractCreate {
        gas: EXECUTE_GAS,
        constructor_args: Bytes::new(),
        admin_key: true,
    };
    let contract = create(ctx, &file, request, "Token").await?;

    ctx.store.write_token_contract(&contract)?;
    Ok(contract)
}

/// Deploy the NFT collection bound to the stored token contract and record
/// its ID in the contract store
pub async fn deploy_collection<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    bytecode: &str,
) -> Result<EntityId> {
    let token = ctx.store.read_token_contract()?;
    info!(token_contract = %token, "Using previously created token");

    let token_address = token.to_evm_address()?;
    let rendered = token_address.to_string();
    info!(
        evm_address = %rendered,
        length = rendered.len(),
        "Converted token ID to EVM address"
    );

    let file = upload_bytecode(ctx.ledger, &ctx.explorer, bytecode).await?;

    let request = ContractCreate {
        gas: EXECUTE_GAS,
        constructor_args: Bytes::from((Address::from(token_address.0),).abi_encode_params()),
        admin_key: true,
    };
    let contract = create(ctx, &file, request, "NFT collection").await?;

    ctx.store.write_nft_contract(&contract)?;
    info!(
        contract_id = %contract,
        evm_address = %contract.to_evm_address()?,
        "Collection deployed"
    );
    Ok(contract)
}
