//! NFT collection commands
//!
//! Each NFT locks an amount of BIDI that its owner can later redeem. Minting
//! pulls the locked amount from the operator, so the operator must first
//! approve the collection (see [`super::token::set_allowance`]).

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use bidi_codec::{
    evm_address_to_account_num, format_token_amount, parse_token_amount, BigUint, EntityId,
    EvmAddress, TOKEN_DECIMALS,
};
use eyre::{eyre, Result};
use tracing::{debug, info, warn};

use super::token::query_allowance;
use super::{ensure_success, Context, EXECUTE_GAS, QUERY_GAS};
use crate::contracts::{from_u256, to_u256, BidiCollection};
use crate::ledger::{Ledger, TxOutcome};

/// Unit label for formatted redemption amounts
pub const TOKEN_SYMBOL: &str = "BIDI";

/// One token of a collection as reported by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRecord {
    pub token_id: u64,
    pub owner: EvmAddress,
    /// Owner decoded as a legacy account number; `None` for addresses that
    /// are not long-zero
    pub owner_id: Option<EntityId>,
    pub redemption_amount: BigUint,
    pub formatted_amount: String,
    pub redeemed: bool,
}

/// Mint an NFT to `recipient` locking `amount` BIDI
pub async fn mint<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    recipient: EntityId,
    amount: &str,
    contract: Option<EntityId>,
) -> Result<TxOutcome> {
    let raw = parse_token_amount(amount, TOKEN_DECIMALS)?;
    let nft = ctx.store.resolve_nft_contract(contract)?;
    let token = ctx.store.read_token_contract()?;

    info!(
        nft_contract = %nft,
        token_contract = %token,
        recipient = %recipient,
        "Amount of BIDI to lock: {} ({} wei)",
        amount,
        raw
    );

    let recipient_address = ctx.ledger.account_evm_address(&recipient).await?;
    let nft_address = ctx.ledger.account_evm_address(&nft).await?;
    let operator_address = ctx.ledger.account_evm_address(&ctx.ledger.operator()).await?;
    info!(
        operator = %operator_address,
        recipient = %recipient_address,
        nft_contract = %nft_address,
        "Resolved EVM addresses"
    );

    let allowance = query_allowance(ctx.ledger, &token, &operator_address, &nft_address).await?;
    if allowance < raw {
        warn!(
            required = %raw,
            current = %allowance,
            "Please approve the NFT contract to spend your BIDI tokens first"
        );
        return Err(eyre!("Insufficient BIDI token allowance"));
    }

    let call = BidiCollection::safeMintCall {
        to: Address::from(recipient_address.0),
        amount: to_u256(&raw)?,
    };
    let outcome = ctx
        .ledger
        .execute(&nft, Bytes::from(call.abi_encode()), EXECUTE_GAS)
        .await?;

    ensure_success(&ctx.explorer, &outcome, "Mint")?;
    Ok(outcome)
}

/// Redeem an NFT of the stored collection, releasing its BIDI to the owner
pub async fn redeem<L: Ledger + ?Sized>(ctx: &Context<'_, L>, token_id: u64) -> Result<TxOutcome> {
    let nft = ctx.store.read_nft_contract()?;
    info!(
        nft_contract = %nft,
        token_id,
        account = %ctx.ledger.operator(),
        "Starting NFT redemption"
    );

    let call = BidiCollection::redeemCall {
        tokenId: U256::from(token_id),
    };
    let outcome = ctx
        .ledger
        .execute(&nft, Bytes::from(call.abi_encode()), EXECUTE_GAS)
        .await?;

    ensure_success(&ctx.explorer, &outcome, "Redeem")?;
    Ok(outcome)
}

async fn query_token<L: Ledger + ?Sized>(
    ledger: &L,
    contract: &EntityId,
    token_id: u64,
) -> Result<NftRecord> {
    let id = U256::from(token_id);

    let owner_call = BidiCollection::ownerOfCall { tokenId: id };
    let result = ledger
        .call(contract, Bytes::from(owner_call.abi_encode()), QUERY_GAS)
        .await?;
    let owner = BidiCollection::ownerOfCall::abi_decode_returns(&result, true)?._0;

    let amount_call = BidiCollection::getRedemptionAmountCall { tokenId: id };
    let result = ledger
        .call(contract, Bytes::from(amount_call.abi_encode()), QUERY_GAS)
        .await?;
    let redemption_amount = from_u256(
        BidiCollection::getRedemptionAmountCall::abi_decode_returns(&result, true)?._0,
    );

    let redeemed_call = BidiCollection::isRedeemedCall { tokenId: id };
    let result = ledger
        .call(contract, Bytes::from(redeemed_call.abi_encode()), QUERY_GAS)
        .await?;
    let redeemed = BidiCollection::isRedeemedCall::abi_decode_returns(&result, true)?._0;

    let mut owner_bytes = [0u8; 20];
    owner_bytes.copy_from_slice(owner.as_slice());
    let owner = EvmAddress(owner_bytes);

    Ok(NftRecord {
        token_id,
        owner,
        owner_id: evm_address_to_account_num(&owner.to_string()).ok(),
        formatted_amount: format_token_amount(
            &redemption_amount.to_string(),
            TOKEN_DECIMALS,
            TOKEN_SYMBOL,
        ),
        redemption_amount,
        redeemed,
    })
}

/// Scan a collection from token 0 until the first token that cannot be read
pub async fn list<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    contract: Option<EntityId>,
) -> Result<Vec<NftRecord>> {
    let nft = ctx.store.resolve_nft_contract(contract)?;
    info!(contract_id = %nft, "Scanning collection");

    let mut records = Vec::new();
    for token_id in 0u64.. {
        let record = match query_token(ctx.ledger, &nft, token_id).await {
            Ok(record) => record,
            Err(e) => {
                debug!(token_id, error = %e, "End of collection");
                break;
            }
        };

        let status = if record.redeemed {
            "Redeemed - BIDI tokens already claimed"
        } else {
            "Available - BIDI tokens locked and ready for redemption"
        };
        info!(
            owner = %record.owner,
            owner_id = %record
                .owner_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            amount = %record.formatted_amount,
            raw_amount = %record.redemption_amount,
            status,
            "NFT #{}",
            token_id
        );
        records.push(record);
    }

    if records.is_empty() {
        info!("No tokens found in collection");
    } else {
        info!(count = records.len(), "Total NFTs found");
    }
    Ok(records)
}
