//! BIDI token commands: allowance and balance

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use bidi_codec::{group_thousands, parse_token_amount, BigUint, EntityId, EvmAddress, TOKEN_DECIMALS};
use eyre::Result;
use tracing::info;

use super::{ensure_success, Context, EXECUTE_GAS, QUERY_GAS};
use crate::contracts::{from_u256, to_u256, BidiToken};
use crate::ledger::{Ledger, TxOutcome};

/// Token balance of an account, plus its allowance toward the NFT
/// collection when one has been deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReport {
    pub account: EntityId,
    pub evm_address: EvmAddress,
    pub balance: BigUint,
    pub allowance: Option<BigUint>,
}

/// Approve the NFT collection to spend `amount` BIDI of the operator
pub async fn set_allowance<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    amount: &str,
) -> Result<TxOutcome> {
    let raw = parse_token_amount(amount, TOKEN_DECIMALS)?;
    info!(amount, "Setting allowance");
    info!(raw = %group_thousands(&raw.to_string()), "Full token amount");

    let token = ctx.store.read_token_contract()?;
    let nft = ctx.store.read_nft_contract()?;
    info!(token_contract = %token, nft_contract = %nft, "Contracts resolved");

    let spender = ctx.ledger.account_evm_address(&nft).await?;
    info!(evm_address = %spender, "NFT contract EVM address");

    let call = BidiToken::approveCall {
        spender: Address::from(spender.0),
        amount: to_u256(&raw)?,
    };
    let outcome = ctx
        .ledger
        .execute(&token, Bytes::from(call.abi_encode()), EXECUTE_GAS)
        .await?;

    ensure_success(&ctx.explorer, &outcome, "Approve")?;
    Ok(outcome)
}

/// `allowance(owner, spender)` on the token contract
pub async fn query_allowance<L: Ledger + ?Sized>(
    ledger: &L,
    token: &EntityId,
    owner: &EvmAddress,
    spender: &EvmAddress,
) -> Result<BigUint> {
    let call = BidiToken::allowanceCall {
        owner: Address::from(owner.0),
        spender: Address::from(spender.0),
    };
    let result = ledger
        .call(token, Bytes::from(call.abi_encode()), QUERY_GAS)
        .await?;
    let decoded = BidiToken::allowanceCall::abi_decode_returns(&result, true)?;
    Ok(from_u256(decoded._0))
}

/// Balance of `account`, defaulting to the operator
pub async fn check_balance<L: Ledger + ?Sized>(
    ctx: &Context<'_, L>,
    account: Option<EntityId>,
) -> Result<BalanceReport> {
    let token = ctx.store.read_token_contract()?;
    let account = account.unwrap_or_else(|| ctx.ledger.operator());
    info!(token_contract = %token, account = %account, "Checking BIDI token balance");

    let evm_address = ctx.ledger.account_evm_address(&account).await?;
    info!(evm_address = %evm_address, "Account EVM address");

    let call = BidiToken::balanceOfCall {
        account: Address::from(evm_address.0),
    };
    let result = ctx
        .ledger
        .call(&token, Bytes::from(call.abi_encode()), QUERY_GAS)
        .await?;
    let balance = from_u256(BidiToken::balanceOfCall::abi_decode_returns(&result, true)?._0);
    info!(balance = %balance, "BIDI token balance");

    let allowance = if ctx.store.has_nft_contract() {
        let nft = ctx.store.read_nft_contract()?;
        let spender = ctx.ledger.account_evm_address(&nft).await?;
        let allowance = query_allowance(ctx.ledger, &token, &evm_address, &spender).await?;
        info!(allowance = %allowance, "Current NFT contract allowance");
        Some(allowance)
    } else {
        None
    };

    Ok(BalanceReport {
        account,
        evm_address,
        balance,
        allowance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, OPERATOR};
    use crate::testing::MockLedger;
    use alloy::primitives::U256;
    use alloy::sol_types::SolValue;

    const TOKEN: EntityId = EntityId::from_num(5100);
    const NFT: EntityId = EntityId::from_num(5200);

    fn addr(id: &EntityId) -> Address {
        Address::from(id.to_evm_address().unwrap().0)
    }

    #[tokio::test]
    async fn test_set_allowance_approves_nft_contract() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();
        ctx.store.write_nft_contract(&NFT).unwrap();

        set_allowance(&ctx, "1,000.5").await.unwrap();

        let executes = ledger.executes();
        assert_eq!(executes.len(), 1);
        assert_eq!(executes[0].contract, TOKEN);
        assert_eq!(executes[0].gas, EXECUTE_GAS);

        let call = BidiToken::approveCall::abi_decode(&executes[0].data, true).unwrap();
        assert_eq!(call.spender, addr(&NFT));
        assert_eq!(call.amount, U256::from(1_000_500_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_set_allowance_rejects_bad_amount() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();
        ctx.store.write_nft_contract(&NFT).unwrap();

        assert!(set_allowance(&ctx, "12a").await.is_err());
        assert!(ledger.executes().is_empty());
    }

    #[tokio::test]
    async fn test_set_allowance_failed_receipt() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();
        ctx.store.write_nft_contract(&NFT).unwrap();
        ledger.fail_executes();

        let err = set_allowance(&ctx, "1").await.unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_check_balance_without_collection() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();

        let balance_call = BidiToken::balanceOfCall {
            account: addr(&OPERATOR),
        };
        ledger.respond(
            TOKEN,
            balance_call.abi_encode(),
            U256::from(42u64).abi_encode(),
        );

        let report = check_balance(&ctx, None).await.unwrap();

        assert_eq!(report.account, OPERATOR);
        assert_eq!(report.balance, BigUint::from(42u32));
        assert_eq!(report.allowance, None);
        assert_eq!(ledger.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_check_balance_with_collection_reports_allowance() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();
        ctx.store.write_nft_contract(&NFT).unwrap();

        let account = EntityId::from_num(77);
        let alias = EvmAddress([0xab; 20]);
        ledger.set_account_address(account, alias);

        let balance_call = BidiToken::balanceOfCall {
            account: Address::from(alias.0),
        };
        let allowance_call = BidiToken::allowanceCall {
            owner: Address::from(alias.0),
            spender: addr(&NFT),
        };
        ledger.respond(TOKEN, balance_call.abi_encode(), U256::from(9u64).abi_encode());
        ledger.respond(TOKEN, allowance_call.abi_encode(), U256::from(3u64).abi_encode());

        let report = check_balance(&ctx, Some(account)).await.unwrap();

        assert_eq!(report.evm_address, alias);
        assert_eq!(report.balance, BigUint::from(9u32));
        assert_eq!(report.allowance, Some(BigUint::from(3u32)));
    }

    #[tokio::test]
    async fn test_check_balance_propagates_query_failure() {
        let ledger = MockLedger::new(OPERATOR);
        let (ctx, _dir) = context(&ledger);
        ctx.store.write_token_contract(&TOKEN).unwrap();

        assert!(check_balance(&ctx, None).await.is_err());
    }
}
