//! End-to-end command flow against the recording mock ledger

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use bidi_codec::EntityId;
use bidi_scripts::commands::{deploy, nft, token, Context};
use bidi_scripts::contracts::{BidiCollection, BidiToken};
use bidi_scripts::testing::MockLedger;
use bidi_scripts::{ContractStore, Explorer};

const OPERATOR: EntityId = EntityId::from_num(1001);
const RECIPIENT: EntityId = EntityId::from_num(2002);

fn addr(id: &EntityId) -> Address {
    Address::from(id.to_evm_address().unwrap().0)
}

#[tokio::test]
async fn test_token_to_nft_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = MockLedger::new(OPERATOR);
    let ctx = Context {
        ledger: &ledger,
        store: ContractStore::new(
            dir.path().join("token-contract-id.txt"),
            dir.path().join("nft-contract-id.txt"),
        ),
        explorer: Explorer::new("https://hashscan.io/testnet"),
    };

    // Large enough to need several file appends
    let token_bytecode = format!("0x{}", "60".repeat(5000));
    let token_id = deploy::create_token(&ctx, &token_bytecode).await.unwrap();
    assert_eq!(ledger.appended_chunks(), vec![4000, 4000, 2002]);

    let nft_id = deploy::deploy_collection(&ctx, "0x6080").await.unwrap();
    assert_ne!(token_id, nft_id);

    token::set_allowance(&ctx, "250").await.unwrap();

    let locked = U256::from(250u64) * U256::from(10u64).pow(U256::from(18u64));
    let allowance = BidiToken::allowanceCall {
        owner: addr(&OPERATOR),
        spender: addr(&nft_id),
    };
    ledger.respond(token_id, allowance.abi_encode(), locked.abi_encode());

    nft::mint(&ctx, RECIPIENT, "250", None).await.unwrap();

    let zero = U256::ZERO;
    ledger.respond(
        nft_id,
        BidiCollection::ownerOfCall { tokenId: zero }.abi_encode(),
        addr(&RECIPIENT).abi_encode(),
    );
    ledger.respond(
        nft_id,
        BidiCollection::getRedemptionAmountCall { tokenId: zero }.abi_encode(),
        locked.abi_encode(),
    );
    ledger.respond(
        nft_id,
        BidiCollection::isRedeemedCall { tokenId: zero }.abi_encode(),
        false.abi_encode(),
    );

    let records = nft::list(&ctx, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].owner_id, Some(RECIPIENT));
    assert_eq!(records[0].formatted_amount, "250 BIDI");

    nft::redeem(&ctx, 0).await.unwrap();

    let executes = ledger.executes();
    assert_eq!(executes.len(), 3);
    assert_eq!(executes[0].contract, token_id);
    assert_eq!(executes[1].contract, nft_id);
    assert_eq!(executes[2].contract, nft_id);
}
