//! Offline conversions, no network access

use bidi_codec::{
    evm_address_to_account_num, evm_address_to_entity_id, format_token_amount, group_thousands,
    parse_token_amount, EntityId, EvmAddress, TOKEN_DECIMALS,
};
use eyre::Result;

use super::nft::TOKEN_SYMBOL;

pub fn id_to_address(id: &EntityId) -> Result<EvmAddress> {
    Ok(id.to_evm_address()?)
}

/// Decode an address strictly, or with the legacy account-number reading
/// that ignores field boundaries
pub fn address_to_id(address: &str, legacy: bool) -> Result<EntityId> {
    let id = if legacy {
        evm_address_to_account_num(address)?
    } else {
        evm_address_to_entity_id(address)?
    };
    Ok(id)
}

/// Raw token units for a human amount, plain and grouped
pub fn to_units(amount: &str) -> Result<(String, String)> {
    let raw = parse_token_amount(amount, TOKEN_DECIMALS)?.to_string();
    let grouped = group_thousands(&raw);
    Ok((raw, grouped))
}

pub fn from_units(raw: &str) -> String {
    format_token_amount(raw, TOKEN_DECIMALS, TOKEN_SYMBOL)
}
