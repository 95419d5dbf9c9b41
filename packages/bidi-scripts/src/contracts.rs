//! Contract ABI definitions
//!
//! Uses alloy's sol! macro to generate call encoders and return decoders for
//! the token and collection contracts. Calldata is built here and handed to a
//! [`Ledger`](crate::ledger::Ledger), so the bindings carry no provider.

use alloy::primitives::U256;
use bidi_codec::BigUint;
use eyre::{eyre, Result};
use std::str::FromStr;

use alloy::sol;

sol! {
    /// BIDI fungible token
    contract BidiToken {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// NFT collection that locks BIDI per token until redeemed
    contract BidiCollection {
        function safeMint(address to, uint256 amount) external;
        function redeem(uint256 tokenId) external;
        function ownerOf(uint256 tokenId) external view returns (address);
        function getRedemptionAmount(uint256 tokenId) external view returns (uint256);
        function isRedeemed(uint256 tokenId) external view returns (bool);
    }
}

/// Convert an arbitrary-precision amount to a `uint256` argument
pub fn to_u256(amount: &BigUint) -> Result<U256> {
    U256::from_str(&amount.to_string())
        .map_err(|_| eyre!("Amount {} does not fit in uint256", amount))
}

/// Convert a `uint256` return value to an arbitrary-precision amount
pub fn from_u256(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_to_u256() {
        let amount: BigUint = "1000500000000000000000".parse().unwrap();
        assert_eq!(
            to_u256(&amount).unwrap(),
            U256::from(1_000_500_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_from_u256() {
        let raw = U256::from(123_456_789u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(from_u256(raw).to_string(), "123456789000000000000000000");
        assert_eq!(to_u256(&from_u256(U256::MAX)).unwrap(), U256::MAX);
    }

    #[test]
    fn test_to_u256_overflow() {
        let amount = BigUint::from(2u32).pow(256);
        assert!(to_u256(&amount).is_err());
    }

    #[test]
    fn test_approve_selector() {
        let call = BidiToken::approveCall {
            spender: Address::ZERO,
            amount: U256::from(1u64),
        };
        let data = call.abi_encode();

        // approve(address,uint256)
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(data.len(), 4 + 32 * 2);
    }
}
