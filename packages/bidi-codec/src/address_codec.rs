//! Entity ID ⇄ EVM Address Encoding
//!
//! Every account and contract on the ledger is named by a `shard.realm.num`
//! triplet. Its "long-zero" EVM address packs the triplet big-endian into
//! 20 bytes:
//!
//! ```text
//! | Shard (4 bytes) | Realm (4 bytes) | Num (12 bytes) |
//! ```
//!
//! Two decoders are provided:
//!
//! - [`evm_address_to_entity_id`] is the strict inverse of
//!   [`entity_id_to_evm_address`] and recovers all three fields.
//! - [`evm_address_to_account_num`] is the legacy decoder used when reading
//!   owners back from contract queries. It reads the whole address as one
//!   number and assumes shard and realm are zero, so it is only correct for
//!   `0.0.x` entities.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

// ============================================================================
// Field Widths
// ============================================================================

/// Width of the shard field in bytes
pub const SHARD_WIDTH: usize = 4;

/// Width of the realm field in bytes
pub const REALM_WIDTH: usize = 4;

/// Width of the entity number field in bytes
pub const NUM_WIDTH: usize = 12;

/// Length of a rendered address including the `0x` prefix
pub const EVM_ADDRESS_STR_LEN: usize = 42;

// ============================================================================
// Entity ID
// ============================================================================

/// Ledger entity identifier (`shard.realm.num`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u128,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u128) -> Self {
        Self { shard, realm, num }
    }

    /// Shorthand for an entity in shard 0, realm 0
    pub const fn from_num(num: u128) -> Self {
        Self::new(0, 0, num)
    }

    /// Long-zero EVM address of this entity
    pub fn to_evm_address(&self) -> Result<EvmAddress, CodecError> {
        entity_id_to_evm_address(self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::Validation(format!("invalid entity ID: {:?}", s));

        let mut parts = s.trim().split('.');
        let (Some(shard), Some(realm), Some(num), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        // `u64::from_str` accepts a leading '+', the ledger's notation does not
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !(all_digits(shard) && all_digits(realm) && all_digits(num)) {
            return Err(invalid());
        }

        Ok(Self {
            shard: shard.parse().map_err(|_| invalid())?,
            realm: realm.parse().map_err(|_| invalid())?,
            num: num.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// EVM Address
// ============================================================================

/// 20-byte EVM address, rendered as `0x` + 40 lowercase hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EvmAddress(pub [u8; 20]);

impl EvmAddress {
    pub const ZERO: EvmAddress = EvmAddress([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EvmAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_evm_address(s).map(EvmAddress)
    }
}

impl From<[u8; 20]> for EvmAddress {
    fn from(bytes: [u8; 20]) -> Self {
        EvmAddress(bytes)
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Encode an entity ID as its long-zero EVM address
///
/// Each field is written big-endian and zero-padded to its width. A field
/// whose value needs more bytes than its width is rejected with
/// [`CodecError::Encoding`] rather than truncated.
pub fn entity_id_to_evm_address(id: &EntityId) -> Result<EvmAddress, CodecError> {
    let mut out = [0u8; 20];
    let (shard, rest) = out.split_at_mut(SHARD_WIDTH);
    let (realm, num) = rest.split_at_mut(REALM_WIDTH);

    write_field(shard, "shard", id.shard as u128)?;
    write_field(realm, "realm", id.realm as u128)?;
    write_field(num, "num", id.num)?;

    Ok(EvmAddress(out))
}

/// Decode a long-zero EVM address back into all three entity ID fields
///
/// Accepts exactly 40 hex characters, with or without the `0x` prefix.
pub fn evm_address_to_entity_id(addr: &str) -> Result<EntityId, CodecError> {
    let bytes = parse_evm_address(addr)?;

    let shard = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let realm = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let mut num = [0u8; 16];
    num[16 - NUM_WIDTH..].copy_from_slice(&bytes[8..]);

    Ok(EntityId {
        shard: shard as u64,
        realm: realm as u64,
        num: u128::from_be_bytes(num),
    })
}

/// Legacy partial decoder: read the whole address as the entity number
///
/// Strips the `0x` prefix and leading zero digits, parses what is left as
/// base 16 and returns `0.0.<value>`. Shard and realm are never recovered;
/// use [`evm_address_to_entity_id`] when they may be non-zero.
pub fn evm_address_to_account_num(addr: &str) -> Result<EntityId, CodecError> {
    let hex_str = addr.strip_prefix("0x").unwrap_or(addr);
    if hex_str.is_empty() {
        return Err(CodecError::Decoding("empty address".to_string()));
    }
    if !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::Decoding(format!(
            "address is not hexadecimal: {}",
            addr
        )));
    }

    let digits = hex_str.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(EntityId::from_num(0));
    }

    let num = u128::from_str_radix(digits, 16).map_err(|_| {
        CodecError::Decoding(format!(
            "address value does not fit an entity number: {}",
            addr
        ))
    })?;

    Ok(EntityId::from_num(num))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a hex EVM address (with or without `0x`) to 20 bytes
pub fn parse_evm_address(addr: &str) -> Result<[u8; 20], CodecError> {
    let hex_str = addr.strip_prefix("0x").unwrap_or(addr);

    if hex_str.len() != 40 {
        return Err(CodecError::Decoding(format!(
            "invalid EVM address length: expected 40 hex chars, got {}",
            hex_str.len()
        )));
    }

    let mut result = [0u8; 20];
    hex::decode_to_slice(hex_str, &mut result)?;
    Ok(result)
}

fn write_field(out: &mut [u8], component: &'static str, value: u128) -> Result<(), CodecError> {
    let width = out.len();
    let bytes = value.to_be_bytes();
    let (overflow, tail) = bytes.split_at(bytes.len() - width);

    if overflow.iter().any(|b| *b != 0) {
        return Err(CodecError::Encoding {
            component,
            value: value.to_string(),
            width,
        });
    }

    out.copy_from_slice(tail);
    Ok(())
}
