//! BIDI Codec: pure conversions shared by the BIDI contract tooling
//!
//! - **Address Codec** - `shard.realm.num` entity IDs to and from long-zero EVM addresses
//! - **Amounts** - human decimal strings to and from 18-decimal raw token units
//! - **Chunking** - bounded-size pieces for file uploads
//! - **Hex Strings** - null-terminated text stored in contract slots
//!
//! Nothing here performs I/O; every function can be called from any thread
//! in any order.

pub mod address_codec;
pub mod amount;
pub mod chunk;
pub mod error;
pub mod hex_string;

pub use address_codec::{
    entity_id_to_evm_address, evm_address_to_account_num, evm_address_to_entity_id,
    parse_evm_address, EntityId, EvmAddress, EVM_ADDRESS_STR_LEN,
};
pub use amount::{
    format_token_amount, format_units, group_thousands, parse_token_amount, TOKEN_DECIMALS,
};
pub use chunk::{chunk, chunk_count, MAX_CHUNK_SIZE};
pub use error::{CodecError, ErrorKind};
pub use hex_string::decode_null_terminated_hex;

// Re-exported so callers can name amounts without depending on num-bigint
pub use num_bigint::BigUint;
