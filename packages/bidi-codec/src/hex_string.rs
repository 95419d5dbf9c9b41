//! Null-terminated strings stored in contract storage slots
//!
//! The mirror node returns storage values as hex. Short Solidity strings sit
//! left-aligned in their slot followed by zero padding, so decoding stops at
//! the first zero byte.

use crate::chunk::chunk;
use crate::error::CodecError;

/// Decode hex into text, one character per byte, up to the first zero byte
pub fn decode_null_terminated_hex(hex_str: &str) -> Result<String, CodecError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let mut out = String::new();

    for pair in chunk(hex_str.as_bytes(), 2)? {
        if !pair.iter().all(u8::is_ascii_hexdigit) {
            return Err(CodecError::Decoding(format!(
                "storage value is not hexadecimal: {}",
                hex_str
            )));
        }

        // Both bytes are ASCII hex digits, so this cannot fail
        let code = pair
            .iter()
            .fold(0u8, |acc, b| (acc << 4) | (*b as char).to_digit(16).unwrap_or(0) as u8);
        if code == 0 {
            break;
        }
        out.push(char::from(code));
    }

    Ok(out)
}
