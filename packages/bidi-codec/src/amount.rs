//! Token Amount Conversion
//!
//! Tokens carry 18 decimals on-chain. Users type human amounts such as
//! `"1,000.5"`; contracts expect the scaled integer
//! `1000500000000000000000`. All arithmetic is done on [`BigUint`] so no
//! amount ever passes through floating point.
//!
//! Excess fractional digits are truncated, not rounded: `"0.1234567890123456789"`
//! becomes `123456789012345678`. Switching to rounding would change the
//! amounts submitted on-chain.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::CodecError;

/// Decimals used by the BIDI token
pub const TOKEN_DECIMALS: usize = 18;

/// Digit strings longer than this are shown in scientific notation by
/// [`group_thousands`]
pub const SCIENTIFIC_THRESHOLD: usize = 24;

/// Convert a human-readable decimal amount into raw token units
///
/// Comma separators are removed first. The remainder must be one or more
/// digits, optionally followed by `.` and zero or more digits.
pub fn parse_token_amount(amount: &str, decimals: usize) -> Result<BigUint, CodecError> {
    let clean: String = amount.chars().filter(|c| *c != ',').collect();

    let (whole, fraction) = clean.split_once('.').unwrap_or((clean.as_str(), ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
        return Err(CodecError::Validation(format!(
            "invalid amount {:?}: please enter a valid number",
            amount
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.extend(fraction.chars().take(decimals));
    for _ in fraction.len().min(decimals)..decimals {
        digits.push('0');
    }

    let trimmed = digits.trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };

    digits
        .parse::<BigUint>()
        .map_err(|e| CodecError::Validation(format!("invalid amount {:?}: {}", amount, e)))
}

/// Render raw token units as a decimal string, optionally followed by a unit
///
/// Trailing fractional zeros are dropped and a zero fraction is omitted
/// entirely, so `1000500000000000000000` renders as `1000.5`.
pub fn format_units(raw: &BigUint, decimals: usize, unit: &str) -> String {
    let scale = BigUint::from(10u32).pow(decimals as u32);
    let whole = raw / &scale;
    let remainder = raw % &scale;

    if remainder.is_zero() {
        return with_unit(whole.to_string(), unit);
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        with_unit(whole.to_string(), unit)
    } else {
        with_unit(format!("{}.{}", whole, fraction), unit)
    }
}

/// Render a raw amount given as text, for display only
///
/// Never fails: text that is not an unsigned decimal integer comes back
/// marked as `"<raw> <unit> (raw)"`.
pub fn format_token_amount(raw: &str, decimals: usize, unit: &str) -> String {
    let trimmed = raw.trim();
    let parsed = if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.parse::<BigUint>().ok()
    } else {
        None
    };

    match parsed {
        Some(value) => format_units(&value, decimals, unit),
        None => {
            tracing::warn!(raw = %raw, "Unable to format token amount");
            format!("{} (raw)", with_unit(raw.to_string(), unit))
        }
    }
}

/// Insert `,` every three digits from the right
///
/// Strings longer than [`SCIENTIFIC_THRESHOLD`] digits are shortened to
/// `d.ddde+N` instead. The output is for humans and must not be parsed back.
pub fn group_thousands(digits: &str) -> String {
    if !digits.is_ascii() {
        return digits.to_string();
    }

    let len = digits.len();
    if len > SCIENTIFIC_THRESHOLD {
        return format!("{}.{}e+{}", &digits[..1], &digits[1..4], len - 1);
    }

    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn with_unit(value: String, unit: &str) -> String {
    if unit.is_empty() {
        value
    } else {
        format!("{} {}", value, unit)
    }
}
