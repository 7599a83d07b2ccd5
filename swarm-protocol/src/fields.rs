//! Field-level parsing helpers shared by event and response parsers

use core::str::FromStr;

use heapless::{String, Vec};

use crate::frame::{hex_digit, hex_value};

/// Errors produced while decoding a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Wrong number of comma-separated fields
    FieldCount,
    /// Expected `KEY=` prefix missing
    MissingKey,
    /// Field is not a number
    InvalidNumber,
    /// Number parsed but is outside the documented range
    OutOfRange,
    /// Odd length or non-hex characters in a hex field
    InvalidHex,
    /// Enumerated field holds an unknown value
    UnknownValue,
    /// Field longer than its fixed-capacity storage
    TooLong,
}

/// Parse a whole field as a number
pub fn number<T: FromStr>(field: &str) -> Result<T, ParseError> {
    field.trim().parse().map_err(|_| ParseError::InvalidNumber)
}

/// Parse a number that must fall within `min..=max`
pub fn number_in<T: FromStr + PartialOrd>(field: &str, min: T, max: T) -> Result<T, ParseError> {
    let value = number(field)?;
    // Written this way round so NaN is rejected
    if !(value >= min && value <= max) {
        return Err(ParseError::OutOfRange);
    }
    Ok(value)
}

/// Strip `KEY=` from a field
pub fn keyed<'a>(field: &'a str, key: &str) -> Result<&'a str, ParseError> {
    field
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or(ParseError::MissingKey)
}

/// Parse a `KEY=number` field
pub fn keyed_number<T: FromStr>(field: &str, key: &str) -> Result<T, ParseError> {
    number(keyed(field, key)?)
}

/// Split a payload into exactly `N` comma-separated fields
pub fn split_exact<const N: usize>(payload: &str) -> Result<[&str; N], ParseError> {
    let mut fields = [""; N];
    let mut parts = payload.split(',');
    for slot in fields.iter_mut() {
        *slot = parts.next().ok_or(ParseError::FieldCount)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::FieldCount);
    }
    Ok(fields)
}

/// Parse a fixed-width run of decimal digits
pub fn digits(text: &str, width: usize) -> Result<u16, ParseError> {
    if text.len() != width || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber);
    }
    number(text)
}

/// Parse an unsigned hex number with an optional `0x` prefix
pub fn hex_u32(field: &str) -> Result<u32, ParseError> {
    let text = field.strip_prefix("0x").unwrap_or(field);
    u32::from_str_radix(text, 16).map_err(|_| ParseError::InvalidHex)
}

/// Copy a hex payload into fixed storage, checking it is well formed
pub fn hex_text<const N: usize>(field: &str) -> Result<String<N>, ParseError> {
    if field.len() % 2 != 0 || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidHex);
    }
    text(field)
}

/// Copy text into fixed storage
pub fn text<const N: usize>(field: &str) -> Result<String<N>, ParseError> {
    let mut out = String::new();
    out.push_str(field).map_err(|_| ParseError::TooLong)?;
    Ok(out)
}

/// Copy text into fixed storage, cutting it at capacity on a char boundary
pub fn truncated<const N: usize>(field: &str) -> String<N> {
    let mut out = String::new();
    for c in field.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Decode ASCII hex into bytes
pub fn decode_hex<const N: usize>(hex: &str) -> Result<Vec<u8, N>, ParseError> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(ParseError::InvalidHex);
    }
    let mut out = Vec::new();
    for pair in bytes.chunks_exact(2) {
        let hi = hex_value(pair[0]).ok_or(ParseError::InvalidHex)?;
        let lo = hex_value(pair[1]).ok_or(ParseError::InvalidHex)?;
        out.push((hi << 4) | lo).map_err(|_| ParseError::TooLong)?;
    }
    Ok(out)
}

/// Append bytes as uppercase ASCII hex
pub fn encode_hex<const N: usize>(data: &[u8], out: &mut String<N>) -> Result<(), ParseError> {
    for &byte in data {
        out.push(char::from(hex_digit(byte >> 4)))
            .map_err(|_| ParseError::TooLong)?;
        out.push(char::from(hex_digit(byte & 0x0F)))
            .map_err(|_| ParseError::TooLong)?;
    }
    Ok(())
}
