//! Conversions between hexadecimal text and raw bytes.

use crate::error::ParseHexError;

/// Decode hexadecimal text into bytes.
///
/// - An optional `0x` / `0X` prefix is accepted.
/// - An odd number of digits is left-padded with a single `0` (so `"0x1"` is `[0x01]`).
/// - An empty string (after the prefix) decodes to an empty byte sequence.
///
/// # Example
///
/// ```
/// use oex_kit::hex_to_bytes;
///
/// assert_eq!(hex_to_bytes("0xabc").unwrap(), vec![0x0a, 0xbc]);
/// assert_eq!(hex_to_bytes("0X").unwrap(), Vec::<u8>::new());
/// assert!(hex_to_bytes("0xzz").is_err());
/// ```
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>, ParseHexError> {
    let (prefix_len, digits) = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => (2, &text[2..]),
        _ => (0, text),
    };

    if digits.is_empty() {
        return Ok(Vec::new());
    }

    let padded;
    let (digits, pad) = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        (padded.as_str(), 1)
    } else {
        (digits, 0)
    };

    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => ParseHexError::InvalidCharacter {
            character: c,
            position: prefix_len + index - pad,
        },
        // Length is always even here, so only character errors remain.
        _ => ParseHexError::InvalidCharacter {
            character: '?',
            position: prefix_len,
        },
    })
}

/// Encode bytes as lowercase `0x`-prefixed hexadecimal text.
///
/// ```
/// use oex_kit::bytes_to_hex;
///
/// assert_eq!(bytes_to_hex(&[0x0a, 0xbc]), "0x0abc");
/// assert_eq!(bytes_to_hex(&[]), "0x");
/// ```
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
