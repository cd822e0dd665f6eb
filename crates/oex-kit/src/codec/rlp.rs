//! Recursive length-prefix ("list") encoding.
//!
//! Every action payload that is not raw bytes or a contract call is a list
//! encoding of its fields. Node signature and hash checks run over these exact
//! bytes, so encoding is canonical and deterministic: the same [`RlpItem`]
//! always produces the same output.
//!
//! [`RlpItem`] is a small owned tree over the `rlp` crate: encoding goes
//! through [`RlpStream`], decoding through [`Rlp`] views.
//!
//! | item | header |
//! |------|--------|
//! | single byte `< 0x80` | none (the byte is its own encoding) |
//! | byte string, length ≤ 55 | `0x80 + len` |
//! | byte string, length > 55 | `0xb7 + len(len)`, then `len` big-endian |
//! | list, payload ≤ 55 | `0xc0 + len` |
//! | list, payload > 55 | `0xf7 + len(len)`, then `len` big-endian |
//!
//! Integers are byte strings holding their minimal big-endian form, so the
//! integer `0` is the empty string (`0x80`).

use ::rlp::{DecoderError, Encodable, Rlp, RlpStream};
use num_bigint::BigUint;

use crate::error::{ParseHexError, RlpError};

/// Deepest list nesting [`decode`] accepts. Payloads nest at most three levels.
pub const MAX_DEPTH: usize = 64;

/// A value in list encoding: a byte string or a nested list.
///
/// Conversions exist from the scalar types used in payloads. Text is always
/// taken as UTF-8 bytes; use [`RlpItem::from_hex`] for fields carried as hex
/// (public keys, pre-encoded payloads).
///
/// ```
/// use oex_kit::codec::{rlp, RlpItem};
///
/// let item = RlpItem::list(vec!["dog".into(), 1024u64.into()]);
/// assert_eq!(rlp::encode(&item), vec![0xc7, 0x83, b'd', b'o', b'g', 0x82, 0x04, 0x00]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// The empty byte string (also the integer zero).
    pub const fn empty() -> Self {
        RlpItem::Bytes(Vec::new())
    }

    /// A nested list.
    pub fn list(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }

    /// A byte string decoded from hex text.
    pub fn from_hex(text: &str) -> Result<Self, ParseHexError> {
        crate::types::hex_to_bytes(text).map(RlpItem::Bytes)
    }

    /// An unsigned integer of arbitrary size.
    pub fn uint(value: &BigUint) -> Self {
        if value.bits() == 0 {
            RlpItem::empty()
        } else {
            RlpItem::Bytes(value.to_bytes_be())
        }
    }

    /// Borrow the byte string, if this is one.
    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            RlpItem::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    /// Borrow the list elements, if this is a list.
    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Interpret a byte string as a canonical unsigned integer.
    pub fn as_biguint(&self) -> Result<BigUint, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        Ok(BigUint::from_bytes_be(bytes))
    }

    /// Interpret a byte string as a canonical `u64`.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        if bytes.len() > 8 {
            return Err(RlpError::IntegerOverflow(64));
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

impl From<&str> for RlpItem {
    fn from(s: &str) -> Self {
        RlpItem::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for RlpItem {
    fn from(s: String) -> Self {
        RlpItem::Bytes(s.into_bytes())
    }
}

impl From<&String> for RlpItem {
    fn from(s: &String) -> Self {
        RlpItem::from(s.as_str())
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(b: Vec<u8>) -> Self {
        RlpItem::Bytes(b)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(b: &[u8]) -> Self {
        RlpItem::Bytes(b.to_vec())
    }
}

impl From<u64> for RlpItem {
    fn from(v: u64) -> Self {
        let bytes = v.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        RlpItem::Bytes(bytes[first..].to_vec())
    }
}

impl From<u32> for RlpItem {
    fn from(v: u32) -> Self {
        RlpItem::from(u64::from(v))
    }
}

impl From<&BigUint> for RlpItem {
    fn from(v: &BigUint) -> Self {
        RlpItem::uint(v)
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

// ============================================================================
// Encoding
// ============================================================================

impl Encodable for RlpItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            RlpItem::Bytes(bytes) => {
                s.append(bytes);
            }
            RlpItem::List(items) => {
                s.begin_list(items.len());
                for item in items {
                    s.append(item);
                }
            }
        }
    }
}

/// Encode a single item.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    ::rlp::encode(item).to_vec()
}

/// Encode a sequence of items as one list.
///
/// Equivalent to `encode(&RlpItem::List(items.to_vec()))` without the clone.
pub fn encode_list(items: &[RlpItem]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(items.len());
    for item in items {
        stream.append(item);
    }
    stream.out().to_vec()
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode exactly one item, rejecting trailing bytes and non-canonical forms.
///
/// Lists nested deeper than [`MAX_DEPTH`] are rejected with
/// [`RlpError::TooDeep`].
pub fn decode(bytes: &[u8]) -> Result<RlpItem, RlpError> {
    let view = Rlp::new(bytes);
    let total = view.payload_info()?.total();
    if total != bytes.len() {
        return Err(RlpError::TrailingBytes(bytes.len() - total));
    }
    to_item(&view, 0)
}

fn to_item(view: &Rlp<'_>, depth: usize) -> Result<RlpItem, RlpError> {
    if !view.is_list() {
        return Ok(RlpItem::Bytes(view.as_val::<Vec<u8>>()?));
    }
    if depth >= MAX_DEPTH {
        return Err(RlpError::TooDeep(MAX_DEPTH));
    }

    let payload_len = view.payload_info()?.value_len;
    let count = view.item_count()?;
    let mut items = Vec::with_capacity(count);
    let mut consumed = 0usize;
    for index in 0..count {
        let child = view.at(index)?;
        consumed += child.as_raw().len();
        items.push(to_item(&child, depth + 1)?);
    }
    // Item iteration stops at the first undecodable element; make sure the
    // elements cover the whole list payload.
    if consumed != payload_len {
        return Err(DecoderError::RlpInconsistentLengthAndData.into());
    }
    Ok(RlpItem::List(items))
}
