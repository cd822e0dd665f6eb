//! Contract-call argument encoding.
//!
//! A call payload is a 4-byte method selector followed by the arguments in the
//! standard head/tail layout:
//!
//! - The selector is the first four bytes of `keccak256("name(type1,type2,...)")`,
//!   using canonical type names (`uint` is written `uint256`).
//! - Static parameters (`uintN`, `intN`, `address`, `bool`, `bytesN`, and fixed
//!   arrays of static types) occupy 32-byte slots in the head, in order.
//! - Dynamic parameters (`bytes`, `string`, `T[]`, and fixed arrays of dynamic
//!   types) put a 32-byte offset in the head and their length-prefixed content
//!   in the tail. Offsets count from the first byte of the argument block.
//!
//! # Example
//!
//! ```
//! use oex_kit::codec::{encode_call, AbiValue};
//!
//! let payload = encode_call("baz", &["uint32", "bool"], &[AbiValue::from(69u64), AbiValue::Bool(true)]).unwrap();
//! assert_eq!(hex::encode(&payload[..4]), "cdcd77c0");
//! assert_eq!(payload.len(), 4 + 64);
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use sha3::{Digest, Keccak256};

use crate::error::AbiError;

const WORD: usize = 32;

// ============================================================================
// Parameter types
// ============================================================================

/// A contract parameter type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uintN`, N in 8..=256 step 8.
    Uint(usize),
    /// `intN`, N in 8..=256 step 8.
    Int(usize),
    Address,
    Bool,
    /// `bytesN`, N in 1..=32.
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[]`
    Array(Box<AbiType>),
    /// `T[k]`
    FixedArray(Box<AbiType>, usize),
}

impl AbiType {
    /// Whether values of this type live in the tail region.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            _ => false,
        }
    }

    /// Size of this type's head slot(s) in bytes, or `None` if it does not
    /// fit in `usize`.
    fn head_size(&self) -> Option<usize> {
        match self {
            AbiType::FixedArray(inner, len) if !inner.is_dynamic() => {
                inner.head_size()?.checked_mul(*len)
            }
            _ => Some(WORD),
        }
    }

    fn checked_head_size(&self) -> Result<usize, AbiError> {
        self.head_size()
            .ok_or_else(|| AbiError::InvalidType(self.to_string()))
    }
}

/// Array dimensions accepted on one type, e.g. `uint256[2][][3]` has three.
const MAX_DIMENSIONS: usize = 32;

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AbiError::InvalidType(s.to_string());
        let s = s.trim();

        if s.matches('[').count() > MAX_DIMENSIONS {
            return Err(invalid());
        }

        if let Some(body) = s.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(invalid)?;
            let inner: AbiType = body[..open].parse().map_err(|_| invalid())?;
            let dim = &body[open + 1..];
            if dim.is_empty() {
                return Ok(AbiType::Array(Box::new(inner)));
            }
            let len: usize = dim.parse().map_err(|_| invalid())?;
            if len == 0 {
                return Err(invalid());
            }
            let ty = AbiType::FixedArray(Box::new(inner), len);
            if ty.head_size().is_none() {
                return Err(invalid());
            }
            return Ok(ty);
        }

        match s {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "byte" => return Ok(AbiType::FixedBytes(1)),
            "uint" => return Ok(AbiType::Uint(256)),
            "int" => return Ok(AbiType::Int(256)),
            _ => {}
        }

        let sized = |digits: &str| -> Option<usize> {
            if digits.starts_with('0') {
                return None;
            }
            digits.parse().ok()
        };

        if let Some(bits) = s.strip_prefix("uint").and_then(sized) {
            if bits % 8 == 0 && (8..=256).contains(&bits) {
                return Ok(AbiType::Uint(bits));
            }
        } else if let Some(bits) = s.strip_prefix("int").and_then(sized) {
            if bits % 8 == 0 && (8..=256).contains(&bits) {
                return Ok(AbiType::Int(bits));
            }
        } else if let Some(len) = s.strip_prefix("bytes").and_then(sized) {
            if (1..=32).contains(&len) {
                return Ok(AbiType::FixedBytes(len));
            }
        }

        Err(invalid())
    }
}

/// Canonical form, as used in method signatures.
impl Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::FixedBytes(len) => write!(f, "bytes{}", len),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
            AbiType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
        }
    }
}

/// Parse a list of type names.
pub fn parse_types<S: AsRef<str>>(types: &[S]) -> Result<Vec<AbiType>, AbiError> {
    types.iter().map(|t| t.as_ref().parse()).collect()
}

// ============================================================================
// Values
// ============================================================================

/// A contract argument value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiValue {
    Uint(BigUint),
    Int(BigInt),
    Address([u8; 20]),
    Bool(bool),
    /// Value of a `bytesN` parameter; at most N bytes, right-padded on encode.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Elements of `T[]` or `T[k]`.
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Parse a `0x`-prefixed 20-byte address.
    pub fn address(text: &str) -> Result<Self, AbiError> {
        let bytes = crate::types::hex_to_bytes(text)?;
        let address: [u8; 20] = bytes
            .try_into()
            .map_err(|_| AbiError::InvalidType(format!("address {}", text)))?;
        Ok(AbiValue::Address(address))
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(BigUint::from(v))
    }
}

impl From<u128> for AbiValue {
    fn from(v: u128) -> Self {
        AbiValue::Uint(BigUint::from(v))
    }
}

impl From<i64> for AbiValue {
    fn from(v: i64) -> Self {
        AbiValue::Int(BigInt::from(v))
    }
}

impl From<BigUint> for AbiValue {
    fn from(v: BigUint) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl<T: Into<AbiValue>> From<Vec<T>> for AbiValue {
    fn from(v: Vec<T>) -> Self {
        AbiValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{}", v),
            AbiValue::Int(v) => write!(f, "{}", v),
            AbiValue::Address(a) => write!(f, "0x{}", hex::encode(a)),
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => f.write_str(s),
            AbiValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// Selector
// ============================================================================

/// Compute the 4-byte method selector for `name(types...)`.
pub fn selector(name: &str, types: &[AbiType]) -> [u8; 4] {
    let signature = format!(
        "{}({})",
        name,
        types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    );
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Compute the method selector from type names.
///
/// ```
/// use oex_kit::codec::compute_selector;
///
/// let sel = compute_selector("transfer", &["address", "uint256"]).unwrap();
/// assert_eq!(sel, [0xa9, 0x05, 0x9c, 0xbb]);
/// // `uint` is canonicalized to `uint256`
/// assert_eq!(compute_selector("transfer", &["address", "uint"]).unwrap(), sel);
/// ```
pub fn compute_selector<S: AsRef<str>>(name: &str, types: &[S]) -> Result<[u8; 4], AbiError> {
    Ok(selector(name, &parse_types(types)?))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a full call payload: selector followed by arguments.
pub fn encode_call<S: AsRef<str>>(
    name: &str,
    types: &[S],
    values: &[AbiValue],
) -> Result<Vec<u8>, AbiError> {
    let types = parse_types(types)?;
    let mut out = selector(name, &types).to_vec();
    out.extend(encode_arguments(&types, values)?);
    Ok(out)
}

/// Encode arguments (without selector) in head/tail layout.
pub fn encode_arguments(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArgumentCount {
            expected: types.len(),
            actual: values.len(),
        });
    }
    let params: Vec<(&AbiType, &AbiValue)> = types.iter().zip(values).collect();
    encode_sequence(&params, None)
}

/// `parent` is the top-level argument position when encoding array elements.
fn encode_sequence(
    params: &[(&AbiType, &AbiValue)],
    parent: Option<usize>,
) -> Result<Vec<u8>, AbiError> {
    let head_len = params.iter().try_fold(0usize, |acc, (ty, _)| {
        let size = ty.checked_head_size()?;
        acc.checked_add(size)
            .ok_or_else(|| AbiError::InvalidType(ty.to_string()))
    })?;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (i, (ty, value)) in params.iter().enumerate() {
        let encoded = encode_value(ty, value, parent.unwrap_or(i))?;
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &AbiValue, index: usize) -> Result<Vec<u8>, AbiError> {
    let mismatch = || AbiError::TypeMismatch {
        index,
        expected: ty.to_string(),
    };
    let out_of_range = || AbiError::ValueOutOfRange {
        index,
        ty: ty.to_string(),
    };

    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bits() > *bits as u64 {
                return Err(out_of_range());
            }
            Ok(left_pad(&v.to_bytes_be()).to_vec())
        }
        (AbiType::Uint(bits), AbiValue::Int(v)) => {
            let v = v.to_biguint().ok_or_else(out_of_range)?;
            encode_value(&AbiType::Uint(*bits), &AbiValue::Uint(v), index)
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => {
            let limit = BigInt::one() << (*bits - 1);
            if *v >= limit || *v < -limit {
                return Err(out_of_range());
            }
            Ok(signed_word(v).to_vec())
        }
        (AbiType::Int(bits), AbiValue::Uint(v)) => {
            encode_value(&AbiType::Int(*bits), &AbiValue::Int(BigInt::from(v.clone())), index)
        }
        (AbiType::Address, AbiValue::Address(a)) => Ok(left_pad(a).to_vec()),
        (AbiType::Bool, AbiValue::Bool(b)) => Ok(usize_word(usize::from(*b)).to_vec()),
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(b) | AbiValue::Bytes(b)) => {
            if b.len() > *len {
                return Err(out_of_range());
            }
            Ok(right_pad(b))
        }
        (AbiType::Bytes, AbiValue::Bytes(b)) => Ok(length_prefixed(b)),
        (AbiType::String, AbiValue::String(s)) => Ok(length_prefixed(s.as_bytes())),
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            let params: Vec<(&AbiType, &AbiValue)> =
                items.iter().map(|item| (inner.as_ref(), item)).collect();
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode_sequence(&params, Some(index))?);
            Ok(out)
        }
        (AbiType::FixedArray(inner, len), AbiValue::Array(items)) => {
            if items.len() != *len {
                return Err(mismatch());
            }
            let params: Vec<(&AbiType, &AbiValue)> =
                items.iter().map(|item| (inner.as_ref(), item)).collect();
            encode_sequence(&params, Some(index))
        }
        _ => Err(mismatch()),
    }
}

fn usize_word(v: usize) -> [u8; WORD] {
    left_pad(&(v as u64).to_be_bytes())
}

fn left_pad(bytes: &[u8]) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    let bytes = &bytes[bytes.len().saturating_sub(WORD)..];
    word[WORD - bytes.len()..].copy_from_slice(bytes);
    word
}

fn signed_word(v: &BigInt) -> [u8; WORD] {
    let bytes = v.to_signed_bytes_be();
    let fill = if v.sign() == Sign::Minus { 0xff } else { 0x00 };
    let mut word = [fill; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    word
}

fn right_pad(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD).max(1) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded_len, 0);
    out
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len()).to_vec();
    if !bytes.is_empty() {
        out.extend(right_pad(bytes));
    }
    out
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode arguments (without selector) against their declared types.
pub fn decode_arguments(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let refs: Vec<&AbiType> = types.iter().collect();
    decode_sequence(&refs, data, 0, None)
}

/// Decode consecutive values laid out in head/tail form.
///
/// `base` is the absolute offset of `data` within the argument block and
/// `parent` the enclosing top-level argument, both for error reporting.
fn decode_sequence(
    types: &[&AbiType],
    data: &[u8],
    base: usize,
    parent: Option<usize>,
) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    let mut head = 0usize;

    for (i, ty) in types.iter().enumerate() {
        let index = parent.unwrap_or(i);
        if ty.is_dynamic() {
            let offset = read_usize(data, head, base)?;
            if offset > data.len() {
                return Err(AbiError::InvalidOffset(base + head));
            }
            values.push(decode_value(ty, &data[offset..], base + offset, index)?);
            head += WORD;
        } else {
            let size = ty.checked_head_size()?;
            let truncated = AbiError::Truncated {
                offset: base + head,
                needed: size,
            };
            let end = head.checked_add(size).ok_or(truncated.clone())?;
            let slot = data.get(head..end).ok_or(truncated)?;
            values.push(decode_value(ty, slot, base + head, index)?);
            head = end;
        }
    }

    Ok(values)
}

fn decode_value(
    ty: &AbiType,
    data: &[u8],
    base: usize,
    index: usize,
) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::Uint(bits) => {
            let v = BigUint::from_bytes_be(word(data, 0, base)?);
            if v.bits() > *bits as u64 {
                return Err(AbiError::ValueOutOfRange {
                    index,
                    ty: ty.to_string(),
                });
            }
            Ok(AbiValue::Uint(v))
        }
        AbiType::Int(_) => Ok(AbiValue::Int(BigInt::from_signed_bytes_be(word(
            data, 0, base,
        )?))),
        AbiType::Address => {
            let w = word(data, 0, base)?;
            let mut address = [0u8; 20];
            address.copy_from_slice(&w[12..]);
            Ok(AbiValue::Address(address))
        }
        AbiType::Bool => match read_usize(data, 0, base)? {
            0 => Ok(AbiValue::Bool(false)),
            1 => Ok(AbiValue::Bool(true)),
            _ => Err(AbiError::InvalidBool(base)),
        },
        AbiType::FixedBytes(len) => Ok(AbiValue::FixedBytes(word(data, 0, base)?[..*len].to_vec())),
        AbiType::Bytes => Ok(AbiValue::Bytes(read_length_prefixed(data, base)?.to_vec())),
        AbiType::String => {
            let bytes = read_length_prefixed(data, base)?;
            String::from_utf8(bytes.to_vec())
                .map(AbiValue::String)
                .map_err(|_| AbiError::InvalidUtf8(index))
        }
        AbiType::Array(inner) => {
            let len = read_usize(data, 0, base)?;
            let body = &data[WORD..];
            // Every element takes at least one word; reject lengths the data cannot hold.
            if len.checked_mul(WORD).is_none_or(|n| n > body.len()) {
                return Err(AbiError::InvalidOffset(base));
            }
            let types = vec![inner.as_ref(); len];
            decode_sequence(&types, body, base + WORD, Some(index)).map(AbiValue::Array)
        }
        AbiType::FixedArray(inner, len) => {
            if len.checked_mul(WORD).is_none_or(|n| n > data.len()) {
                return Err(AbiError::Truncated {
                    offset: base,
                    needed: len.saturating_mul(WORD),
                });
            }
            let types = vec![inner.as_ref(); *len];
            decode_sequence(&types, data, base, Some(index)).map(AbiValue::Array)
        }
    }
}

fn word(data: &[u8], at: usize, base: usize) -> Result<&[u8], AbiError> {
    data.get(at..at + WORD).ok_or(AbiError::Truncated {
        offset: base + at,
        needed: WORD,
    })
}

fn read_usize(data: &[u8], at: usize, base: usize) -> Result<usize, AbiError> {
    let w = word(data, at, base)?;
    let invalid = || AbiError::InvalidOffset(base + at);
    if w[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(invalid());
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&w[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| invalid())
}

fn read_length_prefixed(data: &[u8], base: usize) -> Result<&[u8], AbiError> {
    let len = read_usize(data, 0, base)?;
    data.get(WORD..WORD.saturating_add(len))
        .ok_or(AbiError::Truncated {
            offset: base + WORD,
            needed: len,
        })
}
