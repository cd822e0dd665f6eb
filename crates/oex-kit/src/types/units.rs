//! Asset amounts in base units, and scaling from human decimal quantities.

use std::fmt::{self, Display};

use num_bigint::BigUint;
use num_traits::{Num, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::RlpItem;
use crate::error::ScalingError;

/// An asset amount in base units, as it appears on the wire.
///
/// Zero and non-zero amounts have different wire forms and the difference is
/// deliberate: nodes compare these byte-for-byte, so it must not be normalized.
///
/// | amount | JSON | list encoding |
/// |--------|------|---------------|
/// | zero | the number `0` | empty string (`0x80`) |
/// | non-zero | `"0x…"`, lowercase, no leading zero digit | minimal big-endian bytes |
///
/// # Example
///
/// ```
/// use oex_kit::Amount;
///
/// let one = Amount::scale("1", 18).unwrap();
/// assert_eq!(one.to_string(), "0xde0b6b3a7640000");
/// assert_eq!(serde_json::to_string(&one).unwrap(), "\"0xde0b6b3a7640000\"");
///
/// let zero = Amount::scale("0.000", 18).unwrap();
/// assert!(zero.is_zero());
/// assert_eq!(serde_json::to_string(&zero).unwrap(), "0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Amount {
    /// The literal integer zero.
    #[default]
    Zero,
    /// A non-zero quantity of base units.
    BaseUnits(BigUint),
}

impl Amount {
    /// Wrap a base-unit quantity, mapping zero to [`Amount::Zero`].
    pub fn from_base_units(units: impl Into<BigUint>) -> Self {
        let units = units.into();
        if units.is_zero() {
            Amount::Zero
        } else {
            Amount::BaseUnits(units)
        }
    }

    /// Scale a human decimal quantity by `10^decimals`. See [`scale_amount`].
    pub fn scale(decimal: &str, decimals: u32) -> Result<Self, ScalingError> {
        scale_amount(decimal, decimals)
    }

    /// The quantity in base units.
    pub fn base_units(&self) -> BigUint {
        match self {
            Amount::Zero => BigUint::zero(),
            Amount::BaseUnits(units) => units.clone(),
        }
    }

    /// Check if zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Amount::Zero)
    }

    /// Multiply by an integer factor (stake units, for example).
    pub fn times(&self, factor: &BigUint) -> Self {
        Amount::from_base_units(self.base_units() * factor)
    }

    /// The `0x`-prefixed hex form, or `None` for zero.
    pub fn to_hex(&self) -> Option<String> {
        match self {
            Amount::Zero => None,
            Amount::BaseUnits(units) => Some(format!("0x{}", units.to_str_radix(16))),
        }
    }
}

/// Hex for non-zero amounts, `0` otherwise (matching the JSON form).
impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_hex() {
            Some(hex) => f.write_str(&hex),
            None => f.write_str("0"),
        }
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Amount::from_base_units(units)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Amount::from_base_units(units)
    }
}

impl From<BigUint> for Amount {
    fn from(units: BigUint) -> Self {
        Amount::from_base_units(units)
    }
}

impl From<&Amount> for RlpItem {
    fn from(amount: &Amount) -> Self {
        match amount {
            Amount::Zero => RlpItem::empty(),
            Amount::BaseUnits(units) => RlpItem::uint(units),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.to_hex() {
            Some(hex) => s.serialize_str(&hex),
            None => s.serialize_u64(0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        deserialize_biguint(d).map(Amount::from_base_units)
    }
}

/// Serialize an unsigned integer as a JSON number when it fits in `u64`, and as
/// a decimal string otherwise.
pub(crate) fn serialize_biguint<S: Serializer>(v: &BigUint, s: S) -> Result<S::Ok, S::Error> {
    match u64::try_from(v) {
        Ok(small) => s.serialize_u64(small),
        Err(_) => s.serialize_str(&v.to_str_radix(10)),
    }
}

/// Deserialize an unsigned integer given as a JSON number, a decimal string,
/// or a `0x` hex string. Node responses use all three.
pub(crate) fn deserialize_biguint<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
    struct BigUintVisitor;

    impl Visitor<'_> for BigUintVisitor {
        type Value = BigUint;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer, decimal string or 0x hex string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigUint, E> {
            Ok(BigUint::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigUint, E> {
            Ok(BigUint::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigUint, E> {
            u64::try_from(v)
                .map(BigUint::from)
                .map_err(|_| E::custom(format!("negative integer {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigUint, E> {
            let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
                Some("") => Some(BigUint::zero()),
                Some(hex) => BigUint::from_str_radix(hex, 16).ok(),
                None => BigUint::from_str_radix(v, 10).ok(),
            };
            parsed.ok_or_else(|| E::custom(format!("invalid integer '{}'", v)))
        }
    }

    d.deserialize_any(BigUintVisitor)
}

/// Scale a human decimal quantity into base units: `decimal × 10^decimals`.
///
/// Arithmetic is exact (digit shifting on arbitrary-precision integers).
/// Fractional digits beyond `decimals` are accepted only if they are zeros;
/// anything else would silently change the transferred value.
///
/// # Errors
///
/// - [`ScalingError::Empty`] for an empty string
/// - [`ScalingError::Negative`] for a leading `-`
/// - [`ScalingError::NotFinite`] for `NaN` / `Infinity`
/// - [`ScalingError::InvalidNumber`] for anything else that is not `digits[.digits]`
/// - [`ScalingError::PrecisionLoss`] for non-zero digits past `decimals`
///
/// # Example
///
/// ```
/// use oex_kit::{scale_amount, Amount};
///
/// assert_eq!(scale_amount("0", 18).unwrap(), Amount::Zero);
/// assert_eq!(scale_amount("1.5", 2).unwrap(), Amount::from(150u64));
/// assert!(scale_amount("0.001", 2).is_err());
/// ```
pub fn scale_amount(decimal: &str, decimals: u32) -> Result<Amount, ScalingError> {
    let s = decimal.trim();

    if s.is_empty() {
        return Err(ScalingError::Empty);
    }
    if s.starts_with('-') {
        return Err(ScalingError::Negative(s.to_string()));
    }
    let lowered = s.trim_start_matches('+').to_ascii_lowercase();
    if matches!(lowered.as_str(), "nan" | "inf" | "infinity") {
        return Err(ScalingError::NotFinite(s.to_string()));
    }

    let (integer, fraction) = match s.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (s, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction) {
        return Err(ScalingError::InvalidNumber(s.to_string()));
    }

    let decimals_len = decimals as usize;
    let fraction = if fraction.len() > decimals_len {
        let (kept, dropped) = fraction.split_at(decimals_len);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(ScalingError::PrecisionLoss {
                amount: s.to_string(),
                decimals,
            });
        }
        kept
    } else {
        fraction
    };

    let mut digits = String::with_capacity(integer.len() + decimals_len);
    digits.push_str(integer);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat_n('0', decimals_len - fraction.len()));

    let units = if digits.is_empty() {
        BigUint::zero()
    } else {
        BigUint::from_str_radix(&digits, 10)
            .map_err(|_| ScalingError::InvalidNumber(s.to_string()))?
    };

    Ok(Amount::from_base_units(units))
}
