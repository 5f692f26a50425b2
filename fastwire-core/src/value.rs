/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Scalar field values.
//!
//! [`ScalarValue`] is the single value representation used by fields,
//! dictionaries, and application accessors. Equality is by value: integer
//! variants of different widths holding the same number are equal, and the
//! two string kinds compare by content.

use crate::decimal::DecimalValue;
use crate::error::{DynError, RepError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single FAST field value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum ScalarValue {
    /// No value has ever been assigned. Distinct from an absent optional
    /// field and from the dictionary's empty state.
    #[default]
    Undefined,
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Exact decimal.
    Decimal(DecimalValue),
    /// 7-bit ascii string.
    Ascii(String),
    /// UTF-8 string.
    Unicode(String),
    /// Raw byte vector.
    Bytes(Bytes),
}

impl ScalarValue {
    /// Returns true for [`Self::Undefined`].
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true for the integer variants.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int32(_) | Self::UInt32(_) | Self::Int64(_) | Self::UInt64(_)
        )
    }

    /// A short name for the value kind, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uInt32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uInt64",
            Self::Decimal(_) => "decimal",
            Self::Ascii(_) => "string",
            Self::Unicode(_) => "unicode",
            Self::Bytes(_) => "byteVector",
        }
    }

    /// The integer content widened to 128 bits, for the integer variants.
    #[must_use]
    pub const fn integer_value(&self) -> Option<i128> {
        match self {
            Self::Int32(v) => Some(*v as i128),
            Self::UInt32(v) => Some(*v as i128),
            Self::Int64(v) => Some(*v as i128),
            Self::UInt64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Borrows the string content of the string variants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) | Self::Unicode(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the byte content of string and byte-vector variants.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Ascii(s) | Self::Unicode(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Converts to a signed 64-bit integer.
    ///
    /// Integer variants convert with range checks, decimals must be
    /// integral, strings parse numerically.
    ///
    /// # Errors
    /// [`RepError`] on range or parse failures, [`DynError::InvalidType`]
    /// for kinds with no numeric interpretation.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Self::Int32(v) => Ok(i64::from(*v)),
            Self::UInt32(v) => Ok(i64::from(*v)),
            Self::Int64(v) => Ok(*v),
            Self::UInt64(v) => i64::try_from(*v).map_err(|_| {
                RepError::NumericOverflow {
                    value: v.to_string(),
                    target: "i64",
                }
                .into()
            }),
            Self::Decimal(d) => d.to_i64(),
            Self::Ascii(s) | Self::Unicode(s) => s.parse::<i64>().map_err(|_| {
                RepError::NumericOverflow {
                    value: s.clone(),
                    target: "i64",
                }
                .into()
            }),
            other => Err(invalid_kind("number", other)),
        }
    }

    /// Converts to an unsigned 64-bit integer.
    ///
    /// # Errors
    /// As [`Self::to_i64`]; negative values are range errors.
    pub fn to_u64(&self) -> Result<u64> {
        match self {
            Self::UInt32(v) => Ok(u64::from(*v)),
            Self::UInt64(v) => Ok(*v),
            Self::Int32(v) => u64::try_from(*v).map_err(|_| overflow(v, "u64")),
            Self::Int64(v) => u64::try_from(*v).map_err(|_| overflow(v, "u64")),
            Self::Decimal(d) => {
                let value = d.to_i64()?;
                u64::try_from(value).map_err(|_| overflow(&value, "u64"))
            }
            Self::Ascii(s) | Self::Unicode(s) => s.parse::<u64>().map_err(|_| {
                RepError::NumericOverflow {
                    value: s.clone(),
                    target: "u64",
                }
                .into()
            }),
            other => Err(invalid_kind("number", other)),
        }
    }

    /// Converts to a signed 32-bit integer.
    ///
    /// # Errors
    /// As [`Self::to_i64`], with the narrower range.
    pub fn to_i32(&self) -> Result<i32> {
        let wide = self.to_i64()?;
        i32::try_from(wide).map_err(|_| overflow(&wide, "i32"))
    }

    /// Converts to an unsigned 32-bit integer.
    ///
    /// # Errors
    /// As [`Self::to_u64`], with the narrower range.
    pub fn to_u32(&self) -> Result<u32> {
        let wide = self.to_u64()?;
        u32::try_from(wide).map_err(|_| overflow(&wide, "u32"))
    }

    /// Converts to an exact [`Decimal`].
    ///
    /// # Errors
    /// [`RepError`] when the value exceeds `Decimal`'s envelope or fails to
    /// parse, [`DynError::InvalidType`] for non-numeric kinds.
    pub fn to_decimal(&self) -> Result<Decimal> {
        match self {
            Self::Int32(v) => Ok(Decimal::from(*v)),
            Self::UInt32(v) => Ok(Decimal::from(*v)),
            Self::Int64(v) => Ok(Decimal::from(*v)),
            Self::UInt64(v) => Ok(Decimal::from(*v)),
            Self::Decimal(d) => d.to_decimal(),
            Self::Ascii(s) | Self::Unicode(s) => Decimal::from_str(s).map_err(|_| {
                RepError::NumericOverflow {
                    value: s.clone(),
                    target: "decimal",
                }
                .into()
            }),
            other => Err(invalid_kind("number", other)),
        }
    }

    /// Converts to wire decimal form.
    ///
    /// # Errors
    /// As [`Self::to_decimal`].
    pub fn to_decimal_value(&self) -> Result<DecimalValue> {
        match self {
            Self::Decimal(d) => Ok(*d),
            Self::Ascii(_) | Self::Unicode(_) => DecimalValue::from_decimal(self.to_decimal()?),
            other => Ok(DecimalValue::new(other.to_i64()?, 0)),
        }
    }

    /// Converts to floating point with a single final rounding.
    ///
    /// # Errors
    /// As [`Self::to_decimal`].
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Self::Decimal(d) => d.to_f64(),
            other => Ok(other.to_i64()? as f64),
        }
    }

    /// Interprets the value as a calendar instant (milliseconds since the
    /// Unix epoch).
    ///
    /// # Errors
    /// [`RepError::NumericOverflow`] when the instant is out of calendar
    /// range, plus the [`Self::to_u64`] failure modes.
    pub fn to_timestamp(&self) -> Result<DateTime<Utc>> {
        let millis = self.to_u64()?;
        let millis = i64::try_from(millis).map_err(|_| overflow(&millis, "timestamp"))?;
        DateTime::from_timestamp_millis(millis).ok_or_else(|| overflow(&millis, "timestamp"))
    }

    /// Builds an integer instant from a calendar timestamp.
    ///
    /// # Errors
    /// [`RepError::NumericOverflow`] for instants before the Unix epoch.
    pub fn from_timestamp(value: DateTime<Utc>) -> Result<Self> {
        let millis = value.timestamp_millis();
        u64::try_from(millis)
            .map(Self::UInt64)
            .map_err(|_| overflow(&millis, "uInt64 instant"))
    }

    /// Returns the numeric successor, wrapping at the variant's width.
    ///
    /// # Errors
    /// [`DynError::InvalidType`] for non-integer variants.
    pub fn increment(&self) -> Result<Self> {
        match self {
            Self::Int32(v) => Ok(Self::Int32(v.wrapping_add(1))),
            Self::UInt32(v) => Ok(Self::UInt32(v.wrapping_add(1))),
            Self::Int64(v) => Ok(Self::Int64(v.wrapping_add(1))),
            Self::UInt64(v) => Ok(Self::UInt64(v.wrapping_add(1))),
            other => Err(invalid_kind("integer", other)),
        }
    }
}

fn overflow(value: &dyn fmt::Display, target: &'static str) -> crate::error::FastError {
    RepError::NumericOverflow {
        value: value.to_string(),
        target,
    }
    .into()
}

fn invalid_kind(expected: &str, actual: &ScalarValue) -> crate::error::FastError {
    DynError::InvalidType {
        expected: expected.to_string(),
        actual: actual.kind_name().to_string(),
    }
    .into()
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) => true,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (a, b) if a.is_integer() && b.is_integer() => a.integer_value() == b.integer_value(),
            (a, b) => match (a.as_str(), b.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash by value class so the equality above stays consistent.
        match self {
            Self::Undefined => state.write_u8(0),
            Self::Int32(_) | Self::UInt32(_) | Self::Int64(_) | Self::UInt64(_) => {
                state.write_u8(1);
                self.integer_value().hash(state);
            }
            Self::Decimal(d) => {
                state.write_u8(2);
                d.hash(state);
            }
            Self::Ascii(s) | Self::Unicode(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Self::Bytes(b) => {
                state.write_u8(4);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Ascii(s) | Self::Unicode(s) => write!(f, "{s}"),
            Self::Bytes(b) => {
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        Self::UInt32(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<DecimalValue> for ScalarValue {
    fn from(value: DecimalValue) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Ascii(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Ascii(value)
    }
}

impl From<Bytes> for ScalarValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_equality_crosses_widths() {
        assert_eq!(ScalarValue::UInt32(10), ScalarValue::UInt64(10));
        assert_eq!(ScalarValue::Int32(-1), ScalarValue::Int64(-1));
        assert_ne!(ScalarValue::Int64(-1), ScalarValue::UInt64(u64::MAX));
    }

    #[test]
    fn test_string_equality_crosses_kinds() {
        assert_eq!(
            ScalarValue::Ascii("abc".into()),
            ScalarValue::Unicode("abc".into())
        );
        assert_ne!(
            ScalarValue::Ascii("abc".into()),
            ScalarValue::Bytes(Bytes::from_static(b"abc"))
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ScalarValue::UInt64(109).to_u32().unwrap(), 109);
        assert_eq!(ScalarValue::Int64(-5).to_i32().unwrap(), -5);
        assert_eq!(ScalarValue::Ascii("42".into()).to_i64().unwrap(), 42);
        assert!(ScalarValue::UInt64(u64::MAX).to_i64().is_err());
        assert!(ScalarValue::Int32(-1).to_u64().is_err());
    }

    #[test]
    fn test_decimal_conversion_requires_integral() {
        let value = ScalarValue::Decimal(DecimalValue::new(1001, -1));
        assert!(matches!(
            value.to_i64().unwrap_err(),
            crate::error::FastError::Repr(RepError::DecimalCantConvertToInt { .. })
        ));

        let whole = ScalarValue::Decimal(DecimalValue::new(100, 0));
        assert_eq!(whole.to_i64().unwrap(), 100);
    }

    #[test]
    fn test_increment() {
        assert_eq!(
            ScalarValue::UInt32(9).increment().unwrap(),
            ScalarValue::UInt32(10)
        );
        assert_eq!(
            ScalarValue::UInt64(u64::MAX).increment().unwrap(),
            ScalarValue::UInt64(0)
        );
        assert!(ScalarValue::Ascii("x".into()).increment().is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let instant = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let value = ScalarValue::from_timestamp(instant).unwrap();
        assert_eq!(value, ScalarValue::UInt64(1_700_000_000_123));
        assert_eq!(value.to_timestamp().unwrap(), instant);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarValue::UInt32(7).to_string(), "7");
        assert_eq!(ScalarValue::Ascii("on".into()).to_string(), "on");
        assert_eq!(
            ScalarValue::Bytes(Bytes::from_static(&[0xAB, 0x01])).to_string(),
            "ab01"
        );
    }
}
