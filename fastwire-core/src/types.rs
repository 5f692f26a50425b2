/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! FAST field types.
//!
//! Each field in a template has one of these types; the type selects the
//! wire codec, supplies the implicit base value operators fall back on, and
//! accepts or rejects value kinds during validation.

use crate::decimal::DecimalValue;
use crate::value::ScalarValue;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of FAST field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FastType {
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// Exact decimal (mantissa and exponent).
    Decimal,
    /// 7-bit ascii string.
    Ascii,
    /// UTF-8 string carried as a byte vector.
    Unicode,
    /// Raw byte vector.
    ByteVector,
    /// Calendar instant carried as milliseconds since the Unix epoch.
    Date,
}

impl FastType {
    /// Returns true for the integer-backed types, including [`Self::Date`].
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::U32 | Self::I32 | Self::U64 | Self::I64 | Self::Date)
    }

    /// Returns true for the unsigned integer-backed types.
    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::U32 | Self::U64 | Self::Date)
    }

    /// Returns true for the string types.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::Ascii | Self::Unicode)
    }

    /// The implicit initial value used when a field declares no default.
    #[must_use]
    pub fn base_value(&self) -> ScalarValue {
        match self {
            Self::U32 => ScalarValue::UInt32(0),
            Self::I32 => ScalarValue::Int32(0),
            Self::U64 | Self::Date => ScalarValue::UInt64(0),
            Self::I64 => ScalarValue::Int64(0),
            Self::Decimal => ScalarValue::Decimal(DecimalValue::default()),
            Self::Ascii => ScalarValue::Ascii(String::new()),
            Self::Unicode => ScalarValue::Unicode(String::new()),
            Self::ByteVector => ScalarValue::Bytes(Bytes::new()),
        }
    }

    /// Whether a value kind is acceptable for this type.
    ///
    /// Integer widths are deliberately interchangeable here; magnitude is
    /// enforced when values are narrowed, not at the kind check.
    #[must_use]
    pub fn is_value_of(&self, value: &ScalarValue) -> bool {
        match self {
            Self::U32 | Self::I32 | Self::U64 | Self::I64 | Self::Date => value.is_integer(),
            Self::Decimal => matches!(value, ScalarValue::Decimal(_)),
            Self::Ascii | Self::Unicode => {
                matches!(value, ScalarValue::Ascii(_) | ScalarValue::Unicode(_))
            }
            Self::ByteVector => matches!(value, ScalarValue::Bytes(_)),
        }
    }
}

impl fmt::Display for FastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U32 => "uInt32",
            Self::I32 => "int32",
            Self::U64 => "uInt64",
            Self::I64 => "int64",
            Self::Decimal => "decimal",
            Self::Ascii => "string",
            Self::Unicode => "unicode",
            Self::ByteVector => "byteVector",
            Self::Date => "date",
        };
        write!(f, "{name}")
    }
}
