/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Typed value transfer.
//!
//! Dispatches a whole [`ScalarValue`] through the wire codec matching a
//! [`FastType`], honoring the field's nullable form. Integers travel at
//! full width and narrow on decode, so an out-of-range `uInt32` is a
//! reportable condition rather than a parse failure. Dates are integer
//! instants in milliseconds.

use crate::{byte_vector, decimal, integer, text};
use fastwire_core::{DynError, FastType, RepError, Result, ScalarValue};
use std::io::Read;

fn narrow_u32(value: u64) -> Result<ScalarValue> {
    u32::try_from(value)
        .map(ScalarValue::UInt32)
        .map_err(|_| {
            RepError::NumericOverflow {
                value: value.to_string(),
                target: "uInt32",
            }
            .into()
        })
}

fn narrow_i32(value: i64) -> Result<ScalarValue> {
    i32::try_from(value)
        .map(ScalarValue::Int32)
        .map_err(|_| {
            RepError::NumericOverflow {
                value: value.to_string(),
                target: "int32",
            }
            .into()
        })
}

fn wrong_kind(fast_type: FastType, value: &ScalarValue) -> fastwire_core::FastError {
    DynError::InvalidType {
        expected: fast_type.to_string(),
        actual: value.kind_name().to_string(),
    }
    .into()
}

/// Appends a whole value in the type's wire form.
///
/// `None` stands for null and is only legal in the nullable form.
///
/// # Errors
/// [`DynError::InvalidType`] for a value kind foreign to the type or a
/// null on a non-nullable form, plus the per-type codec failures.
pub fn encode_value(
    buf: &mut Vec<u8>,
    fast_type: FastType,
    nullable: bool,
    value: Option<&ScalarValue>,
) -> Result<()> {
    let Some(value) = value else {
        if !nullable {
            return Err(DynError::InvalidType {
                expected: fast_type.to_string(),
                actual: "null".to_string(),
            }
            .into());
        }
        buf.push(0x80);
        return Ok(());
    };

    match fast_type {
        FastType::U32 | FastType::U64 | FastType::Date => {
            let v = value.to_u64()?;
            if nullable {
                integer::encode_u64_nullable(buf, Some(v))?;
            } else {
                integer::encode_u64(buf, v);
            }
        }
        FastType::I32 | FastType::I64 => {
            let v = value.to_i64()?;
            if nullable {
                integer::encode_i64_nullable(buf, Some(v))?;
            } else {
                integer::encode_i64(buf, v);
            }
        }
        FastType::Decimal => {
            let v = value.to_decimal_value()?;
            if nullable {
                decimal::encode_decimal_nullable(buf, Some(v))?;
            } else {
                decimal::encode_decimal(buf, v)?;
            }
        }
        FastType::Ascii => {
            let s = value.as_str().ok_or_else(|| wrong_kind(fast_type, value))?;
            if nullable {
                text::encode_ascii_nullable(buf, Some(s))?;
            } else {
                text::encode_ascii(buf, s)?;
            }
        }
        FastType::Unicode => {
            let s = value.as_str().ok_or_else(|| wrong_kind(fast_type, value))?;
            if nullable {
                text::encode_unicode_nullable(buf, Some(s))?;
            } else {
                text::encode_unicode(buf, s);
            }
        }
        FastType::ByteVector => {
            let b = value
                .as_bytes()
                .ok_or_else(|| wrong_kind(fast_type, value))?;
            if nullable {
                byte_vector::encode_bytes_nullable(buf, Some(b))?;
            } else {
                byte_vector::encode_bytes(buf, b);
            }
        }
    }
    Ok(())
}

/// Reads a whole value in the type's wire form.
///
/// Returns `None` for a null, which only the nullable form produces.
///
/// # Errors
/// [`RepError::NumericOverflow`] when a 32-bit type receives a wider
/// value, plus the per-type codec failures.
pub fn decode_value<R: Read>(
    reader: &mut R,
    fast_type: FastType,
    nullable: bool,
) -> Result<Option<ScalarValue>> {
    let value = match fast_type {
        FastType::U32 => {
            if nullable {
                match integer::decode_u64_nullable(reader)? {
                    None => return Ok(None),
                    Some(v) => narrow_u32(v)?,
                }
            } else {
                narrow_u32(integer::decode_u64(reader)?)?
            }
        }
        FastType::U64 | FastType::Date => {
            if nullable {
                match integer::decode_u64_nullable(reader)? {
                    None => return Ok(None),
                    Some(v) => ScalarValue::UInt64(v),
                }
            } else {
                ScalarValue::UInt64(integer::decode_u64(reader)?)
            }
        }
        FastType::I32 => {
            if nullable {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok(None),
                    Some(v) => narrow_i32(v)?,
                }
            } else {
                narrow_i32(integer::decode_i64(reader)?)?
            }
        }
        FastType::I64 => {
            if nullable {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok(None),
                    Some(v) => ScalarValue::Int64(v),
                }
            } else {
                ScalarValue::Int64(integer::decode_i64(reader)?)
            }
        }
        FastType::Decimal => {
            if nullable {
                match decimal::decode_decimal_nullable(reader)? {
                    None => return Ok(None),
                    Some(v) => ScalarValue::Decimal(v),
                }
            } else {
                ScalarValue::Decimal(decimal::decode_decimal(reader)?)
            }
        }
        FastType::Ascii => {
            if nullable {
                match text::decode_ascii_nullable(reader)? {
                    None => return Ok(None),
                    Some(s) => ScalarValue::Ascii(s),
                }
            } else {
                ScalarValue::Ascii(text::decode_ascii(reader)?)
            }
        }
        FastType::Unicode => {
            if nullable {
                match text::decode_unicode_nullable(reader)? {
                    None => return Ok(None),
                    Some(s) => ScalarValue::Unicode(s),
                }
            } else {
                ScalarValue::Unicode(text::decode_unicode(reader)?)
            }
        }
        FastType::ByteVector => {
            if nullable {
                match byte_vector::decode_bytes_nullable(reader)? {
                    None => return Ok(None),
                    Some(b) => ScalarValue::Bytes(b),
                }
            } else {
                ScalarValue::Bytes(byte_vector::decode_bytes(reader)?)
            }
        }
    };
    Ok(Some(value))
}
