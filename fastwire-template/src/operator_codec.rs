/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Operator transfer rules.
//!
//! One encode and one decode routine per operator, all written against
//! the same three-way prior state: undefined, empty, or a held value.
//! The encode side decides whether the value travels and what dictionary
//! state the decoder will end up with; the decode side must reach exactly
//! the same state from the wire alone.

use crate::operator::Operator;
use crate::scalar::Scalar;
use bytes::Bytes;
use fastwire_codec::{byte_vector, decimal as decimal_codec, integer, text, type_codec};
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{
    DecimalValue, DynError, FastError, FastType, RepError, Result, ScalarValue, StaticError,
};
use fastwire_dictionary::DictionaryValue;
use std::io::Read;

/// What the field does to its dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DictionaryUpdate {
    /// Leave the entry as it is.
    Keep,
    /// Replace the entry.
    Store(DictionaryValue),
}

pub(crate) fn encode_scalar(
    field: &Scalar,
    buf: &mut Vec<u8>,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
    prior: &DictionaryValue,
) -> Result<DictionaryUpdate> {
    match field.operator() {
        Operator::None => encode_none(field, buf, value),
        Operator::Constant => encode_constant(field, pmap, value),
        Operator::Default => encode_default(field, buf, pmap, value),
        Operator::Copy => encode_copy(field, buf, pmap, value, prior),
        Operator::Increment => encode_increment(field, buf, pmap, value, prior),
        Operator::Delta => encode_delta(field, buf, value, prior),
        Operator::Tail => encode_tail(field, buf, pmap, value, prior),
    }
}

pub(crate) fn decode_scalar<R: Read>(
    field: &Scalar,
    reader: &mut R,
    pmap: &mut PresenceMapReader,
    prior: &DictionaryValue,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    match field.operator() {
        Operator::None => {
            let value = type_codec::decode_value(reader, field.fast_type(), field.is_optional())?;
            Ok((value, DictionaryUpdate::Keep))
        }
        Operator::Constant => decode_constant(field, pmap),
        Operator::Default => decode_default(field, reader, pmap),
        Operator::Copy => decode_copy(field, reader, pmap, prior),
        Operator::Increment => decode_increment(field, reader, pmap, prior),
        Operator::Delta => decode_delta(field, reader, prior),
        Operator::Tail => decode_tail(field, reader, pmap, prior),
    }
}

fn resolved(value: Option<&ScalarValue>) -> DictionaryValue {
    match value {
        Some(v) => DictionaryValue::Value(v.clone()),
        None => DictionaryValue::Empty,
    }
}

fn no_prior(field: &Scalar) -> FastError {
    DynError::NoPriorValue {
        field: field.name().to_string(),
    }
    .into()
}

fn empty_prior(field: &Scalar) -> FastError {
    DynError::EmptyPriorValue {
        field: field.name().to_string(),
    }
    .into()
}

fn invalid_prior(field: &Scalar, value: &ScalarValue) -> FastError {
    DynError::InvalidPriorValue {
        field: field.name().to_string(),
        value: value.to_string(),
    }
    .into()
}

fn no_initial(field: &Scalar) -> FastError {
    StaticError::NoInitialValue {
        field: field.name().to_string(),
    }
    .into()
}

fn encode_none(
    field: &Scalar,
    buf: &mut Vec<u8>,
    value: Option<&ScalarValue>,
) -> Result<DictionaryUpdate> {
    type_codec::encode_value(buf, field.fast_type(), field.is_optional(), value)?;
    Ok(DictionaryUpdate::Keep)
}

fn encode_constant(
    field: &Scalar,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
) -> Result<DictionaryUpdate> {
    if let Some(v) = value {
        let Some(constant) = field.initial_value() else {
            return Err(no_initial(field));
        };
        if v != constant {
            return Err(DynError::CantEncodeValue {
                field: field.name().to_string(),
                value: v.to_string(),
                reason: "differs from the declared constant".to_string(),
            }
            .into());
        }
    }
    if field.is_optional() {
        pmap.push(value.is_some());
    }
    Ok(DictionaryUpdate::Keep)
}

fn decode_constant(
    field: &Scalar,
    pmap: &mut PresenceMapReader,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    let present = if field.is_optional() {
        pmap.next_bit()
    } else {
        true
    };
    if !present {
        return Ok((None, DictionaryUpdate::Keep));
    }
    match field.initial_value() {
        Some(constant) => Ok((Some(constant.clone()), DictionaryUpdate::Keep)),
        None => Err(no_initial(field)),
    }
}

fn encode_default(
    field: &Scalar,
    buf: &mut Vec<u8>,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
) -> Result<DictionaryUpdate> {
    let matches_default = match (value, field.initial_value()) {
        (Some(v), Some(d)) => v == d,
        (None, None) => true,
        _ => false,
    };
    if matches_default {
        pmap.push(false);
    } else {
        pmap.push(true);
        type_codec::encode_value(buf, field.fast_type(), field.is_optional(), value)?;
    }
    Ok(DictionaryUpdate::Keep)
}

fn decode_default<R: Read>(
    field: &Scalar,
    reader: &mut R,
    pmap: &mut PresenceMapReader,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    if pmap.next_bit() {
        let value = type_codec::decode_value(reader, field.fast_type(), field.is_optional())?;
        return Ok((value, DictionaryUpdate::Keep));
    }
    match field.initial_value() {
        Some(d) => Ok((Some(d.clone()), DictionaryUpdate::Keep)),
        None if field.is_optional() => Ok((None, DictionaryUpdate::Keep)),
        None => Err(StaticError::MissingDefaultValue {
            field: field.name().to_string(),
        }
        .into()),
    }
}

fn encode_copy(
    field: &Scalar,
    buf: &mut Vec<u8>,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
    prior: &DictionaryValue,
) -> Result<DictionaryUpdate> {
    let skip = match prior {
        DictionaryValue::Value(p) => value == Some(p),
        DictionaryValue::Empty => value.is_none(),
        DictionaryValue::Undefined => match (value, field.initial_value()) {
            (Some(v), Some(init)) => v == init,
            (None, None) => field.is_optional(),
            _ => false,
        },
    };
    if skip {
        pmap.push(false);
    } else {
        pmap.push(true);
        type_codec::encode_value(buf, field.fast_type(), field.is_optional(), value)?;
    }
    Ok(DictionaryUpdate::Store(resolved(value)))
}

fn decode_copy<R: Read>(
    field: &Scalar,
    reader: &mut R,
    pmap: &mut PresenceMapReader,
    prior: &DictionaryValue,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    if pmap.next_bit() {
        let value = type_codec::decode_value(reader, field.fast_type(), field.is_optional())?;
        let update = DictionaryUpdate::Store(resolved(value.as_ref()));
        return Ok((value, update));
    }
    match prior {
        DictionaryValue::Value(p) => Ok((Some(p.clone()), DictionaryUpdate::Keep)),
        DictionaryValue::Empty => {
            if field.is_optional() {
                Ok((None, DictionaryUpdate::Keep))
            } else {
                Err(empty_prior(field))
            }
        }
        DictionaryValue::Undefined => match field.initial_value() {
            Some(init) => Ok((
                Some(init.clone()),
                DictionaryUpdate::Store(DictionaryValue::Value(init.clone())),
            )),
            None if field.is_optional() => {
                Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty)))
            }
            None => Err(no_prior(field)),
        },
    }
}

fn encode_increment(
    field: &Scalar,
    buf: &mut Vec<u8>,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
    prior: &DictionaryValue,
) -> Result<DictionaryUpdate> {
    let skip = match prior {
        DictionaryValue::Value(p) => match value {
            Some(v) => p.increment().is_ok_and(|next| next == *v),
            None => false,
        },
        DictionaryValue::Empty => value.is_none(),
        DictionaryValue::Undefined => match (value, field.initial_value()) {
            (Some(v), Some(init)) => v == init,
            (None, None) => field.is_optional(),
            _ => false,
        },
    };
    if skip {
        pmap.push(false);
    } else {
        pmap.push(true);
        type_codec::encode_value(buf, field.fast_type(), field.is_optional(), value)?;
    }
    Ok(DictionaryUpdate::Store(resolved(value)))
}

fn decode_increment<R: Read>(
    field: &Scalar,
    reader: &mut R,
    pmap: &mut PresenceMapReader,
    prior: &DictionaryValue,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    if pmap.next_bit() {
        let value = type_codec::decode_value(reader, field.fast_type(), field.is_optional())?;
        let update = DictionaryUpdate::Store(resolved(value.as_ref()));
        return Ok((value, update));
    }
    match prior {
        DictionaryValue::Value(p) => {
            let next = p.increment().map_err(|_| invalid_prior(field, p))?;
            Ok((
                Some(next.clone()),
                DictionaryUpdate::Store(DictionaryValue::Value(next)),
            ))
        }
        DictionaryValue::Empty => {
            if field.is_optional() {
                Ok((None, DictionaryUpdate::Keep))
            } else {
                Err(empty_prior(field))
            }
        }
        DictionaryValue::Undefined => match field.initial_value() {
            Some(init) => Ok((
                Some(init.clone()),
                DictionaryUpdate::Store(DictionaryValue::Value(init.clone())),
            )),
            None if field.is_optional() => {
                Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty)))
            }
            None => Err(no_prior(field)),
        },
    }
}

/// The value a delta or tail is measured against.
fn base_value(field: &Scalar, prior: &DictionaryValue) -> Result<ScalarValue> {
    match prior {
        DictionaryValue::Value(p) => Ok(p.clone()),
        DictionaryValue::Empty => Err(empty_prior(field)),
        DictionaryValue::Undefined => Ok(field
            .initial_value()
            .cloned()
            .unwrap_or_else(|| field.fast_type().base_value())),
    }
}

fn encode_delta(
    field: &Scalar,
    buf: &mut Vec<u8>,
    value: Option<&ScalarValue>,
    prior: &DictionaryValue,
) -> Result<DictionaryUpdate> {
    let Some(v) = value else {
        // Null travels in the leading nullable component.
        buf.push(0x80);
        return Ok(DictionaryUpdate::Store(DictionaryValue::Empty));
    };
    let base = base_value(field, prior)?;
    let optional = field.is_optional();

    match field.fast_type() {
        FastType::U32 | FastType::U64 | FastType::Date => {
            let b = base.to_u64().map_err(|_| invalid_prior(field, &base))?;
            let diff = v.to_u64()?.wrapping_sub(b) as i64;
            if optional {
                integer::encode_i64_nullable(buf, Some(diff))?;
            } else {
                integer::encode_i64(buf, diff);
            }
        }
        FastType::I32 | FastType::I64 => {
            let b = base.to_i64().map_err(|_| invalid_prior(field, &base))?;
            let diff = v.to_i64()?.wrapping_sub(b);
            if optional {
                integer::encode_i64_nullable(buf, Some(diff))?;
            } else {
                integer::encode_i64(buf, diff);
            }
        }
        FastType::Decimal => {
            let b = base
                .to_decimal_value()
                .map_err(|_| invalid_prior(field, &base))?;
            let val = v.to_decimal_value()?;
            let exp_diff = i64::from(val.exponent) - i64::from(b.exponent);
            let mant_diff = val.mantissa.wrapping_sub(b.mantissa);
            if optional {
                integer::encode_i64_nullable(buf, Some(exp_diff))?;
            } else {
                integer::encode_i64(buf, exp_diff);
            }
            integer::encode_i64(buf, mant_diff);
        }
        FastType::Ascii | FastType::Unicode | FastType::ByteVector => {
            let base_bytes = base.as_bytes().ok_or_else(|| invalid_prior(field, &base))?;
            let value_bytes = v.as_bytes().ok_or_else(|| {
                FastError::from(DynError::InvalidType {
                    expected: field.fast_type().to_string(),
                    actual: v.kind_name().to_string(),
                })
            })?;
            let (subtraction, diff) = content_delta(base_bytes, value_bytes);
            if optional {
                integer::encode_i64_nullable(buf, Some(subtraction))?;
            } else {
                integer::encode_i64(buf, subtraction);
            }
            match field.fast_type() {
                FastType::Ascii => {
                    let diff = std::str::from_utf8(diff).map_err(|_| DynError::InvalidString)?;
                    text::encode_ascii(buf, diff)?;
                }
                _ => byte_vector::encode_bytes(buf, diff),
            }
        }
    }
    Ok(DictionaryUpdate::Store(DictionaryValue::Value(v.clone())))
}

fn decode_delta<R: Read>(
    field: &Scalar,
    reader: &mut R,
    prior: &DictionaryValue,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    let optional = field.is_optional();

    let value = match field.fast_type() {
        FastType::U32 | FastType::U64 | FastType::Date => {
            let diff = if optional {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty))),
                    Some(d) => d,
                }
            } else {
                integer::decode_i64(reader)?
            };
            let base = base_value(field, prior)?;
            let b = base.to_u64().map_err(|_| invalid_prior(field, &base))?;
            let result = b.wrapping_add(diff as u64);
            match field.fast_type() {
                FastType::U32 => narrow_u32(result)?,
                _ => ScalarValue::UInt64(result),
            }
        }
        FastType::I32 | FastType::I64 => {
            let diff = if optional {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty))),
                    Some(d) => d,
                }
            } else {
                integer::decode_i64(reader)?
            };
            let base = base_value(field, prior)?;
            let b = base.to_i64().map_err(|_| invalid_prior(field, &base))?;
            let result = b.wrapping_add(diff);
            match field.fast_type() {
                FastType::I32 => narrow_i32(result)?,
                _ => ScalarValue::Int64(result),
            }
        }
        FastType::Decimal => {
            let exp_diff = if optional {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty))),
                    Some(d) => d,
                }
            } else {
                integer::decode_i64(reader)?
            };
            let mant_diff = integer::decode_i64(reader)?;
            let base = base_value(field, prior)?;
            let b = base
                .to_decimal_value()
                .map_err(|_| invalid_prior(field, &base))?;
            let exponent = i64::from(b.exponent) + exp_diff;
            let exponent =
                i32::try_from(exponent).map_err(|_| RepError::ExponentOutOfRange {
                    exponent: exponent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
                })?;
            if !DecimalValue::exponent_in_range(exponent) {
                return Err(RepError::ExponentOutOfRange { exponent }.into());
            }
            ScalarValue::Decimal(DecimalValue::new(b.mantissa.wrapping_add(mant_diff), exponent))
        }
        FastType::Ascii | FastType::Unicode | FastType::ByteVector => {
            let subtraction = if optional {
                match integer::decode_i64_nullable(reader)? {
                    None => return Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty))),
                    Some(s) => s,
                }
            } else {
                integer::decode_i64(reader)?
            };
            let diff: Vec<u8> = match field.fast_type() {
                FastType::Ascii => text::decode_ascii(reader)?.into_bytes(),
                _ => byte_vector::decode_bytes(reader)?.to_vec(),
            };
            let base = base_value(field, prior)?;
            let base_bytes = base.as_bytes().ok_or_else(|| invalid_prior(field, &base))?;
            let content = apply_content_delta(base_bytes, subtraction, &diff)?;
            content_value(field.fast_type(), content)?
        }
    };
    let update = DictionaryUpdate::Store(DictionaryValue::Value(value.clone()));
    Ok((Some(value), update))
}

fn encode_tail(
    field: &Scalar,
    buf: &mut Vec<u8>,
    pmap: &mut PresenceMapBuilder,
    value: Option<&ScalarValue>,
    prior: &DictionaryValue,
) -> Result<DictionaryUpdate> {
    let skip = match prior {
        DictionaryValue::Value(p) => value == Some(p),
        DictionaryValue::Empty => value.is_none(),
        DictionaryValue::Undefined => match (value, field.initial_value()) {
            (Some(v), Some(init)) => v == init,
            (None, None) => field.is_optional(),
            _ => false,
        },
    };
    if skip {
        pmap.push(false);
        return Ok(DictionaryUpdate::Store(resolved(value)));
    }

    pmap.push(true);
    let Some(v) = value else {
        buf.push(0x80);
        return Ok(DictionaryUpdate::Store(DictionaryValue::Empty));
    };

    let base: Vec<u8> = match prior {
        DictionaryValue::Value(p) => p
            .as_bytes()
            .ok_or_else(|| invalid_prior(field, p))?
            .to_vec(),
        _ => field
            .initial_value()
            .and_then(ScalarValue::as_bytes)
            .unwrap_or_default()
            .to_vec(),
    };
    let value_bytes = v.as_bytes().ok_or_else(|| {
        FastError::from(DynError::InvalidType {
            expected: field.fast_type().to_string(),
            actual: v.kind_name().to_string(),
        })
    })?;

    let tail: &[u8] = if value_bytes.len() == base.len() {
        let split = value_bytes
            .iter()
            .zip(&base)
            .position(|(a, b)| a != b)
            .unwrap_or(value_bytes.len());
        &value_bytes[split..]
    } else if value_bytes.len() > base.len() {
        value_bytes
    } else {
        return Err(DynError::CantEncodeValue {
            field: field.name().to_string(),
            value: v.to_string(),
            reason: "shorter than the tail base".to_string(),
        }
        .into());
    };

    match field.fast_type() {
        FastType::Ascii => {
            let tail = std::str::from_utf8(tail).map_err(|_| DynError::InvalidString)?;
            if field.is_optional() {
                text::encode_ascii_nullable(buf, Some(tail))?;
            } else {
                text::encode_ascii(buf, tail)?;
            }
        }
        _ => {
            if field.is_optional() {
                byte_vector::encode_bytes_nullable(buf, Some(tail))?;
            } else {
                byte_vector::encode_bytes(buf, tail);
            }
        }
    }
    Ok(DictionaryUpdate::Store(DictionaryValue::Value(v.clone())))
}

fn decode_tail<R: Read>(
    field: &Scalar,
    reader: &mut R,
    pmap: &mut PresenceMapReader,
    prior: &DictionaryValue,
) -> Result<(Option<ScalarValue>, DictionaryUpdate)> {
    if !pmap.next_bit() {
        return match prior {
            DictionaryValue::Value(p) => Ok((Some(p.clone()), DictionaryUpdate::Keep)),
            DictionaryValue::Empty => {
                if field.is_optional() {
                    Ok((None, DictionaryUpdate::Keep))
                } else {
                    Err(empty_prior(field))
                }
            }
            DictionaryValue::Undefined => match field.initial_value() {
                Some(init) => Ok((
                    Some(init.clone()),
                    DictionaryUpdate::Store(DictionaryValue::Value(init.clone())),
                )),
                None if field.is_optional() => {
                    Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty)))
                }
                None => Err(no_prior(field)),
            },
        };
    }

    let tail: Option<Vec<u8>> = match field.fast_type() {
        FastType::Ascii => {
            if field.is_optional() {
                text::decode_ascii_nullable(reader)?.map(String::into_bytes)
            } else {
                Some(text::decode_ascii(reader)?.into_bytes())
            }
        }
        _ => {
            if field.is_optional() {
                byte_vector::decode_bytes_nullable(reader)?.map(|b| b.to_vec())
            } else {
                Some(byte_vector::decode_bytes(reader)?.to_vec())
            }
        }
    };
    let Some(tail) = tail else {
        return Ok((None, DictionaryUpdate::Store(DictionaryValue::Empty)));
    };

    let base: Vec<u8> = match prior {
        DictionaryValue::Value(p) => p
            .as_bytes()
            .ok_or_else(|| invalid_prior(field, p))?
            .to_vec(),
        _ => field
            .initial_value()
            .and_then(ScalarValue::as_bytes)
            .unwrap_or_default()
            .to_vec(),
    };
    let keep = base.len().saturating_sub(tail.len());
    let mut content = base[..keep].to_vec();
    content.extend_from_slice(&tail);

    let value = content_value(field.fast_type(), content)?;
    let update = DictionaryUpdate::Store(DictionaryValue::Value(value.clone()));
    Ok((Some(value), update))
}

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

/// Splits a new value against its base into a subtraction length and the
/// replacement bytes. A non-negative subtraction removes from the end, a
/// negative one removes `-s - 1` bytes from the front.
fn content_delta<'a>(base: &[u8], value: &'a [u8]) -> (i64, &'a [u8]) {
    let limit = base.len().min(value.len());
    let prefix = base
        .iter()
        .zip(value)
        .take(limit)
        .position(|(a, b)| a != b)
        .unwrap_or(limit);
    let suffix = base
        .iter()
        .rev()
        .zip(value.iter().rev())
        .take(limit - prefix)
        .position(|(a, b)| a != b)
        .unwrap_or(limit - prefix);

    if prefix >= suffix {
        (base.len() as i64 - prefix as i64, &value[prefix..])
    } else {
        (
            -(base.len() as i64 - suffix as i64) - 1,
            &value[..value.len() - suffix],
        )
    }
}

fn apply_content_delta(base: &[u8], subtraction: i64, diff: &[u8]) -> Result<Vec<u8>> {
    let out_of_range = |subtraction| {
        FastError::from(DynError::SubtractionOutOfRange {
            subtraction,
            length: base.len(),
        })
    };
    if subtraction >= 0 {
        let removed = usize::try_from(subtraction).map_err(|_| out_of_range(subtraction))?;
        let keep = base
            .len()
            .checked_sub(removed)
            .ok_or_else(|| out_of_range(subtraction))?;
        let mut content = base[..keep].to_vec();
        content.extend_from_slice(diff);
        Ok(content)
    } else {
        let removed = usize::try_from(-(subtraction + 1)).map_err(|_| out_of_range(subtraction))?;
        if removed > base.len() {
            return Err(out_of_range(subtraction));
        }
        let mut content = diff.to_vec();
        content.extend_from_slice(&base[removed..]);
        Ok(content)
    }
}

fn content_value(fast_type: FastType, content: Vec<u8>) -> Result<ScalarValue> {
    match fast_type {
        FastType::Ascii => String::from_utf8(content)
            .map(ScalarValue::Ascii)
            .map_err(|_| DynError::InvalidString.into()),
        FastType::Unicode => String::from_utf8(content)
            .map(ScalarValue::Unicode)
            .map_err(|_| DynError::InvalidUtf8.into()),
        FastType::ByteVector => Ok(ScalarValue::Bytes(Bytes::from(content))),
        other => Err(DynError::InvalidType {
            expected: "string or byteVector".to_string(),
            actual: other.to_string(),
        }
        .into()),
    }
}
