/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Stop-bit integer codec.
//!
//! Integers travel as big-endian 7-bit groups, one group per byte, with
//! the high bit of the final byte set as the stop bit. Signed values carry
//! their sign in bit 6 of the first byte and decode against a sign-extended
//! accumulator. Nullable forms shift non-negative values up by one so that
//! zero can stand for null.

use crate::stream;
use fastwire_core::{DynError, RepError, Result};
use smallvec::SmallVec;
use std::io::Read;

/// Longest legal stop-bit integer: ten groups cover 64 value bits.
pub const MAX_STOP_BIT_BYTES: usize = 10;

/// Appends an unsigned integer in stop-bit form.
pub fn encode_u64(buf: &mut Vec<u8>, value: u64) {
    if value == 0 {
        buf.push(0x80);
        return;
    }

    let mut bytes = SmallVec::<[u8; MAX_STOP_BIT_BYTES]>::new();
    let mut v = value;
    while v > 0 {
        bytes.push((v & 0x7F) as u8);
        v >>= 7;
    }
    bytes.reverse();

    if let Some(last) = bytes.last_mut() {
        *last |= 0x80;
    }
    buf.extend_from_slice(&bytes);
}

/// Appends a signed integer in stop-bit form.
///
/// The encoding is minimal: the first byte's bit 6 must match the sign,
/// so one extra group is emitted when the magnitude fills a group exactly.
pub fn encode_i64(buf: &mut Vec<u8>, value: i64) {
    let mut bytes = SmallVec::<[u8; MAX_STOP_BIT_BYTES]>::new();
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        bytes.push(byte);
        v >>= 7;
        let done = if value < 0 {
            v == -1 && byte & 0x40 != 0
        } else {
            v == 0 && byte & 0x40 == 0
        };
        if done {
            break;
        }
    }
    bytes.reverse();

    if let Some(last) = bytes.last_mut() {
        *last |= 0x80;
    }
    buf.extend_from_slice(&bytes);
}

/// Appends a nullable unsigned integer: null is zero, values shift up by one.
///
/// # Errors
/// [`RepError::NumericOverflow`] for `u64::MAX`, which the nullable form
/// cannot represent.
pub fn encode_u64_nullable(buf: &mut Vec<u8>, value: Option<u64>) -> Result<()> {
    match value {
        None => buf.push(0x80),
        Some(v) => {
            let shifted = v.checked_add(1).ok_or(RepError::NumericOverflow {
                value: v.to_string(),
                target: "nullable uInt64",
            })?;
            encode_u64(buf, shifted);
        }
    }
    Ok(())
}

/// Appends a nullable signed integer: null is zero, non-negative values
/// shift up by one, negative values are unchanged.
///
/// # Errors
/// [`RepError::NumericOverflow`] for `i64::MAX`.
pub fn encode_i64_nullable(buf: &mut Vec<u8>, value: Option<i64>) -> Result<()> {
    match value {
        None => buf.push(0x80),
        Some(v) if v >= 0 => {
            let shifted = v.checked_add(1).ok_or(RepError::NumericOverflow {
                value: v.to_string(),
                target: "nullable int64",
            })?;
            encode_i64(buf, shifted);
        }
        Some(v) => encode_i64(buf, v),
    }
    Ok(())
}

/// Reads an unsigned stop-bit integer.
///
/// # Errors
/// [`DynError::IntegerOverflow`] past 64 bits, [`DynError::OverlongEncoding`]
/// past ten bytes, [`DynError::UnexpectedEof`] on a truncated stream.
pub fn decode_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    for _ in 0..MAX_STOP_BIT_BYTES {
        let byte = stream::read_byte(reader)?;
        if result > (u64::MAX >> 7) {
            return Err(DynError::IntegerOverflow.into());
        }
        result = (result << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 != 0 {
            return Ok(result);
        }
    }
    Err(DynError::OverlongEncoding.into())
}

/// Reads a signed stop-bit integer.
///
/// # Errors
/// As [`decode_u64`].
pub fn decode_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let first = stream::read_byte(reader)?;
    let seed: i64 = if first & 0x40 != 0 { -1 } else { 0 };
    let mut result = (seed << 7) | i64::from(first & 0x7F);
    if first & 0x80 != 0 {
        return Ok(result);
    }

    for _ in 1..MAX_STOP_BIT_BYTES {
        let byte = stream::read_byte(reader)?;
        if result > (i64::MAX >> 7) || result < (i64::MIN >> 7) {
            return Err(DynError::IntegerOverflow.into());
        }
        result = (result << 7) | i64::from(byte & 0x7F);
        if byte & 0x80 != 0 {
            return Ok(result);
        }
    }
    Err(DynError::OverlongEncoding.into())
}

/// Reads a nullable unsigned integer.
///
/// # Errors
/// As [`decode_u64`].
pub fn decode_u64_nullable<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let raw = decode_u64(reader)?;
    if raw == 0 {
        Ok(None)
    } else {
        Ok(Some(raw - 1))
    }
}

/// Reads a nullable signed integer.
///
/// # Errors
/// As [`decode_i64`].
pub fn decode_i64_nullable<R: Read>(reader: &mut R) -> Result<Option<i64>> {
    let raw = decode_i64(reader)?;
    match raw {
        0 => Ok(None),
        v if v > 0 => Ok(Some(v - 1)),
        v => Ok(Some(v)),
    }
}
