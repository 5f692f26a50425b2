/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! String wire codecs.
//!
//! Ascii strings travel as 7-bit characters with the stop bit on the last
//! one. The empty string and strings made of NUL characters need an escape
//! because their natural encodings would collide with each other and with
//! null: a run of k NULs travels with a zero-byte prefix, one level deeper
//! in the nullable form. A leading NUL ahead of other content has no wire
//! form and is rejected at encode. Unicode strings are UTF-8 bytes framed
//! as a byte vector.

use crate::{byte_vector, stream};
use fastwire_core::{DynError, Result};
use std::io::Read;

/// Appends a mandatory ascii string.
///
/// # Errors
/// [`DynError::InvalidString`] when the value is not 7-bit ascii.
pub fn encode_ascii(buf: &mut Vec<u8>, value: &str) -> Result<()> {
    if !value.is_ascii() {
        return Err(DynError::InvalidString.into());
    }
    let bytes = value.as_bytes();

    if bytes.is_empty() {
        buf.push(0x80);
        return Ok(());
    }
    if bytes.iter().all(|&b| b == 0) {
        buf.extend(std::iter::repeat_n(0x00, bytes.len()));
        buf.push(0x80);
        return Ok(());
    }
    // A zero prefix is reserved for the NUL-run escapes.
    if bytes[0] == 0 {
        return Err(DynError::InvalidString.into());
    }

    for (i, &b) in bytes.iter().enumerate() {
        if i == bytes.len() - 1 {
            buf.push(b | 0x80);
        } else {
            buf.push(b);
        }
    }
    Ok(())
}

/// Appends a nullable ascii string.
///
/// # Errors
/// As [`encode_ascii`].
pub fn encode_ascii_nullable(buf: &mut Vec<u8>, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        buf.push(0x80);
        return Ok(());
    };
    if !value.is_ascii() {
        return Err(DynError::InvalidString.into());
    }
    let bytes = value.as_bytes();

    if bytes.iter().all(|&b| b == 0) {
        // Empty and NUL-runs shift one zero byte deeper than the
        // mandatory form so that null keeps the single 0x80.
        buf.extend(std::iter::repeat_n(0x00, bytes.len() + 1));
        buf.push(0x80);
        return Ok(());
    }
    if bytes[0] == 0 {
        return Err(DynError::InvalidString.into());
    }

    for (i, &b) in bytes.iter().enumerate() {
        if i == bytes.len() - 1 {
            buf.push(b | 0x80);
        } else {
            buf.push(b);
        }
    }
    Ok(())
}

fn read_payload<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    loop {
        let byte = stream::read_byte(reader)?;
        raw.push(byte & 0x7F);
        if byte & 0x80 != 0 {
            return Ok(raw);
        }
    }
}

fn check_zero_run(raw: &[u8]) -> Result<()> {
    if raw.iter().any(|&b| b != 0) {
        return Err(DynError::OverlongEncoding.into());
    }
    Ok(())
}

/// Reads a mandatory ascii string.
///
/// # Errors
/// [`DynError::UnexpectedEof`] on truncation, [`DynError::OverlongEncoding`]
/// on a zero-byte prefix before non-zero content, [`DynError::InvalidString`]
/// on malformed content.
pub fn decode_ascii<R: Read>(reader: &mut R) -> Result<String> {
    let raw = read_payload(reader)?;
    if raw[0] == 0 {
        check_zero_run(&raw)?;
        return Ok("\0".repeat(raw.len() - 1));
    }
    String::from_utf8(raw).map_err(|_| DynError::InvalidString.into())
}

/// Reads a nullable ascii string.
///
/// # Errors
/// As [`decode_ascii`].
pub fn decode_ascii_nullable<R: Read>(reader: &mut R) -> Result<Option<String>> {
    let raw = read_payload(reader)?;
    if raw[0] == 0 {
        check_zero_run(&raw)?;
        if raw.len() == 1 {
            return Ok(None);
        }
        return Ok(Some("\0".repeat(raw.len() - 2)));
    }
    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| DynError::InvalidString.into())
}

/// Appends a mandatory unicode string as UTF-8 in byte-vector framing.
pub fn encode_unicode(buf: &mut Vec<u8>, value: &str) {
    byte_vector::encode_bytes(buf, value.as_bytes());
}

/// Appends a nullable unicode string.
///
/// # Errors
/// The byte-vector length failures.
pub fn encode_unicode_nullable(buf: &mut Vec<u8>, value: Option<&str>) -> Result<()> {
    byte_vector::encode_bytes_nullable(buf, value.map(str::as_bytes))
}

/// Reads a mandatory unicode string.
///
/// # Errors
/// [`DynError::InvalidUtf8`] on malformed content, plus the byte-vector
/// failures.
pub fn decode_unicode<R: Read>(reader: &mut R) -> Result<String> {
    let raw = byte_vector::decode_bytes(reader)?;
    String::from_utf8(raw.to_vec()).map_err(|_| DynError::InvalidUtf8.into())
}

/// Reads a nullable unicode string.
///
/// # Errors
/// As [`decode_unicode`].
pub fn decode_unicode_nullable<R: Read>(reader: &mut R) -> Result<Option<String>> {
    match byte_vector::decode_bytes_nullable(reader)? {
        None => Ok(None),
        Some(raw) => String::from_utf8(raw.to_vec())
            .map(Some)
            .map_err(|_| DynError::InvalidUtf8.into()),
    }
}
