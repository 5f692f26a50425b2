/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Byte vector wire codec.
//!
//! A byte vector travels as a stop-bit length followed by that many raw
//! bytes with no stop-bit transformation. The nullable form shifts the
//! length up by one so a zero length can stand for null.

use crate::{integer, stream};
use bytes::Bytes;
use fastwire_core::{DynError, Result};
use std::io::Read;

/// Appends a mandatory byte vector.
pub fn encode_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    integer::encode_u64(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

/// Appends a nullable byte vector.
///
/// # Errors
/// The nullable length failures.
pub fn encode_bytes_nullable(buf: &mut Vec<u8>, value: Option<&[u8]>) -> Result<()> {
    match value {
        None => {
            buf.push(0x80);
            Ok(())
        }
        Some(value) => {
            integer::encode_u64_nullable(buf, Some(value.len() as u64))?;
            buf.extend_from_slice(value);
            Ok(())
        }
    }
}

/// Reads a mandatory byte vector.
///
/// # Errors
/// [`DynError::UnexpectedEof`] when the stream ends before the announced
/// length, plus the length codec failures.
pub fn decode_bytes<R: Read>(reader: &mut R) -> Result<Bytes> {
    let length = integer::decode_u64(reader)?;
    read_body(reader, length)
}

/// Reads a nullable byte vector.
///
/// # Errors
/// As [`decode_bytes`].
pub fn decode_bytes_nullable<R: Read>(reader: &mut R) -> Result<Option<Bytes>> {
    match integer::decode_u64_nullable(reader)? {
        None => Ok(None),
        Some(length) => read_body(reader, length).map(Some),
    }
}

/// Bytes pulled per read while filling a vector body.
const READ_CHUNK: usize = 4096;

fn read_body<R: Read>(reader: &mut R, length: u64) -> Result<Bytes> {
    let length = usize::try_from(length).map_err(|_| DynError::IntegerOverflow)?;

    // Grown by what the stream actually yields, not pre-sized by the
    // claimed length, which is attacker-controlled.
    let mut data = Vec::with_capacity(length.min(READ_CHUNK));
    let mut chunk = [0u8; READ_CHUNK];
    let mut remaining = length;
    while remaining > 0 {
        let take = remaining.min(READ_CHUNK);
        stream::read_exact(reader, &mut chunk[..take])?;
        data.extend_from_slice(&chunk[..take]);
        remaining -= take;
    }
    Ok(Bytes::from(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastwire_core::FastError;
    use std::io::Cursor;

    #[test]
    fn test_mandatory_round_trip() {
        let mut buf = Vec::new();
        encode_bytes(&mut buf, &[0xDE, 0xAD, 0xBE]);
        assert_eq!(buf, vec![0x83, 0xDE, 0xAD, 0xBE]);
        assert_eq!(
            decode_bytes(&mut Cursor::new(&buf)).unwrap(),
            Bytes::from_static(&[0xDE, 0xAD, 0xBE])
        );
    }

    #[test]
    fn test_mandatory_empty() {
        let mut buf = Vec::new();
        encode_bytes(&mut buf, &[]);
        assert_eq!(buf, vec![0x80]);
        assert_eq!(decode_bytes(&mut Cursor::new(&buf)).unwrap(), Bytes::new());
    }

    #[test]
    fn test_nullable_length_shift() {
        let mut buf = Vec::new();
        encode_bytes_nullable(&mut buf, None).unwrap();
        assert_eq!(buf, vec![0x80]);
        assert_eq!(decode_bytes_nullable(&mut Cursor::new(&buf)).unwrap(), None);

        let mut buf = Vec::new();
        encode_bytes_nullable(&mut buf, Some(&[])).unwrap();
        assert_eq!(buf, vec![0x81]);
        assert_eq!(
            decode_bytes_nullable(&mut Cursor::new(&buf)).unwrap(),
            Some(Bytes::new())
        );

        let mut buf = Vec::new();
        encode_bytes_nullable(&mut buf, Some(&[0x0F])).unwrap();
        assert_eq!(buf, vec![0x82, 0x0F]);
        assert_eq!(
            decode_bytes_nullable(&mut Cursor::new(&buf)).unwrap(),
            Some(Bytes::from_static(&[0x0F]))
        );
    }

    #[test]
    fn test_truncated_body() {
        let wire = vec![0x85, 0x01];
        assert!(decode_bytes(&mut Cursor::new(wire)).is_err());
    }

    #[test]
    fn test_huge_claimed_length_fails_without_allocating() {
        let mut wire = Vec::new();
        integer::encode_u64(&mut wire, u64::from(u32::MAX));
        wire.extend_from_slice(&[0xAA, 0xBB]);

        let err = decode_bytes(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(
            err,
            FastError::Dynamic(DynError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_body_longer_than_one_chunk() {
        let payload = vec![0x5A; READ_CHUNK + 100];
        let mut buf = Vec::new();
        encode_bytes(&mut buf, &payload);
        let decoded = decode_bytes(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded.as_ref(), payload.as_slice());
    }

    #[test]
    fn test_raw_bytes_keep_high_bits() {
        let payload = [0xFF, 0x80, 0x00];
        let mut buf = Vec::new();
        encode_bytes(&mut buf, &payload);
        let decoded = decode_bytes(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded.as_ref(), &payload);
    }
}
