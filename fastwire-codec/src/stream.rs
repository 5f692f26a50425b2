/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Byte-level stream access.
//!
//! Thin helpers over [`std::io::Read`] that map end-of-stream conditions
//! onto protocol errors. Running dry inside an encoded entity is a dynamic
//! error; running dry on a message boundary is a normal end of stream and
//! is surfaced as `None` by [`try_read_byte`].

use fastwire_core::{DynError, Result};
use std::io::{self, Read};

/// Reads exactly one byte.
///
/// # Errors
/// [`DynError::UnexpectedEof`] when the stream ends, or the underlying
/// I/O error.
pub fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf[0]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DynError::UnexpectedEof.into()),
        Err(e) => Err(e.into()),
    }
}

/// Reads one byte, or `None` on a clean end of stream.
///
/// # Errors
/// The underlying I/O error, except end-of-stream.
pub fn try_read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Fills `buf` completely.
///
/// # Errors
/// [`DynError::UnexpectedEof`] when the stream ends first, or the
/// underlying I/O error.
pub fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DynError::UnexpectedEof.into()),
        Err(e) => Err(e.into()),
    }
}
