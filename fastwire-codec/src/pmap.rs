/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Presence map encoding and decoding.
//!
//! A presence map is a bit sequence carried in the low 7 bits of each
//! byte, most significant bit first, with the stop bit marking the final
//! byte. Trailing all-zero bytes are dropped on the wire, so readers must
//! treat bits past the end as zero.

use crate::stream;
use fastwire_core::{DynError, Result};
use smallvec::SmallVec;
use std::io::Read;

/// Upper bound on map size, guards runaway maps on corrupt input.
const MAX_PMAP_BYTES: usize = 1024;

/// Collects presence bits during encoding.
#[derive(Debug, Clone, Default)]
pub struct PresenceMapBuilder {
    bits: Vec<bool>,
}

impl PresenceMapBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder sized for a known bit count.
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    /// Appends the next presence bit.
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Number of bits collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true when no bit has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Encodes the collected bits into wire form.
    ///
    /// Bits are packed seven per byte, trailing all-zero bytes are
    /// dropped, and the stop bit is set on the final byte. A map with no
    /// set bit is the single byte `0x80`.
    #[must_use]
    pub fn encode(&self) -> SmallVec<[u8; 8]> {
        let mut bytes = SmallVec::<[u8; 8]>::new();
        for (i, &bit) in self.bits.iter().enumerate() {
            if i % 7 == 0 {
                bytes.push(0);
            }
            if bit {
                let last = bytes.len() - 1;
                bytes[last] |= 1 << (6 - (i % 7));
            }
        }

        while matches!(bytes.last(), Some(0)) {
            bytes.pop();
        }
        match bytes.last_mut() {
            Some(last) => *last |= 0x80,
            None => bytes.push(0x80),
        }
        bytes
    }
}

/// Reads presence bits during decoding.
#[derive(Debug, Clone)]
pub struct PresenceMapReader {
    bits: Vec<bool>,
    position: usize,
}

impl PresenceMapReader {
    /// Builds a reader from explicit bits, mainly for tests.
    #[must_use]
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits, position: 0 }
    }

    /// Reads a wire-form map from the stream.
    ///
    /// # Errors
    /// [`DynError::UnexpectedEof`] on a truncated stream,
    /// [`DynError::OverlongEncoding`] when no stop bit appears within the
    /// size bound.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bits = Vec::new();
        for _ in 0..MAX_PMAP_BYTES {
            let byte = stream::read_byte(reader)?;
            for i in (0..7).rev() {
                bits.push(byte & (1 << i) != 0);
            }
            if byte & 0x80 != 0 {
                return Ok(Self { bits, position: 0 });
            }
        }
        Err(DynError::OverlongEncoding.into())
    }

    /// Continues decoding from an already-read first byte.
    ///
    /// # Errors
    /// As [`Self::decode`].
    pub fn decode_after<R: Read>(first: u8, reader: &mut R) -> Result<Self> {
        let mut bits = Vec::new();
        let mut byte = first;
        for _ in 0..MAX_PMAP_BYTES {
            for i in (0..7).rev() {
                bits.push(byte & (1 << i) != 0);
            }
            if byte & 0x80 != 0 {
                return Ok(Self { bits, position: 0 });
            }
            byte = stream::read_byte(reader)?;
        }
        Err(DynError::OverlongEncoding.into())
    }

    /// Yields the next bit, zero once the wire map is exhausted.
    pub fn next_bit(&mut self) -> bool {
        if self.position < self.bits.len() {
            let bit = self.bits[self.position];
            self.position += 1;
            bit
        } else {
            false
        }
    }

    /// Number of bits carried on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true when the wire carried no bits, which cannot happen
    /// for well-formed input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}
