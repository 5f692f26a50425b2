/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire Codec
//!
//! Wire-level primitives for the FAST (FIX Adapted for Streaming) encoding.
//!
//! Everything on a FAST wire is built from a handful of primitives, all
//! implemented here:
//!
//! - **Stop-bit integers**: 7-bit groups with the high bit terminating a value
//! - **Ascii strings**: 7-bit characters with a stop bit and NUL-run escapes
//! - **Byte vectors**: length-prefixed raw bytes, also the unicode framing
//! - **Decimals**: exponent/mantissa pairs of stop-bit integers
//! - **Presence maps**: the bit sequences that steer operator decoding
//!
//! Each primitive has a mandatory and a nullable form; the nullable form
//! reserves one code point for null by shifting values up.

pub mod byte_vector;
pub mod decimal;
pub mod integer;
pub mod pmap;
pub mod stream;
pub mod text;
pub mod type_codec;

pub use pmap::{PresenceMapBuilder, PresenceMapReader};
