/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire Engine
//!
//! The streaming layer: [`FastEncoder`] turns messages into wire units
//! over any [`std::io::Write`] sink, [`FastDecoder`] rebuilds them from
//! any [`std::io::Read`] source. Both keep per-stream dictionary state
//! and share a template registry agreed out of band.

pub mod decoder;
pub mod encoder;

pub use decoder::FastDecoder;
pub use encoder::{FastEncoder, encode_message};
