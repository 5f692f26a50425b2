/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire Core
//!
//! Core types and error definitions for the FastWire FAST protocol engine.
//!
//! This crate provides the fundamental building blocks used across all FastWire crates:
//! - **Error types**: Unified error handling with `thiserror`, split into the
//!   protocol's static, dynamic, and reportable categories
//! - **Scalar values**: `ScalarValue` with value-based equality across integer widths
//! - **Exact decimals**: `DecimalValue` as a mantissa/exponent pair
//! - **Field types**: `FastType` and qualified names (`QName`)
//!
//! ## Value Semantics
//!
//! Values compare by content, not representation: a `uInt32` holding 10 equals a
//! `uInt64` holding 10, which is what dictionary-conditioned transfer encoding needs.

pub mod decimal;
pub mod error;
pub mod qname;
pub mod types;
pub mod value;

pub use decimal::DecimalValue;
pub use error::{
    DynError, ErrorAction, ErrorHandler, FastError, LoggingErrorHandler, RepError, Result,
    StaticError, StrictErrorHandler,
};
pub use qname::QName;
pub use types::FastType;
pub use value::ScalarValue;
