/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire Dictionary
//!
//! Dictionary state for the FastWire FAST protocol engine.
//!
//! FAST conditions each field's wire form on previously transferred values.
//! Those previous values live in named dictionaries:
//! - **global**: shared by every template in the stream
//! - **template**: private to a single template
//! - **type**: shared by templates declaring the same application type
//! - any user-defined name declared on a field
//!
//! This crate holds the state containers only; scope resolution happens in
//! the template layer where the current template is known.

pub mod entry;
pub mod store;

pub use entry::DictionaryValue;
pub use store::{Dictionary, FieldKey};

/// Name of the stream-wide dictionary.
pub const GLOBAL: &str = "global";
/// Name of the per-template dictionary.
pub const TEMPLATE: &str = "template";
/// Name of the per-application-type dictionary.
pub const TYPE: &str = "type";
