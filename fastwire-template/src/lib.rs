/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire Template
//!
//! Template definitions and the operator machinery that turns them into
//! bytes.
//!
//! - **Definitions**: [`Scalar`], [`Group`], [`Sequence`] and the
//!   [`Field`] dispatch build a [`MessageTemplate`].
//! - **Values**: [`Message`] pairs a template with [`FieldValue`] slots.
//! - **State**: [`Context`] owns the dictionaries and the error handler
//!   for one direction of a stream.
//! - **Registration**: [`BasicTemplateRegistry`] resolves wire
//!   identifiers to validated templates.

pub mod context;
pub mod field;
pub mod group;
pub mod message;
pub mod operator;
mod operator_codec;
pub mod registry;
pub mod scalar;
pub mod sequence;
pub mod value;

pub use context::Context;
pub use field::Field;
pub use group::Group;
pub use message::{Message, MessageTemplate, TEMPLATE_ID_NAME};
pub use operator::Operator;
pub use registry::{BasicTemplateRegistry, TemplateRegistry};
pub use scalar::Scalar;
pub use sequence::Sequence;
pub use value::{FieldValue, GroupValue, SequenceValue};
