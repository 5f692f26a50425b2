/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Message templates and messages.
//!
//! A [`MessageTemplate`] is the decoding schema for one message kind: an
//! ordered field list plus the implicit template identifier field that
//! leads every message. A [`Message`] pairs one template with one set of
//! field values.
//!
//! The template identifier behaves like a mandatory `uInt32` copy field
//! named `templateId` against the global dictionary, so back-to-back
//! messages of the same template spend one presence bit and no bytes on
//! it.

use crate::context::Context;
use crate::field::Field;
use crate::operator::Operator;
use crate::scalar::Scalar;
use crate::value::{FieldValue, GroupValue};
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{DynError, FastType, QName, Result, ScalarValue};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;

/// The field name the implicit template identifier is keyed under.
pub const TEMPLATE_ID_NAME: &str = "templateId";

/// The decoding schema for one message kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    name: QName,
    type_reference: Option<QName>,
    template_id: Scalar,
    fields: Vec<Field>,
    pmap_bits: usize,
}

impl MessageTemplate {
    /// Creates an empty template.
    pub fn new(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            type_reference: None,
            template_id: Scalar::new(TEMPLATE_ID_NAME, FastType::U32, Operator::Copy, false),
            fields: Vec::new(),
            // The template identifier always claims the first bit.
            pmap_bits: 1,
        }
    }

    /// Sets the application type the template's fields describe. Fields
    /// using the type dictionary share state across templates with the
    /// same reference.
    #[must_use]
    pub fn with_type_reference(mut self, name: QName) -> Self {
        self.type_reference = Some(name);
        self
    }

    /// Appends a field to the template body.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        let field = field.into();
        self.pmap_bits += usize::from(field.uses_pmap_bit());
        self.fields.push(field);
        self
    }

    /// The template's qualified name.
    #[must_use]
    pub const fn name(&self) -> &QName {
        &self.name
    }

    /// The application type reference, if declared.
    #[must_use]
    pub const fn type_reference(&self) -> Option<&QName> {
        self.type_reference.as_ref()
    }

    /// The body fields in declaration order, template identifier excluded.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The slot of a body field, by unqualified name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name().name() == name)
    }

    /// Bits the template claims in the message presence map, template
    /// identifier included.
    #[must_use]
    pub const fn pmap_bits(&self) -> usize {
        self.pmap_bits
    }

    /// Checks every field definition for static errors.
    ///
    /// # Errors
    /// The field validation failures.
    pub fn validate(&self) -> Result<()> {
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Encodes a message body, template identifier first.
    ///
    /// # Errors
    /// The field encoding failures.
    pub fn encode(
        &self,
        buf: &mut Vec<u8>,
        pmap: &mut PresenceMapBuilder,
        values: &GroupValue,
        id: u32,
        ctx: &mut Context,
    ) -> Result<()> {
        self.template_id
            .encode(buf, pmap, Some(&ScalarValue::UInt32(id)), ctx, self)?;
        for (index, field) in self.fields.iter().enumerate() {
            field.encode(buf, pmap, values.get(index), ctx, self)?;
        }
        Ok(())
    }

    /// Decodes a message body. The caller has already consumed the
    /// template identifier and its presence bit.
    ///
    /// # Errors
    /// The field decoding failures.
    pub fn decode<R: Read>(
        self: &Arc<Self>,
        reader: &mut R,
        pmap: &mut PresenceMapReader,
        ctx: &mut Context,
    ) -> Result<Message> {
        let mut values = GroupValue::sized(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if let Some(value) = field.decode(reader, pmap, ctx, self)? {
                values.set(index, value);
            }
        }
        Ok(Message::from_parts(Arc::clone(self), values))
    }
}

/// One message: a template and its field values.
#[derive(Debug, Clone)]
pub struct Message {
    template: Arc<MessageTemplate>,
    template_id: Option<u32>,
    values: GroupValue,
}

impl Message {
    /// Creates a message with every slot absent.
    #[must_use]
    pub fn new(template: Arc<MessageTemplate>) -> Self {
        let values = GroupValue::sized(template.fields().len());
        Self {
            template,
            template_id: None,
            values,
        }
    }

    /// Assembles a message from already-decoded values.
    #[must_use]
    pub fn from_parts(template: Arc<MessageTemplate>, values: GroupValue) -> Self {
        Self {
            template,
            template_id: None,
            values,
        }
    }

    /// The template this message follows.
    #[must_use]
    pub fn template(&self) -> &Arc<MessageTemplate> {
        &self.template
    }

    /// The wire identifier this message was decoded under. `None` for
    /// messages built by hand; the encoder resolves the identifier from
    /// its registry.
    #[must_use]
    pub const fn template_id(&self) -> Option<u32> {
        self.template_id
    }

    /// Records the wire identifier after decode.
    pub fn set_template_id(&mut self, id: u32) {
        self.template_id = Some(id);
    }

    /// The template's qualified name.
    #[must_use]
    pub fn name(&self) -> &QName {
        self.template.name()
    }

    /// The field slots in declaration order.
    #[must_use]
    pub const fn values(&self) -> &GroupValue {
        &self.values
    }

    /// Fills a field by name.
    ///
    /// # Errors
    /// [`DynError::UnknownField`] when the template has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let index = self
            .template
            .field_index(name)
            .ok_or_else(|| DynError::UnknownField {
                name: name.to_string(),
            })?;
        self.values.set(index, value.into());
        Ok(())
    }

    /// Reads a field by name. Absent and unknown fields both read as
    /// `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.template
            .field_index(name)
            .and_then(|index| self.values.get(index))
    }

    /// Reads a scalar field by name.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&ScalarValue> {
        self.get(name).and_then(FieldValue::as_scalar)
    }
}

impl PartialEq for Message {
    // The identifier is derived state and stays out of equality.
    fn eq(&self, other: &Self) -> bool {
        self.template.name() == other.template.name() && self.values == other.values
    }
}
