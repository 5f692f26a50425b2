/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Nested field groups.
//!
//! A group gathers inner fields behind a single presence decision. An
//! optional group claims one bit in its parent's presence map; a present
//! group with inner operator bits carries its own presence map, written
//! before the group body.

use crate::context::Context;
use crate::field::Field;
use crate::message::MessageTemplate;
use crate::value::GroupValue;
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{DynError, QName, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A named list of fields that is present or absent as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    name: QName,
    optional: bool,
    fields: Vec<Field>,
    pmap_bits: usize,
}

impl Group {
    /// Creates an empty group definition.
    pub fn new(name: impl Into<QName>, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            fields: Vec::new(),
            pmap_bits: 0,
        }
    }

    /// Appends an inner field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        let field = field.into();
        self.pmap_bits += usize::from(field.uses_pmap_bit());
        self.fields.push(field);
        self
    }

    /// The group's qualified name.
    #[must_use]
    pub const fn name(&self) -> &QName {
        &self.name
    }

    /// True when the group may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// The inner fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Bits the inner fields claim in the group's own presence map.
    #[must_use]
    pub const fn pmap_bits(&self) -> usize {
        self.pmap_bits
    }

    /// Checks the inner definitions for static errors.
    ///
    /// # Errors
    /// The inner field validation failures.
    pub fn validate(&self) -> Result<()> {
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Encodes the group, claiming the parent bit when optional.
    ///
    /// # Errors
    /// [`DynError::MandatoryFieldAbsent`] for a missing mandatory group,
    /// plus the inner field failures.
    pub fn encode(
        &self,
        buf: &mut Vec<u8>,
        pmap: &mut PresenceMapBuilder,
        value: Option<&GroupValue>,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<()> {
        if self.optional {
            pmap.push(value.is_some());
        }
        let Some(values) = value else {
            if self.optional {
                return Ok(());
            }
            return Err(DynError::MandatoryFieldAbsent {
                field: self.name.to_string(),
            }
            .into());
        };

        let mut inner_pmap = PresenceMapBuilder::with_capacity(self.pmap_bits);
        if self.pmap_bits > 0 {
            // The group pmap precedes the body, so the body goes through
            // a scratch buffer first.
            let mut body = Vec::new();
            for (index, field) in self.fields.iter().enumerate() {
                field.encode(&mut body, &mut inner_pmap, values.get(index), ctx, template)?;
            }
            buf.extend_from_slice(&inner_pmap.encode());
            buf.extend_from_slice(&body);
        } else {
            for (index, field) in self.fields.iter().enumerate() {
                field.encode(buf, &mut inner_pmap, values.get(index), ctx, template)?;
            }
        }
        Ok(())
    }

    /// Decodes the group, consuming the parent bit when optional.
    ///
    /// # Errors
    /// The inner field failures.
    pub fn decode<R: Read>(
        &self,
        reader: &mut R,
        pmap: &mut PresenceMapReader,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<Option<GroupValue>> {
        if self.optional && !pmap.next_bit() {
            return Ok(None);
        }

        let mut inner_pmap = if self.pmap_bits > 0 {
            PresenceMapReader::decode(reader)?
        } else {
            PresenceMapReader::from_bits(Vec::new())
        };
        let mut values = GroupValue::sized(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if let Some(value) = field.decode(reader, &mut inner_pmap, ctx, template)? {
                values.set(index, value);
            }
        }
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use crate::scalar::Scalar;
    use crate::value::FieldValue;
    use fastwire_core::{FastType, ScalarValue};
    use std::io::Cursor;

    fn market_group(optional: bool) -> Group {
        Group::new("Venue", optional)
            .with_field(Scalar::new("Mic", FastType::Ascii, Operator::Copy, false))
            .with_field(Scalar::new("Tier", FastType::U32, Operator::None, false))
    }

    fn venue_value(mic: &str, tier: u32) -> GroupValue {
        let mut value = GroupValue::new();
        value.push(Some(FieldValue::from(mic)));
        value.push(Some(FieldValue::from(tier)));
        value
    }

    #[test]
    fn test_group_round_trip_with_inner_pmap() {
        let group = market_group(false);
        assert_eq!(group.pmap_bits(), 1);

        let template = MessageTemplate::new("T");
        let mut encode_ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        group
            .encode(
                &mut buf,
                &mut pmap,
                Some(&venue_value("XPAR", 2)),
                &mut encode_ctx,
                &template,
            )
            .unwrap();
        // Mandatory group claims no parent bit.
        assert_eq!(pmap.len(), 0);

        let mut decode_ctx = Context::new();
        let mut reader = Cursor::new(buf);
        let mut parent = PresenceMapReader::from_bits(Vec::new());
        let decoded = group
            .decode(&mut reader, &mut parent, &mut decode_ctx, &template)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.scalar(0), Some(&ScalarValue::Ascii("XPAR".into())));
        assert_eq!(decoded.scalar(1), Some(&ScalarValue::UInt32(2)));
    }

    #[test]
    fn test_optional_group_absent_is_one_bit() {
        let group = market_group(true);
        let template = MessageTemplate::new("T");
        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        group
            .encode(&mut buf, &mut pmap, None, &mut ctx, &template)
            .unwrap();
        assert!(buf.is_empty());
        assert_eq!(pmap.len(), 1);

        let mut reader = Cursor::new(buf);
        let mut parent = PresenceMapReader::from_bits(vec![false]);
        let decoded = group
            .decode(&mut reader, &mut parent, &mut ctx, &template)
            .unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_mandatory_group_requires_value() {
        let group = market_group(false);
        let template = MessageTemplate::new("T");
        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        let err = group
            .encode(&mut buf, &mut pmap, None, &mut ctx, &template)
            .unwrap_err();
        assert!(matches!(
            err,
            fastwire_core::FastError::Dynamic(DynError::MandatoryFieldAbsent { .. })
        ));
    }

    #[test]
    fn test_group_without_operator_bits_skips_inner_pmap() {
        let group = Group::new("Plain", false)
            .with_field(Scalar::new("A", FastType::U32, Operator::None, false));
        assert_eq!(group.pmap_bits(), 0);

        let template = MessageTemplate::new("T");
        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        let mut value = GroupValue::new();
        value.push(Some(FieldValue::from(9u32)));
        group
            .encode(&mut buf, &mut pmap, Some(&value), &mut ctx, &template)
            .unwrap();
        // Just the one stop-bit integer, no pmap byte.
        assert_eq!(buf, vec![0x89]);
    }
}
