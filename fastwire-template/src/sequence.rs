/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Repeating field groups.
//!
//! A sequence is a field list repeated zero or more times, preceded by an
//! unsigned length. The length field defaults to a plain integer built
//! from the sequence name, can be replaced with an operator-carrying
//! scalar, and its nullability carries the presence of an optional
//! sequence. Each element with operator bits opens its own presence map.

use crate::context::Context;
use crate::field::Field;
use crate::message::MessageTemplate;
use crate::operator::Operator;
use crate::scalar::Scalar;
use crate::value::{GroupValue, SequenceValue};
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{DynError, FastType, QName, Result, ScalarValue};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A named field list repeated a wire-carried number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    name: QName,
    optional: bool,
    length: Scalar,
    fields: Vec<Field>,
    pmap_bits: usize,
}

impl Sequence {
    /// Creates an empty sequence definition with its implicit length field.
    pub fn new(name: impl Into<QName>, optional: bool) -> Self {
        let name = name.into();
        let length_name =
            QName::with_namespace(format!("{}Length", name.name()), name.namespace());
        Self {
            length: Scalar::new(length_name, FastType::U32, Operator::None, optional),
            name,
            optional,
            fields: Vec::new(),
            pmap_bits: 0,
        }
    }

    /// Replaces the implicit length field.
    ///
    /// The supplied scalar keeps its operator, dictionary binding, and
    /// initial value; its nullability is forced to the sequence's, since
    /// a null length is what carries absence.
    #[must_use]
    pub fn with_length(mut self, length: Scalar) -> Self {
        self.length = length.with_optional(self.optional);
        self
    }

    /// Appends a field to the repeated list.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        let field = field.into();
        self.pmap_bits += usize::from(field.uses_pmap_bit());
        self.fields.push(field);
        self
    }

    /// The sequence's qualified name.
    #[must_use]
    pub const fn name(&self) -> &QName {
        &self.name
    }

    /// True when the whole sequence may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// The implicit length field.
    #[must_use]
    pub const fn length(&self) -> &Scalar {
        &self.length
    }

    /// The repeated fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Bits each element claims in its own presence map.
    #[must_use]
    pub const fn pmap_bits(&self) -> usize {
        self.pmap_bits
    }

    /// True when the length field claims a bit in the enclosing map.
    #[must_use]
    pub fn uses_pmap_bit(&self) -> bool {
        self.length
            .operator()
            .uses_pmap_bit(self.length.is_optional())
    }

    /// Checks the inner definitions for static errors.
    ///
    /// # Errors
    /// The inner field validation failures.
    pub fn validate(&self) -> Result<()> {
        self.length.validate()?;
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Encodes the length and every element.
    ///
    /// # Errors
    /// [`DynError::MandatoryFieldAbsent`] for a missing mandatory
    /// sequence, [`DynError::IntegerOverflow`] for an element count beyond
    /// the length field, plus the inner field failures.
    pub fn encode(
        &self,
        buf: &mut Vec<u8>,
        pmap: &mut PresenceMapBuilder,
        value: Option<&SequenceValue>,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<()> {
        let Some(elements) = value else {
            if self.optional {
                return self.length.encode(buf, pmap, None, ctx, template);
            }
            return Err(DynError::MandatoryFieldAbsent {
                field: self.name.to_string(),
            }
            .into());
        };

        let count =
            u32::try_from(elements.len()).map_err(|_| DynError::IntegerOverflow)?;
        self.length
            .encode(buf, pmap, Some(&ScalarValue::UInt32(count)), ctx, template)?;

        for element in elements.elements() {
            let mut element_pmap = PresenceMapBuilder::with_capacity(self.pmap_bits);
            if self.pmap_bits > 0 {
                let mut body = Vec::new();
                for (index, field) in self.fields.iter().enumerate() {
                    field.encode(&mut body, &mut element_pmap, element.get(index), ctx, template)?;
                }
                buf.extend_from_slice(&element_pmap.encode());
                buf.extend_from_slice(&body);
            } else {
                for (index, field) in self.fields.iter().enumerate() {
                    field.encode(buf, &mut element_pmap, element.get(index), ctx, template)?;
                }
            }
        }
        Ok(())
    }

    /// Decodes the length and every element.
    ///
    /// # Errors
    /// The inner field failures.
    pub fn decode<R: Read>(
        &self,
        reader: &mut R,
        pmap: &mut PresenceMapReader,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<Option<SequenceValue>> {
        let Some(count) = self.length.decode(reader, pmap, ctx, template)? else {
            return Ok(None);
        };
        let count = usize::try_from(count.to_u32()?).map_err(|_| DynError::IntegerOverflow)?;

        // Sized by what the stream actually yields, not by the claimed
        // count, which is attacker-controlled.
        let mut elements = Vec::new();
        for _ in 0..count {
            let mut element_pmap = if self.pmap_bits > 0 {
                PresenceMapReader::decode(reader)?
            } else {
                PresenceMapReader::from_bits(Vec::new())
            };
            let mut element = GroupValue::sized(self.fields.len());
            for (index, field) in self.fields.iter().enumerate() {
                if let Some(value) = field.decode(reader, &mut element_pmap, ctx, template)? {
                    element.set(index, value);
                }
            }
            elements.push(element);
        }
        Ok(Some(SequenceValue::from(elements)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;
    use std::io::Cursor;

    fn depth_sequence(optional: bool) -> Sequence {
        Sequence::new("Depth", optional)
            .with_field(Scalar::new("Level", FastType::U32, Operator::Increment, false))
            .with_field(Scalar::new("Size", FastType::U32, Operator::None, false))
    }

    fn level(level: u32, size: u32) -> GroupValue {
        let mut element = GroupValue::new();
        element.push(Some(FieldValue::from(level)));
        element.push(Some(FieldValue::from(size)));
        element
    }

    #[test]
    fn test_length_field_name_and_shape() {
        let seq = depth_sequence(false);
        assert_eq!(seq.length().name().name(), "DepthLength");
        assert_eq!(seq.length().fast_type(), FastType::U32);
        assert_eq!(seq.length().operator(), Operator::None);
        assert!(!seq.length().is_optional());
        assert_eq!(seq.pmap_bits(), 1);
    }

    #[test]
    fn test_sequence_round_trip() {
        let seq = depth_sequence(false);
        let template = MessageTemplate::new("T");

        let mut value = SequenceValue::new();
        value.push(level(1, 100));
        value.push(level(2, 250));

        let mut encode_ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut buf, &mut pmap, Some(&value), &mut encode_ctx, &template)
            .unwrap();
        assert_eq!(pmap.len(), 0);

        let mut decode_ctx = Context::new();
        let mut reader = Cursor::new(buf);
        let mut parent = PresenceMapReader::from_bits(Vec::new());
        let decoded = seq
            .decode(&mut reader, &mut parent, &mut decode_ctx, &template)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get(0).and_then(|e| e.scalar(0)), Some(&ScalarValue::UInt32(1)));
        assert_eq!(decoded.get(0).and_then(|e| e.scalar(1)), Some(&ScalarValue::UInt32(100)));
        assert_eq!(decoded.get(1).and_then(|e| e.scalar(0)), Some(&ScalarValue::UInt32(2)));
        assert_eq!(decoded.get(1).and_then(|e| e.scalar(1)), Some(&ScalarValue::UInt32(250)));
    }

    #[test]
    fn test_increment_skips_inside_elements() {
        let seq = depth_sequence(false);
        let template = MessageTemplate::new("T");

        let mut value = SequenceValue::new();
        value.push(level(1, 10));
        value.push(level(2, 20));
        value.push(level(3, 30));

        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut buf, &mut pmap, Some(&value), &mut ctx, &template)
            .unwrap();
        // Length, then per element: pmap byte, maybe a level, a size.
        // Levels two and three ride the increment, so only the first
        // element carries level bytes.
        assert_eq!(
            buf,
            vec![0x83, 0xC0, 0x81, 0x8A, 0x80, 0x94, 0x80, 0x9E]
        );
    }

    #[test]
    fn test_copy_length_rides_across_messages() {
        let seq = Sequence::new("Depth", false)
            .with_length(Scalar::new("DepthLength", FastType::U32, Operator::Copy, false))
            .with_field(Scalar::new("Size", FastType::U32, Operator::None, false));
        assert!(seq.uses_pmap_bit());
        let template = MessageTemplate::new("T");

        let mut value = SequenceValue::new();
        for size in [10u32, 20] {
            let mut element = GroupValue::new();
            element.push(Some(FieldValue::from(size)));
            value.push(element);
        }

        let mut ctx = Context::new();
        let mut first = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut first, &mut pmap, Some(&value), &mut ctx, &template)
            .unwrap();
        // First pass transmits the count under a set bit.
        assert_eq!(pmap.encode().as_slice(), &[0xC0]);
        assert_eq!(first, vec![0x82, 0x8A, 0x94]);

        let mut second = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut second, &mut pmap, Some(&value), &mut ctx, &template)
            .unwrap();
        // Same count rides the copy: bit clear, no length byte.
        assert_eq!(pmap.encode().as_slice(), &[0x80]);
        assert_eq!(second, vec![0x8A, 0x94]);

        let mut decode_ctx = Context::new();
        let mut parent = PresenceMapReader::from_bits(vec![true]);
        let decoded = seq
            .decode(&mut Cursor::new(first), &mut parent, &mut decode_ctx, &template)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.len(), 2);

        let mut parent = PresenceMapReader::from_bits(vec![false]);
        let decoded = seq
            .decode(&mut Cursor::new(second), &mut parent, &mut decode_ctx, &template)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded.get(1).and_then(|e| e.scalar(0)),
            Some(&ScalarValue::UInt32(20))
        );
    }

    #[test]
    fn test_custom_length_tracks_sequence_nullability() {
        let seq = Sequence::new("Depth", true)
            .with_length(Scalar::new("DepthLength", FastType::U32, Operator::Copy, false));
        assert!(seq.length().is_optional());
        assert_eq!(seq.length().operator(), Operator::Copy);
    }

    #[test]
    fn test_optional_sequence_absent_is_null_length() {
        let seq = depth_sequence(true);
        let template = MessageTemplate::new("T");

        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut buf, &mut pmap, None, &mut ctx, &template)
            .unwrap();
        assert_eq!(buf, vec![0x80]);
        assert_eq!(pmap.len(), 0);

        let mut reader = Cursor::new(buf);
        let mut parent = PresenceMapReader::from_bits(Vec::new());
        let decoded = seq
            .decode(&mut reader, &mut parent, &mut ctx, &template)
            .unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_optional_sequence_empty_is_zero_length() {
        let seq = depth_sequence(true);
        let template = MessageTemplate::new("T");

        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        seq.encode(&mut buf, &mut pmap, Some(&SequenceValue::new()), &mut ctx, &template)
            .unwrap();
        assert_eq!(buf, vec![0x81]);

        let mut reader = Cursor::new(buf);
        let mut parent = PresenceMapReader::from_bits(Vec::new());
        let decoded = seq
            .decode(&mut reader, &mut parent, &mut ctx, &template)
            .unwrap()
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_mandatory_sequence_requires_value() {
        let seq = depth_sequence(false);
        let template = MessageTemplate::new("T");
        let mut ctx = Context::new();
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        let err = seq
            .encode(&mut buf, &mut pmap, None, &mut ctx, &template)
            .unwrap_err();
        assert!(matches!(
            err,
            fastwire_core::FastError::Dynamic(DynError::MandatoryFieldAbsent { .. })
        ));
    }
}
