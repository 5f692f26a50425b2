/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Field tree dispatch.
//!
//! A template body is a list of [`Field`]s. Scalars carry the operator
//! machinery, groups nest a field list behind an optional presence bit,
//! and sequences repeat one. Encode and decode fan out here.

use crate::context::Context;
use crate::group::Group;
use crate::message::MessageTemplate;
use crate::scalar::Scalar;
use crate::sequence::Sequence;
use crate::value::FieldValue;
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{DynError, QName, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One entry of a template or group body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    /// A single operator-coded value.
    Scalar(Scalar),
    /// A nested structure, present or absent as a whole.
    Group(Group),
    /// A repeated structure with a length prefix.
    Sequence(Sequence),
}

impl Field {
    /// The field's qualified name.
    #[must_use]
    pub fn name(&self) -> &QName {
        match self {
            Self::Scalar(field) => field.name(),
            Self::Group(field) => field.name(),
            Self::Sequence(field) => field.name(),
        }
    }

    /// True when the field may be absent.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Scalar(field) => field.is_optional(),
            Self::Group(field) => field.is_optional(),
            Self::Sequence(field) => field.is_optional(),
        }
    }

    /// True when the field claims a bit in its enclosing presence map.
    ///
    /// Groups claim one only when optional; sequences defer to their
    /// length field's classification.
    #[must_use]
    pub fn uses_pmap_bit(&self) -> bool {
        match self {
            Self::Scalar(field) => field.operator().uses_pmap_bit(field.is_optional()),
            Self::Group(field) => field.is_optional(),
            Self::Sequence(field) => field.uses_pmap_bit(),
        }
    }

    /// Checks the definition for static errors.
    ///
    /// # Errors
    /// The scalar validation failures, recursively for structured fields.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Scalar(field) => field.validate(),
            Self::Group(field) => field.validate(),
            Self::Sequence(field) => field.validate(),
        }
    }

    /// Encodes one slot of a message body.
    ///
    /// # Errors
    /// [`DynError::InvalidType`] when the slot holds the wrong value
    /// shape, plus the per-kind encoding failures.
    pub fn encode(
        &self,
        buf: &mut Vec<u8>,
        pmap: &mut PresenceMapBuilder,
        value: Option<&FieldValue>,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<()> {
        match self {
            Self::Scalar(field) => {
                let value = match value {
                    None => None,
                    Some(v) => Some(v.as_scalar().ok_or_else(|| wrong_shape("scalar", v))?),
                };
                field.encode(buf, pmap, value, ctx, template)
            }
            Self::Group(field) => {
                let value = match value {
                    None => None,
                    Some(v) => Some(v.as_group().ok_or_else(|| wrong_shape("group", v))?),
                };
                field.encode(buf, pmap, value, ctx, template)
            }
            Self::Sequence(field) => {
                let value = match value {
                    None => None,
                    Some(v) => Some(v.as_sequence().ok_or_else(|| wrong_shape("sequence", v))?),
                };
                field.encode(buf, pmap, value, ctx, template)
            }
        }
    }

    /// Decodes one slot of a message body.
    ///
    /// # Errors
    /// The per-kind decoding failures.
    pub fn decode<R: Read>(
        &self,
        reader: &mut R,
        pmap: &mut PresenceMapReader,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<Option<FieldValue>> {
        match self {
            Self::Scalar(field) => Ok(field
                .decode(reader, pmap, ctx, template)?
                .map(FieldValue::Scalar)),
            Self::Group(field) => Ok(field
                .decode(reader, pmap, ctx, template)?
                .map(FieldValue::Group)),
            Self::Sequence(field) => Ok(field
                .decode(reader, pmap, ctx, template)?
                .map(FieldValue::Sequence)),
        }
    }
}

fn wrong_shape(expected: &str, actual: &FieldValue) -> fastwire_core::FastError {
    DynError::InvalidType {
        expected: expected.to_string(),
        actual: actual.kind_name().to_string(),
    }
    .into()
}

impl From<Scalar> for Field {
    fn from(field: Scalar) -> Self {
        Self::Scalar(field)
    }
}

impl From<Group> for Field {
    fn from(field: Group) -> Self {
        Self::Group(field)
    }
}

impl From<Sequence> for Field {
    fn from(field: Sequence) -> Self {
        Self::Sequence(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use fastwire_core::FastType;

    #[test]
    fn test_pmap_bit_claims() {
        let copy = Field::from(Scalar::new("A", FastType::U32, Operator::Copy, false));
        assert!(copy.uses_pmap_bit());

        let plain = Field::from(Scalar::new("B", FastType::U32, Operator::None, true));
        assert!(!plain.uses_pmap_bit());

        let constant = Field::from(Scalar::new("C", FastType::U32, Operator::Constant, false));
        assert!(!constant.uses_pmap_bit());

        let optional_group = Field::from(Group::new("G", true));
        assert!(optional_group.uses_pmap_bit());

        let mandatory_group = Field::from(Group::new("G", false));
        assert!(!mandatory_group.uses_pmap_bit());

        let seq = Field::from(Sequence::new("S", false));
        assert!(!seq.uses_pmap_bit());

        let copy_length_seq = Field::from(
            Sequence::new("S", false)
                .with_length(Scalar::new("SLength", FastType::U32, Operator::Copy, false)),
        );
        assert!(copy_length_seq.uses_pmap_bit());
    }

    #[test]
    fn test_wrong_value_shape_is_rejected() {
        let field = Field::from(Scalar::new("A", FastType::U32, Operator::None, false));
        let mut buf = Vec::new();
        let mut pmap = PresenceMapBuilder::new();
        let mut ctx = Context::new();
        let template = MessageTemplate::new("T");

        let group_value = FieldValue::Group(crate::value::GroupValue::new());
        let err = field
            .encode(&mut buf, &mut pmap, Some(&group_value), &mut ctx, &template)
            .unwrap_err();
        assert!(matches!(
            err,
            fastwire_core::FastError::Dynamic(DynError::InvalidType { .. })
        ));
    }
}
