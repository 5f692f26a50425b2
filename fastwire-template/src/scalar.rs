/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Scalar field definitions.
//!
//! A [`Scalar`] binds a name and wire type to an operator, an optional
//! initial value, and the dictionary entry the operator works against.
//! The encode and decode entry points resolve the dictionary prior, run
//! the operator, and store the entry's new state.

use crate::context::Context;
use crate::message::MessageTemplate;
use crate::operator::Operator;
use crate::operator_codec::{self, DictionaryUpdate};
use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};
use fastwire_core::{DynError, ErrorAction, FastError, FastType, QName, Result, ScalarValue, StaticError};
use fastwire_dictionary::DictionaryValue;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A scalar field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scalar {
    name: QName,
    fast_type: FastType,
    operator: Operator,
    optional: bool,
    initial_value: Option<ScalarValue>,
    dictionary: String,
    key: QName,
    id: Option<u32>,
}

impl Scalar {
    /// Creates a scalar field keyed by its own name in the global
    /// dictionary.
    #[must_use]
    pub fn new(
        name: impl Into<QName>,
        fast_type: FastType,
        operator: Operator,
        optional: bool,
    ) -> Self {
        let name = name.into();
        let key = name.clone();
        Self {
            name,
            fast_type,
            operator,
            optional,
            initial_value: None,
            dictionary: fastwire_dictionary::GLOBAL.to_string(),
            key,
            id: None,
        }
    }

    /// Sets the initial value, which is the constant for constant fields
    /// and the default for default fields.
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<ScalarValue>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Overrides the field's nullability.
    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Selects the dictionary the operator state lives in.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: impl Into<String>) -> Self {
        self.dictionary = dictionary.into();
        self
    }

    /// Overrides the dictionary key, which defaults to the field name.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<QName>) -> Self {
        self.key = key.into();
        self
    }

    /// Attaches an auxiliary numeric id, such as a FIX tag.
    #[must_use]
    pub const fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// The field name.
    #[must_use]
    pub const fn name(&self) -> &QName {
        &self.name
    }

    /// The wire type.
    #[must_use]
    pub const fn fast_type(&self) -> FastType {
        self.fast_type
    }

    /// The operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Whether the field may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// The initial value, if declared.
    #[must_use]
    pub const fn initial_value(&self) -> Option<&ScalarValue> {
        self.initial_value.as_ref()
    }

    /// The dictionary name.
    #[must_use]
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    /// The dictionary key.
    #[must_use]
    pub const fn key(&self) -> &QName {
        &self.key
    }

    /// The auxiliary id, if declared.
    #[must_use]
    pub const fn id(&self) -> Option<u32> {
        self.id
    }

    /// Checks the definition for static errors.
    ///
    /// # Errors
    /// [`StaticError`] when the operator does not apply to the type, a
    /// required initial value is missing, or the initial value has a
    /// foreign kind.
    pub fn validate(&self) -> Result<()> {
        if !self.operator.valid_for(self.fast_type) {
            return Err(StaticError::OperatorTypeMismatch {
                operator: self.operator.to_string(),
                fast_type: self.fast_type,
            }
            .into());
        }
        match &self.initial_value {
            Some(value) if !self.fast_type.is_value_of(value) => {
                Err(StaticError::InvalidDefaultType {
                    field: self.name.to_string(),
                    fast_type: self.fast_type,
                    value: value.to_string(),
                }
                .into())
            }
            Some(_) => Ok(()),
            None if self.operator == Operator::Constant => Err(StaticError::NoInitialValue {
                field: self.name.to_string(),
            }
            .into()),
            None if self.operator == Operator::Default && !self.optional => {
                Err(StaticError::MissingDefaultValue {
                    field: self.name.to_string(),
                }
                .into())
            }
            None => Ok(()),
        }
    }

    /// Encodes one value of this field.
    ///
    /// Appends wire bytes to `buf` and presence bits to `pmap`, and
    /// updates the dictionary entry the operator conditions on.
    ///
    /// # Errors
    /// [`DynError::MandatoryFieldAbsent`] for a missing mandatory value,
    /// [`DynError::InvalidType`] for a foreign value kind, plus the
    /// operator and codec failures.
    pub fn encode(
        &self,
        buf: &mut Vec<u8>,
        pmap: &mut PresenceMapBuilder,
        value: Option<&ScalarValue>,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<()> {
        if value.is_none() && !self.optional && self.operator != Operator::Constant {
            return Err(DynError::MandatoryFieldAbsent {
                field: self.name.to_string(),
            }
            .into());
        }
        if let Some(v) = value {
            if !self.fast_type.is_value_of(v) {
                return Err(DynError::InvalidType {
                    expected: self.fast_type.to_string(),
                    actual: v.kind_name().to_string(),
                }
                .into());
            }
        }

        let prior = self.prior(ctx, template);
        let update = operator_codec::encode_scalar(self, buf, pmap, value, &prior)?;
        self.apply(update, ctx, template);
        Ok(())
    }

    /// Decodes one value of this field.
    ///
    /// Reportable conditions such as a 32-bit overflow consult the
    /// context's error handler; continuing substitutes the type's base
    /// value so the rest of the message still decodes.
    ///
    /// # Errors
    /// The operator and codec failures, and reportable conditions under a
    /// strict handler.
    pub fn decode<R: Read>(
        &self,
        reader: &mut R,
        pmap: &mut PresenceMapReader,
        ctx: &mut Context,
        template: &MessageTemplate,
    ) -> Result<Option<ScalarValue>> {
        let prior = self.prior(ctx, template);
        match operator_codec::decode_scalar(self, reader, pmap, &prior) {
            Ok((value, update)) => {
                self.apply(update, ctx, template);
                Ok(value)
            }
            Err(err @ FastError::Repr(_)) => match ctx.report(&err) {
                ErrorAction::Abort => Err(err),
                ErrorAction::Continue => {
                    let fallback = self.fast_type.base_value();
                    if self.operator.uses_dictionary() {
                        self.apply(
                            DictionaryUpdate::Store(DictionaryValue::Value(fallback.clone())),
                            ctx,
                            template,
                        );
                    }
                    Ok(Some(fallback))
                }
            },
            Err(err) => Err(err),
        }
    }

    fn prior(&self, ctx: &Context, template: &MessageTemplate) -> DictionaryValue {
        if self.operator.uses_dictionary() {
            ctx.lookup(&self.dictionary, template, &self.key)
        } else {
            DictionaryValue::Undefined
        }
    }

    fn apply(&self, update: DictionaryUpdate, ctx: &mut Context, template: &MessageTemplate) {
        if let DictionaryUpdate::Store(state) = update {
            ctx.store(&self.dictionary, template, self.key.clone(), state);
        }
    }
}
