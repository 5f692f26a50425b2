/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Per-stream coding state.
//!
//! A [`Context`] owns every dictionary a stream uses plus the error
//! handler that decides whether reportable conditions abort or continue.
//! Encoder and decoder each hold their own context and must apply the
//! same updates in the same order to stay in sync.

use fastwire_core::{ErrorAction, ErrorHandler, FastError, QName, StrictErrorHandler};
use fastwire_dictionary::{Dictionary, DictionaryValue, FieldKey, GLOBAL, TEMPLATE, TYPE};
use std::collections::HashMap;
use std::sync::Arc;

use crate::message::MessageTemplate;

/// Dictionaries and the error handler for one direction of a stream.
#[derive(Debug, Clone)]
pub struct Context {
    dictionaries: HashMap<String, Dictionary>,
    error_handler: Arc<dyn ErrorHandler + Send + Sync>,
}

impl Context {
    /// Creates a context with the strict error handler.
    #[must_use]
    pub fn new() -> Self {
        Self::with_handler(Arc::new(StrictErrorHandler))
    }

    /// Creates a context with a caller-chosen error handler.
    #[must_use]
    pub fn with_handler(handler: Arc<dyn ErrorHandler + Send + Sync>) -> Self {
        Self {
            dictionaries: HashMap::new(),
            error_handler: handler,
        }
    }

    /// Reads the prior value under a field's dictionary and key.
    ///
    /// An unknown dictionary or key reads as
    /// [`DictionaryValue::Undefined`].
    #[must_use]
    pub fn lookup(&self, dictionary: &str, template: &MessageTemplate, key: &QName) -> DictionaryValue {
        let field_key = Self::field_key(dictionary, template, key.clone());
        match self.dictionaries.get(dictionary) {
            Some(entries) => entries.lookup(&field_key).clone(),
            None => DictionaryValue::Undefined,
        }
    }

    /// Writes the prior value under a field's dictionary and key.
    pub fn store(
        &mut self,
        dictionary: &str,
        template: &MessageTemplate,
        key: QName,
        state: DictionaryValue,
    ) {
        let field_key = Self::field_key(dictionary, template, key);
        self.dictionaries
            .entry(dictionary.to_string())
            .or_default()
            .store(field_key, state);
    }

    /// Reads a globally scoped entry without template qualification.
    #[must_use]
    pub fn lookup_global(&self, key: &QName) -> DictionaryValue {
        match self.dictionaries.get(GLOBAL) {
            Some(entries) => entries.lookup(&FieldKey::global(key.clone())).clone(),
            None => DictionaryValue::Undefined,
        }
    }

    /// Writes a globally scoped entry without template qualification.
    pub fn store_global(&mut self, key: QName, state: DictionaryValue) {
        self.dictionaries
            .entry(GLOBAL.to_string())
            .or_default()
            .store(FieldKey::global(key), state);
    }

    /// Forgets one dictionary entry, returning its slot to undefined.
    pub fn reset_entry(&mut self, dictionary: &str, template: &MessageTemplate, key: QName) {
        let field_key = Self::field_key(dictionary, template, key);
        if let Some(entries) = self.dictionaries.get_mut(dictionary) {
            entries.reset_key(&field_key);
        }
    }

    /// Returns every dictionary to its initial, undefined state.
    pub fn reset(&mut self) {
        for entries in self.dictionaries.values_mut() {
            entries.reset();
        }
    }

    /// Asks the error handler what to do about a reportable condition.
    #[must_use]
    pub fn report(&self, error: &FastError) -> ErrorAction {
        self.error_handler.on_error(error)
    }

    /// Scopes a key by the dictionary it lives in. The template dictionary
    /// qualifies by template name, the type dictionary by the template's
    /// application type. Global and custom dictionaries are unqualified.
    fn field_key(dictionary: &str, template: &MessageTemplate, name: QName) -> FieldKey {
        let scope = match dictionary {
            TEMPLATE => Some(template.name().clone()),
            TYPE => template.type_reference().cloned(),
            _ => None,
        };
        FieldKey { scope, name }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastwire_core::ScalarValue;

    fn template(name: &str) -> MessageTemplate {
        MessageTemplate::new(name)
    }

    #[test]
    fn test_lookup_before_store_is_undefined() {
        let ctx = Context::new();
        let value = ctx.lookup(GLOBAL, &template("T"), &QName::new("Price"));
        assert_eq!(value, DictionaryValue::Undefined);
    }

    #[test]
    fn test_template_dictionary_scopes_by_template_name() {
        let mut ctx = Context::new();
        let first = template("First");
        let second = template("Second");
        let key = QName::new("Price");

        ctx.store(
            TEMPLATE,
            &first,
            key.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(7)),
        );
        assert_eq!(
            ctx.lookup(TEMPLATE, &first, &key),
            DictionaryValue::Value(ScalarValue::UInt32(7))
        );
        assert_eq!(ctx.lookup(TEMPLATE, &second, &key), DictionaryValue::Undefined);
    }

    #[test]
    fn test_global_dictionary_crosses_templates() {
        let mut ctx = Context::new();
        let key = QName::new("Symbol");

        ctx.store(
            GLOBAL,
            &template("First"),
            key.clone(),
            DictionaryValue::Value(ScalarValue::Ascii("MSFT".into())),
        );
        assert_eq!(
            ctx.lookup(GLOBAL, &template("Second"), &key),
            DictionaryValue::Value(ScalarValue::Ascii("MSFT".into()))
        );
        assert_eq!(
            ctx.lookup_global(&key),
            DictionaryValue::Value(ScalarValue::Ascii("MSFT".into()))
        );
    }

    #[test]
    fn test_custom_dictionaries_are_disjoint() {
        let mut ctx = Context::new();
        let tpl = template("T");
        let key = QName::new("Qty");

        ctx.store(
            "book",
            &tpl,
            key.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(1)),
        );
        assert_eq!(ctx.lookup(GLOBAL, &tpl, &key), DictionaryValue::Undefined);
        assert_eq!(
            ctx.lookup("book", &tpl, &key),
            DictionaryValue::Value(ScalarValue::UInt32(1))
        );
    }

    #[test]
    fn test_reset_entry_clears_one_slot() {
        let mut ctx = Context::new();
        let tpl = template("T");
        let qty = QName::new("Qty");
        let px = QName::new("Px");

        ctx.store(
            GLOBAL,
            &tpl,
            qty.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(1)),
        );
        ctx.store(
            GLOBAL,
            &tpl,
            px.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(2)),
        );

        ctx.reset_entry(GLOBAL, &tpl, qty.clone());
        assert_eq!(ctx.lookup(GLOBAL, &tpl, &qty), DictionaryValue::Undefined);
        assert_eq!(
            ctx.lookup(GLOBAL, &tpl, &px),
            DictionaryValue::Value(ScalarValue::UInt32(2))
        );
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut ctx = Context::new();
        let tpl = template("T");
        let key = QName::new("Qty");

        ctx.store(
            GLOBAL,
            &tpl,
            key.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(1)),
        );
        ctx.reset();
        assert_eq!(ctx.lookup(GLOBAL, &tpl, &key), DictionaryValue::Undefined);
    }

    #[test]
    fn test_type_dictionary_scopes_by_application_type() {
        let mut ctx = Context::new();
        let with_type = MessageTemplate::new("Quote").with_type_reference(QName::new("MDEntry"));
        let same_type = MessageTemplate::new("Trade").with_type_reference(QName::new("MDEntry"));
        let key = QName::new("Px");

        ctx.store(
            TYPE,
            &with_type,
            key.clone(),
            DictionaryValue::Value(ScalarValue::UInt32(3)),
        );
        assert_eq!(
            ctx.lookup(TYPE, &same_type, &key),
            DictionaryValue::Value(ScalarValue::UInt32(3))
        );
    }
}
