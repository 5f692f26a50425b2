/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! In-memory dictionary store.
//!
//! A [`Dictionary`] maps field keys to [`DictionaryValue`] entries. Entries
//! are scoped: the global dictionary keys by field name alone, while
//! template- and type-scoped lookups qualify the key with the owning
//! template or application type name so identical field names in different
//! templates do not collide.

use crate::entry::DictionaryValue;
use fastwire_core::QName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of a dictionary entry: an optional scope plus the field's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    /// Scope qualifier, `None` for globally scoped entries.
    pub scope: Option<QName>,
    /// Qualified field name.
    pub name: QName,
}

impl FieldKey {
    /// Creates a key inside an explicit scope.
    #[must_use]
    pub fn scoped(scope: QName, name: QName) -> Self {
        Self {
            scope: Some(scope),
            name,
        }
    }

    /// Creates an unscoped (global) key.
    #[must_use]
    pub fn global(name: QName) -> Self {
        Self { scope: None, name }
    }
}

/// A mutable map of previous values.
///
/// Dictionaries hold the state that conditions transfer encoding. Both
/// sides of a stream must apply identical updates, so the encoder and the
/// decoder each own their copy and reset them together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    entries: HashMap<FieldKey, DictionaryValue>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an entry, treating absent slots as undefined.
    #[must_use]
    pub fn lookup(&self, key: &FieldKey) -> &DictionaryValue {
        static UNDEFINED: DictionaryValue = DictionaryValue::Undefined;
        self.entries.get(key).unwrap_or(&UNDEFINED)
    }

    /// Stores an entry, replacing any previous state.
    pub fn store(&mut self, key: FieldKey, value: DictionaryValue) {
        self.entries.insert(key, value);
    }

    /// Forgets one entry, returning its slot to undefined.
    pub fn reset_key(&mut self, key: &FieldKey) {
        self.entries.remove(key);
    }

    /// Forgets all entries, returning every slot to undefined.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of assigned slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no slot has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
