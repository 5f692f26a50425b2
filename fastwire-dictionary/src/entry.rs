/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Dictionary entry states.
//!
//! Every dictionary slot is in one of three states: it has never been
//! assigned, it was explicitly emptied by a null transfer, or it holds a
//! value. Operators branch on all three, so the distinction between
//! undefined and empty is load-bearing.

use fastwire_core::ScalarValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DictionaryValue {
    /// Never assigned since the last reset.
    #[default]
    Undefined,
    /// Explicitly assigned the null value.
    Empty,
    /// Holds a previous value.
    Value(ScalarValue),
}

impl DictionaryValue {
    /// Returns true when the entry has never been assigned.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true when the entry was assigned null.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Borrows the held value, if any.
    #[must_use]
    pub const fn as_value(&self) -> Option<&ScalarValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the entry, yielding the held value if any.
    #[must_use]
    pub fn into_value(self) -> Option<ScalarValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Wraps an optional value: `None` becomes [`Self::Empty`].
    #[must_use]
    pub fn from_option(value: Option<ScalarValue>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Empty,
        }
    }
}

impl From<ScalarValue> for DictionaryValue {
    fn from(value: ScalarValue) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for DictionaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Empty => write!(f, "empty"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}
