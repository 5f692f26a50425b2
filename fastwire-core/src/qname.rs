/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Qualified names for fields and templates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespace-qualified name.
///
/// Fields, templates, and dictionary keys are identified by a name plus an
/// optional namespace. Two names are equal only when both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct QName {
    name: String,
    namespace: String,
}

impl QName {
    /// Creates a name in the empty namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
        }
    }

    /// Creates a name in the given namespace.
    #[must_use]
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Returns the local name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace, empty when unqualified.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl From<&str> for QName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_equality_includes_namespace() {
        let plain = QName::new("Price");
        let qualified = QName::with_namespace("Price", "http://example.org/md");

        assert_ne!(plain, qualified);
        assert_eq!(plain, QName::from("Price"));
    }

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::new("Bid").to_string(), "Bid");
        assert_eq!(
            QName::with_namespace("Bid", "md").to_string(),
            "md:Bid"
        );
    }
}
