/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Template registration and lookup.
//!
//! Both sides of a stream agree on a numeric identifier per template out
//! of band. The registry resolves identifiers to templates on decode and
//! template names back to identifiers on encode. Templates are validated
//! once, at registration, so coding never trips over a bad definition.

use crate::message::MessageTemplate;
use fastwire_core::{QName, Result, StaticError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Read access to registered templates.
pub trait TemplateRegistry: fmt::Debug + Send + Sync {
    /// Resolves a wire identifier to its template.
    fn template_by_id(&self, id: u32) -> Option<Arc<MessageTemplate>>;

    /// Resolves a template name to its template.
    fn template_by_name(&self, name: &QName) -> Option<Arc<MessageTemplate>>;

    /// Resolves a template name to its wire identifier.
    fn id_for_name(&self, name: &QName) -> Option<u32>;
}

/// An in-memory registry filled before coding starts.
#[derive(Debug, Clone, Default)]
pub struct BasicTemplateRegistry {
    by_id: HashMap<u32, Arc<MessageTemplate>>,
    ids: HashMap<QName, u32>,
}

impl BasicTemplateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers a template under a wire identifier.
    ///
    /// # Errors
    /// [`StaticError::DuplicateTemplateId`] when the identifier is taken,
    /// plus the template validation failures.
    pub fn register(&mut self, id: u32, template: MessageTemplate) -> Result<Arc<MessageTemplate>> {
        template.validate()?;
        if self.by_id.contains_key(&id) {
            return Err(StaticError::DuplicateTemplateId { id }.into());
        }
        let template = Arc::new(template);
        self.ids.insert(template.name().clone(), id);
        self.by_id.insert(id, Arc::clone(&template));
        Ok(template)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl TemplateRegistry for BasicTemplateRegistry {
    fn template_by_id(&self, id: u32) -> Option<Arc<MessageTemplate>> {
        self.by_id.get(&id).map(Arc::clone)
    }

    fn template_by_name(&self, name: &QName) -> Option<Arc<MessageTemplate>> {
        self.ids.get(name).and_then(|id| self.template_by_id(*id))
    }

    fn id_for_name(&self, name: &QName) -> Option<u32> {
        self.ids.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use crate::scalar::Scalar;
    use fastwire_core::{FastError, FastType};

    #[test]
    fn test_register_and_resolve_both_ways() {
        let mut registry = BasicTemplateRegistry::new();
        registry
            .register(113, MessageTemplate::new("Empty"))
            .unwrap();

        let by_id = registry.template_by_id(113).unwrap();
        assert_eq!(by_id.name().name(), "Empty");
        assert_eq!(registry.id_for_name(&QName::new("Empty")), Some(113));
        assert!(registry.template_by_name(&QName::new("Empty")).is_some());
        assert!(registry.template_by_id(7).is_none());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut registry = BasicTemplateRegistry::new();
        registry.register(1, MessageTemplate::new("A")).unwrap();
        let err = registry
            .register(1, MessageTemplate::new("B"))
            .unwrap_err();
        assert!(matches!(
            err,
            FastError::Static(StaticError::DuplicateTemplateId { id: 1 })
        ));
    }

    #[test]
    fn test_registration_validates_the_template() {
        let mut registry = BasicTemplateRegistry::new();
        let bad = MessageTemplate::new("Bad")
            .with_field(Scalar::new("Text", FastType::Ascii, Operator::Increment, false));
        let err = registry.register(2, bad).unwrap_err();
        assert!(matches!(
            err,
            FastError::Static(StaticError::OperatorTypeMismatch { .. })
        ));
        assert!(registry.is_empty());
    }
}
