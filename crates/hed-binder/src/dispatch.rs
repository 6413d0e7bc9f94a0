//! Polymorphic type dispatch
//!
//! Decides which node class an element binds to: the type discriminator
//! (`xsi:type`) when present, then the element's own tag name.

use crate::registry::TypeRegistry;
use crate::schema::NodeClass;
use crate::xml::SourceNode;
use roxmltree::Node as XmlNode;
use std::sync::Arc;

/// Outcome of dispatching an element
#[derive(Debug, Clone)]
pub enum Dispatch<'r> {
    Resolved(&'r Arc<NodeClass>),
    /// No candidate name is registered
    Unresolved { candidates: Vec<String> },
}

impl<'r> Dispatch<'r> {
    pub fn class(&self) -> Option<&'r Arc<NodeClass>> {
        match self {
            Dispatch::Resolved(class) => Some(*class),
            Dispatch::Unresolved { .. } => None,
        }
    }
}

/// Resolves elements to registered node classes
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Normalized candidate type names for `element`, in lookup order
    pub fn candidates(&self, element: XmlNode<'_, '_>) -> Vec<String> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(discriminator) = self.discriminator(element) {
            candidates.push(normalize_type_name(discriminator));
        }
        let tag = normalize_type_name(element.tag_name().name());
        if !candidates.contains(&tag) {
            candidates.push(tag);
        }
        candidates
    }

    /// Raw type-discriminator value of `element`
    pub fn discriminator<'a>(&self, element: XmlNode<'a, '_>) -> Option<&'a str> {
        self.registry
            .discriminator()
            .select_first(element)
            .and_then(|source| match source {
                SourceNode::Attribute { value, .. } => Some(value),
                SourceNode::Element(_) => None,
            })
    }

    pub fn resolve(&self, element: XmlNode<'_, '_>) -> Dispatch<'r> {
        let candidates = self.candidates(element);
        for candidate in &candidates {
            if let Some(class) = self.registry.lookup(candidate) {
                log::trace!(
                    "Dispatched <{}> to {}",
                    element.tag_name().name(),
                    class.name()
                );
                return Dispatch::Resolved(class);
            }
        }
        Dispatch::Unresolved { candidates }
    }
}

/// Strip any namespace prefix and upper-case the first letter
///
/// `ka:measureSubject` and `measureSubject` both become `MeasureSubject`.
pub fn normalize_type_name(name: &str) -> String {
    let local = name.rsplit(':').next().unwrap_or(name).trim();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
