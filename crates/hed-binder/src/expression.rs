//! Expression bindings
//!
//! Operator elements carry their arguments as operand children rather than
//! as named fields. Unary classes take the first operand, n-ary classes take
//! them positionally (or as one list), and reference classes resolve a named
//! definition elsewhere in the document.

use crate::mapper::MapContext;
use crate::node::Node;
use crate::options::Namespaces;
use crate::path::FieldPath;
use crate::schema::NodeClass;
use crate::value::Value;
use crate::xml;
use hed_diagnostics::{
    CYCLIC_REFERENCE, Diagnostic, MISSING_REFERENCE_NAME, Result, UNRESOLVED_REFERENCE,
};
use roxmltree::Node as XmlNode;
use std::sync::Arc;

/// One place a named definition may live
#[derive(Debug, Clone)]
pub struct ReferenceScope {
    container: String,
    body: String,
    compiled: Option<(FieldPath, FieldPath)>,
}

impl ReferenceScope {
    /// Path to the candidate containers, evaluated from the document root
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Path from a matching container to the definition body
    pub fn body(&self) -> &str {
        &self.body
    }

    fn find<'a, 'input>(
        &self,
        document: XmlNode<'a, 'input>,
        name_attribute: &str,
        name: &str,
    ) -> Option<XmlNode<'a, 'input>> {
        let (container, body) = self.compiled.as_ref()?;
        container
            .select(document)
            .into_iter()
            .filter_map(xml::SourceNode::as_element)
            .filter(|c| c.attribute(name_attribute) == Some(name))
            .find_map(|c| body.select(c).into_iter().find_map(xml::SourceNode::as_element))
    }
}

/// Ordered search scopes of a reference class; the first hit wins
#[derive(Debug, Clone, Default)]
pub struct ReferenceScopes {
    scopes: Vec<ReferenceScope>,
}

impl ReferenceScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scope: containers selected by `container` whose name
    /// attribute matches, then their child selected by `body`
    pub fn scope(mut self, container: impl Into<String>, body: impl Into<String>) -> Self {
        self.scopes.push(ReferenceScope {
            container: container.into(),
            body: body.into(),
            compiled: None,
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceScope> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub(crate) fn compile(&mut self, namespaces: &Namespaces) -> Result<()> {
        for scope in &mut self.scopes {
            let container = FieldPath::compile(&scope.container, namespaces)?;
            let body = FieldPath::compile(&scope.body, namespaces)?;
            scope.compiled = Some((container, body));
        }
        Ok(())
    }
}

impl MapContext<'_> {
    fn operands<'a, 'input>(&self, element: XmlNode<'a, 'input>) -> Vec<XmlNode<'a, 'input>> {
        self.registry
            .operand()
            .select(element)
            .into_iter()
            .filter_map(xml::SourceNode::as_element)
            .collect()
    }

    fn map_operand(&mut self, operand: XmlNode<'_, '_>) -> Value {
        self.map_element(operand, None).map(Value::from).unwrap_or_default()
    }

    /// The single field takes the first operand; later operands are ignored
    pub(crate) fn bind_unary(&mut self, element: XmlNode<'_, '_>, class: &Arc<NodeClass>) -> Node {
        let value = match self.operands(element).first() {
            Some(operand) => self.map_operand(*operand),
            None => Value::Null,
        };
        let value = match (value, class.fields().first()) {
            (Value::Null, Some(spec)) => spec.fallback(),
            (value, _) => value,
        };
        class.instantiate([value])
    }

    /// One field collects every operand as a list; several fields are
    /// filled positionally, dropping surplus operands and leaving missing
    /// ones at their fallback
    pub(crate) fn bind_nary(&mut self, element: XmlNode<'_, '_>, class: &Arc<NodeClass>) -> Node {
        let operands: Vec<Value> = self
            .operands(element)
            .into_iter()
            .map(|operand| self.map_operand(operand))
            .collect();

        let arity = class.fields().len();
        if arity == 1 {
            return class.instantiate([Value::List(operands)]);
        }
        if operands.len() > arity {
            log::debug!(
                "{} takes {} operands, ignoring {} more",
                class.name(),
                arity,
                operands.len() - arity
            );
        }
        class.instantiate(operands)
    }

    /// Resolve a reference element to the definition it names
    ///
    /// The result is the mapped definition itself, not a reference node.
    pub(crate) fn resolve_reference(
        &mut self,
        element: XmlNode<'_, '_>,
        class: &Arc<NodeClass>,
        scopes: &ReferenceScopes,
    ) -> Option<Node> {
        let registry = self.registry;
        let name_attribute = registry.options().reference_name.as_str();
        let Some(name) = element.attribute(name_attribute) else {
            self.report(
                Diagnostic::error(
                    MISSING_REFERENCE_NAME,
                    format!("{} has no `{}` attribute", class.name(), name_attribute),
                )
                .with_location(xml::location(element)),
            );
            return None;
        };

        let key = format!("{}:{}", class.name(), name);
        if self.resolving.contains(&key) {
            self.report(
                Diagnostic::error(
                    CYCLIC_REFERENCE,
                    format!("{} `{}` refers back to itself", class.name(), name),
                )
                .with_location(xml::location(element))
                .with_help(format!("Resolution chain: {}", self.resolving.join(" -> "))),
            );
            return None;
        }

        let root = element.document().root();
        let Some(target) = scopes.iter().find_map(|scope| scope.find(root, name_attribute, name))
        else {
            let searched: Vec<String> = scopes
                .iter()
                .map(|s| format!("{}[@{}='{}']/{}", s.container(), name_attribute, name, s.body()))
                .collect();
            self.report(
                Diagnostic::error(
                    UNRESOLVED_REFERENCE,
                    format!("{} `{}` does not name any definition", class.name(), name),
                )
                .with_location(xml::location(element))
                .with_help(format!("Searched {}", searched.join(", "))),
            );
            return None;
        };

        log::trace!("Resolved {} `{}` at {}", class.name(), name, xml::location(target));
        self.resolving.push(key);
        let node = self.map_element(target, None);
        self.resolving.pop();
        node
    }
}
