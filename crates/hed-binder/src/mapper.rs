//! Element to node mapping
//!
//! [`NodeMapper`] is the entry point: it dispatches an element to a node
//! class and lets the class binding populate the fields. Problems in the
//! document never abort mapping; the affected field is left null and a
//! [`Diagnostic`] is recorded alongside the result.

use crate::dispatch::{Dispatch, Dispatcher};
use crate::node::Node;
use crate::registry::TypeRegistry;
use crate::schema::{Binding, NodeClass};
use crate::value::Value;
use crate::xml;
use hed_diagnostics::{Diagnostic, NODE_LIMIT, RECURSION_LIMIT, UNRESOLVED_TYPE};
use roxmltree::Node as XmlNode;
use std::sync::Arc;

/// A mapped value together with the diagnostics recorded while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Mapped<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Whether mapping recorded nothing at all
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Mapped<U> {
        Mapped {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }
}

/// Maps XML elements to nodes of a [`TypeRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct NodeMapper<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> NodeMapper<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Map `element`, as `type_hint` when given, else as whatever the
    /// element dispatches to
    ///
    /// The value is `None` when no class could be determined.
    pub fn map(&self, element: XmlNode<'_, '_>, type_hint: Option<&str>) -> Mapped<Option<Node>> {
        let mut context = MapContext::new(self.registry);
        let node = context.map_element(element, type_hint);
        Mapped::new(node, context.into_diagnostics())
    }

    /// Map each element independently, collecting all diagnostics
    pub fn map_all<'a, 'input: 'a>(
        &self,
        elements: impl IntoIterator<Item = XmlNode<'a, 'input>>,
    ) -> Mapped<Vec<Option<Node>>> {
        let mut context = MapContext::new(self.registry);
        let nodes = elements
            .into_iter()
            .map(|element| context.map_element(element, None))
            .collect();
        Mapped::new(nodes, context.into_diagnostics())
    }
}

/// State of a single mapping run
pub(crate) struct MapContext<'r> {
    pub(crate) registry: &'r TypeRegistry,
    depth: usize,
    /// `Type:name` keys of references currently being resolved
    pub(crate) resolving: Vec<String>,
    /// Nodes bound so far in this run
    built: usize,
    exhausted: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> MapContext<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            depth: 0,
            resolving: Vec::new(),
            built: 0,
            exhausted: false,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn map_element(&mut self, element: XmlNode<'_, '_>, type_hint: Option<&str>) -> Option<Node> {
        let registry = self.registry;
        let class = match type_hint {
            Some(name) => match registry.lookup(name) {
                Some(class) => class,
                None => {
                    self.report_unresolved(element, &[name.to_string()]);
                    return None;
                }
            },
            None => match Dispatcher::new(registry).resolve(element) {
                Dispatch::Resolved(class) => class,
                Dispatch::Unresolved { candidates } => {
                    self.report_unresolved(element, &candidates);
                    return None;
                }
            },
        };
        self.map_as(element, class)
    }

    /// Bind `element` with an already resolved class
    pub(crate) fn map_as(&mut self, element: XmlNode<'_, '_>, class: &Arc<NodeClass>) -> Option<Node> {
        if self.depth >= self.registry.options().max_depth {
            self.report(
                Diagnostic::error(
                    RECURSION_LIMIT,
                    format!(
                        "Nesting deeper than {} elements at <{}>",
                        self.registry.options().max_depth,
                        element.tag_name().name()
                    ),
                )
                .with_location(xml::location(element)),
            );
            return None;
        }

        let max_nodes = self.registry.options().max_nodes;
        if self.built >= max_nodes {
            // Reported once; everything after the limit is skipped silently
            if !self.exhausted {
                self.exhausted = true;
                self.report(
                    Diagnostic::error(
                        NODE_LIMIT,
                        format!("Mapping stopped after {} nodes at <{}>", max_nodes, element.tag_name().name()),
                    )
                    .with_location(xml::location(element)),
                );
            }
            return None;
        }
        self.built += 1;

        self.depth += 1;
        let node = match class.binding() {
            Binding::Fields => {
                let values: Vec<Value> = class
                    .fields()
                    .iter()
                    .map(|spec| self.convert_field(element, spec))
                    .collect();
                Some(class.instantiate(values))
            }
            Binding::Unary => Some(self.bind_unary(element, class)),
            Binding::Nary => Some(self.bind_nary(element, class)),
            Binding::Reference(scopes) => self.resolve_reference(element, class, scopes),
        };
        self.depth -= 1;
        node
    }

    pub(crate) fn report_unresolved(&mut self, element: XmlNode<'_, '_>, candidates: &[String]) {
        self.report(
            Diagnostic::error(
                UNRESOLVED_TYPE,
                format!("No registered type for <{}>", element.tag_name().name()),
            )
            .with_location(xml::location(element))
            .with_help(format!("Tried {}", candidates.join(", "))),
        );
    }
}
