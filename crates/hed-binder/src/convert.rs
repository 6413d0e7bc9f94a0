//! Field value conversion
//!
//! Turns the XML selected by a field path into a [`Value`] according to the
//! field's declared type and cardinality.

use crate::dispatch::{Dispatch, Dispatcher};
use crate::mapper::MapContext;
use crate::schema::{Cardinality, FieldSpec, FieldType};
use crate::value::Value;
use crate::xml::{self, SourceNode};
use hed_diagnostics::{CONVERSION_FAILURE, Diagnostic};
use roxmltree::Node as XmlNode;

impl MapContext<'_> {
    /// Populate one field of `element`
    ///
    /// Absent sources take the field fallback. A source that fails to
    /// convert stays null, with the diagnostic explaining why.
    pub(crate) fn convert_field(&mut self, element: XmlNode<'_, '_>, spec: &FieldSpec) -> Value {
        let Some(path) = spec.path() else {
            return spec.fallback();
        };
        let sources = path.select(element);

        match spec.cardinality() {
            Cardinality::List => {
                if sources.is_empty() {
                    return spec.fallback();
                }
                Value::List(
                    sources
                        .into_iter()
                        .map(|source| self.convert_source(source, spec))
                        .collect(),
                )
            }
            Cardinality::Single => match sources.into_iter().next() {
                Some(source) => self.convert_source(source, spec),
                None => spec.fallback(),
            },
        }
    }

    /// Convert a single selected node
    pub(crate) fn convert_source(&mut self, source: SourceNode<'_, '_>, spec: &FieldSpec) -> Value {
        match spec.field_type() {
            FieldType::Scalar(scalar) => match scalar.parse(&source.text()) {
                Ok(value) => value,
                Err(reason) => {
                    self.report(
                        Diagnostic::warning(
                            CONVERSION_FAILURE,
                            format!("Field `{}`: {}", spec.name(), reason),
                        )
                        .with_location(source.location()),
                    );
                    Value::Null
                }
            },
            FieldType::Node(type_name) => match source {
                SourceNode::Element(element) => {
                    self.map_element(element, Some(type_name.as_str()))
                        .map(Value::from)
                        .unwrap_or_default()
                }
                SourceNode::Attribute { name, .. } => {
                    self.report(
                        Diagnostic::warning(
                            CONVERSION_FAILURE,
                            format!(
                                "Field `{}`: attribute `{}` cannot hold a {} node",
                                spec.name(),
                                name,
                                type_name
                            ),
                        )
                        .with_location(source.location()),
                    );
                    Value::Null
                }
            },
            FieldType::Inferred => match source {
                SourceNode::Attribute { value, .. } => Value::String(value.to_string()),
                SourceNode::Element(element) => self.convert_inferred(element),
            },
        }
    }

    /// Dispatch an untyped element, falling back to its text when it is a
    /// plain text leaf without a type discriminator
    pub(crate) fn convert_inferred(&mut self, element: XmlNode<'_, '_>) -> Value {
        let dispatcher = Dispatcher::new(self.registry);
        match dispatcher.resolve(element) {
            Dispatch::Resolved(class) => self.map_as(element, class).map(Value::from).unwrap_or_default(),
            Dispatch::Unresolved { candidates } => {
                if dispatcher.discriminator(element).is_none() && xml::is_text_leaf(element) {
                    Value::String(xml::text_content(element).into_owned())
                } else {
                    self.report_unresolved(element, &candidates);
                    Value::Null
                }
            }
        }
    }
}
