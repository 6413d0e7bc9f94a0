//! Measure document parsing
//!
//! Parses knowledge artifact XML and binds its root `measureDocument`
//! element. Malformed XML and a foreign root element are hard errors; any
//! problem inside the document is reported as a diagnostic instead.

use crate::document::MeasureDocument;
use crate::kind::Kind;
use crate::schema::default_registry;
use hed_binder::{Mapped, NodeMapper, TypeRegistry};
use hed_diagnostics::{ErrorBuilder, HED0200, HED0201, Result, SourceLocation};
use roxmltree::Document;

const ROOT_ELEMENT: &str = "measureDocument";

/// Parser for measure documents
#[derive(Debug, Clone, Copy)]
pub struct MeasureParser<'r> {
    registry: &'r TypeRegistry,
}

impl MeasureParser<'static> {
    /// Parser over the default model registry
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }
}

impl Default for MeasureParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> MeasureParser<'r> {
    /// Parser over a caller-built registry, e.g. one with custom options
    pub fn with_registry(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Parse and bind a complete measure document
    pub fn parse(&self, xml: &str) -> Result<Mapped<MeasureDocument>> {
        let document = Document::parse(xml).map_err(|err| {
            let pos = err.pos();
            let location = text_pos_location(xml, pos.row as usize, pos.col as usize);
            ErrorBuilder::new(HED0200, err.to_string()).at(location).input()
        })?;
        map_measure_document(&document, self.registry)
    }
}

/// Bind the root of an already parsed document
pub fn map_measure_document(
    document: &Document<'_>,
    registry: &TypeRegistry,
) -> Result<Mapped<MeasureDocument>> {
    let root = document.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(ErrorBuilder::new(
            HED0201,
            format!("Expected `{}` root element, found `{}`", ROOT_ELEMENT, root.tag_name().name()),
        )
        .at(hed_binder::xml::location(root))
        .input());
    }

    log::debug!("Binding measure document ({} bytes)", document.input_text().len());
    let (node, diagnostics) = NodeMapper::new(registry)
        .map(root, Some(Kind::MeasureDocument.name()))
        .into_parts();

    // The root always resolves through the type hint; only the depth guard can reject it
    let node = match node {
        Some(node) => node,
        None => registry.instantiate(Kind::MeasureDocument.name(), [])?,
    };
    let document = MeasureDocument::from_node(node).map_err(|node| {
        ErrorBuilder::new(
            HED0201,
            format!("Root bound as `{}` instead of a measure document", node.type_name()),
        )
        .input()
    })?;

    if !diagnostics.is_empty() {
        log::debug!("Measure document bound with {} diagnostics", diagnostics.len());
    }
    Ok(Mapped::new(document, diagnostics))
}

/// Parse and bind with the default registry
pub fn parse_measure_document(xml: &str) -> Result<Mapped<MeasureDocument>> {
    MeasureParser::new().parse(xml)
}

fn text_pos_location(source: &str, row: usize, col: usize) -> SourceLocation {
    let offset = source
        .split_inclusive('\n')
        .take(row.saturating_sub(1))
        .map(str::len)
        .sum::<usize>()
        + col.saturating_sub(1);
    SourceLocation::new(row, col, offset.min(source.len()), 0)
}
