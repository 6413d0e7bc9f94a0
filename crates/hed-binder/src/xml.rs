//! Read-only helpers over the parsed XML tree

use hed_diagnostics::{SourceLocation, Span};
use roxmltree::Node as XmlNode;
use std::borrow::Cow;

/// A node selected by a field path: an element or one of its attributes
#[derive(Debug, Clone, Copy)]
pub enum SourceNode<'a, 'input: 'a> {
    Element(XmlNode<'a, 'input>),
    Attribute {
        owner: XmlNode<'a, 'input>,
        name: &'a str,
        value: &'a str,
    },
}

impl<'a, 'input: 'a> SourceNode<'a, 'input> {
    /// The element, if this is an element
    pub fn as_element(self) -> Option<XmlNode<'a, 'input>> {
        match self {
            SourceNode::Element(node) => Some(node),
            SourceNode::Attribute { .. } => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, SourceNode::Attribute { .. })
    }

    /// Local name of the element or attribute
    pub fn name(&self) -> &'a str {
        match self {
            SourceNode::Element(node) => node.tag_name().name(),
            SourceNode::Attribute { name, .. } => name,
        }
    }

    /// Inner text: the attribute value, or the element's concatenated text
    pub fn text(&self) -> Cow<'a, str> {
        match self {
            SourceNode::Element(node) => text_content(*node),
            SourceNode::Attribute { value, .. } => Cow::Borrowed(value),
        }
    }

    /// Location of the element (or the attribute's owning element)
    pub fn location(&self) -> SourceLocation {
        match self {
            SourceNode::Element(node) => location(*node),
            SourceNode::Attribute { owner, .. } => location(*owner),
        }
    }
}

/// Concatenated text of all descendant text nodes
pub fn text_content<'a>(node: XmlNode<'a, '_>) -> Cow<'a, str> {
    let mut texts = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text());

    let Some(first) = texts.next() else {
        return Cow::Borrowed("");
    };
    match texts.next() {
        None => Cow::Borrowed(first),
        Some(second) => {
            let mut text = String::from(first);
            text.push_str(second);
            texts.for_each(|t| text.push_str(t));
            Cow::Owned(text)
        }
    }
}

/// Whether the element has text but no child elements
pub fn is_text_leaf(node: XmlNode<'_, '_>) -> bool {
    !node.children().any(|c| c.is_element()) && node.children().any(|c| c.is_text())
}

/// Line and column of a node within its document
pub fn location(node: XmlNode<'_, '_>) -> SourceLocation {
    SourceLocation::from_span(Span::from(node.range()), node.document().input_text())
}
