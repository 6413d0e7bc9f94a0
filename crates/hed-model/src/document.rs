//! Typed views over a bound measure document
//!
//! The binder produces plain [`Node`]s. These wrappers give the document
//! structure named accessors while expressions stay generic nodes.

use crate::kind::Kind;
use hed_binder::{Node, Value};
use serde::{Serialize, Serializer};

/// A bound `measureDocument`
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureDocument {
    node: Node,
}

impl MeasureDocument {
    /// Wrap a node, returning it back if it is not a measure document
    pub fn from_node(node: Node) -> std::result::Result<Self, Node> {
        if node.is_a(Kind::MeasureDocument.name()) {
            Ok(Self { node })
        } else {
            Err(node)
        }
    }

    pub fn metadata(&self) -> Option<Metadata<'_>> {
        self.node.node("metadata").map(Metadata)
    }

    /// Measure scoring type, e.g. `ContinuousVariable`
    pub fn measure_type(&self) -> Option<&str> {
        self.node.str("measure_type")
    }

    pub fn measure_period(&self) -> Option<&Node> {
        self.node.node("measure_period")
    }

    pub fn measure_subject(&self) -> Option<MeasureSubject<'_>> {
        self.node.node("measure_subject").map(MeasureSubject)
    }

    /// Population criteria in document order
    pub fn criteria(&self) -> impl Iterator<Item = Criterion<'_>> {
        self.node
            .list("criteria")
            .iter()
            .filter_map(Value::as_node)
            .map(Criterion)
    }

    /// First criterion with the given role
    pub fn criterion(&self, role: &str) -> Option<Criterion<'_>> {
        self.criteria().find(|c| c.role() == Some(role))
    }

    pub fn measure_observation(&self) -> Option<&Node> {
        self.node.node("measure_observation")
    }

    pub fn measure_score(&self) -> Option<&Node> {
        self.node.node("measure_score")
    }

    pub fn scores(&self) -> Option<&Value> {
        self.node.get("scores").filter(|v| !v.is_null())
    }

    pub fn as_node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

impl Serialize for MeasureDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.node.serialize(serializer)
    }
}

/// Artifact metadata
#[derive(Debug, Clone, Copy)]
pub struct Metadata<'a>(&'a Node);

impl<'a> Metadata<'a> {
    pub fn ids(&self) -> impl Iterator<Item = VersionedIdentifier<'a>> {
        self.0
            .list("ids")
            .iter()
            .filter_map(Value::as_node)
            .map(VersionedIdentifier)
    }

    pub fn schema_id(&self) -> Option<VersionedIdentifier<'a>> {
        self.0.node("schema_id").map(VersionedIdentifier)
    }

    /// Referenced data model URNs
    pub fn data_models(&self) -> impl Iterator<Item = &'a str> {
        self.0.list("data_models").iter().filter_map(Value::as_str)
    }

    pub fn title(&self) -> Option<&'a str> {
        self.0.str("title")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.0.str("description")
    }

    pub fn as_node(&self) -> &'a Node {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VersionedIdentifier<'a>(&'a Node);

impl<'a> VersionedIdentifier<'a> {
    pub fn id(&self) -> Option<&'a str> {
        self.0.str("id")
    }

    pub fn version(&self) -> Option<&'a str> {
        self.0.str("version")
    }

    pub fn as_node(&self) -> &'a Node {
        self.0
    }
}

/// Population the measure is evaluated over
#[derive(Debug, Clone, Copy)]
pub struct MeasureSubject<'a>(&'a Node);

impl<'a> MeasureSubject<'a> {
    pub fn id(&self) -> Option<&'a str> {
        self.0.str("id")
    }

    pub fn subject(&self) -> Option<&'a Node> {
        self.0.node("subject")
    }

    pub fn as_node(&self) -> &'a Node {
        self.0
    }
}

/// A role-tagged piece of measure logic
#[derive(Debug, Clone, Copy)]
pub struct Criterion<'a>(&'a Node);

impl<'a> Criterion<'a> {
    pub fn logic(&self) -> Option<&'a Node> {
        self.0.node("logic")
    }

    /// Criterion role, e.g. `InitialPopulation` or `Stratifier`
    pub fn role(&self) -> Option<&'a str> {
        self.0.str("role")
    }

    pub fn as_node(&self) -> &'a Node {
        self.0
    }
}
