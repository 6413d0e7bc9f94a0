//! Knowledge artifact node kinds
//!
//! Every node class of the document model is one [`Kind`] variant, and
//! [`Kind::class`] is the single place its fields and binding are declared.

use hed_binder::{FieldSpec, Node, NodeClass, ReferenceScopes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All document and expression node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    // Document structure
    VersionedIdentifier,
    Metadata,
    MeasureSubject,
    Criterion,
    MeasureDocument,

    // Logical
    AllOf,
    And,
    AnyOf,
    Or,
    Not,

    // Lists and sets
    Union,
    Intersect,
    Distinct,
    Exists,
    IsEmpty,
    IsNotEmpty,
    Expand,
    In,
    Filter,
    ForEach,

    // Aggregates
    Count,
    Median,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,

    // Dates and intervals
    DateAdd,
    DateOf,
    Interval,
    TimestampIntervalLiteral,

    // Literals
    IntegerLiteral,
    BooleanLiteral,
    StringLiteral,
    Literal,

    // Data access
    ClinicalRequest,
    Property,
    ValueSet,

    // References
    ExpressionRef,
    ParameterRef,
}

impl Kind {
    /// Every kind, ordered so nested types come before the types using them
    pub const ALL: [Kind; 45] = [
        Kind::VersionedIdentifier,
        Kind::Metadata,
        Kind::MeasureSubject,
        Kind::Criterion,
        Kind::AllOf,
        Kind::And,
        Kind::AnyOf,
        Kind::Or,
        Kind::Not,
        Kind::Union,
        Kind::Intersect,
        Kind::Distinct,
        Kind::Exists,
        Kind::IsEmpty,
        Kind::IsNotEmpty,
        Kind::Expand,
        Kind::In,
        Kind::Filter,
        Kind::ForEach,
        Kind::Count,
        Kind::Median,
        Kind::Add,
        Kind::Subtract,
        Kind::Multiply,
        Kind::Divide,
        Kind::Equal,
        Kind::NotEqual,
        Kind::Greater,
        Kind::GreaterOrEqual,
        Kind::Less,
        Kind::LessOrEqual,
        Kind::DateAdd,
        Kind::DateOf,
        Kind::Interval,
        Kind::TimestampIntervalLiteral,
        Kind::IntegerLiteral,
        Kind::BooleanLiteral,
        Kind::StringLiteral,
        Kind::Literal,
        Kind::ClinicalRequest,
        Kind::Property,
        Kind::ValueSet,
        Kind::ExpressionRef,
        Kind::ParameterRef,
        Kind::MeasureDocument,
    ];

    /// Registered type name, as matched against `xsi:type` and tag names
    pub fn name(&self) -> &'static str {
        match self {
            Kind::VersionedIdentifier => "VersionedIdentifier",
            Kind::Metadata => "Metadata",
            Kind::MeasureSubject => "MeasureSubject",
            Kind::Criterion => "Criterion",
            Kind::MeasureDocument => "MeasureDocument",
            Kind::AllOf => "AllOf",
            Kind::And => "And",
            Kind::AnyOf => "AnyOf",
            Kind::Or => "Or",
            Kind::Not => "Not",
            Kind::Union => "Union",
            Kind::Intersect => "Intersect",
            Kind::Distinct => "Distinct",
            Kind::Exists => "Exists",
            Kind::IsEmpty => "IsEmpty",
            Kind::IsNotEmpty => "IsNotEmpty",
            Kind::Expand => "Expand",
            Kind::In => "In",
            Kind::Filter => "Filter",
            Kind::ForEach => "ForEach",
            Kind::Count => "Count",
            Kind::Median => "Median",
            Kind::Add => "Add",
            Kind::Subtract => "Subtract",
            Kind::Multiply => "Multiply",
            Kind::Divide => "Divide",
            Kind::Equal => "Equal",
            Kind::NotEqual => "NotEqual",
            Kind::Greater => "Greater",
            Kind::GreaterOrEqual => "GreaterOrEqual",
            Kind::Less => "Less",
            Kind::LessOrEqual => "LessOrEqual",
            Kind::DateAdd => "DateAdd",
            Kind::DateOf => "DateOf",
            Kind::Interval => "Interval",
            Kind::TimestampIntervalLiteral => "TimestampIntervalLiteral",
            Kind::IntegerLiteral => "IntegerLiteral",
            Kind::BooleanLiteral => "BooleanLiteral",
            Kind::StringLiteral => "StringLiteral",
            Kind::Literal => "Literal",
            Kind::ClinicalRequest => "ClinicalRequest",
            Kind::Property => "Property",
            Kind::ValueSet => "ValueSet",
            Kind::ExpressionRef => "ExpressionRef",
            Kind::ParameterRef => "ParameterRef",
        }
    }

    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Kind of a bound node, if it belongs to this model
    pub fn of(node: &Node) -> Option<Kind> {
        Kind::from_name(node.type_name())
    }

    /// Whether this kind is an expression rather than document structure
    pub fn is_expression(&self) -> bool {
        !matches!(
            self,
            Kind::VersionedIdentifier
                | Kind::Metadata
                | Kind::MeasureSubject
                | Kind::Criterion
                | Kind::MeasureDocument
        )
    }

    /// Node class declaration for this kind
    pub fn class(&self) -> NodeClass {
        let class = NodeClass::new(self.name());
        match self {
            Kind::VersionedIdentifier => class
                .field(FieldSpec::new("id").at("@root").string())
                .field(FieldSpec::new("version").string()),
            Kind::Metadata => class
                .field(
                    FieldSpec::new("ids")
                        .at("ka:identifiers/ka:identifier")
                        .node(Kind::VersionedIdentifier.name())
                        .list(),
                )
                .field(
                    FieldSpec::new("schema_id")
                        .at("ka:schemaIdentifier")
                        .node(Kind::VersionedIdentifier.name()),
                )
                .field(
                    FieldSpec::new("data_models")
                        .at("ka:dataModels/ka:modelReference/ka:referencedModel/@value")
                        .string()
                        .list(),
                )
                .field(FieldSpec::new("title").at("ka:title/@value").string())
                .field(FieldSpec::new("description").at("ka:description/@value").string()),
            Kind::MeasureSubject => class
                .field(FieldSpec::new("id").at("@subjectId").string())
                .field(FieldSpec::new("subject").at("ka:expression")),
            Kind::Criterion => class
                .field(FieldSpec::new("logic").at("ka:logic/ka:expression"))
                .field(FieldSpec::new("role").at("ka:criterionRole/@value").string()),
            Kind::MeasureDocument => class
                .field(FieldSpec::new("metadata").node(Kind::Metadata.name()))
                .field(FieldSpec::new("measure_type").at("ka:measureType/@value").string())
                .field(FieldSpec::new("measure_period").at("ka:measurePeriod/ka:expression"))
                .field(FieldSpec::new("measure_subject").node(Kind::MeasureSubject.name()))
                .field(
                    FieldSpec::new("criteria")
                        .at("ka:criteria/ka:criterion")
                        .node(Kind::Criterion.name())
                        .list(),
                )
                .field(
                    FieldSpec::new("measure_observation").at("ka:measureObservation/ka:expression"),
                )
                .field(FieldSpec::new("measure_score"))
                .field(FieldSpec::new("scores")),

            Kind::AllOf | Kind::And | Kind::AnyOf | Kind::Or | Kind::Union | Kind::Intersect => {
                class.field(FieldSpec::new("args").list()).nary()
            }
            Kind::Not | Kind::Expand | Kind::DateOf => class.field(FieldSpec::new("arg")).unary(),
            Kind::Exists | Kind::IsEmpty | Kind::IsNotEmpty => {
                class.field(FieldSpec::new("list")).unary()
            }
            Kind::Add
            | Kind::Subtract
            | Kind::Multiply
            | Kind::Equal
            | Kind::NotEqual
            | Kind::Greater
            | Kind::GreaterOrEqual
            | Kind::Less
            | Kind::LessOrEqual => class
                .field(FieldSpec::new("arg_1"))
                .field(FieldSpec::new("arg_2"))
                .nary(),
            Kind::Divide => class
                .field(FieldSpec::new("numerator"))
                .field(FieldSpec::new("denominator"))
                .nary(),
            Kind::In => class
                .field(FieldSpec::new("item"))
                .field(FieldSpec::new("set"))
                .nary(),

            Kind::Distinct => class.field(FieldSpec::new("source")),
            Kind::Filter => class
                .field(FieldSpec::new("scope").string())
                .field(FieldSpec::new("source"))
                .field(FieldSpec::new("condition")),
            Kind::ForEach => class
                .field(FieldSpec::new("source"))
                .field(FieldSpec::new("element"))
                .field(FieldSpec::new("scope").string()),
            Kind::Count | Kind::Median => class
                .field(FieldSpec::new("source"))
                .field(FieldSpec::new("path").string()),
            Kind::DateAdd => class
                .field(FieldSpec::new("date"))
                .field(FieldSpec::new("granularity"))
                .field(FieldSpec::new("number_of_periods")),
            Kind::Interval => class
                .field(FieldSpec::new("begin"))
                .field(FieldSpec::new("end"))
                .field(FieldSpec::new("begin_open").boolean().default(false))
                .field(FieldSpec::new("end_open").boolean().default(false)),
            Kind::TimestampIntervalLiteral => class
                .field(FieldSpec::new("low").at("ka:low/@value").string())
                .field(FieldSpec::new("high").at("ka:high/@value").string())
                .field(FieldSpec::new("low_closed").boolean().default(false))
                .field(FieldSpec::new("high_closed").boolean().default(false)),

            Kind::IntegerLiteral => class.field(FieldSpec::new("value").integer()),
            Kind::BooleanLiteral => class.field(FieldSpec::new("value").boolean()),
            Kind::StringLiteral => class.field(FieldSpec::new("value").string()),
            Kind::Literal => class
                .field(FieldSpec::new("value_type").string())
                .field(FieldSpec::new("value").string()),

            Kind::ClinicalRequest => class
                .field(FieldSpec::new("cardinality").string())
                .field(FieldSpec::new("data_type").string())
                .field(FieldSpec::new("time_offset"))
                .field(FieldSpec::new("scope").string())
                .field(FieldSpec::new("template_id").string())
                .field(FieldSpec::new("id_property").string())
                .field(FieldSpec::new("trigger_type").string())
                .field(FieldSpec::new("codes"))
                .field(FieldSpec::new("date_range"))
                .field(FieldSpec::new("subject"))
                .field(FieldSpec::new("code_property").string())
                .field(FieldSpec::new("date_property").string())
                .field(FieldSpec::new("subject_property").string())
                .field(FieldSpec::new("is_initial").boolean().default(true))
                .field(FieldSpec::new("use_value_sets").boolean().default(false))
                .field(FieldSpec::new("use_subsumption").boolean().default(false)),
            Kind::Property => class
                .field(FieldSpec::new("path").string())
                .field(FieldSpec::new("scope").string())
                .field(FieldSpec::new("source")),
            Kind::ValueSet => class
                .field(FieldSpec::new("id").string())
                .field(FieldSpec::new("version").string())
                .field(FieldSpec::new("authority").string()),

            Kind::ExpressionRef => class.reference(
                ReferenceScopes::new()
                    .scope("/ka:measureDocument/ka:externalData/ka:def", "ka:expression")
                    .scope("/ka:measureDocument/ka:expressions/ka:def", "ka:expression")
                    .scope("/ka:measureDocument/ka:measurePeriod", "ka:expression")
                    .scope("/ka:measureDocument/ka:measureSubject", "ka:expression")
                    .scope("/ka:measureDocument/ka:criteria/ka:criterion/ka:logic", "ka:expression")
                    .scope("/ka:measureDocument/ka:measureObservation", "ka:expression"),
            ),
            Kind::ParameterRef => class.reference(
                ReferenceScopes::new()
                    .scope("/ka:measureDocument/ka:externalData/ka:parameter", "ka:default"),
            ),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
