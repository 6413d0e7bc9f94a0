//! Expression node binding against the model registry

use hed_binder::{Node, NodeMapper, Value};
use hed_model::{Kind, default_registry};
use pretty_assertions::assert_eq;
use roxmltree::{Document, Node as XmlNode};
use rstest::rstest;

const FRAGMENTS: &str = include_str!("fixtures/expressions.xml");

fn lookup<'a, 'input>(doc: &'a Document<'input>, name: &str) -> XmlNode<'a, 'input> {
    doc.root_element()
        .children()
        .find(|n| n.has_tag_name("externalData"))
        .and_then(|data| {
            data.children()
                .find(|n| n.has_tag_name("def") && n.attribute("name") == Some(name))
        })
        .and_then(|def| def.children().find(|n| n.has_tag_name("expression")))
        .unwrap_or_else(|| panic!("no fragment named {name}"))
}

fn from_fragment(kind: Kind, postfix: Option<&str>) -> Node {
    let _ = env_logger::builder().is_test(true).try_init();
    let name = match postfix {
        Some(postfix) => format!("{}_{}", kind.name(), postfix),
        None => kind.name().to_string(),
    };
    let doc = Document::parse(FRAGMENTS).unwrap();
    let mapped = NodeMapper::new(default_registry()).map(lookup(&doc, &name), Some(kind.name()));
    assert!(mapped.is_clean(), "{name}: {:?}", mapped.diagnostics);
    mapped.value.unwrap()
}

fn from_snippet(kind: Kind, body: &str) -> Node {
    let xml = format!(
        r#"<root xmlns="urn:hl7-org:knowledgeartifact:r1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
             <expression xsi:type="{}">{}</expression>
           </root>"#,
        kind.name(),
        body
    );
    let doc = Document::parse(&xml).unwrap();
    let element = doc.root_element().first_element_child().unwrap();
    let mapped = NodeMapper::new(default_registry()).map(element, Some(kind.name()));
    assert!(mapped.is_clean(), "{kind}: {:?}", mapped.diagnostics);
    mapped.value.unwrap()
}

fn kind_of(node: &Node, field: &str) -> Option<Kind> {
    node.node(field).and_then(Kind::of)
}

#[test]
fn test_clinical_request_everything() {
    let exp = from_fragment(Kind::ClinicalRequest, Some("Everything"));
    assert_eq!(exp.str("cardinality"), Some("Multiple"));
    assert_eq!(exp.str("data_type"), Some("vmr:Encounter"));
    assert_eq!(exp.str("code_property"), Some("encounterCode"));
    assert_eq!(exp.str("date_property"), Some("effectiveDateTime.low"));
    assert_eq!(exp.str("subject_property"), Some("evaluatedPersonId"));
    assert_eq!(exp.boolean("use_value_sets"), Some(true));
    assert_eq!(exp.boolean("use_subsumption"), Some(true));
    assert_eq!(exp.str("scope"), Some("ED"));
    assert_eq!(exp.str("template_id"), Some("abc"));
    assert_eq!(exp.str("id_property"), Some("xyz"));
    assert_eq!(exp.str("trigger_type"), Some("DataElementAdded"));
    assert_eq!(exp.boolean("is_initial"), Some(false));
    assert_eq!(kind_of(&exp, "codes"), Some(Kind::ValueSet));
    assert_eq!(kind_of(&exp, "date_range"), Some(Kind::TimestampIntervalLiteral));
    assert_eq!(kind_of(&exp, "subject"), Some(Kind::ClinicalRequest));
    assert_eq!(kind_of(&exp, "time_offset"), Some(Kind::IntegerLiteral));
}

#[test]
fn test_clinical_request_minimal() {
    let exp = from_fragment(Kind::ClinicalRequest, Some("Minimal"));
    assert_eq!(exp.str("cardinality"), Some("Single"));
    assert_eq!(exp.str("data_type"), Some("vmr:Patient"));
    assert_eq!(exp.boolean("use_value_sets"), Some(false));
    assert_eq!(exp.boolean("use_subsumption"), Some(false));
    assert_eq!(exp.boolean("is_initial"), Some(true));
    assert_eq!(exp.get("codes"), Some(&Value::Null));
}

#[test]
fn test_count() {
    let exp = from_fragment(Kind::Count, None);
    assert_eq!(kind_of(&exp, "source"), Some(Kind::Distinct));
    assert_eq!(exp.str("path"), Some("value"));
}

#[test]
fn test_date_add() {
    let exp = from_fragment(Kind::DateAdd, None);
    assert_eq!(kind_of(&exp, "date"), Some(Kind::Property));
    assert_eq!(kind_of(&exp, "granularity"), Some(Kind::Literal));
    assert_eq!(kind_of(&exp, "number_of_periods"), Some(Kind::IntegerLiteral));
}

#[test]
fn test_distinct() {
    let exp = from_fragment(Kind::Distinct, None);
    assert_eq!(kind_of(&exp, "source"), Some(Kind::Union));
}

#[test]
fn test_divide() {
    let exp = from_fragment(Kind::Divide, None);
    assert_eq!(exp.node("numerator").and_then(|n| n.integer("value")), Some(150));
    assert_eq!(exp.node("denominator").and_then(|n| n.integer("value")), Some(3));
}

#[test]
fn test_equal() {
    let exp = from_fragment(Kind::Equal, None);
    assert_eq!(kind_of(&exp, "arg_1"), Some(Kind::Property));
    assert_eq!(kind_of(&exp, "arg_2"), Some(Kind::StringLiteral));
}

#[rstest]
#[case("ExternalData", "ABCD")]
#[case("Expressions", "EFG")]
#[case("MeasurePeriod", "HIJK")]
#[case("MeasureSubject", "LMNOP")]
#[case("Criterion", "QRS")]
#[case("MeasureObservation", "TUV")]
fn test_expression_ref(#[case] target: &str, #[case] expected: &str) {
    let exp = from_fragment(Kind::ExpressionRef, Some(target));
    assert_eq!(Kind::of(&exp), Some(Kind::StringLiteral));
    assert_eq!(exp.str("value"), Some(expected));
}

#[test]
fn test_parameter_ref() {
    let exp = from_fragment(Kind::ParameterRef, None);
    assert_eq!(exp.str("value"), Some("WXYZ"));
}

#[test]
fn test_filter() {
    let exp = from_fragment(Kind::Filter, None);
    assert_eq!(kind_of(&exp, "source"), Some(Kind::ClinicalRequest));
    assert_eq!(kind_of(&exp, "condition"), Some(Kind::Equal));
    assert_eq!(exp.str("scope"), Some("abc"));
}

#[rstest]
#[case(Kind::GreaterOrEqual)]
#[case(Kind::LessOrEqual)]
fn test_comparison_10_20(#[case] kind: Kind) {
    let exp = from_fragment(kind, None);
    assert_eq!(exp.node("arg_1").and_then(|n| n.integer("value")), Some(10));
    assert_eq!(exp.node("arg_2").and_then(|n| n.integer("value")), Some(20));
}

#[test]
fn test_for_each() {
    let exp = from_fragment(Kind::ForEach, None);
    assert_eq!(kind_of(&exp, "source"), Some(Kind::Union));
    assert_eq!(kind_of(&exp, "element"), Some(Kind::Subtract));
    assert_eq!(exp.str("scope"), Some("xyz"));
}

#[test]
fn test_in() {
    let exp = from_fragment(Kind::In, None);
    assert_eq!(kind_of(&exp, "item"), Some(Kind::Property));
    assert_eq!(kind_of(&exp, "set"), Some(Kind::ValueSet));
}

#[test]
fn test_integer_literal() {
    let exp = from_fragment(Kind::IntegerLiteral, None);
    assert_eq!(exp.integer("value"), Some(42));
}

#[test]
fn test_interval_everything() {
    let exp = from_fragment(Kind::Interval, Some("Everything"));
    assert_eq!(kind_of(&exp, "begin"), Some(Kind::Property));
    assert_eq!(kind_of(&exp, "end"), Some(Kind::DateAdd));
    assert_eq!(exp.boolean("begin_open"), Some(true));
    assert_eq!(exp.boolean("end_open"), Some(true));
}

#[test]
fn test_interval_minimal() {
    let exp = from_fragment(Kind::Interval, Some("Minimal"));
    assert_eq!(exp.get("begin"), Some(&Value::Null));
    assert_eq!(exp.get("end"), Some(&Value::Null));
    assert_eq!(exp.boolean("begin_open"), Some(false));
    assert_eq!(exp.boolean("end_open"), Some(false));
}

#[test]
fn test_literal() {
    let exp = from_fragment(Kind::Literal, None);
    assert_eq!(exp.str("value_type"), Some("DateGranularity"));
    assert_eq!(exp.str("value"), Some("Hour"));
}

#[test]
fn test_median() {
    let exp = from_fragment(Kind::Median, None);
    assert_eq!(kind_of(&exp, "source"), Some(Kind::Union));
    assert_eq!(exp.str("path"), Some("value"));
}

#[test]
fn test_property_everything() {
    let exp = from_fragment(Kind::Property, Some("Everything"));
    assert_eq!(exp.str("scope"), Some("Numbers"));
    assert_eq!(exp.str("path"), Some("value"));
    assert_eq!(kind_of(&exp, "source"), Some(Kind::IntegerLiteral));
}

#[test]
fn test_property_minimal() {
    let exp = from_fragment(Kind::Property, Some("Minimal"));
    assert_eq!(exp.str("scope"), Some("ED"));
    assert_eq!(exp.str("path"), Some("dischargeStatus"));
    assert_eq!(exp.get("source"), Some(&Value::Null));
}

#[test]
fn test_string_literal() {
    let exp = from_fragment(Kind::StringLiteral, None);
    assert_eq!(exp.str("value"), Some("Hello World"));
}

#[test]
fn test_subtract() {
    let exp = from_fragment(Kind::Subtract, None);
    assert_eq!(exp.node("arg_1").and_then(|n| n.integer("value")), Some(20));
    assert_eq!(exp.node("arg_2").and_then(|n| n.integer("value")), Some(10));
}

#[rstest]
#[case("Everything", true)]
#[case("Minimal", false)]
fn test_timestamp_interval_literal(#[case] postfix: &str, #[case] closed: bool) {
    let exp = from_fragment(Kind::TimestampIntervalLiteral, Some(postfix));
    assert_eq!(exp.str("low"), Some("20130101"));
    assert_eq!(exp.str("high"), Some("20140101"));
    assert_eq!(exp.boolean("low_closed"), Some(closed));
    assert_eq!(exp.boolean("high_closed"), Some(closed));
}

#[test]
fn test_value_set() {
    let exp = from_fragment(Kind::ValueSet, None);
    assert_eq!(exp.str("id"), Some("2.16.840.1.113883.3.666.5.1146"));
    assert_eq!(exp.str("version"), Some("20130401"));
    assert_eq!(exp.str("authority"), Some("VSAC"));
}

#[test]
fn test_boolean_literal() {
    let exp = from_fragment(Kind::BooleanLiteral, None);
    assert_eq!(exp.boolean("value"), Some(true));
}

#[test]
fn test_or_collects_operands() {
    let exp = from_fragment(Kind::Or, None);
    let values: Vec<_> = exp
        .list("args")
        .iter()
        .filter_map(|v| v.as_node().and_then(|n| n.boolean("value")))
        .collect();
    assert_eq!(values, vec![true, false]);
}

#[test]
fn test_exists() {
    let exp = from_fragment(Kind::Exists, None);
    assert_eq!(kind_of(&exp, "list"), Some(Kind::ClinicalRequest));
}

#[rstest]
#[case(Kind::AllOf)]
#[case(Kind::And)]
#[case(Kind::AnyOf)]
#[case(Kind::Union)]
#[case(Kind::Intersect)]
fn test_single_arg_nary(#[case] kind: Kind) {
    let empty = from_snippet(kind, "");
    assert_eq!(empty.get("args"), Some(&Value::List(vec![])));

    let exp = from_snippet(
        kind,
        r#"<operand xsi:type="IntegerLiteral" value="1"/>
           <operand xsi:type="IntegerLiteral" value="2"/>
           <operand xsi:type="IntegerLiteral" value="3"/>"#,
    );
    let values: Vec<_> = exp
        .list("args")
        .iter()
        .filter_map(|v| v.as_node().and_then(|n| n.integer("value")))
        .collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[rstest]
#[case(Kind::DateOf, "arg")]
#[case(Kind::Expand, "arg")]
#[case(Kind::IsEmpty, "list")]
#[case(Kind::IsNotEmpty, "list")]
#[case(Kind::Not, "arg")]
fn test_unary(#[case] kind: Kind, #[case] field: &str) {
    let empty = from_snippet(kind, "");
    assert_eq!(empty.get(field), Some(&Value::Null));

    let exp = from_snippet(kind, r#"<operand xsi:type="IntegerLiteral" value="42"/>"#);
    assert_eq!(exp.node(field).and_then(|n| n.integer("value")), Some(42));
}
