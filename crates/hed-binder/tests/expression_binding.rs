//! Unary, n-ary and reference binding tests

use hed_binder::{
    BinderOptions, FieldSpec, Node, NodeClass, NodeMapper, ReferenceScopes, TypeRegistry, Value,
};
use hed_diagnostics::{
    CYCLIC_REFERENCE, MISSING_REFERENCE_NAME, NODE_LIMIT, RECURSION_LIMIT, UNRESOLVED_REFERENCE,
    UNRESOLVED_TYPE,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn registry_with(options: BinderOptions) -> TypeRegistry {
    let mut registry = TypeRegistry::new(options).unwrap();
    registry
        .register(NodeClass::new("IntegerLiteral").field(FieldSpec::new("value").integer()))
        .unwrap();
    registry.register(NodeClass::new("Not").field(FieldSpec::new("arg")).unary()).unwrap();
    registry
        .register(NodeClass::new("And").field(FieldSpec::new("args").list()).nary())
        .unwrap();
    registry
        .register(
            NodeClass::new("Subtract")
                .field(FieldSpec::new("arg_1"))
                .field(FieldSpec::new("arg_2"))
                .nary(),
        )
        .unwrap();
    registry
        .register(
            NodeClass::new("Ref").reference(
                ReferenceScopes::new()
                    .scope("/ka:doc/ka:defs/ka:def", "ka:expression")
                    .scope("/ka:doc/ka:criteria/ka:criterion", "ka:logic/ka:expression"),
            ),
        )
        .unwrap();
    registry
}

fn registry() -> TypeRegistry {
    registry_with(BinderOptions::default())
}

fn wrap(body: &str) -> String {
    format!(
        r#"<doc xmlns="urn:hl7-org:knowledgeartifact:r1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <defs>
    <def name="One"><expression xsi:type="IntegerLiteral" value="1"/></def>
    <def name="Shared"><expression xsi:type="IntegerLiteral" value="10"/></def>
    <def name="Loop"><expression xsi:type="Ref" name="Loop"/></def>
    <def name="PingA"><expression xsi:type="Ref" name="PingB"/></def>
    <def name="PingB"><expression xsi:type="Ref" name="PingA"/></def>
  </defs>
  <criteria>
    <criterion name="Shared"><logic><expression xsi:type="IntegerLiteral" value="20"/></logic></criterion>
    <criterion name="Two"><logic><expression xsi:type="IntegerLiteral" value="2"/></logic></criterion>
  </criteria>
  <body>{body}</body>
</doc>"#
    )
}

fn int(registry: &TypeRegistry, value: i64) -> Value {
    Value::from(registry.instantiate("IntegerLiteral", vec![Value::from(value)]).unwrap())
}

fn map_body(registry: &TypeRegistry, body: &str) -> (Option<Node>, Vec<hed_diagnostics::Diagnostic>) {
    map_document(registry, &wrap(body))
}

fn map_document(registry: &TypeRegistry, xml: &str) -> (Option<Node>, Vec<hed_diagnostics::Diagnostic>) {
    let doc = roxmltree::Document::parse(xml).unwrap();
    let element = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("body"))
        .and_then(|body| body.first_element_child())
        .unwrap();
    NodeMapper::new(registry).map(element, None).into_parts()
}

#[test]
fn test_unary_takes_first_operand() {
    let registry = registry();
    let (node, diagnostics) = map_body(
        &registry,
        r#"<expression xsi:type="Not">
             <operand xsi:type="IntegerLiteral" value="1"/>
             <operand xsi:type="IntegerLiteral" value="2"/>
           </expression>"#,
    );
    assert!(diagnostics.is_empty());
    assert_eq!(node.unwrap().get("arg"), Some(&int(&registry, 1)));
}

#[test]
fn test_unary_without_operand() {
    let registry = registry();
    let (node, diagnostics) = map_body(&registry, r#"<expression xsi:type="Not"/>"#);
    assert!(diagnostics.is_empty());
    assert_eq!(node.unwrap().get("arg"), Some(&Value::Null));
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
fn test_single_field_nary_collects_all(#[case] count: i64) {
    let registry = registry();
    let operands: String = (0..count)
        .map(|i| format!(r#"<operand xsi:type="IntegerLiteral" value="{i}"/>"#))
        .collect();
    let (node, _) = map_body(&registry, &format!(r#"<expression xsi:type="And">{operands}</expression>"#));

    let expected: Vec<Value> = (0..count).map(|i| int(&registry, i)).collect();
    assert_eq!(node.unwrap().get("args"), Some(&Value::List(expected)));
}

#[test]
fn test_positional_nary() {
    let registry = registry();
    let (node, diagnostics) = map_body(
        &registry,
        r#"<expression xsi:type="Subtract">
             <operand xsi:type="IntegerLiteral" value="5"/>
             <operand xsi:type="IntegerLiteral" value="3"/>
           </expression>"#,
    );
    assert!(diagnostics.is_empty());
    let node = node.unwrap();
    assert_eq!(node.get("arg_1"), Some(&int(&registry, 5)));
    assert_eq!(node.get("arg_2"), Some(&int(&registry, 3)));
}

#[test]
fn test_operand_with_unknown_type() {
    let registry = registry();
    let (node, diagnostics) = map_body(
        &registry,
        r#"<expression xsi:type="Subtract">
             <operand xsi:type="Mystery"/>
             <operand xsi:type="IntegerLiteral" value="3"/>
           </expression>"#,
    );
    let node = node.unwrap();
    assert_eq!(node.get("arg_1"), Some(&Value::Null));
    assert_eq!(node.get("arg_2"), Some(&int(&registry, 3)));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, UNRESOLVED_TYPE);
}

proptest! {
    #[test]
    fn prop_positional_nary_truncates_and_pads(count in 0usize..6) {
        let registry = registry();
        let operands: String = (0..count)
            .map(|i| format!(r#"<operand xsi:type="IntegerLiteral" value="{i}"/>"#))
            .collect();
        let (node, diagnostics) =
            map_body(&registry, &format!(r#"<expression xsi:type="Subtract">{operands}</expression>"#));
        prop_assert!(diagnostics.is_empty());

        let node = node.unwrap();
        prop_assert_eq!(node.values().len(), 2);
        for (i, value) in node.values().iter().enumerate() {
            if i < count {
                prop_assert_eq!(value, &int(&registry, i as i64));
            } else {
                prop_assert_eq!(value, &Value::Null);
            }
        }
    }
}

#[rstest]
#[case("One", 1)]
#[case("Two", 2)]
#[case("Shared", 10)]
fn test_reference_resolves_in_scope_order(#[case] name: &str, #[case] expected: i64) {
    let registry = registry();
    let (node, diagnostics) =
        map_body(&registry, &format!(r#"<expression xsi:type="Ref" name="{name}"/>"#));
    assert!(diagnostics.is_empty());
    assert_eq!(node.map(Value::from), Some(int(&registry, expected)));
}

#[test]
fn test_reference_inside_operator() {
    let registry = registry();
    let (node, diagnostics) = map_body(
        &registry,
        r#"<expression xsi:type="Subtract">
             <operand xsi:type="Ref" name="Two"/>
             <operand xsi:type="Ref" name="One"/>
           </expression>"#,
    );
    assert!(diagnostics.is_empty());
    let node = node.unwrap();
    assert_eq!(node.get("arg_1"), Some(&int(&registry, 2)));
    assert_eq!(node.get("arg_2"), Some(&int(&registry, 1)));
}

#[rstest]
#[case(r#"<expression xsi:type="Ref" name="Nowhere"/>"#, UNRESOLVED_REFERENCE)]
#[case(r#"<expression xsi:type="Ref"/>"#, MISSING_REFERENCE_NAME)]
#[case(r#"<expression xsi:type="Ref" name="Loop"/>"#, CYCLIC_REFERENCE)]
#[case(r#"<expression xsi:type="Ref" name="PingA"/>"#, CYCLIC_REFERENCE)]
fn test_reference_failures(#[case] body: &str, #[case] code: hed_diagnostics::ErrorCode) {
    let registry = registry();
    let (node, diagnostics) = map_body(&registry, body);
    assert_eq!(node, None);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, code);
    assert!(diagnostics[0].location.is_some());
}

#[test]
fn test_depth_limit() {
    let registry = registry_with(BinderOptions::default().with_max_depth(3));
    let (node, diagnostics) = map_body(
        &registry,
        r#"<expression xsi:type="Not">
             <operand xsi:type="Not">
               <operand xsi:type="Not">
                 <operand xsi:type="IntegerLiteral" value="1"/>
               </operand>
             </operand>
           </expression>"#,
    );

    let inner = node.as_ref().and_then(|n| n.node("arg")).and_then(|n| n.node("arg")).unwrap();
    assert_eq!(inner.get("arg"), Some(&Value::Null));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, RECURSION_LIMIT);
}

/// `D0` is a literal; every `D{i}` is an `And` referencing `D{i-1}` twice
fn doubling_chain(levels: usize) -> String {
    let mut defs = String::from(
        r#"<def name="D0"><expression xsi:type="IntegerLiteral" value="1"/></def>"#,
    );
    for i in 1..=levels {
        defs.push_str(&format!(
            r#"<def name="D{i}"><expression xsi:type="And"><operand xsi:type="Ref" name="D{p}"/><operand xsi:type="Ref" name="D{p}"/></expression></def>"#,
            p = i - 1
        ));
    }
    format!(
        r#"<doc xmlns="urn:hl7-org:knowledgeartifact:r1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <defs>{defs}</defs>
  <body><expression xsi:type="Ref" name="D{levels}"/></body>
</doc>"#
    )
}

fn count_literals(value: &Value) -> usize {
    match value {
        Value::Node(node) if node.is_a("IntegerLiteral") => 1,
        Value::Node(node) => node.values().iter().map(count_literals).sum(),
        Value::List(items) => items.iter().map(count_literals).sum(),
        _ => 0,
    }
}

#[test]
fn test_repeated_references_expand_within_budget() {
    let registry = registry();
    let (node, diagnostics) = map_document(&registry, &doubling_chain(4));
    assert!(diagnostics.is_empty());
    assert_eq!(count_literals(&Value::from(node)), 16);
}

#[test]
fn test_node_budget_stops_exponential_expansion() {
    let registry = registry_with(BinderOptions::default().with_max_nodes(500));
    let (node, diagnostics) = map_document(&registry, &doubling_chain(40));

    assert!(node.is_some());
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![NODE_LIMIT]);
}

#[test]
fn test_map_all_collects_every_diagnostic() {
    let registry = registry();
    let xml = wrap(
        r#"<expression xsi:type="Ref" name="Nowhere"/><expression xsi:type="IntegerLiteral" value="4"/><thing/>"#,
    );
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let body = doc.root_element().children().find(|n| n.has_tag_name("body")).unwrap();

    let mapped = NodeMapper::new(&registry).map_all(body.children().filter(|n| n.is_element()));
    assert_eq!(mapped.value.len(), 3);
    assert_eq!(mapped.value[1].clone().map(Value::from), Some(int(&registry, 4)));
    let codes: Vec<_> = mapped.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![UNRESOLVED_REFERENCE, UNRESOLVED_TYPE]);
    assert!(mapped.has_errors());
}
