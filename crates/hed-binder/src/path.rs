//! Field path compilation and selection
//!
//! Field paths are a small XPath subset, enough to locate the XML that feeds
//! a field:
//!
//! ```text
//! path      := alternative ('|' alternative)*
//! alternative := '/'? step ('/' step)*
//! step      := '.' | '@' qname | ('*' | qname) predicate*
//! predicate := '[' '@' qname '=' quoted ']' | '[' digits ']'
//! ```
//!
//! Attribute steps may only appear last. Prefixed names resolve through the
//! binder's namespace bindings; unprefixed element steps match by local name
//! in any namespace, unprefixed attribute steps match attributes without a
//! namespace.

use crate::options::Namespaces;
use crate::xml::SourceNode;
use hed_diagnostics::{HED0100, HED0101, HedError, Result};
use roxmltree::Node as XmlNode;
use std::fmt;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

type PResult<T> = ModalResult<T>;

/// A possibly prefixed XML name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    prefix: Option<String>,
    local: String,
    namespace: Option<String>,
}

impl QName {
    fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            namespace: None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Namespace URI the prefix resolved to
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn resolve(&mut self, namespaces: &Namespaces) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            match namespaces.resolve(prefix) {
                Some(uri) => self.namespace = Some(uri.to_string()),
                None => {
                    return Err(HedError::schema(
                        HED0101,
                        format!("Namespace prefix `{}` is not bound", prefix),
                    ));
                }
            }
        }
        Ok(())
    }

    fn matches_element(&self, node: XmlNode<'_, '_>) -> bool {
        let tag = node.tag_name();
        tag.name() == self.local
            && (self.namespace.is_none() || tag.namespace() == self.namespace.as_deref())
    }

    fn matches_attribute(&self, namespace: Option<&str>, local: &str) -> bool {
        local == self.local && namespace == self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(QName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    /// `[@name='value']`
    Attribute(QName, String),
    /// `[n]`, 1-based
    Position(usize),
}

impl Predicate {
    fn apply<'a, 'input>(&self, nodes: Vec<XmlNode<'a, 'input>>) -> Vec<XmlNode<'a, 'input>> {
        match self {
            Predicate::Attribute(name, value) => nodes
                .into_iter()
                .filter(|n| {
                    n.attributes().any(|a| {
                        name.matches_attribute(a.namespace(), a.name()) && a.value() == value
                    })
                })
                .collect(),
            Predicate::Position(position) => {
                nodes.into_iter().skip(position - 1).take(1).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    SelfNode,
    Element {
        test: NameTest,
        predicates: Vec<Predicate>,
    },
    Attribute(QName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alternative {
    absolute: bool,
    steps: Vec<Step>,
}

impl Alternative {
    fn select<'a, 'input>(&self, context: XmlNode<'a, 'input>, out: &mut Vec<SourceNode<'a, 'input>>) {
        let start = if self.absolute {
            context.document().root()
        } else {
            context
        };
        let mut current = vec![start];

        for step in &self.steps {
            match step {
                Step::SelfNode => {}
                Step::Element { test, predicates } => {
                    let mut next = Vec::new();
                    for node in &current {
                        let mut matched: Vec<_> = node
                            .children()
                            .filter(|c| c.is_element())
                            .filter(|c| match test {
                                NameTest::Any => true,
                                NameTest::Name(name) => name.matches_element(*c),
                            })
                            .collect();
                        for predicate in predicates {
                            matched = predicate.apply(matched);
                        }
                        next.extend(matched);
                    }
                    current = next;
                }
                Step::Attribute(name) => {
                    for owner in &current {
                        for attr in owner.attributes() {
                            if name.matches_attribute(attr.namespace(), attr.name()) {
                                out.push(SourceNode::Attribute {
                                    owner: *owner,
                                    name: attr.name(),
                                    value: attr.value(),
                                });
                            }
                        }
                    }
                    return;
                }
            }
        }

        out.extend(current.into_iter().filter(|n| n.is_element()).map(SourceNode::Element));
    }

    fn resolve(&mut self, namespaces: &Namespaces) -> Result<()> {
        for step in &mut self.steps {
            match step {
                Step::SelfNode => {}
                Step::Attribute(name) => name.resolve(namespaces)?,
                Step::Element { test, predicates } => {
                    if let NameTest::Name(name) = test {
                        name.resolve(namespaces)?;
                    }
                    for predicate in predicates {
                        if let Predicate::Attribute(name, _) = predicate {
                            name.resolve(namespaces)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// A compiled field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    source: String,
    alternatives: Vec<Alternative>,
}

impl FieldPath {
    /// Compile `source`, resolving prefixes against `namespaces`
    pub fn compile(source: &str, namespaces: &Namespaces) -> Result<Self> {
        let mut input = source;
        let mut alternatives = path_parser(&mut input).map_err(|_| {
            HedError::schema(
                HED0100,
                format!(
                    "Invalid field path `{}` at offset {}",
                    source,
                    source.len() - input.len()
                ),
            )
        })?;

        for alternative in &mut alternatives {
            let last = alternative.steps.len().saturating_sub(1);
            if alternative.steps[..last]
                .iter()
                .any(|s| matches!(s, Step::Attribute(_)))
            {
                return Err(HedError::schema(
                    HED0100,
                    format!("Invalid field path `{}`: attribute steps must come last", source),
                ));
            }
            alternative.resolve(namespaces)?;
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The path used when a field declares no explicit source:
    /// a child element in the default prefix named after the field, then
    /// an attribute of the same name
    pub fn convention(field_name: &str, namespaces: &Namespaces, default_prefix: &str) -> Result<Self> {
        let name = lower_camel(field_name);
        Self::compile(&format!("{default_prefix}:{name} | @{name}"), namespaces)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Select every node the path reaches from `context`
    ///
    /// Alternatives contribute their matches in declaration order.
    pub fn select<'a, 'input>(&self, context: XmlNode<'a, 'input>) -> Vec<SourceNode<'a, 'input>> {
        let mut out = Vec::new();
        for alternative in &self.alternatives {
            alternative.select(context, &mut out);
        }
        out
    }

    /// First node the path reaches from `context`
    pub fn select_first<'a, 'input>(&self, context: XmlNode<'a, 'input>) -> Option<SourceNode<'a, 'input>> {
        self.select(context).into_iter().next()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Convert a snake_case field name to lowerCamelCase (`arg_1` becomes `arg1`)
pub fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn path_parser(input: &mut &str) -> PResult<Vec<Alternative>> {
    let alternatives: Vec<Alternative> = delimited(
        multispace0,
        separated(1.., alternative_parser, (multispace0, '|', multispace0)),
        multispace0,
    )
    .parse_next(input)?;
    winnow::combinator::eof.parse_next(input)?;
    Ok(alternatives)
}

fn alternative_parser(input: &mut &str) -> PResult<Alternative> {
    let absolute = opt('/').parse_next(input)?.is_some();
    let steps: Vec<Step> = separated(1.., step_parser, '/').parse_next(input)?;
    Ok(Alternative { absolute, steps })
}

fn step_parser(input: &mut &str) -> PResult<Step> {
    alt((
        preceded('@', qname_parser).map(Step::Attribute),
        '.'.value(Step::SelfNode),
        element_step_parser,
    ))
    .parse_next(input)
}

fn element_step_parser(input: &mut &str) -> PResult<Step> {
    let test = alt(('*'.value(NameTest::Any), qname_parser.map(NameTest::Name))).parse_next(input)?;
    let predicates: Vec<Predicate> = repeat(0.., predicate_parser).parse_next(input)?;
    Ok(Step::Element { test, predicates })
}

fn predicate_parser(input: &mut &str) -> PResult<Predicate> {
    delimited(
        ('[', multispace0),
        alt((
            (
                preceded('@', qname_parser),
                preceded((multispace0, '=', multispace0), quoted_parser),
            )
                .map(|(name, value)| Predicate::Attribute(name, value.to_string())),
            digit1
                .try_map(str::parse::<usize>)
                .verify(|position: &usize| *position > 0)
                .map(Predicate::Position),
        )),
        (multispace0, ']'),
    )
    .parse_next(input)
}

fn quoted_parser<'a>(input: &mut &'a str) -> PResult<&'a str> {
    alt((
        delimited('\'', take_till(0.., '\''), '\''),
        delimited('"', take_till(0.., '"'), '"'),
    ))
    .parse_next(input)
}

fn qname_parser(input: &mut &str) -> PResult<QName> {
    let first = ncname_parser.parse_next(input)?;
    let second = opt(preceded(':', ncname_parser)).parse_next(input)?;
    Ok(match second {
        Some(local) => QName::new(Some(first), local),
        None => QName::new(None, first),
    })
}

fn ncname_parser<'a>(input: &mut &'a str) -> PResult<&'a str> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')),
    )
        .take()
        .parse_next(input)
}
