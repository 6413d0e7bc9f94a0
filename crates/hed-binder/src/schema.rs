//! Declarative node class definitions
//!
//! A [`NodeClass`] is an ordered list of [`FieldSpec`]s plus a [`Binding`]
//! that says how an element populates them. Classes are plain data until
//! they are registered; registration compiles their paths and validates the
//! declaration.

use crate::expression::ReferenceScopes;
use crate::node::Node;
use crate::path::FieldPath;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Scalar field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// The raw text
    String,
    /// Trimmed text parsed as a base-10 integer
    Integer,
    /// True only when the text is exactly `true`
    Boolean,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Integer => "Integer",
            ScalarType::Boolean => "Boolean",
        }
    }

    /// Convert inner text to a value of this type
    pub fn parse(&self, text: &str) -> Result<Value, String> {
        match self {
            ScalarType::String => Ok(Value::String(text.to_string())),
            ScalarType::Integer => text
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| format!("`{}` is not an integer: {}", text, e)),
            ScalarType::Boolean => Ok(Value::Boolean(text == "true")),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarType::String, Value::String(_))
                | (ScalarType::Integer, Value::Integer(_))
                | (ScalarType::Boolean, Value::Boolean(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// No declared type; elements are dispatched, attributes become strings
    Inferred,
    Scalar(ScalarType),
    /// A registered node class, by name
    Node(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Single,
    List,
}

/// Declaration of one field of a node class
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    source: Option<String>,
    field_type: FieldType,
    cardinality: Cardinality,
    default: Option<Value>,
    path: Option<FieldPath>,
}

impl FieldSpec {
    /// Declare a field with an inferred type, a single value and a
    /// convention-derived source path
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            field_type: FieldType::Inferred,
            cardinality: Cardinality::Single,
            default: None,
            path: None,
        }
    }

    /// Read the field from an explicit path instead of the naming convention
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn string(self) -> Self {
        self.of_type(FieldType::Scalar(ScalarType::String))
    }

    pub fn integer(self) -> Self {
        self.of_type(FieldType::Scalar(ScalarType::Integer))
    }

    pub fn boolean(self) -> Self {
        self.of_type(FieldType::Scalar(ScalarType::Boolean))
    }

    /// Bind matched elements as the named node class
    pub fn node(self, type_name: impl Into<String>) -> Self {
        self.of_type(FieldType::Node(type_name.into()))
    }

    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Collect every match instead of the first
    pub fn list(mut self) -> Self {
        self.cardinality = Cardinality::List;
        self
    }

    /// Value used when the source is absent
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit source path, if one was declared
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_list(&self) -> bool {
        self.cardinality == Cardinality::List
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Compiled path; present once the owning class is registered
    pub fn path(&self) -> Option<&FieldPath> {
        self.path.as_ref()
    }

    /// Value of an unset field: the default, else an empty list for list
    /// fields, else null
    pub fn fallback(&self) -> Value {
        match (&self.default, self.cardinality) {
            (Some(value), _) => value.clone(),
            (None, Cardinality::List) => Value::List(Vec::new()),
            (None, Cardinality::Single) => Value::Null,
        }
    }

    pub(crate) fn set_path(&mut self, path: FieldPath) {
        self.path = Some(path);
    }

    /// Whether `value` can be stored in this field
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.cardinality, value) {
            (_, Value::Null) => true,
            (Cardinality::List, Value::List(items)) => items.iter().all(|v| self.accepts_item(v)),
            (Cardinality::List, _) => false,
            (Cardinality::Single, v) => self.accepts_item(v),
        }
    }

    fn accepts_item(&self, value: &Value) -> bool {
        match (&self.field_type, value) {
            (_, Value::Null) => true,
            (FieldType::Inferred, _) => true,
            (FieldType::Scalar(scalar), v) => scalar.accepts(v),
            (FieldType::Node(type_name), v) => v.as_node().is_some_and(|n| n.type_name() == type_name),
        }
    }
}

/// How an element populates the fields of its node class
#[derive(Debug, Clone, Default)]
pub enum Binding {
    /// Each field is located by its own path
    #[default]
    Fields,
    /// The single field takes the first operand child
    Unary,
    /// Operand children fill the fields positionally, or form a list when
    /// there is exactly one field
    Nary,
    /// The element names a definition elsewhere in the document
    Reference(ReferenceScopes),
}

impl Binding {
    pub fn name(&self) -> &'static str {
        match self {
            Binding::Fields => "fields",
            Binding::Unary => "unary",
            Binding::Nary => "n-ary",
            Binding::Reference(_) => "reference",
        }
    }
}

/// A node class declaration
#[derive(Debug, Clone)]
pub struct NodeClass {
    name: String,
    fields: Vec<FieldSpec>,
    binding: Binding,
}

impl NodeClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            binding: Binding::Fields,
        }
    }

    /// Append a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn unary(self) -> Self {
        self.with_binding(Binding::Unary)
    }

    pub fn nary(self) -> Self {
        self.with_binding(Binding::Nary)
    }

    pub fn reference(self, scopes: ReferenceScopes) -> Self {
        self.with_binding(Binding::Reference(scopes))
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldSpec] {
        &mut self.fields
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(crate) fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    /// Build an instance from positional values
    ///
    /// Surplus values are dropped and missing ones take the field fallback.
    /// An explicit [`Value::Null`] is kept as given.
    pub fn instantiate(self: &Arc<Self>, values: impl IntoIterator<Item = Value>) -> Node {
        let mut values = values.into_iter();
        let values = self
            .fields
            .iter()
            .map(|spec| values.next().unwrap_or_else(|| spec.fallback()))
            .collect();
        Node::new(Arc::clone(self), values)
    }
}
