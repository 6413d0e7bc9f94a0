//! Bound node instances

use crate::registry::TypeRegistry;
use crate::schema::NodeClass;
use crate::value::Value;
use hed_diagnostics::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

/// An instance of a registered [`NodeClass`]
///
/// Holds one value per declared field, in declaration order. Two nodes are
/// equal when they have the same class name and equal field values.
#[derive(Clone)]
pub struct Node {
    class: Arc<NodeClass>,
    values: Vec<Value>,
}

impl Node {
    pub(crate) fn new(class: Arc<NodeClass>, values: Vec<Value>) -> Self {
        debug_assert_eq!(class.fields().len(), values.len());
        Self { class, values }
    }

    /// Build a node of a registered type from `(field, value)` pairs
    ///
    /// Fields not named take their default, an empty list for list fields,
    /// or null.
    pub fn from_map<K: AsRef<str>>(
        registry: &TypeRegistry,
        type_name: &str,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self> {
        registry.instantiate_map(type_name, values)
    }

    pub fn class(&self) -> &Arc<NodeClass> {
        &self.class
    }

    /// Name of the node class
    pub fn type_name(&self) -> &str {
        self.class.name()
    }

    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name() == type_name
    }

    /// Field values in declaration order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(field name, value)` pairs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.class
            .fields()
            .iter()
            .map(|spec| spec.name())
            .zip(self.values.iter())
    }

    /// Value of a field, or `None` if the class declares no such field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.class.field_index(field).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.class.field_index(field).map(|i| &mut self.values[i])
    }

    /// Replace a field value, returning the previous one
    ///
    /// Returns `None` and leaves the node untouched if the field is unknown.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Option<Value> {
        self.get_mut(field)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_integer)
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn node(&self, field: &str) -> Option<&Node> {
        self.get(field).and_then(Value::as_node)
    }

    /// Items of a list field; empty when the field is absent or not a list
    pub fn list(&self, field: &str) -> &[Value] {
        self.get(field).and_then(Value::as_list).unwrap_or(&[])
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.class, &other.class) || self.class.name() == other.class.name())
            && self.values == other.values
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("type", self.type_name())?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
