//! Type registry
//!
//! Holds every registered node class by name. Registration is where schema
//! mistakes surface: bad paths, unknown prefixes, forward references to
//! unregistered types, duplicate names and impossible binding arities all
//! fail here, before any document is read.

use crate::options::BinderOptions;
use crate::path::FieldPath;
use crate::node::Node;
use crate::schema::{Binding, FieldType, NodeClass};
use crate::value::Value;
use hed_diagnostics::{
    ErrorBuilder, HED0102, HED0103, HED0104, HED0105, HED0106, HED0107, HED0202, HedError, Result,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of node classes
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    options: BinderOptions,
    discriminator: FieldPath,
    operand: FieldPath,
    classes: HashMap<String, Arc<NodeClass>>,
    order: Vec<String>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new(options: BinderOptions) -> Result<Self> {
        options.validate()?;
        let discriminator = FieldPath::compile(&format!("@{}", options.discriminator), &options.namespaces)
            .map_err(|e| config_context(e, "discriminator"))?;
        let operand = FieldPath::compile(&options.operand, &options.namespaces)
            .map_err(|e| config_context(e, "operand"))?;

        Ok(Self {
            options,
            discriminator,
            operand,
            classes: HashMap::new(),
            order: Vec::new(),
        })
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Path selecting the type-discriminator attribute of an element
    pub fn discriminator(&self) -> &FieldPath {
        &self.discriminator
    }

    /// Path selecting the operand children of an element
    pub fn operand(&self) -> &FieldPath {
        &self.operand
    }

    /// Validate, compile and register a node class
    pub fn register(&mut self, mut class: NodeClass) -> Result<Arc<NodeClass>> {
        let class_name = class.name().to_string();
        if class_name.is_empty() {
            return Err(HedError::schema(HED0102, "Node class name must not be empty"));
        }
        if self.classes.contains_key(&class_name) {
            return Err(ErrorBuilder::new(HED0102, format!("Type `{}` is already registered", class_name))
                .schema());
        }

        self.check_arity(&class)?;

        let mut seen = Vec::with_capacity(class.fields().len());
        for spec in class.fields_mut() {
            let context = format!("field `{}` of `{}`", spec.name(), class_name);
            if seen.contains(&spec.name().to_string()) {
                return Err(ErrorBuilder::new(HED0105, format!("Duplicate field `{}`", spec.name()))
                    .context(context)
                    .schema());
            }
            seen.push(spec.name().to_string());

            let path = match spec.source() {
                Some(source) => FieldPath::compile(source, &self.options.namespaces),
                None => FieldPath::convention(
                    spec.name(),
                    &self.options.namespaces,
                    &self.options.default_prefix,
                ),
            }
            .map_err(|e| schema_context(e, &context))?;
            spec.set_path(path);

            if let FieldType::Node(type_name) = spec.field_type() {
                if !self.classes.contains_key(type_name) {
                    return Err(ErrorBuilder::new(
                        HED0103,
                        format!("Field type `{}` is not registered", type_name),
                    )
                    .context(context)
                    .schema());
                }
            }

            match spec.default_value() {
                Some(default) if !spec.accepts(default) => {
                    return Err(ErrorBuilder::new(
                        HED0106,
                        format!("Default {} value does not fit the field type", default.kind()),
                    )
                    .context(context)
                    .schema());
                }
                _ => {}
            }
        }

        if let Binding::Reference(scopes) = class.binding_mut() {
            scopes
                .compile(&self.options.namespaces)
                .map_err(|e| schema_context(e, &format!("reference scopes of `{}`", class_name)))?;
        }

        log::trace!("Registered node class {} ({} binding)", class_name, class.binding().name());
        let class = Arc::new(class);
        self.classes.insert(class_name.clone(), Arc::clone(&class));
        self.order.push(class_name);
        Ok(class)
    }

    fn check_arity(&self, class: &NodeClass) -> Result<()> {
        let fields = class.fields().len();
        let message = match class.binding() {
            Binding::Unary if fields != 1 => Some(format!(
                "Unary type `{}` must declare exactly one field, found {}",
                class.name(),
                fields
            )),
            Binding::Nary if fields == 0 => Some(format!(
                "N-ary type `{}` must declare at least one field",
                class.name()
            )),
            Binding::Reference(scopes) if scopes.is_empty() => Some(format!(
                "Reference type `{}` declares no search scopes",
                class.name()
            )),
            _ => None,
        };
        match message {
            Some(message) => Err(HedError::schema(HED0104, message)),
            None => Ok(()),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<NodeClass>> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered type names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Build a node from positional values
    pub fn instantiate(&self, name: &str, values: impl IntoIterator<Item = Value>) -> Result<Node> {
        Ok(self.require(name)?.instantiate(values))
    }

    /// Build a node from named values
    ///
    /// Fields missing from `values` take their fallback. Unknown keys are an
    /// error.
    pub fn instantiate_map<K: AsRef<str>>(
        &self,
        name: &str,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Node> {
        let class = self.require(name)?;
        let mut slots: Vec<Option<Value>> = vec![None; class.fields().len()];

        for (key, value) in values {
            let key = key.as_ref();
            match class.field_index(key) {
                Some(index) => slots[index] = Some(value),
                None => {
                    return Err(ErrorBuilder::new(HED0107, format!("`{}` has no field `{}`", name, key))
                        .schema());
                }
            }
        }

        let values = slots
            .into_iter()
            .zip(class.fields())
            .map(|(slot, spec)| slot.unwrap_or_else(|| spec.fallback()));
        Ok(class.instantiate(values))
    }

    fn require(&self, name: &str) -> Result<&Arc<NodeClass>> {
        self.lookup(name)
            .ok_or_else(|| HedError::schema(HED0103, format!("Type `{}` is not registered", name)))
    }
}

fn schema_context(error: HedError, context: &str) -> HedError {
    match error {
        HedError::Schema { code, message, .. } => ErrorBuilder::new(code, message).context(context).schema(),
        other => other,
    }
}

fn config_context(error: HedError, option: &str) -> HedError {
    HedError::config(
        HED0202,
        format!("Invalid `{}` option: {}", option, error),
    )
}
