//! Binder configuration
//!
//! Everything the binder needs to know about the XML vocabulary lives here:
//! namespace prefixes used by field paths, the default prefix for
//! convention-derived paths, the type-discriminator attribute, and the
//! operand element used by unary and n-ary bindings.

use hed_diagnostics::{HED0202, HedError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Knowledge artifact namespace
pub const KNOWLEDGE_ARTIFACT_NS: &str = "urn:hl7-org:knowledgeartifact:r1";

/// XML Schema instance namespace (carries `xsi:type`)
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefix to namespace URI bindings used when compiling field paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespaces(IndexMap<String, String>);

impl Namespaces {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// The `ka` and `xsi` bindings used by knowledge artifact documents
    pub fn knowledge_artifact() -> Self {
        Self::new()
            .bind("ka", KNOWLEDGE_ARTIFACT_NS)
            .bind("xsi", XSI_NS)
    }

    /// Bind a prefix, replacing any previous binding for it
    pub fn bind(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.0.insert(prefix.into(), uri.into());
        self
    }

    /// Look up the URI bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Iterate over `(prefix, uri)` pairs in binding order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::knowledge_artifact()
    }
}

/// Binder options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BinderOptions {
    /// Prefix bindings available to field paths
    pub namespaces: Namespaces,
    /// Prefix applied to convention-derived element paths
    pub default_prefix: String,
    /// Qualified name of the type-discriminator attribute
    pub discriminator: String,
    /// Qualified name of operand child elements
    pub operand: String,
    /// Attribute carrying the target name on reference elements
    pub reference_name: String,
    /// Maximum element nesting depth the mapper will descend into
    pub max_depth: usize,
    /// Maximum number of nodes a single mapping run may build, counting
    /// every expansion of a referenced definition
    pub max_nodes: usize,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            namespaces: Namespaces::default(),
            default_prefix: "ka".to_string(),
            discriminator: "xsi:type".to_string(),
            operand: "ka:operand".to_string(),
            reference_name: "name".to_string(),
            max_depth: 256,
            max_nodes: 100_000,
        }
    }
}

impl BinderOptions {
    /// Create options with the knowledge artifact defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON, filling absent keys with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| HedError::config(HED0202, format!("Invalid binder options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Bind an additional namespace prefix
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces = self.namespaces.bind(prefix, uri);
        self
    }

    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }

    pub fn with_discriminator(mut self, name: impl Into<String>) -> Self {
        self.discriminator = name.into();
        self
    }

    pub fn with_operand(mut self, name: impl Into<String>) -> Self {
        self.operand = name.into();
        self
    }

    pub fn with_reference_name(mut self, name: impl Into<String>) -> Self {
        self.reference_name = name.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Check the options for internal consistency
    ///
    /// Prefixes used by the discriminator and operand names are checked when
    /// the registry compiles them.
    pub fn validate(&self) -> Result<()> {
        if self.namespaces.resolve(&self.default_prefix).is_none() {
            return Err(HedError::config(
                HED0202,
                format!("Default prefix `{}` is not bound to a namespace", self.default_prefix),
            ));
        }
        if self.max_depth == 0 {
            return Err(HedError::config(HED0202, "max_depth must be at least 1"));
        }
        if self.max_nodes == 0 {
            return Err(HedError::config(HED0202, "max_nodes must be at least 1"));
        }
        if self.reference_name.is_empty() {
            return Err(HedError::config(HED0202, "reference_name must not be empty"));
        }
        Ok(())
    }
}
