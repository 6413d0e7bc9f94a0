//! Schema-driven binding of HeD knowledge artifact XML to node graphs
//!
//! This crate provides:
//! - Declarative node classes built from [`FieldSpec`]s
//! - A [`TypeRegistry`] that validates and compiles declarations
//! - Type dispatch on `xsi:type` and tag names
//! - Scalar and nested value conversion
//! - Unary, n-ary and reference expression bindings
//! - A [`NodeMapper`] that turns elements into [`Node`]s with diagnostics
//!
//! # Example
//!
//! ```
//! use hed_binder::{BinderOptions, FieldSpec, NodeClass, NodeMapper, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new(BinderOptions::default())?;
//! registry.register(NodeClass::new("StringLiteral").field(FieldSpec::new("value").string()))?;
//!
//! let xml = r#"<stringLiteral xmlns="urn:hl7-org:knowledgeartifact:r1" value="hi"/>"#;
//! let doc = roxmltree::Document::parse(xml).unwrap();
//! let mapped = NodeMapper::new(&registry).map(doc.root_element(), None);
//! assert_eq!(mapped.value.unwrap().str("value"), Some("hi"));
//! # Ok::<(), hed_diagnostics::HedError>(())
//! ```

pub mod convert;
pub mod dispatch;
pub mod expression;
pub mod mapper;
pub mod node;
pub mod options;
pub mod path;
pub mod registry;
pub mod schema;
pub mod value;
pub mod xml;

pub use dispatch::{Dispatch, Dispatcher, normalize_type_name};
pub use expression::{ReferenceScope, ReferenceScopes};
pub use mapper::{Mapped, NodeMapper};
pub use node::Node;
pub use options::{BinderOptions, KNOWLEDGE_ARTIFACT_NS, Namespaces, XSI_NS};
pub use path::{FieldPath, lower_camel};
pub use registry::TypeRegistry;
pub use schema::{Binding, Cardinality, FieldSpec, FieldType, NodeClass, ScalarType};
pub use value::Value;
pub use xml::SourceNode;

// Re-exported so callers can parse documents without a direct dependency
pub use roxmltree;
