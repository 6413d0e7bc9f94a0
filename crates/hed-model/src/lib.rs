//! HeD knowledge artifact document model
//!
//! Declares every measure document and expression node class on top of
//! `hed-binder`, and parses measure documents into them.
//!
//! # Example
//!
//! ```
//! use hed_model::parse_measure_document;
//!
//! let xml = r#"<measureDocument xmlns="urn:hl7-org:knowledgeartifact:r1">
//!   <metadata><title value="Example"/></metadata>
//!   <measureType value="Proportion"/>
//! </measureDocument>"#;
//!
//! let mapped = parse_measure_document(xml)?;
//! assert!(mapped.is_clean());
//! assert_eq!(mapped.value.measure_type(), Some("Proportion"));
//! assert_eq!(mapped.value.metadata().and_then(|m| m.title()), Some("Example"));
//! # Ok::<(), hed_diagnostics::HedError>(())
//! ```

pub mod document;
pub mod kind;
pub mod parser;
pub mod schema;

pub use document::{Criterion, MeasureDocument, MeasureSubject, Metadata, VersionedIdentifier};
pub use kind::Kind;
pub use parser::{MeasureParser, map_measure_document, parse_measure_document};
pub use schema::{build_registry, default_registry, register_all};
