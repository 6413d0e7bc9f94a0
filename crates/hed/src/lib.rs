//! HeD knowledge artifact binding for Rust
//!
//! This crate ties together:
//! - Declarative XML-to-node binding (`binder`)
//! - The measure document and expression model (`model`)
//! - Error codes and diagnostics (`diagnostics`)
//!
//! # Example
//!
//! ```
//! let xml = r#"<measureDocument xmlns="urn:hl7-org:knowledgeartifact:r1"
//!     xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
//!   <measurePeriod name="MeasurePeriod">
//!     <expression xsi:type="TimestampIntervalLiteral">
//!       <low value="20130101"/><high value="20140101"/>
//!     </expression>
//!   </measurePeriod>
//! </measureDocument>"#;
//!
//! let mapped = hed::parse(xml)?;
//! let period = mapped.value.measure_period().unwrap();
//! assert_eq!(period.str("low"), Some("20130101"));
//! # Ok::<(), hed::HedError>(())
//! ```

// Re-export all public APIs from internal crates
pub use hed_binder as binder;
pub use hed_diagnostics as diagnostics;
pub use hed_model as model;

// Convenience re-exports
pub use hed_binder::{BinderOptions, Mapped, Node, Value};
pub use hed_diagnostics::{Diagnostic, HedError, Result};
pub use hed_model::{Kind, MeasureDocument, MeasureParser};

/// Parse a measure document with the default model registry
pub fn parse(xml: &str) -> Result<Mapped<MeasureDocument>> {
    hed_model::parse_measure_document(xml)
}

/// Parse a measure document with custom binder options
///
/// Builds a fresh registry for the call; keep a registry and a
/// [`MeasureParser`] around instead when parsing many documents.
pub fn parse_with_options(xml: &str, options: BinderOptions) -> Result<Mapped<MeasureDocument>> {
    let registry = hed_model::build_registry(options)?;
    MeasureParser::with_registry(&registry).parse(xml)
}
