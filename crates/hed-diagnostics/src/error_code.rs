//! HeD error codes following a structured numbering system
//!
//! Error code ranges:
//! - HED0001-HED0099: Document content (non-fatal, reported as diagnostics)
//! - HED0100-HED0199: Schema declaration misuse (fatal at registration)
//! - HED0200-HED0299: Input and configuration errors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a document content problem (0001-0099)
    pub const fn is_document_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a schema declaration error (0100-0199)
    pub const fn is_schema_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an input or configuration error (0200-0299)
    pub const fn is_input_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HED{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Document content (0001-0099)
    map.insert(1, ErrorInfo::new("Unresolved type")
        .with_help("Register a node class for the discriminator or tag name"));
    map.insert(2, ErrorInfo::new("Unresolved reference"));
    map.insert(3, ErrorInfo::new("Value conversion failed"));
    map.insert(4, ErrorInfo::new("Nesting depth limit exceeded"));
    map.insert(5, ErrorInfo::new("Circular reference"));
    map.insert(6, ErrorInfo::new("Reference without a name"));
    map.insert(7, ErrorInfo::new("Node budget exhausted")
        .with_help("Raise max_nodes if the document legitimately expands this far"));

    // Schema declarations (0100-0199)
    map.insert(100, ErrorInfo::new("Invalid field path"));
    map.insert(101, ErrorInfo::new("Unknown namespace prefix"));
    map.insert(102, ErrorInfo::new("Duplicate type declaration"));
    map.insert(103, ErrorInfo::new("Unknown type")
        .with_help("Nested types must be registered before the types that use them"));
    map.insert(104, ErrorInfo::new("Invalid binding arity"));
    map.insert(105, ErrorInfo::new("Duplicate field declaration"));
    map.insert(106, ErrorInfo::new("Default value does not fit the field type"));
    map.insert(107, ErrorInfo::new("Unknown field"));

    // Input and configuration (0200-0299)
    map.insert(200, ErrorInfo::new("Malformed XML"));
    map.insert(201, ErrorInfo::new("Unexpected root element"));
    map.insert(202, ErrorInfo::new("Invalid configuration"));

    map
});

// Document content
pub const HED0001: ErrorCode = ErrorCode::new(1);
pub const HED0002: ErrorCode = ErrorCode::new(2);
pub const HED0003: ErrorCode = ErrorCode::new(3);
pub const HED0004: ErrorCode = ErrorCode::new(4);
pub const HED0005: ErrorCode = ErrorCode::new(5);
pub const HED0006: ErrorCode = ErrorCode::new(6);
pub const HED0007: ErrorCode = ErrorCode::new(7);

// Schema declarations
pub const HED0100: ErrorCode = ErrorCode::new(100);
pub const HED0101: ErrorCode = ErrorCode::new(101);
pub const HED0102: ErrorCode = ErrorCode::new(102);
pub const HED0103: ErrorCode = ErrorCode::new(103);
pub const HED0104: ErrorCode = ErrorCode::new(104);
pub const HED0105: ErrorCode = ErrorCode::new(105);
pub const HED0106: ErrorCode = ErrorCode::new(106);
pub const HED0107: ErrorCode = ErrorCode::new(107);

// Input and configuration
pub const HED0200: ErrorCode = ErrorCode::new(200);
pub const HED0201: ErrorCode = ErrorCode::new(201);
pub const HED0202: ErrorCode = ErrorCode::new(202);

/// Type discriminator or tag name matched no registered node class
pub const UNRESOLVED_TYPE: ErrorCode = HED0001;
/// Named reference exhausted every search scope
pub const UNRESOLVED_REFERENCE: ErrorCode = HED0002;
/// Text could not be parsed as the declared scalar type
pub const CONVERSION_FAILURE: ErrorCode = HED0003;
/// Nesting exceeded the configured depth
pub const RECURSION_LIMIT: ErrorCode = HED0004;
/// Reference re-entered a definition it is already resolving
pub const CYCLIC_REFERENCE: ErrorCode = HED0005;
/// Reference element carries no name
pub const MISSING_REFERENCE_NAME: ErrorCode = HED0006;
/// Mapping built more nodes than the configured budget allows
pub const NODE_LIMIT: ErrorCode = HED0007;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(HED0001.to_string(), "HED0001");
        assert_eq!(HED0107.to_string(), "HED0107");
    }

    #[test]
    fn test_error_categories() {
        assert!(UNRESOLVED_TYPE.is_document_error());
        assert!(!UNRESOLVED_TYPE.is_schema_error());
        assert!(NODE_LIMIT.is_document_error());

        assert!(HED0100.is_schema_error());
        assert!(!HED0100.is_document_error());

        assert!(HED0200.is_input_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(UNRESOLVED_REFERENCE.info().description, "Unresolved reference");
        assert!(HED0103.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
