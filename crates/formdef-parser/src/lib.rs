//! Form Definition Parser
//!
//! Parses JSON form definition documents into a `FormDocument` tree.
//! Directive keys (`!section(...)`, `!repeat(...)`) are classified into
//! tagged node variants here, at parse time, so the compiler dispatches
//! over a closed enum instead of re-inspecting key strings.
//!
//! # Example
//!
//! ```
//! use formdef_parser::parse_source;
//!
//! let doc = parse_source("members", r#"{"name": "join", "fields": {}}"#).unwrap();
//! assert_eq!(doc.name, "join");
//! assert!(doc.fields.is_empty());
//! ```

pub mod document;
pub mod loader;
pub mod parser;

pub use document::{FieldNode, FormDocument, LeafField, RepeatNode, SectionNode};
pub use loader::{load_document, resolve_path, LoadError};
pub use parser::parse_source;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
