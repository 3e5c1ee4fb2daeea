//! Source resolution for form definitions.
//!
//! A form is addressed by `(module, name)` and lives on disk at
//! `<root>/Models/<module>/<name>.json`, versioned with the
//! application. Files are read-only as far as this crate is concerned.

use crate::document::FormDocument;
use crate::parser::parse_source;
use crate::ParseError;
use std::path::{Path, PathBuf};

/// Failure to turn a `(module, name)` pair into a parsed document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read form definition {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Canonical on-disk location of the form `name` in `module`.
pub fn resolve_path(root: &Path, module: &str, name: &str) -> PathBuf {
    root.join("Models").join(module).join(format!("{name}.json"))
}

/// Resolve, read, and parse a form definition.
pub fn load_document(root: &Path, module: &str, name: &str) -> Result<FormDocument, LoadError> {
    let path = resolve_path(root, module, name);
    let source = std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })?;
    Ok(parse_source(module, &source)?)
}
