//! Document model for parsed form definitions.
//!
//! A `FormDocument` is the parsed shape of one `.json` form definition:
//! document metadata plus an ordered list of named field nodes. Field
//! nodes are a closed union decided at parse time: ordinary leaf fields,
//! `!section(...)` groups, and `!repeat(...)` blocks.

use serde_json::{Map, Value};

/// A complete parsed form definition.
///
/// `module` is supplied by the caller at parse time; a `module` key in
/// the document itself is informational only and does not override it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDocument {
    pub name: String,
    pub module: String,
    /// Opaque construction options, forwarded verbatim to the compiled form.
    pub options: Map<String, Value>,
    /// Field nodes in document order.
    pub fields: Vec<(String, FieldNode)>,
}

/// A named entry in a `fields` mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldNode {
    /// An ordinary field: `"age": { "type": "number", "label": "Age" }`.
    Leaf(LeafField),

    /// A `!section(label)` directive: a header plus a flat body group.
    Section(SectionNode),

    /// A `!repeat(start, end)` directive: the body is stamped out once
    /// per index in `start..=end`.
    Repeat(RepeatNode),
}

/// An ordinary field awaiting type resolution and binding substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafField {
    /// Declared type name, matched case-insensitively against the
    /// field-type registry at compile time.
    pub type_name: String,
    /// Construction options (label included). May contain `!bind(...)`
    /// references; redundant `name`/`type` keys are already stripped.
    pub options: Map<String, Value>,
}

/// Body of a `!section(label)` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub label: String,
    pub body: Vec<(String, FieldNode)>,
}

/// Body and bounds of a `!repeat(start, end)` directive.
///
/// Bound shape (two non-negative integers) is validated at parse time;
/// bound ordering (`start < end`) is a compile-time check.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatNode {
    pub start: u32,
    pub end: u32,
    pub body: Vec<(String, FieldNode)>,
}
