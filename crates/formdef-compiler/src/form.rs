//! Compiled form objects.
//!
//! `CompiledForm` is the flat, ordered output of compilation: concrete
//! fields ready for rendering and validation. The compiler only ever
//! appends to it, in discovery order, and never reads it back.

use crate::types::FieldType;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};

/// Reserved prefix for synthetic section-header field names. User field
/// names never collide with headers because directive keys (the only
/// place `!` appears) never reach the form as field names.
const SECTION_NAME_PREFIX: &str = "__section_";

/// A fully compiled form: metadata plus ordered concrete fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledForm {
    pub name: String,
    pub module: String,
    pub action: String,
    pub options: Map<String, Value>,
    pub fields: Vec<Field>,
}

impl CompiledForm {
    pub fn new(name: &str, module: &str, action: &str, options: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            module: module.to_string(),
            action: action.to_string(),
            options,
            fields: Vec::new(),
        }
    }

    /// Append a field. Order of calls is the order of rendering.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }
}

/// One concrete field in a compiled form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub options: Map<String, Value>,
}

impl Field {
    pub fn new(name: String, field_type: FieldType, options: Map<String, Value>) -> Self {
        Self {
            name,
            field_type,
            options,
        }
    }

    /// Synthetic header field for a `!section(label)` directive. The
    /// name encodes the label reversibly, so equal labels map to equal
    /// names and distinct labels never collide. `suffix` carries the
    /// enclosing repeat indices; it joins with `.`, which is outside
    /// the base64url alphabet, so headers stamped out by a repeat stay
    /// distinct and the label stays recoverable.
    pub fn section_header(label: &str, suffix: &str) -> Self {
        let encoded = URL_SAFE_NO_PAD.encode(label);
        let name = if suffix.is_empty() {
            format!("{SECTION_NAME_PREFIX}{encoded}")
        } else {
            format!("{SECTION_NAME_PREFIX}{encoded}.{suffix}")
        };
        let mut options = Map::new();
        options.insert("label".to_string(), Value::String(label.to_string()));
        Self::new(name, FieldType::Section, options)
    }

    /// Recover the label a section-header name was derived from.
    /// `None` for ordinary fields.
    pub fn section_label(&self) -> Option<String> {
        let rest = self.name.strip_prefix(SECTION_NAME_PREFIX)?;
        let encoded = match rest.split_once('.') {
            Some((encoded, _)) => encoded,
            None => rest,
        };
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_field_preserves_order() {
        let mut form = CompiledForm::new("join", "members", "save", Map::new());
        form.add_field(Field::new("a".into(), FieldType::Text, Map::new()));
        form.add_field(Field::new("b".into(), FieldType::Email, Map::new()));
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_section_header_is_deterministic() {
        let first = Field::section_header("Contact Details", "");
        let second = Field::section_header("Contact Details", "");
        assert_eq!(first, second);
        assert_eq!(first.field_type, FieldType::Section);
        assert_eq!(first.options["label"], "Contact Details");
        assert_eq!(first.options.len(), 1);
    }

    #[test]
    fn test_section_header_names_do_not_collide() {
        let one = Field::section_header("Header", "");
        let other = Field::section_header("header", "");
        assert_ne!(one.name, other.name);
    }

    #[test]
    fn test_section_header_suffix_distinguishes_iterations() {
        let first = Field::section_header("Block", "0");
        let second = Field::section_header("Block", "1");
        assert_ne!(first.name, second.name);
        assert_eq!(first.options["label"], "Block");
        assert_eq!(second.options["label"], "Block");
    }

    #[test]
    fn test_section_label_round_trip() {
        let header = Field::section_header("Emergency Contacts", "");
        assert_eq!(header.section_label().as_deref(), Some("Emergency Contacts"));
    }

    #[test]
    fn test_section_label_round_trip_with_suffix() {
        let header = Field::section_header("Emergency Contacts", "02");
        assert_eq!(header.section_label().as_deref(), Some("Emergency Contacts"));
    }

    #[test]
    fn test_ordinary_field_has_no_section_label() {
        let field = Field::new("surname".into(), FieldType::Text, Map::new());
        assert_eq!(field.section_label(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let mut form = CompiledForm::new("join", "members", "save", Map::new());
        form.add_field(Field::new("age".into(), FieldType::Number, Map::new()));
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["name"], "join");
        assert_eq!(json["fields"][0]["type"], "number");
    }
}
