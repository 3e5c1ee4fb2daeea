//! Field type registry.
//!
//! The closed set of field kinds the form renderer understands, plus
//! the case-insensitive name lookup the compiler resolves declared
//! `type` strings through. The mapping is declared statically and
//! injected into the compiler, so there is no runtime discovery and an
//! unknown name is always a hard error.

use serde::Serialize;

/// A concrete field kind. Discriminants are the wire constants the
/// renderer keys its widget dispatch on.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text = 0,
    Textarea = 1,
    Password = 2,
    Email = 3,
    Number = 4,
    Date = 5,
    Checkbox = 6,
    Radio = 7,
    Select = 8,
    Hidden = 9,
    Submit = 10,
    /// Non-interactive group header, emitted for `!section(...)`.
    Section = 11,
}

impl FieldType {
    /// The wire constant for this kind.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Name-to-kind lookup table for declared field types.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<(&'static str, FieldType)>,
}

impl TypeRegistry {
    /// Registry over the full built-in field type set.
    pub fn new() -> Self {
        Self {
            entries: vec![
                ("text", FieldType::Text),
                ("textarea", FieldType::Textarea),
                ("password", FieldType::Password),
                ("email", FieldType::Email),
                ("number", FieldType::Number),
                ("date", FieldType::Date),
                ("checkbox", FieldType::Checkbox),
                ("radio", FieldType::Radio),
                ("select", FieldType::Select),
                ("hidden", FieldType::Hidden),
                ("submit", FieldType::Submit),
                ("section", FieldType::Section),
            ],
        }
    }

    /// Case-insensitive lookup of a declared type name.
    pub fn resolve(&self, name: &str) -> Option<FieldType> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.resolve("text"), Some(FieldType::Text));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.resolve("TeXt"), Some(FieldType::Text));
        assert_eq!(registry.resolve("EMAIL"), Some(FieldType::Email));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.resolve("carousel"), None);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(FieldType::Text.code(), 0);
        assert_eq!(FieldType::Section.code(), 11);
    }
}
