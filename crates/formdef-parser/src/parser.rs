//! JSON document parser for form definitions.
//!
//! Converts raw JSON text into a `FormDocument`. The JSON must be an
//! object with a string `name`, an optional `options` object, and a
//! `fields` object whose entry order is preserved. Keys beginning with
//! `!` are directive nodes and are classified here into their node
//! variants; everything else is an ordinary leaf field.

use crate::document::{FieldNode, FormDocument, LeafField, RepeatNode, SectionNode};
use crate::ParseError;
use serde_json::{Map, Value};

/// Reserved prefix marking a directive key (or a `!bind(...)` value).
pub const DIRECTIVE_PREFIX: char = '!';

/// Parse raw JSON text into a `FormDocument`.
///
/// `module` is the caller-supplied namespace the form belongs to. The
/// document's own `module` key, if present, is ignored in its favor.
pub fn parse_source(module: &str, source: &str) -> Result<FormDocument, ParseError> {
    let root: Value = serde_json::from_str(source).map_err(json_error)?;

    let Value::Object(map) = root else {
        return Err(structural_error("document root must be an object"));
    };

    let name = match map.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(structural_error("document 'name' must be a string")),
        None => return Err(structural_error("document is missing a 'name' key")),
    };

    let options = match map.get("options") {
        Some(Value::Object(options)) => options.clone(),
        Some(_) => return Err(structural_error("document 'options' must be an object")),
        None => Map::new(),
    };

    let fields = match map.get("fields") {
        Some(Value::Object(fields)) => parse_fields(fields)?,
        Some(_) => return Err(structural_error("document 'fields' must be an object")),
        None => return Err(structural_error("document is missing a 'fields' key")),
    };

    Ok(FormDocument {
        name,
        module: module.to_string(),
        options,
        fields,
    })
}

/// Parse a `fields` object into an ordered list of named nodes.
/// Recurses through directive bodies, so sections and repeats may nest.
fn parse_fields(fields: &Map<String, Value>) -> Result<Vec<(String, FieldNode)>, ParseError> {
    let mut nodes = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        let node = if key.starts_with(DIRECTIVE_PREFIX) {
            parse_directive(key, value)?
        } else {
            parse_leaf(key, value)?
        };
        nodes.push((key.clone(), node));
    }

    Ok(nodes)
}

/// Parse an ordinary field node: an object with a string `type` plus
/// arbitrary construction options.
fn parse_leaf(name: &str, value: &Value) -> Result<FieldNode, ParseError> {
    let Value::Object(entries) = value else {
        return Err(structural_error(format!(
            "field '{name}' must be an object"
        )));
    };

    let type_name = match entries.get("type") {
        Some(Value::String(type_name)) => type_name.clone(),
        Some(_) => {
            return Err(structural_error(format!(
                "field '{name}' has a non-string 'type'"
            )))
        }
        None => {
            return Err(structural_error(format!(
                "field '{name}' is missing a 'type' key"
            )))
        }
    };

    // `name` and `type` are metadata, not construction options. A
    // redundant `name` key inside the node is dropped the same way.
    let options: Map<String, Value> = entries
        .iter()
        .filter(|(key, _)| key.as_str() != "name" && key.as_str() != "type")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(FieldNode::Leaf(LeafField { type_name, options }))
}

/// Parse a directive key of the form `!keyword(args)` together with its
/// body object.
fn parse_directive(key: &str, value: &Value) -> Result<FieldNode, ParseError> {
    let Some((keyword, args)) = split_directive(key) else {
        return Err(structural_error(format!("illegal directive name '{key}'")));
    };

    let Value::Object(entries) = value else {
        return Err(structural_error(format!(
            "directive '{key}' body must be an object"
        )));
    };
    let body = parse_fields(entries)?;

    match keyword {
        "section" => Ok(FieldNode::Section(SectionNode {
            label: args.trim().to_string(),
            body,
        })),
        "repeat" => {
            let (start, end) = parse_repeat_bounds(key, args)?;
            Ok(FieldNode::Repeat(RepeatNode { start, end, body }))
        }
        _ => Err(structural_error(format!("illegal directive name '{key}'"))),
    }
}

/// Split `!keyword(args)` into its keyword and raw argument text.
/// Returns `None` when the key does not have that shape.
fn split_directive(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(DIRECTIVE_PREFIX)?;
    let open = rest.find('(')?;
    let inner = rest[open + 1..].strip_suffix(')')?;
    Some((rest[..open].trim(), inner))
}

/// Parse the two non-negative integer arguments of `!repeat(start, end)`.
/// Whitespace around each argument is tolerated.
fn parse_repeat_bounds(key: &str, args: &str) -> Result<(u32, u32), ParseError> {
    let mut parts = args.split(',');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(structural_error(format!(
            "directive '{key}' takes exactly two arguments"
        )));
    };

    let parse_bound = |text: &str| -> Result<u32, ParseError> {
        text.trim().parse().map_err(|_| {
            structural_error(format!(
                "directive '{key}' has a malformed bound '{}'",
                text.trim()
            ))
        })
    };

    Ok((parse_bound(start)?, parse_bound(end)?))
}

/// Map a serde_json syntax error into `ParseError`, keeping its
/// line/column and trimming the position suffix from its message.
fn json_error(err: serde_json::Error) -> ParseError {
    let full = err.to_string();
    let message = full
        .split(" at line ")
        .next()
        .unwrap_or(full.as_str())
        .to_string();
    ParseError {
        message,
        line: err.line(),
        column: err.column(),
    }
}

/// A document-shape error with no meaningful source position.
fn structural_error(message: impl Into<String>) -> ParseError {
    ParseError {
        message: message.into(),
        line: 0,
        column: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> FormDocument {
        parse_source("members", source).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        parse_source("members", source).unwrap_err()
    }

    fn leaf<'a>(doc: &'a FormDocument, index: usize) -> (&'a str, &'a LeafField) {
        match &doc.fields[index] {
            (name, FieldNode::Leaf(leaf)) => (name, leaf),
            (name, other) => panic!("Expected leaf '{name}', got {other:?}"),
        }
    }

    // =========================================================================
    // Document shape
    // =========================================================================

    #[test]
    fn test_empty_fields() {
        let doc = parse(r#"{"name": "join", "fields": {}}"#);
        assert_eq!(doc.name, "join");
        assert_eq!(doc.module, "members");
        assert!(doc.options.is_empty());
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn test_options_forwarded() {
        let doc = parse(r#"{"name": "join", "options": {"method": "post"}, "fields": {}}"#);
        assert_eq!(doc.options["method"], "post");
    }

    #[test]
    fn test_caller_module_wins() {
        let doc = parse(r#"{"name": "join", "module": "legacy", "fields": {}}"#);
        assert_eq!(doc.module, "members");
    }

    #[test]
    fn test_missing_name() {
        let err = parse_err(r#"{"fields": {}}"#);
        assert!(err.message.contains("missing a 'name'"));
    }

    #[test]
    fn test_missing_fields() {
        let err = parse_err(r#"{"name": "join"}"#);
        assert!(err.message.contains("missing a 'fields'"));
    }

    #[test]
    fn test_non_object_root() {
        let err = parse_err(r#"[1, 2]"#);
        assert!(err.message.contains("root must be an object"));
    }

    #[test]
    fn test_malformed_json_has_position() {
        let err = parse_err("{\n  \"name\": }");
        assert_eq!(err.line, 2);
        assert!(err.column > 0);
        assert!(!err.message.contains("at line"));
    }

    // =========================================================================
    // Leaf fields
    // =========================================================================

    #[test]
    fn test_leaf_field_order_preserved() {
        let doc = parse(
            r#"{"name": "join", "fields": {
                "surname": {"type": "text", "label": "Surname"},
                "email": {"type": "email", "label": "Email"}
            }}"#,
        );
        let (first, _) = leaf(&doc, 0);
        let (second, _) = leaf(&doc, 1);
        assert_eq!(first, "surname");
        assert_eq!(second, "email");
    }

    #[test]
    fn test_leaf_strips_name_and_type_keys() {
        let doc = parse(
            r#"{"name": "join", "fields": {
                "surname": {"type": "text", "name": "surname", "label": "Surname"}
            }}"#,
        );
        let (_, field) = leaf(&doc, 0);
        assert_eq!(field.type_name, "text");
        assert!(field.options.get("name").is_none());
        assert!(field.options.get("type").is_none());
        assert_eq!(field.options["label"], "Surname");
    }

    #[test]
    fn test_leaf_missing_type() {
        let err = parse_err(r#"{"name": "join", "fields": {"x": {"label": "X"}}}"#);
        assert!(err.message.contains("missing a 'type'"));
    }

    #[test]
    fn test_leaf_not_an_object() {
        let err = parse_err(r#"{"name": "join", "fields": {"x": 3}}"#);
        assert!(err.message.contains("must be an object"));
    }

    // =========================================================================
    // Directives
    // =========================================================================

    #[test]
    fn test_section_directive() {
        let doc = parse(
            r#"{"name": "join", "fields": {
                "!section( Contact Details )": {
                    "phone": {"type": "text", "label": "Phone"}
                }
            }}"#,
        );
        let (_, node) = &doc.fields[0];
        let FieldNode::Section(section) = node else {
            panic!("Expected section, got {node:?}");
        };
        assert_eq!(section.label, "Contact Details");
        assert_eq!(section.body.len(), 1);
    }

    #[test]
    fn test_repeat_directive() {
        let doc = parse(
            r#"{"name": "join", "fields": {
                "!repeat( 0 , 2 )": {
                    "child": {"type": "text", "label": "Child"}
                }
            }}"#,
        );
        let (_, node) = &doc.fields[0];
        let FieldNode::Repeat(repeat) = node else {
            panic!("Expected repeat, got {node:?}");
        };
        assert_eq!((repeat.start, repeat.end), (0, 2));
    }

    #[test]
    fn test_nested_directive_bodies() {
        let doc = parse(
            r#"{"name": "join", "fields": {
                "!section(Family)": {
                    "!repeat(0, 1)": {
                        "child": {"type": "text", "label": "Child"}
                    }
                }
            }}"#,
        );
        let (_, node) = &doc.fields[0];
        let FieldNode::Section(section) = node else {
            panic!("Expected section, got {node:?}");
        };
        assert!(matches!(section.body[0].1, FieldNode::Repeat(_)));
    }

    #[test]
    fn test_illegal_directive_name() {
        let err = parse_err(r#"{"name": "join", "fields": {"!group(x)": {}}}"#);
        assert!(err.message.contains("illegal directive name"));
    }

    #[test]
    fn test_directive_without_parens() {
        let err = parse_err(r#"{"name": "join", "fields": {"!section": {}}}"#);
        assert!(err.message.contains("illegal directive name"));
    }

    #[test]
    fn test_repeat_wrong_arity() {
        let err = parse_err(r#"{"name": "join", "fields": {"!repeat(1)": {}}}"#);
        assert!(err.message.contains("exactly two arguments"));
    }

    #[test]
    fn test_repeat_non_numeric_bound() {
        let err = parse_err(r#"{"name": "join", "fields": {"!repeat(0, many)": {}}}"#);
        assert!(err.message.contains("malformed bound"));
    }

    #[test]
    fn test_repeat_negative_bound() {
        let err = parse_err(r#"{"name": "join", "fields": {"!repeat(-1, 2)": {}}}"#);
        assert!(err.message.contains("malformed bound"));
    }
}
