//! Binding environments and `!bind(...)` substitution.
//!
//! A `Bindings` maps symbolic names to values for one compile call.
//! Option values of the form `"!bind( name )"` are replaced with the
//! bound value during expansion; a reference to an absent name is a
//! hard error, never a silent default.

use crate::CompileError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Binding key the repeat directive introduces for the loop index.
pub const REPEATER: &str = "repeater";

/// A per-compile mapping from symbolic name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Child scope for one repeat iteration: `repeater` is bound to the
    /// stringified index first, then the parent environment is merged
    /// on top. A caller binding named `repeater` therefore shadows the
    /// loop index (long-standing behavior, kept as-is).
    pub fn with_repeater(&self, index: u32) -> Self {
        let mut values = BTreeMap::new();
        values.insert(REPEATER.to_string(), Value::String(index.to_string()));
        for (name, value) in &self.values {
            values.insert(name.clone(), value.clone());
        }
        Self { values }
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Substitute `!bind(...)` references throughout an option mapping.
pub fn substitute_options(
    options: &Map<String, Value>,
    bindings: &Bindings,
) -> Result<Map<String, Value>, CompileError> {
    options
        .iter()
        .map(|(key, value)| Ok((key.clone(), substitute_value(value, bindings)?)))
        .collect()
}

/// Substitute one option value. Strings that are exactly a bind
/// reference are replaced; maps and arrays are always walked in full,
/// whatever their own shape; everything else passes through unchanged.
fn substitute_value(value: &Value, bindings: &Bindings) -> Result<Value, CompileError> {
    match value {
        Value::String(text) => match bind_target(text) {
            Some(name) => bindings
                .get(name)
                .cloned()
                .ok_or_else(|| CompileError::UnboundVariable(name.to_string())),
            None => Ok(value.clone()),
        },
        Value::Object(entries) => Ok(Value::Object(substitute_options(entries, bindings)?)),
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, bindings))
                .collect::<Result<_, _>>()?,
        )),
        _ => Ok(value.clone()),
    }
}

/// The bound name in a `!bind( name )` reference, whitespace around the
/// name tolerated. `None` for any other string, including other `!`
/// strings, which pass through untouched.
fn bind_target(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("!bind(")?.strip_suffix(')')?;
    Some(inner.trim())
}
