//! Dotted field paths over JSON records.

use derive_more::{Display, Error};
use serde_json::{Map, Value};
use tracing::instrument;

/// A field path such as `powers.hint`, stored as its segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

/// Result of resolving a [`FieldPath`] against a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Some segment was missing, or an intermediate was null or not a record.
    Absent,
    /// The leaf exists. It may itself be `null`.
    Present(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// The resolved value, if present.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }

    /// Returns true when the path did not resolve.
    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl FieldPath {
    /// Splits a dotted key into segments. Empty segments are kept and
    /// rejected later by [`FieldPath::assign`].
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(String::from).collect(),
        }
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Follows the path through nested records.
    pub fn resolve<'a>(&self, root: &'a Value) -> FieldValue<'a> {
        let mut cursor = root;
        for segment in &self.segments {
            match cursor {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => cursor = next,
                    None => return FieldValue::Absent,
                },
                _ => return FieldValue::Absent,
            }
        }
        FieldValue::Present(cursor)
    }

    /// Writes `value` at the path, creating intermediate records where they
    /// are missing or null.
    ///
    /// # Errors
    ///
    /// Fails when the root or an existing intermediate is not a record, or
    /// when the path has an empty segment.
    #[instrument(skip(root, value), fields(path = %self))]
    pub fn assign(&self, root: &mut Value, value: Value) -> Result<(), PathError> {
        let Some((leaf, parents)) = self.segments.split_last() else {
            return Err(PathError::new("empty path"));
        };
        if self.segments.iter().any(String::is_empty) {
            return Err(PathError::new(format!("empty segment in '{}'", self)));
        }

        let mut cursor = root;
        for segment in parents {
            let map = match cursor {
                Value::Object(map) => map,
                other => {
                    return Err(PathError::new(format!(
                        "cannot descend into {} at '{}'",
                        kind_name(other),
                        segment
                    )));
                }
            };
            let slot = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            cursor = slot;
        }

        match cursor {
            Value::Object(map) => {
                map.insert(leaf.clone(), value);
                Ok(())
            }
            other => Err(PathError::new(format!(
                "cannot set '{}' on {}",
                leaf,
                kind_name(other)
            ))),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}

/// Failure while writing through a [`FieldPath`].
#[derive(Debug, Clone, Display, Error)]
#[display("Path error: {} at {}:{}", message, file, line)]
pub struct PathError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PathError {
    /// Creates a new path error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Renders a value the way the arena prints values in messages: numbers
/// plain, strings unquoted, lists comma-joined and null as `null`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_nested_and_absent() {
        let state = json!({"powers": {"hint": 3}, "currentPuzzle": null});
        let hint = FieldPath::parse("powers.hint");
        assert_eq!(hint.resolve(&state), FieldValue::Present(&json!(3)));
        assert!(FieldPath::parse("powers.freeze").resolve(&state).is_absent());
        assert!(FieldPath::parse("currentPuzzle.fen").resolve(&state).is_absent());
    }

    #[test]
    fn test_assign_creates_intermediates() {
        let mut state = json!({});
        FieldPath::parse("a.b.c")
            .assign(&mut state, json!(7))
            .expect("assign failed");
        assert_eq!(state, json!({"a": {"b": {"c": 7}}}));
    }

    #[test]
    fn test_assign_replaces_null_intermediate() {
        let mut state = json!({"a": null});
        FieldPath::parse("a.b")
            .assign(&mut state, json!("x"))
            .expect("assign failed");
        assert_eq!(state, json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_assign_through_scalar_fails() {
        let mut state = json!({"a": 5});
        assert!(FieldPath::parse("a.b").assign(&mut state, json!(1)).is_err());
        assert_eq!(state, json!({"a": 5}));
        assert!(FieldPath::parse("a..b").assign(&mut state, json!(1)).is_err());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!(99)), "99");
        assert_eq!(display_value(&json!(12.0)), "12");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!("bad")), "bad");
        assert_eq!(display_value(&json!(["e2e4", "e7e5"])), "e2e4,e7e5");
        assert_eq!(display_value(&Value::Null), "null");
    }
}
