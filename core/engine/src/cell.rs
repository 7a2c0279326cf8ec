//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the decoded representation of a single record cell.
//! CONTEXT: The host hands cell values over as loosely-shaped JSON (plain
//! scalars, lookup wrappers, linked-record references, arrays). This file
//! turns them into the `CellValue` enum so callers match on known shapes
//! instead of probing objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents the value held by one cell of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// A lookup element wrapping a scalar: `{ "value": "..." }`.
    Lookup(String),
    /// A reference to another record, either `{ "value": { "name": ... } }`
    /// or `{ "id": ..., "name": ... }`.
    LinkedRecord { id: Option<String>, name: String },
    /// Array-valued cells (lookups, multiple selects, record links).
    List(Vec<CellValue>),
    /// Any shape not covered above, kept verbatim.
    Unrecognized(Value),
}

impl CellValue {
    /// Decodes a host JSON cell value. Never fails: unknown shapes become
    /// `Unrecognized`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Unrecognized(value.clone()),
            },
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Array(items) => CellValue::List(items.iter().map(CellValue::from_json).collect()),
            Value::Object(map) => decode_object(map),
        }
    }

    /// Returns the text used to display (and group by) this value.
    ///
    /// Wrappers are unwrapped one level, with a nested `name` preferred over
    /// the wrapper itself. Lists yield their first element. `None` means
    /// there is nothing recognizable to show.
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::Lookup(s) => Some(s.clone()),
            CellValue::LinkedRecord { name, .. } => Some(name.clone()),
            CellValue::List(items) => items.first().and_then(CellValue::display_text),
            CellValue::Unrecognized(_) => None,
        }
    }

    /// Returns a key identifying the whole value, used to count distinct
    /// values. Unlike `display_text` it covers every list element and keeps
    /// numbers apart from text. `None` for empty cells.
    pub fn unique_key(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(format!("n:{}", format_number(*n))),
            CellValue::Text(s) | CellValue::Lookup(s) => Some(format!("t:{}", s)),
            CellValue::Boolean(b) => Some(format!("b:{}", b)),
            CellValue::LinkedRecord { id, name } => {
                Some(format!("r:{}:{}", id.as_deref().unwrap_or_default(), name))
            }
            CellValue::List(items) => {
                let keys: Vec<String> = items
                    .iter()
                    .map(|item| item.unique_key().unwrap_or_default())
                    .collect();
                Some(format!("[{}]", keys.join("\u{1f}")))
            }
            CellValue::Unrecognized(value) => Some(format!("u:{}", value)),
        }
    }

    /// Returns the numeric content of the cell, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the cell counts as blank for empty/filled aggregations.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Decodes the object shapes the host uses for lookups and record links.
fn decode_object(map: &Map<String, Value>) -> CellValue {
    match map.get("value") {
        Some(Value::String(s)) => CellValue::Lookup(s.clone()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => CellValue::Lookup(format_number(f)),
            None => CellValue::Unrecognized(Value::Object(map.clone())),
        },
        Some(Value::Null) => CellValue::Empty,
        Some(Value::Object(inner)) => match name_of(inner) {
            Some(name) => CellValue::LinkedRecord { id: id_of(inner), name },
            None => CellValue::Unrecognized(Value::Object(map.clone())),
        },
        Some(_) => CellValue::Unrecognized(Value::Object(map.clone())),
        None => match name_of(map) {
            Some(name) => CellValue::LinkedRecord { id: id_of(map), name },
            None => CellValue::Unrecognized(Value::Object(map.clone())),
        },
    }
}

fn name_of(map: &Map<String, Value>) -> Option<String> {
    map.get("name").and_then(Value::as_str).map(str::to_string)
}

fn id_of(map: &Map<String, Value>) -> Option<String> {
    map.get("id").and_then(Value::as_str).map(str::to_string)
}

/// Formats a number without unnecessary decimal places.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        CellValue::from_json(value)
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        CellValue::from_json(&value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_scalars() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from_json(&json!("abc")), CellValue::Text("abc".to_string()));
        assert_eq!(CellValue::from_json(&json!(12.5)), CellValue::Number(12.5));
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Boolean(true));
    }

    #[test]
    fn decodes_lookup_and_linked_record_shapes() {
        assert_eq!(
            CellValue::from_json(&json!({ "linkedRecordId": "rec1", "value": "North" })),
            CellValue::Lookup("North".to_string())
        );
        assert_eq!(
            CellValue::from_json(&json!({ "value": { "id": "rec2", "name": "Acme" } })),
            CellValue::LinkedRecord { id: Some("rec2".to_string()), name: "Acme".to_string() }
        );
        assert_eq!(
            CellValue::from_json(&json!({ "id": "sel1", "name": "Red", "color": "red" })),
            CellValue::LinkedRecord { id: Some("sel1".to_string()), name: "Red".to_string() }
        );
    }

    #[test]
    fn unknown_shapes_are_kept_as_unrecognized() {
        let raw = json!({ "value": { "url": "https://example.com" } });
        let cell = CellValue::from_json(&raw);
        assert_eq!(cell, CellValue::Unrecognized(raw));
        assert_eq!(cell.display_text(), None);
    }

    #[test]
    fn display_text_prefers_nested_name() {
        let cell = CellValue::from_json(&json!([
            { "value": { "id": "rec1", "name": "First" } },
            { "value": { "id": "rec2", "name": "Second" } }
        ]));
        assert_eq!(cell.display_text(), Some("First".to_string()));
    }

    #[test]
    fn numbers_display_without_trailing_zeroes() {
        assert_eq!(CellValue::Number(15.0).display_text(), Some("15".to_string()));
        assert_eq!(CellValue::Number(2.5).display_text(), Some("2.5".to_string()));
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn unique_key_covers_every_list_element() {
        let ab = CellValue::List(vec!["a".into(), "b".into()]);
        let ac = CellValue::List(vec!["a".into(), "c".into()]);
        assert_ne!(ab.unique_key(), ac.unique_key());
        assert_eq!(ab.unique_key(), ab.clone().unique_key());
        assert_ne!(CellValue::Number(1.0).unique_key(), CellValue::from("1").unique_key());
        assert_eq!(CellValue::Empty.unique_key(), None);
    }

    #[test]
    fn emptiness() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(CellValue::List(vec![]).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }
}
