//! FILENAME: core/engine/src/record.rs
//! PURPOSE: The record abstraction consumed by grouping and aggregation.
//! CONTEXT: Records belong to the host. Anything that can answer
//! "what is in field X" is a `Record`; `SourceRecord` is the in-memory
//! implementation used when the host hands over materialized JSON rows.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::cell::CellValue;

/// A row of the source table.
pub trait Record {
    fn id(&self) -> &str;

    /// Returns the value of the named field. Missing fields read as `Empty`.
    fn cell_value(&self, field_name: &str) -> CellValue;
}

impl<R: Record + ?Sized> Record for &R {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn cell_value(&self, field_name: &str) -> CellValue {
        (**self).cell_value(field_name)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn cell_value(&self, field_name: &str) -> CellValue {
        (**self).cell_value(field_name)
    }
}

/// A materialized record keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct SourceRecord {
    id: String,
    cells: FxHashMap<String, CellValue>,
}

impl SourceRecord {
    pub fn new(id: impl Into<String>) -> Self {
        SourceRecord {
            id: id.into(),
            cells: FxHashMap::default(),
        }
    }

    /// Builder-style variant of `set_cell`.
    pub fn with_cell(mut self, field_name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set_cell(field_name, value);
        self
    }

    pub fn set_cell(&mut self, field_name: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(field_name.into(), value.into());
    }

    /// Builds a record from a JSON object of `field name -> cell value`.
    /// Non-object input yields a record with no cells.
    pub fn from_json(id: impl Into<String>, fields: &Value) -> Self {
        let mut record = SourceRecord::new(id);
        if let Value::Object(map) = fields {
            for (name, value) in map {
                record.set_cell(name.clone(), CellValue::from_json(value));
            }
        }
        record
    }
}

impl Record for SourceRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn cell_value(&self, field_name: &str) -> CellValue {
        self.cells.get(field_name).cloned().unwrap_or(CellValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_read_as_empty() {
        let record = SourceRecord::new("rec1").with_cell("Name", "Alice");
        assert_eq!(record.cell_value("Name"), CellValue::Text("Alice".to_string()));
        assert_eq!(record.cell_value("Age"), CellValue::Empty);
    }

    #[test]
    fn builds_from_json_object() {
        let record = SourceRecord::from_json(
            "rec1",
            &json!({ "Year": "2020-01-01", "Amount": 10, "Owner": { "id": "usr1", "name": "Bo" } }),
        );
        assert_eq!(record.id(), "rec1");
        assert_eq!(record.cell_value("Amount"), CellValue::Number(10.0));
        assert_eq!(record.cell_value("Owner").display_text(), Some("Bo".to_string()));
    }

    #[test]
    fn references_and_boxes_are_records() {
        let record = SourceRecord::new("rec1").with_cell("Amount", 3.0);
        let boxed: Box<dyn Record> = Box::new(record.clone());
        assert_eq!((&record).cell_value("Amount"), CellValue::Number(3.0));
        assert_eq!(boxed.id(), "rec1");
    }
}
