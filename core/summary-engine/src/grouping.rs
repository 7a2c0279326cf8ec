//! FILENAME: core/summary-engine/src/grouping.rs
//! Grouping - buckets records by a normalized key of the grouping field.
//!
//! The field type picks one of a closed set of strategies. Each strategy is
//! a pure function from a decoded cell to a group key. Groups keep the order
//! in which their key was first seen.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use engine::{CellValue, Field, FieldType, Record};
use rustc_hash::FxHashMap;

use crate::error::SummaryError;

/// Key used when a cell holds something that cannot be turned into a key
/// (unparseable date, unknown object shape).
pub const UNRECOGNIZED_GROUP_KEY: &str = "?";

/// How a grouping field's values become group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    /// Four-digit calendar year of a date value.
    Year,
    /// The raw text of the value.
    Text,
    /// The text of the first element of a lookup array.
    FirstLookupValue,
}

impl GroupingStrategy {
    /// Selects the strategy for a field type.
    pub fn for_field_type(field_type: FieldType) -> Result<Self, SummaryError> {
        match field_type {
            FieldType::Date
            | FieldType::DateTime
            | FieldType::CreatedTime
            | FieldType::LastModifiedTime => Ok(GroupingStrategy::Year),
            FieldType::SingleLineText | FieldType::Formula => Ok(GroupingStrategy::Text),
            FieldType::MultipleLookupValues => Ok(GroupingStrategy::FirstLookupValue),
            other => Err(SummaryError::UnsupportedFieldType(other)),
        }
    }

    /// Computes the group key of a cell. Absent values map to the empty key.
    pub fn group_key(&self, value: &CellValue) -> String {
        match self {
            GroupingStrategy::Year => year_key(value),
            GroupingStrategy::Text => text_key(value),
            GroupingStrategy::FirstLookupValue => match value {
                CellValue::List(items) => items.first().map(text_key).unwrap_or_default(),
                other => text_key(other),
            },
        }
    }
}

/// Whether a field can be used to group records.
pub fn is_groupable(field_type: FieldType) -> bool {
    GroupingStrategy::for_field_type(field_type).is_ok()
}

fn text_key(value: &CellValue) -> String {
    if let CellValue::Empty = value {
        return String::new();
    }
    value
        .display_text()
        .unwrap_or_else(|| UNRECOGNIZED_GROUP_KEY.to_string())
}

fn year_key(value: &CellValue) -> String {
    if let CellValue::Empty = value {
        return String::new();
    }
    value
        .display_text()
        .and_then(|text| parse_year(&text))
        .map(|year| format!("{:04}", year))
        .unwrap_or_else(|| UNRECOGNIZED_GROUP_KEY.to_string())
}

/// Extracts the calendar year from the date formats the host emits:
/// RFC 3339 timestamps, naive date-times and plain ISO dates.
pub fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.year());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.year());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(|d| d.year())
}

// ============================================================================
// RECORD GROUPS
// ============================================================================

/// Records sharing one group key.
pub struct RecordGroup<'r> {
    pub key: String,
    pub records: Vec<&'r dyn Record>,
}

impl<'r> RecordGroup<'r> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups records by the key of `field`, in first-seen key order.
/// Every record lands in exactly one group.
pub fn group_records<'r, R: Record>(
    records: &'r [R],
    field: &Field,
) -> Result<Vec<RecordGroup<'r>>, SummaryError> {
    let strategy = GroupingStrategy::for_field_type(field.field_type)?;

    let mut groups: Vec<RecordGroup<'r>> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for record in records {
        let key = strategy.group_key(&record.cell_value(&field.name));
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                index.insert(key.clone(), slot);
                groups.push(RecordGroup { key, records: Vec::new() });
                slot
            }
        };
        groups[slot].records.push(record as &dyn Record);
    }

    log::debug!(
        "grouped {} records by '{}' into {} groups",
        records.len(),
        field.name,
        groups.len()
    );

    Ok(groups)
}
