//! FILENAME: core/summary-engine/src/definition.rs
//! Summary Table Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a summary table as the
//! host persists it in its key-value config store:
//! - which table/view feeds it
//! - which field groups records into columns
//! - the ordered summaries (rows)
//! - whether the rendered grid is transposed
//!
//! It also carries the edits the settings panel performs on that document.

use engine::Field;
use serde::{Deserialize, Serialize};

use crate::error::SummaryError;

/// Keys of the host config store holding the summary table settings.
pub mod config_keys {
    pub const SELECTED_TABLE_ID: &str = "selectedTableId";
    pub const SELECTED_VIEW_ID: &str = "selectedViewId";
    pub const GROUP_FIELD_ID: &str = "groupFieldId";
    pub const SUMMARIES: &str = "summaries";
    pub const TRANSPOSE: &str = "transpose";
}

/// Aggregator key given to newly added summaries.
pub const DEFAULT_AGGREGATOR_KEY: &str = "sum";

/// Settings label of a summary that has no field yet, or whose field was
/// deleted.
pub const NEW_SUMMARY_LABEL: &str = "Add new summary";

// ============================================================================
// SUMMARY SPEC
// ============================================================================

/// One user-chosen (field, aggregator) pair; renders as one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpec {
    pub id: Option<String>,

    pub field_id: Option<String>,

    /// Aggregator key (e.g. "sum", "count").
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SummarySpec {
    pub fn new(id: impl Into<String>, field_id: impl Into<String>, summary: impl Into<String>) -> Self {
        SummarySpec {
            id: Some(id.into()),
            field_id: Some(field_id.into()),
            summary: summary.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// The user's label override, ignoring blank input.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// A summary paired with the field it aggregates.
#[derive(Debug, Clone)]
pub struct ResolvedSummary {
    pub spec: SummarySpec,
    pub field: Field,
}

impl ResolvedSummary {
    pub fn new(spec: SummarySpec, field: Field) -> Self {
        ResolvedSummary { spec, field }
    }

    /// Label of the rendered row: the override, else the field name.
    pub fn row_label(&self) -> String {
        self.spec
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.field.name.clone())
    }
}

/// Label shown for a summary in the settings list: the override, else
/// "Field (Aggregator)", else the bare field name when the aggregator is
/// no longer offered. Without a field it is `NEW_SUMMARY_LABEL`.
pub fn summary_label(spec: &SummarySpec, field: Option<&Field>) -> String {
    if let Some(name) = spec.display_name() {
        return name.to_string();
    }
    let Some(field) = field else {
        return NEW_SUMMARY_LABEL.to_string();
    };
    match field.aggregator(&spec.summary) {
        Some(aggregator) => format!("{} ({})", field.name, aggregator.display_name()),
        None => field.name.clone(),
    }
}

// ============================================================================
// MAIN CONFIG DOCUMENT
// ============================================================================

/// The complete persisted configuration of one summary table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTableConfig {
    #[serde(default)]
    pub selected_table_id: Option<String>,

    #[serde(default)]
    pub selected_view_id: Option<String>,

    #[serde(default)]
    pub group_field_id: Option<String>,

    #[serde(default)]
    pub summaries: Vec<SummarySpec>,

    #[serde(default)]
    pub transpose: bool,
}

impl SummaryTableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the host config document. `null` values count as absent.
    pub fn from_json(json: &str) -> Result<Self, SummaryError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: serde_json::Value) -> Result<Self, SummaryError> {
        // The store writes explicit nulls when a picker is cleared.
        if let serde_json::Value::Object(map) = &mut value {
            map.retain(|_, v| !v.is_null());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String, SummaryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Field ids the record source must load: the grouping field followed
    /// by every summary field, skipping absent ids.
    pub fn requested_field_ids(&self) -> Vec<String> {
        self.group_field_id
            .iter()
            .chain(self.summaries.iter().filter_map(|s| s.field_id.as_ref()))
            .filter(|id| !id.is_empty())
            .cloned()
            .collect()
    }

    /// The configured grouping field, if it still exists.
    pub fn group_field<'f>(&self, fields: &'f [Field]) -> Option<&'f Field> {
        let id = self.group_field_id.as_deref()?;
        fields.iter().find(|f| f.id == id)
    }

    /// Pairs summaries with their fields. Summaries without a field id or
    /// whose field no longer exists are dropped; order is preserved.
    pub fn resolve_summaries(&self, fields: &[Field]) -> Vec<ResolvedSummary> {
        self.summaries
            .iter()
            .filter_map(|spec| {
                let field_id = spec.field_id.as_deref()?;
                let field = fields.iter().find(|f| f.id == field_id)?;
                Some(ResolvedSummary::new(spec.clone(), field.clone()))
            })
            .collect()
    }

    // ========================================================================
    // SETTINGS EDITS
    // ========================================================================

    /// Points the table at a new source. Changing table clears the grouping
    /// field and summaries, which refer to the old table's fields.
    pub fn select_table(&mut self, table_id: Option<String>) {
        if self.selected_table_id == table_id {
            return;
        }
        self.selected_table_id = table_id;
        self.selected_view_id = None;
        self.group_field_id = None;
        self.summaries.clear();
    }

    /// Appends a summary for `field` with the default aggregator.
    /// Returns the new summary's id.
    pub fn add_summary(&mut self, field: &Field) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.summaries.push(SummarySpec::new(id.clone(), field.id.clone(), DEFAULT_AGGREGATOR_KEY));
        id
    }

    /// Changes the field of a summary, resetting its aggregator and label.
    /// Clearing the field removes the summary.
    pub fn set_summary_field(&mut self, id: &str, field: Option<&Field>) -> Result<(), SummaryError> {
        let Some(field) = field else {
            return self.remove_summary(id);
        };
        let spec = self.summary_mut(id)?;
        spec.field_id = Some(field.id.clone());
        spec.summary = DEFAULT_AGGREGATOR_KEY.to_string();
        spec.display_name = None;
        Ok(())
    }

    pub fn set_summary_aggregator(&mut self, id: &str, aggregator_key: &str) -> Result<(), SummaryError> {
        self.summary_mut(id)?.summary = aggregator_key.to_string();
        Ok(())
    }

    pub fn set_summary_display_name(&mut self, id: &str, display_name: &str) -> Result<(), SummaryError> {
        self.summary_mut(id)?.display_name = Some(display_name.to_string());
        Ok(())
    }

    pub fn remove_summary(&mut self, id: &str) -> Result<(), SummaryError> {
        let pos = self.position_of(id)?;
        self.summaries.remove(pos);
        Ok(())
    }

    /// Drag reordering: takes the summary at `from` and inserts it at `to`.
    pub fn move_summary(&mut self, from: usize, to: usize) -> Result<(), SummaryError> {
        let len = self.summaries.len();
        if from >= len {
            return Err(SummaryError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(SummaryError::IndexOutOfRange { index: to, len });
        }
        let moved = self.summaries.remove(from);
        self.summaries.insert(to, moved);
        Ok(())
    }

    fn position_of(&self, id: &str) -> Result<usize, SummaryError> {
        self.summaries
            .iter()
            .position(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| SummaryError::SummaryNotFound(id.to_string()))
    }

    fn summary_mut(&mut self, id: &str) -> Result<&mut SummarySpec, SummaryError> {
        let pos = self.position_of(id)?;
        Ok(&mut self.summaries[pos])
    }
}
