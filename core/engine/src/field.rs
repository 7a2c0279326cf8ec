//! FILENAME: core/engine/src/field.rs
//! PURPOSE: Field (column) descriptors of a source table.
//! CONTEXT: A field carries its type tag and the aggregators the host
//! offers for it. Aggregators are shared behind `Arc` so descriptors are
//! cheap to clone into resolved summaries.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregator::{builtin_aggregators, Aggregator};

/// Field type tags, serialized with the host's names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    SingleLineText,
    Email,
    Url,
    MultilineText,
    Number,
    Percent,
    Currency,
    SingleSelect,
    MultipleSelects,
    SingleCollaborator,
    MultipleCollaborators,
    MultipleRecordLinks,
    Date,
    DateTime,
    PhoneNumber,
    MultipleAttachments,
    Checkbox,
    Formula,
    CreatedTime,
    Rollup,
    Count,
    MultipleLookupValues,
    AutoNumber,
    Barcode,
    Rating,
    RichText,
    Duration,
    LastModifiedTime,
    Button,
    CreatedBy,
    LastModifiedBy,
    ExternalSyncSource,
}

impl FieldType {
    /// The host's tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "singleLineText",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::MultilineText => "multilineText",
            FieldType::Number => "number",
            FieldType::Percent => "percent",
            FieldType::Currency => "currency",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultipleSelects => "multipleSelects",
            FieldType::SingleCollaborator => "singleCollaborator",
            FieldType::MultipleCollaborators => "multipleCollaborators",
            FieldType::MultipleRecordLinks => "multipleRecordLinks",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::PhoneNumber => "phoneNumber",
            FieldType::MultipleAttachments => "multipleAttachments",
            FieldType::Checkbox => "checkbox",
            FieldType::Formula => "formula",
            FieldType::CreatedTime => "createdTime",
            FieldType::Rollup => "rollup",
            FieldType::Count => "count",
            FieldType::MultipleLookupValues => "multipleLookupValues",
            FieldType::AutoNumber => "autoNumber",
            FieldType::Barcode => "barcode",
            FieldType::Rating => "rating",
            FieldType::RichText => "richText",
            FieldType::Duration => "duration",
            FieldType::LastModifiedTime => "lastModifiedTime",
            FieldType::Button => "button",
            FieldType::CreatedBy => "createdBy",
            FieldType::LastModifiedBy => "lastModifiedBy",
            FieldType::ExternalSyncSource => "externalSyncSource",
        }
    }

    /// Whether numeric aggregations (sum, average, ...) make sense for this type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Number
                | FieldType::Percent
                | FieldType::Currency
                | FieldType::Rating
                | FieldType::Duration
                | FieldType::AutoNumber
                | FieldType::Count
                | FieldType::Rollup
                | FieldType::Formula
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one column of the source table.
#[derive(Clone)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub field_type: FieldType,
    available_aggregators: Vec<Arc<dyn Aggregator>>,
}

impl Field {
    /// Creates a field offering the built-in aggregators for its type.
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            id: id.into(),
            name: name.into(),
            field_type,
            available_aggregators: builtin_aggregators(field_type),
        }
    }

    /// Replaces the aggregators offered for this field.
    pub fn with_aggregators(mut self, aggregators: Vec<Arc<dyn Aggregator>>) -> Self {
        self.available_aggregators = aggregators;
        self
    }

    pub fn available_aggregators(&self) -> &[Arc<dyn Aggregator>] {
        &self.available_aggregators
    }

    /// Finds the aggregator with exactly this key.
    pub fn aggregator(&self, key: &str) -> Option<&Arc<dyn Aggregator>> {
        self.available_aggregators.iter().find(|a| a.key() == key)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.available_aggregators.iter().map(|a| a.key()).collect();
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("available_aggregators", &keys)
            .finish()
    }
}
