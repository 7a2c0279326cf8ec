//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the record data model.
//! CONTEXT: Re-exports the types the summary engine consumes from the
//! host: decoded cells, field descriptors, records and aggregators.

pub mod aggregator;
pub mod cell;
pub mod field;
pub mod record;

// Re-export commonly used types at the crate root
pub use aggregator::{builtin_aggregators, AggregateValue, Aggregator, AggregatorKind, BuiltinAggregator};
pub use cell::{format_number, CellValue};
pub use field::{Field, FieldType};
pub use record::{Record, SourceRecord};
