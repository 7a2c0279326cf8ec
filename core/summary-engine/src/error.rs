//! FILENAME: core/summary-engine/src/error.rs

use engine::FieldType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(FieldType),

    #[error("Grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, found: usize },

    #[error("Invalid summary table config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Summary not found: {0}")]
    SummaryNotFound(String),

    #[error("Index {index} out of range for {len} summaries")]
    IndexOutOfRange { index: usize, len: usize },
}
