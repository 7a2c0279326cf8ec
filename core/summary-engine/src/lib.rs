//! FILENAME: core/summary-engine/src/lib.rs
//! Summary Table subsystem.
//!
//! This crate groups records by one field and runs per-field aggregators
//! for every group, producing a table of summaries. It depends on `engine`
//! only for shared types (CellValue, Field, Record, Aggregator).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the summary table IS)
//! - `grouping`: Group-key strategies and record bucketing
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: Calculation engine (HOW we calculate)

pub mod definition;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod view;

pub use definition::*;
pub use error::SummaryError;
pub use grouping::{group_records, is_groupable, GroupingStrategy, RecordGroup, UNRECOGNIZED_GROUP_KEY};
pub use view::*;
pub use self::engine::{
    compute_grouped_table, normalize_display_value, render_summary_table,
    resolve_aggregator, SummaryCalculator,
};

/// Swaps rows and columns of a rendered grid.
pub fn transpose<T: Clone>(grid: &[Vec<T>]) -> Result<Vec<Vec<T>>, SummaryError> {
    view::transpose_grid(grid)
}
