//! FILENAME: core/summary-engine/src/view.rs
//! Summary View - Renderable output for the frontend.
//!
//! `GroupedTable` is the computed result (group keys x summaries).
//! `to_grid` lays it out as a 2D grid with a header row and a label column,
//! optionally transposed, ready for a table widget.

use engine::AggregateValue;
use serde::{Deserialize, Serialize};

use crate::definition::SummarySpec;
use crate::error::SummaryError;

/// Id of the top-left corner cell.
pub const CORNER_CELL_ID: &str = "top";

// ============================================================================
// GROUPED TABLE
// ============================================================================

/// The computed value of one summary for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    pub group: String,
    pub value: AggregateValue,
}

/// One summary row: a value slot per column, `None` when the field offers
/// no usable aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub summary: SummarySpec,
    pub field_id: String,
    pub field_name: String,
    pub values: Vec<Option<GroupValue>>,
}

impl SummaryRow {
    /// Row heading: the display name override, else the field name.
    pub fn label(&self) -> &str {
        self.summary.display_name().unwrap_or(&self.field_name)
    }
}

/// Group keys (columns, first-seen order) by summaries (rows, user order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl GroupedTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing to draw; callers show an empty state.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Lays the table out as a grid: a header row (corner + one cell per
    /// group), then one row per summary (label + one cell per group).
    pub fn to_grid(&self, transpose: bool) -> Result<Vec<Vec<GridCell>>, SummaryError> {
        let mut grid: Vec<Vec<GridCell>> = Vec::with_capacity(self.rows.len() + 1);

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(GridCell::corner());
        header.extend(self.columns.iter().map(|key| GridCell::text(key.clone(), key.clone())));
        grid.push(header);

        for row in &self.rows {
            let mut cells = Vec::with_capacity(self.columns.len() + 1);
            cells.push(GridCell::text(row.field_id.clone(), row.label()));
            for (column, slot) in self.columns.iter().zip(&row.values) {
                let group = slot.as_ref().map(|v| v.group.as_str()).unwrap_or(column.as_str());
                cells.push(GridCell {
                    id: format!("{}-{}", group, row.field_id),
                    value: slot.as_ref().map(|v| v.value.clone()),
                });
            }
            grid.push(cells);
        }

        if transpose {
            transpose_grid(&grid)
        } else {
            Ok(grid)
        }
    }
}

// ============================================================================
// GRID
// ============================================================================

/// A rendered grid cell with a stable id for keyed rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: String,
    pub value: Option<AggregateValue>,
}

impl GridCell {
    pub fn corner() -> Self {
        GridCell {
            id: CORNER_CELL_ID.to_string(),
            value: None,
        }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        GridCell {
            id: id.into(),
            value: Some(AggregateValue::Text(text.into())),
        }
    }
}

/// Swaps rows and columns: `result[i][j] == grid[j][i]`.
/// An empty grid stays empty; ragged input is rejected.
pub fn transpose_grid<T: Clone>(grid: &[Vec<T>]) -> Result<Vec<Vec<T>>, SummaryError> {
    let Some(first) = grid.first() else {
        return Ok(Vec::new());
    };
    let width = first.len();
    if let Some((row, cells)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(SummaryError::RaggedGrid {
            row,
            expected: width,
            found: cells.len(),
        });
    }

    Ok((0..width)
        .map(|col| grid.iter().map(|row| row[col].clone()).collect())
        .collect())
}

/// Everything a frontend needs to draw the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTableView {
    pub table: GroupedTable,
    pub grid: Vec<Vec<GridCell>>,
    pub transposed: bool,
    pub is_empty: bool,
}

impl SummaryTableView {
    pub fn new(table: GroupedTable, transpose: bool) -> Result<Self, SummaryError> {
        let grid = table.to_grid(transpose)?;
        Ok(SummaryTableView {
            is_empty: table.is_empty(),
            grid,
            transposed: transpose,
            table,
        })
    }
}
