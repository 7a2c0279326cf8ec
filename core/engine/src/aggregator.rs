//! FILENAME: core/engine/src/aggregator.rs
//! PURPOSE: Named reductions over a set of records for one field.
//! CONTEXT: The host exposes a list of aggregators per field; the same
//! keys are provided here as built-ins so fields can be described without
//! a live host. Numeric reductions share one accumulator.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cell::format_number;
use crate::field::{Field, FieldType};
use crate::record::Record;

/// The result of running an aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateValue::Number(n) => f.write_str(&format_number(*n)),
            AggregateValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AggregateValue {
    fn from(value: f64) -> Self {
        AggregateValue::Number(value)
    }
}

impl From<&str> for AggregateValue {
    fn from(value: &str) -> Self {
        AggregateValue::Text(value.to_string())
    }
}

/// A reduction the host offers for a field.
pub trait Aggregator: Send + Sync {
    /// Stable key stored in summary configuration (e.g. `"sum"`).
    fn key(&self) -> &str;

    /// Human-readable name (e.g. `"Sum"`).
    fn display_name(&self) -> &str;

    fn aggregate(&self, records: &[&dyn Record], field: &Field) -> AggregateValue;
}

// ============================================================================
// BUILT-IN AGGREGATORS
// ============================================================================

/// Reductions available without a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregatorKind {
    Count,
    Empty,
    Filled,
    Unique,
    PercentEmpty,
    PercentFilled,
    PercentUnique,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Range,
    StdDev,
}

impl AggregatorKind {
    pub const GENERAL: [AggregatorKind; 7] = [
        AggregatorKind::Count,
        AggregatorKind::Empty,
        AggregatorKind::Filled,
        AggregatorKind::Unique,
        AggregatorKind::PercentEmpty,
        AggregatorKind::PercentFilled,
        AggregatorKind::PercentUnique,
    ];

    pub const NUMERIC: [AggregatorKind; 7] = [
        AggregatorKind::Sum,
        AggregatorKind::Average,
        AggregatorKind::Median,
        AggregatorKind::Min,
        AggregatorKind::Max,
        AggregatorKind::Range,
        AggregatorKind::StdDev,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AggregatorKind::Count => "count",
            AggregatorKind::Empty => "empty",
            AggregatorKind::Filled => "filled",
            AggregatorKind::Unique => "unique",
            AggregatorKind::PercentEmpty => "percentEmpty",
            AggregatorKind::PercentFilled => "percentFilled",
            AggregatorKind::PercentUnique => "percentUnique",
            AggregatorKind::Sum => "sum",
            AggregatorKind::Average => "average",
            AggregatorKind::Median => "median",
            AggregatorKind::Min => "min",
            AggregatorKind::Max => "max",
            AggregatorKind::Range => "range",
            AggregatorKind::StdDev => "stdDev",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AggregatorKind::Count => "Count",
            AggregatorKind::Empty => "Empty",
            AggregatorKind::Filled => "Filled",
            AggregatorKind::Unique => "Unique",
            AggregatorKind::PercentEmpty => "Percent empty",
            AggregatorKind::PercentFilled => "Percent filled",
            AggregatorKind::PercentUnique => "Percent unique",
            AggregatorKind::Sum => "Sum",
            AggregatorKind::Average => "Average",
            AggregatorKind::Median => "Median",
            AggregatorKind::Min => "Min",
            AggregatorKind::Max => "Max",
            AggregatorKind::Range => "Range",
            AggregatorKind::StdDev => "Std dev",
        }
    }
}

/// Built-in implementation of `Aggregator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinAggregator {
    kind: AggregatorKind,
}

impl BuiltinAggregator {
    pub fn new(kind: AggregatorKind) -> Self {
        BuiltinAggregator { kind }
    }

    pub fn kind(&self) -> AggregatorKind {
        self.kind
    }
}

impl Aggregator for BuiltinAggregator {
    fn key(&self) -> &str {
        self.kind.key()
    }

    fn display_name(&self) -> &str {
        self.kind.display_name()
    }

    fn aggregate(&self, records: &[&dyn Record], field: &Field) -> AggregateValue {
        let total = records.len();
        let cells = records.iter().map(|r| r.cell_value(&field.name));

        match self.kind {
            AggregatorKind::Count => AggregateValue::Number(total as f64),
            AggregatorKind::Empty => AggregateValue::Number(cells.filter(|c| c.is_empty()).count() as f64),
            AggregatorKind::Filled => AggregateValue::Number(cells.filter(|c| !c.is_empty()).count() as f64),
            AggregatorKind::Unique => AggregateValue::Number(count_unique(cells) as f64),
            AggregatorKind::PercentEmpty => {
                percent(cells.filter(|c| c.is_empty()).count(), total)
            }
            AggregatorKind::PercentFilled => {
                percent(cells.filter(|c| !c.is_empty()).count(), total)
            }
            AggregatorKind::PercentUnique => percent(count_unique(cells), total),
            numeric => {
                let mut acc = NumericAccumulator::new();
                for cell in cells {
                    if let Some(n) = cell.as_number() {
                        acc.add_number(n);
                    }
                }
                AggregateValue::Number(acc.compute(numeric))
            }
        }
    }
}

fn count_unique(cells: impl Iterator<Item = crate::cell::CellValue>) -> usize {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for cell in cells {
        if cell.is_empty() {
            continue;
        }
        if let Some(key) = cell.unique_key() {
            seen.insert(key);
        }
    }
    seen.len()
}

/// Percentages render like the host does (`"50%"`). With no records the
/// ratio is undefined and renders as `"NaN"`.
fn percent(part: usize, total: usize) -> AggregateValue {
    if total == 0 {
        return AggregateValue::Text("NaN".to_string());
    }
    let ratio = part as f64 / total as f64 * 100.0;
    AggregateValue::Text(format!("{}%", format_number(ratio.round())))
}

/// Running state for numeric reductions.
/// Uses Welford's algorithm for numerical stability of the deviation.
#[derive(Debug, Clone, Default)]
struct NumericAccumulator {
    values: Vec<f64>,
    sum: f64,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericAccumulator {
    fn new() -> Self {
        Self::default()
    }

    fn add_number(&mut self, value: f64) {
        self.values.push(value);
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        let delta = value - self.mean;
        self.mean += delta / (self.values.len() as f64);
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Computes the final value. Reductions with no defined result over an
    /// empty set yield NaN.
    fn compute(&self, kind: AggregatorKind) -> f64 {
        let count = self.values.len();
        match kind {
            AggregatorKind::Sum => self.sum,
            AggregatorKind::Average => {
                if count > 0 {
                    self.sum / count as f64
                } else {
                    f64::NAN
                }
            }
            AggregatorKind::Median => self.median(),
            AggregatorKind::Min => self.min.unwrap_or(f64::NAN),
            AggregatorKind::Max => self.max.unwrap_or(f64::NAN),
            AggregatorKind::Range => match (self.min, self.max) {
                (Some(min), Some(max)) => max - min,
                _ => f64::NAN,
            },
            AggregatorKind::StdDev => {
                if count > 1 {
                    (self.m2 / ((count - 1) as f64)).sqrt()
                } else if count == 1 {
                    0.0
                } else {
                    f64::NAN
                }
            }
            AggregatorKind::Count
            | AggregatorKind::Empty
            | AggregatorKind::Filled
            | AggregatorKind::Unique
            | AggregatorKind::PercentEmpty
            | AggregatorKind::PercentFilled
            | AggregatorKind::PercentUnique => f64::NAN,
        }
    }

    fn median(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }
}

/// The built-in aggregators the host offers for a field type.
/// Every type gets the general reductions; numeric types add the numeric ones.
pub fn builtin_aggregators(field_type: FieldType) -> Vec<Arc<dyn Aggregator>> {
    let mut kinds: Vec<AggregatorKind> = AggregatorKind::GENERAL.to_vec();
    if field_type.is_numeric() {
        kinds.extend_from_slice(&AggregatorKind::NUMERIC);
    }
    kinds
        .into_iter()
        .map(|kind| Arc::new(BuiltinAggregator::new(kind)) as Arc<dyn Aggregator>)
        .collect()
}
