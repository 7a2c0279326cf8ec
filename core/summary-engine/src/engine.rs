//! FILENAME: core/summary-engine/src/engine.rs
//! Summary Engine - The calculation core that transforms records into a renderable table.
//!
//! This module takes records, a grouping field and resolved summaries and
//! produces a GroupedTable.
//!
//! Algorithm:
//! 1. Pick the grouping strategy from the grouping field's type
//! 2. Bucket records by group key, keeping first-seen key order
//! 3. Resolve one aggregator per summary (exact key, else "count")
//! 4. For each (summary, group) pair, aggregate and normalize the value

use std::sync::Arc;

use engine::{AggregateValue, Aggregator, Field, Record};

use crate::definition::{ResolvedSummary, SummaryTableConfig};
use crate::error::SummaryError;
use crate::grouping::{group_records, GroupingStrategy, RecordGroup};
use crate::view::{GroupValue, GroupedTable, SummaryRow, SummaryTableView};

/// Aggregator used when the requested one is not offered by the field.
pub const FALLBACK_AGGREGATOR_KEY: &str = "count";

/// Placeholder rendered instead of an undefined ("NaN") result.
pub const NOT_A_NUMBER_PLACEHOLDER: &str = "-";

// ============================================================================
// AGGREGATOR RESOLUTION
// ============================================================================

/// Finds the aggregator for `key` on `field`, falling back to `count`.
/// Returns `None` (and logs a warning) when neither is offered.
pub fn resolve_aggregator<'f>(field: &'f Field, key: &str) -> Option<&'f Arc<dyn Aggregator>> {
    if let Some(aggregator) = field.aggregator(key) {
        return Some(aggregator);
    }
    if let Some(count) = field.aggregator(FALLBACK_AGGREGATOR_KEY) {
        log::debug!(
            "aggregator '{}' not offered by field '{}', using '{}'",
            key,
            field.name,
            FALLBACK_AGGREGATOR_KEY
        );
        return Some(count);
    }
    log::warn!("Aggregator {} not found for field '{}'", key, field.name);
    None
}

/// Rewrites undefined results for display. Both the literal text "NaN" and
/// a NaN number render as "-"; everything else passes through.
pub fn normalize_display_value(value: AggregateValue) -> AggregateValue {
    match value {
        AggregateValue::Text(ref s) if s == "NaN" => {
            AggregateValue::Text(NOT_A_NUMBER_PLACEHOLDER.to_string())
        }
        AggregateValue::Number(n) if n.is_nan() => {
            AggregateValue::Text(NOT_A_NUMBER_PLACEHOLDER.to_string())
        }
        other => other,
    }
}

// ============================================================================
// SUMMARY CALCULATOR
// ============================================================================

/// Computes a GroupedTable for one set of inputs.
pub struct SummaryCalculator<'a, R: Record> {
    records: &'a [R],
    group_field: Option<&'a Field>,
    summaries: &'a [ResolvedSummary],
}

impl<'a, R: Record> SummaryCalculator<'a, R> {
    pub fn new(
        records: &'a [R],
        group_field: Option<&'a Field>,
        summaries: &'a [ResolvedSummary],
    ) -> Self {
        SummaryCalculator {
            records,
            group_field,
            summaries,
        }
    }

    /// Executes the full calculation.
    pub fn calculate(&self) -> Result<GroupedTable, SummaryError> {
        let Some(group_field) = self.group_field else {
            return Ok(GroupedTable::empty());
        };

        // An unusable grouping field is a configuration error even when
        // there is nothing to group yet.
        GroupingStrategy::for_field_type(group_field.field_type)?;

        if self.records.is_empty() {
            return Ok(GroupedTable::empty());
        }

        let groups = group_records(self.records, group_field)?;
        let columns: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let rows: Vec<SummaryRow> = self
            .summaries
            .iter()
            .map(|summary| Self::calculate_row(summary, &groups))
            .collect();

        log::debug!(
            "computed summary table with {} columns and {} rows",
            columns.len(),
            rows.len()
        );

        Ok(GroupedTable { columns, rows })
    }

    /// Computes one summary across every group.
    fn calculate_row(summary: &ResolvedSummary, groups: &[RecordGroup<'_>]) -> SummaryRow {
        let aggregator = resolve_aggregator(&summary.field, &summary.spec.summary);

        let values = groups
            .iter()
            .map(|group| {
                aggregator.map(|aggregator| GroupValue {
                    group: group.key.clone(),
                    value: normalize_display_value(aggregator.aggregate(&group.records, &summary.field)),
                })
            })
            .collect();

        SummaryRow {
            summary: summary.spec.clone(),
            field_id: summary.field.id.clone(),
            field_name: summary.field.name.clone(),
            values,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Groups `records` by `group_field` and runs every summary per group.
/// This is the main entry point for the calculation engine.
pub fn compute_grouped_table<R: Record>(
    records: &[R],
    group_field: Option<&Field>,
    summaries: &[ResolvedSummary],
) -> Result<GroupedTable, SummaryError> {
    SummaryCalculator::new(records, group_field, summaries).calculate()
}

/// Resolves fields from the persisted config, computes the table and lays
/// out the grid, transposed if the config asks for it.
pub fn render_summary_table<R: Record>(
    config: &SummaryTableConfig,
    fields: &[Field],
    records: &[R],
) -> Result<SummaryTableView, SummaryError> {
    let group_field = config.group_field(fields);
    let summaries = config.resolve_summaries(fields);
    let table = compute_grouped_table(records, group_field, &summaries)?;
    SummaryTableView::new(table, config.transpose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SummarySpec;
    use engine::{AggregatorKind, BuiltinAggregator, FieldType, SourceRecord};

    struct FixedAggregator {
        key: &'static str,
        result: &'static str,
    }

    impl Aggregator for FixedAggregator {
        fn key(&self) -> &str {
            self.key
        }

        fn display_name(&self) -> &str {
            self.key
        }

        fn aggregate(&self, _records: &[&dyn Record], _field: &Field) -> AggregateValue {
            AggregateValue::Text(self.result.to_string())
        }
    }

    fn create_test_records() -> Vec<SourceRecord> {
        vec![
            SourceRecord::new("rec1").with_cell("Year", "2020-01-01").with_cell("Amount", 10.0),
            SourceRecord::new("rec2").with_cell("Year", "2020-06-01").with_cell("Amount", 5.0),
            SourceRecord::new("rec3").with_cell("Year", "2021-01-01").with_cell("Amount", 7.0),
        ]
    }

    fn year_field() -> Field {
        Field::new("fldYear", "Year", FieldType::Date)
    }

    fn amount_summary(key: &str) -> ResolvedSummary {
        ResolvedSummary::new(
            SummarySpec::new("s1", "fldAmount", key),
            Field::new("fldAmount", "Amount", FieldType::Number),
        )
    }

    #[test]
    fn test_basic_summary_calculation() {
        let records = create_test_records();
        let field = year_field();
        let table = compute_grouped_table(&records, Some(&field), &[amount_summary("sum")]).unwrap();

        assert_eq!(table.columns, vec!["2020", "2021"]);
        assert_eq!(
            table.rows[0].values,
            vec![
                Some(GroupValue { group: "2020".to_string(), value: AggregateValue::Number(15.0) }),
                Some(GroupValue { group: "2021".to_string(), value: AggregateValue::Number(7.0) }),
            ]
        );
    }

    #[test]
    fn test_no_group_field() {
        let records = create_test_records();
        let table = compute_grouped_table(&records, None, &[amount_summary("sum")]).unwrap();
        assert_eq!(table, GroupedTable::empty());
    }

    #[test]
    fn test_no_records() {
        let records: Vec<SourceRecord> = Vec::new();
        let field = year_field();
        let table = compute_grouped_table(&records, Some(&field), &[amount_summary("sum")]).unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_no_summaries() {
        let records = create_test_records();
        let field = year_field();
        let table = compute_grouped_table(&records, Some(&field), &[]).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert!(table.rows.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_unsupported_group_field() {
        let records = create_test_records();
        let field = Field::new("fldAmount", "Amount", FieldType::Currency);
        let err = compute_grouped_table(&records, Some(&field), &[amount_summary("sum")]).unwrap_err();
        assert!(matches!(err, SummaryError::UnsupportedFieldType(FieldType::Currency)));
        assert_eq!(err.to_string(), "Unsupported field type: currency");

        let empty: Vec<SourceRecord> = Vec::new();
        assert!(compute_grouped_table(&empty, Some(&field), &[]).is_err());
    }

    #[test]
    fn test_fallback_to_count() {
        let records = create_test_records();
        let field = year_field();
        let fallback = compute_grouped_table(&records, Some(&field), &[amount_summary("nonexistent")]).unwrap();
        let direct = compute_grouped_table(&records, Some(&field), &[amount_summary("count")]).unwrap();

        assert_eq!(fallback.rows[0].values, direct.rows[0].values);
        assert_eq!(
            fallback.rows[0].values[0].as_ref().map(|v| v.value.clone()),
            Some(AggregateValue::Number(2.0))
        );
    }

    #[test]
    fn test_missing_aggregator_yields_null_cells() {
        let records = create_test_records();
        let field = year_field();
        let bare = ResolvedSummary::new(
            SummarySpec::new("s1", "fldAmount", "sum"),
            Field::new("fldAmount", "Amount", FieldType::Number).with_aggregators(Vec::new()),
        );
        let table = compute_grouped_table(&records, Some(&field), &[bare, amount_summary("max")]).unwrap();

        assert_eq!(table.rows[0].values, vec![None, None]);
        assert_eq!(
            table.rows[1].values[0].as_ref().map(|v| v.value.clone()),
            Some(AggregateValue::Number(10.0))
        );
    }

    #[test]
    fn test_nan_is_normalized() {
        let records = create_test_records();
        let field = year_field();
        let summary = ResolvedSummary::new(
            SummarySpec::new("s1", "fldAmount", "weird"),
            Field::new("fldAmount", "Amount", FieldType::Number).with_aggregators(vec![
                Arc::new(FixedAggregator { key: "weird", result: "NaN" }) as Arc<dyn Aggregator>,
            ]),
        );
        let table = compute_grouped_table(&records, Some(&field), &[summary]).unwrap();
        for value in table.rows[0].values.iter().flatten() {
            assert_eq!(value.value, AggregateValue::Text("-".to_string()));
        }
    }

    #[test]
    fn test_normalize_display_value() {
        assert_eq!(normalize_display_value("NaN".into()), AggregateValue::Text("-".to_string()));
        assert_eq!(normalize_display_value(f64::NAN.into()), AggregateValue::Text("-".to_string()));
        assert_eq!(normalize_display_value("nan".into()), AggregateValue::Text("nan".to_string()));
        assert_eq!(normalize_display_value(AggregateValue::Number(3.5)), AggregateValue::Number(3.5));
        assert_eq!(normalize_display_value("12%".into()), AggregateValue::Text("12%".to_string()));
    }

    #[test]
    fn test_resolve_aggregator() {
        let field = Field::new("fldAmount", "Amount", FieldType::Number);
        assert_eq!(resolve_aggregator(&field, "sum").map(|a| a.key()), Some("sum"));
        assert_eq!(resolve_aggregator(&field, "bogus").map(|a| a.key()), Some("count"));

        let only_max = field.with_aggregators(vec![
            Arc::new(BuiltinAggregator::new(AggregatorKind::Max)) as Arc<dyn Aggregator>,
        ]);
        assert!(resolve_aggregator(&only_max, "bogus").is_none());
    }

    #[test]
    fn test_row_order_follows_summaries() {
        let records = create_test_records();
        let field = year_field();
        let mut min = amount_summary("min");
        min.spec.id = Some("s2".to_string());
        let table = compute_grouped_table(&records, Some(&field), &[min, amount_summary("sum")]).unwrap();

        let ids: Vec<Option<&str>> = table.rows.iter().map(|r| r.summary.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("s2"), Some("s1")]);
        for row in &table.rows {
            assert_eq!(row.values.len(), table.columns.len());
        }
    }

    #[test]
    fn test_render_from_config() {
        let records = create_test_records();
        let fields = vec![year_field(), Field::new("fldAmount", "Amount", FieldType::Number)];
        let mut config = SummaryTableConfig::new();
        config.group_field_id = Some("fldYear".to_string());
        config.summaries.push(SummarySpec::new("s1", "fldAmount", "sum"));
        config.transpose = true;

        let view = render_summary_table(&config, &fields, &records).unwrap();
        assert!(view.transposed);
        assert_eq!(view.grid.len(), 3);
        assert_eq!(view.grid[1][1].value, Some(AggregateValue::Number(15.0)));
    }
}
