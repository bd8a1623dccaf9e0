//! Daily revenue series for the sales chart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::trace;
use serde::Serialize;

use crate::{
    data::{day_label, parse_amount, parse_calendar_date},
    mapping::SalesMapping,
    record::{CellValue, Record},
};

/// Number of most recent days with data kept for display.
pub const DEFAULT_CHART_DAYS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Localized `dd/mm` label.
    pub label: String,
    /// Bucket key; serializes as an ISO date.
    pub date: NaiveDate,
    pub amount: f64,
}

/// Sums parsed amounts per calendar day, oldest first, keeping only the last
/// `window` days that have at least one record.
///
/// Records whose date does not parse are skipped. Records whose amount does not
/// parse still open their day bucket with a zero contribution. An unresolved date
/// or amount role yields an empty series.
pub fn aggregate_by_day(records: &[Record], mapping: &SalesMapping, window: usize) -> Vec<ChartPoint> {
    if mapping.date_field.is_empty() || mapping.amount_field.is_empty() {
        return Vec::new();
    }

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        let Some(date) = record
            .get(&mapping.date_field)
            .and_then(parse_calendar_date)
        else {
            trace!("Skipping record '{}' with unparseable date", record.id());
            continue;
        };
        let amount = parse_amount(record.get(&mapping.amount_field).unwrap_or(&CellValue::Empty));
        *buckets.entry(date).or_insert(0.0) += amount;
    }

    let skip = buckets.len().saturating_sub(window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(date, amount)| ChartPoint {
            label: day_label(date),
            date,
            amount,
        })
        .collect()
}
