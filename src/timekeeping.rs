//! Per-employee hour and day totals from timekeeping rows.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    data::{parse_amount, parse_calendar_date},
    mapping::TimekeepingMapping,
    record::Record,
};

pub const DEFAULT_TOP_EMPLOYEES: usize = 20;
/// Monthly hours at or above which an employee counts as full time.
pub const FULL_TIME_HOURS: f64 = 160.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStat {
    pub name: String,
    pub total_hours: f64,
    pub days_worked: usize,
}

impl EmployeeStat {
    pub fn is_full_time(&self, threshold: f64) -> bool {
        self.total_hours >= threshold
    }
}

#[derive(Default)]
struct EmployeeTotals {
    hours: f64,
    days: HashSet<NaiveDate>,
}

/// Aggregates timekeeping rows per employee, ordered by total hours (descending,
/// ties by name).
///
/// Rows without an employee value are ignored. Hours come from the hours role and
/// follow the amount parsing rule; days worked counts distinct parseable dates.
pub fn employee_stats(records: &[Record], mapping: &TimekeepingMapping) -> Vec<EmployeeStat> {
    if mapping.employee_field.is_empty() {
        return Vec::new();
    }

    let mut totals: HashMap<String, EmployeeTotals> = HashMap::new();
    for record in records {
        let name = record.text(&mapping.employee_field).trim().to_string();
        if name.is_empty() {
            continue;
        }
        let entry = totals.entry(name).or_default();
        if !mapping.hours_field.is_empty()
            && let Some(value) = record.get(&mapping.hours_field)
        {
            entry.hours += parse_amount(value);
        }
        if !mapping.date_field.is_empty()
            && let Some(date) = record
                .get(&mapping.date_field)
                .and_then(parse_calendar_date)
        {
            entry.days.insert(date);
        }
    }

    let mut stats = totals
        .into_iter()
        .map(|(name, totals)| EmployeeStat {
            name,
            total_hours: totals.hours,
            days_worked: totals.days.len(),
        })
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| {
        b.total_hours
            .total_cmp(&a.total_hours)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats
}

/// Highest-hour employees for display.
pub fn top_employees(records: &[Record], mapping: &TimekeepingMapping, limit: usize) -> Vec<EmployeeStat> {
    let mut stats = employee_stats(records, mapping);
    stats.truncate(limit);
    stats
}
