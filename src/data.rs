//! Value parsing and display formatting.
//!
//! Source data arrives as loosely typed cells: amounts may be numbers or text with
//! thousands separators, dates may be epoch milliseconds, ISO strings or day-first
//! locale strings. Parsing here never fails loudly: callers decide whether an
//! unparseable value is skipped (dates) or counted as zero (amounts).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::record::CellValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];

/// Parses a monetary or quantity cell.
///
/// Numbers pass through; text has every `,` stripped and then its leading decimal
/// literal parsed. Anything unusable contributes `0.0`.
pub fn parse_amount(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) | CellValue::Bool(_) | CellValue::Empty => 0.0,
        CellValue::Text(text) => {
            let stripped = text.replace(',', "");
            parse_leading_float(&stripped).unwrap_or(0.0)
        }
    }
}

/// Parses the longest decimal literal at the start of `input` (after leading
/// whitespace), so `"150000 đ"` yields `150000.0`.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a cell into a calendar day.
///
/// Every form lands on the UTC calendar day: numbers are epoch milliseconds, RFC 3339
/// text is shifted by its offset, and text without an offset is read as UTC. Text is
/// tried as RFC 3339, then the date-time forms, then the plain date forms. Slash
/// dates are day-first.
pub fn parse_calendar_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(millis) => {
            if !millis.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(*millis as i64).map(|dt| dt.date_naive())
        }
        CellValue::Text(text) => parse_date_text(text.trim()),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Short day label used on chart axes (`dd/mm`).
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a whole number the vi-VN way (`1.234.567`).
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits, '.');
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a VND amount (`150.000 ₫`). The dong has no minor unit.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("{} ₫", format_count(value))
}

/// Compact axis label: `1.5B`, `12M`, `3K`, or the plain value below a thousand.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.0}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.0}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_hours(value: f64) -> String {
    format!("{value:.1} giờ")
}
