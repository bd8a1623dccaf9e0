//! Terminal presentation of dashboard results.
//!
//! Everything here is a pure `String` builder; callers decide where it goes.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    chart::ChartPoint,
    data::{format_compact, format_count, format_currency, format_hours},
    mapping::FieldMapping,
    stats::SalesStats,
    timekeeping::EmployeeStat,
    view::TableView,
};

const BAR_WIDTH: usize = 40;
const COLUMN_GAP: &str = "  ";

/// Column-aligned text table with a dashed separator under the header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.truncate(line.trim_end().len());
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn render_mapping(mapping: &FieldMapping) -> String {
    let headers = vec!["role".to_string(), "column".to_string()];
    let rows = mapping
        .entries()
        .into_iter()
        .map(|(role, column)| {
            let column = if column.is_empty() {
                "(unresolved)".to_string()
            } else {
                column.to_string()
            };
            vec![role.to_string(), column]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

/// One page of the record table followed by the "showing X to Y of Z" footer.
pub fn render_view(view: &TableView<'_>) -> String {
    let mut output = if view.columns.is_empty() {
        String::from("No records.\n")
    } else if view.rows.is_empty() {
        let mut empty = render_table(&view.columns, &[]);
        empty.push_str("No records match the current search and filters.\n");
        empty
    } else {
        render_table(&view.columns, &view.cell_rows())
    };
    let _ = writeln!(
        output,
        "Showing {} to {} of {} (page {}/{})",
        view.first_row,
        view.last_row,
        view.total_filtered,
        if view.total_pages == 0 { 0 } else { view.page },
        view.total_pages
    );
    let mut pages = Vec::new();
    if view.has_previous() {
        pages.push(format!("previous: --page {}", view.page - 1));
    }
    if view.has_next() {
        pages.push(format!("next: --page {}", view.page + 1));
    }
    if !pages.is_empty() {
        let _ = writeln!(output, "{}", pages.join(" | "));
    }
    for (column, values) in &view.filter_options {
        let _ = writeln!(output, "Filter '{column}': {}", values.join(" | "));
    }
    output
}

pub fn render_stats(stats: &SalesStats) -> String {
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = vec![
        vec![
            "Total revenue".to_string(),
            format_currency(stats.total_revenue),
        ],
        vec!["Total orders".to_string(), format_count(stats.total_orders as f64)],
        vec![
            "Average order value".to_string(),
            format_currency(stats.average_order_value),
        ],
        vec!["Total quantity".to_string(), format_count(stats.total_quantity)],
        vec![
            "Top product".to_string(),
            stats.top_product.clone().unwrap_or_else(|| "-".to_string()),
        ],
    ];
    render_table(&headers, &rows)
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "#".repeat(cells.min(BAR_WIDTH))
}

pub fn render_chart(points: &[ChartPoint]) -> String {
    let max = points.iter().map(|p| p.amount).fold(0.0_f64, f64::max);
    let headers = vec!["day".to_string(), "revenue".to_string(), String::new()];
    let rows = points
        .iter()
        .map(|point| {
            vec![
                point.label.clone(),
                format_compact(point.amount),
                bar(point.amount, max),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn render_employees(stats: &[EmployeeStat], full_time_hours: f64) -> String {
    let max = stats.iter().map(|s| s.total_hours).fold(0.0_f64, f64::max);
    let headers = vec![
        "employee".to_string(),
        "hours".to_string(),
        "days".to_string(),
        String::new(),
    ];
    let rows = stats
        .iter()
        .map(|stat| {
            let marker = if stat.is_full_time(full_time_hours) { "*" } else { "" };
            vec![
                stat.name.clone(),
                format_hours(stat.total_hours),
                stat.days_worked.to_string(),
                format!("{}{marker}", bar(stat.total_hours, max)),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}
