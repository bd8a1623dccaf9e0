//! Table view model: column resolution, search, column filters and pagination.
//!
//! The view is a pure projection of `(records, options, state)`. [`TableViewState`]
//! is a plain serializable value; every mutation that narrows or widens the result
//! set (search edit, filter edit, clearing) puts the page back to 1.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::record::{Record, SYNTHETIC_ID_COLUMN};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableViewState {
    search: String,
    filters: BTreeMap<String, String>,
    page: usize,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
        }
    }
}

impl TableViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Current 1-based page.
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Selects `value` for `column`; an empty value deactivates the filter.
    pub fn set_filter(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        if value.is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters.insert(column, value);
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.filters.clear();
        self.page = 1;
    }

    pub fn has_filters(&self) -> bool {
        !self.search.is_empty() || self.filters.values().any(|v| !v.is_empty())
    }

    /// Jumps to `page`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page() < total_pages {
            self.page = self.page() + 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page = self.page().saturating_sub(1).max(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    pub hidden_columns: Vec<String>,
    pub filter_columns: Vec<String>,
    pub page_size: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            hidden_columns: Vec::new(),
            filter_columns: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableOptions {
    fn is_hidden(&self, column: &str) -> bool {
        column == SYNTHETIC_ID_COLUMN || self.hidden_columns.iter().any(|c| c == column)
    }

    fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a> {
    pub columns: Vec<String>,
    pub rows: Vec<&'a Record>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub page: usize,
    /// 1-based position of the first row on the page; 0 when nothing matches.
    pub first_row: usize,
    /// 1-based position of the last row on the page.
    pub last_row: usize,
    pub filter_options: BTreeMap<String, Vec<String>>,
}

impl TableView<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages > 0 && self.page < self.total_pages
    }

    /// Cell text for every visible column of every row on the page.
    pub fn cell_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|record| self.columns.iter().map(|c| record.text(c)).collect())
            .collect()
    }
}

/// Visible columns, taken from the first record's key order only.
pub fn visible_columns(records: &[Record], options: &TableOptions) -> Vec<String> {
    records
        .first()
        .map(|first| {
            first
                .columns()
                .filter(|c| !options.is_hidden(c))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Distinct non-empty values per filter column across all records, sorted.
pub fn filter_options(records: &[Record], filter_columns: &[String]) -> BTreeMap<String, Vec<String>> {
    filter_columns
        .iter()
        .map(|column| {
            let values = records
                .iter()
                .map(|record| record.text(column))
                .filter(|value| !value.is_empty())
                .sorted_unstable()
                .dedup()
                .collect::<Vec<_>>();
            (column.clone(), values)
        })
        .collect()
}

fn matches_search(record: &Record, columns: &[String], needle: &str) -> bool {
    needle.is_empty()
        || columns
            .iter()
            .any(|column| record.text(column).to_lowercase().contains(needle))
}

fn matches_filters(record: &Record, filters: &BTreeMap<String, String>) -> bool {
    filters
        .iter()
        .filter(|(_, wanted)| !wanted.is_empty())
        .all(|(column, wanted)| record.text(column) == *wanted)
}

/// Records that pass the search term and every active column filter, in input order.
pub fn filter_records<'a>(
    records: &'a [Record],
    columns: &[String],
    state: &TableViewState,
) -> Vec<&'a Record> {
    let needle = state.search.to_lowercase();
    records
        .iter()
        .filter(|record| matches_search(record, columns, &needle))
        .filter(|record| matches_filters(record, &state.filters))
        .collect()
}

/// Projects the current page of the table.
///
/// A page past the end yields an empty page rather than wrapping.
pub fn compute_view<'a>(
    records: &'a [Record],
    options: &TableOptions,
    state: &TableViewState,
) -> TableView<'a> {
    let columns = visible_columns(records, options);
    let filtered = filter_records(records, &columns, state);
    let total_filtered = filtered.len();
    let page_size = options.page_size();
    let total_pages = total_filtered.div_ceil(page_size);
    let page = state.page();
    let start = (page - 1).saturating_mul(page_size);
    let rows = filtered
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect::<Vec<_>>();
    let (first_row, last_row) = if rows.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + rows.len())
    };
    debug!(
        "Table view: {total_filtered} of {} record(s) match, page {page}/{total_pages}",
        records.len()
    );
    TableView {
        columns,
        rows,
        total_filtered,
        total_pages,
        page,
        first_row,
        last_row,
        filter_options: filter_options(records, &options.filter_columns),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;

    fn row(index: usize, branch: &str, note: &str) -> Record {
        Record::new(
            format!("row-{index}"),
            vec![
                ("Chi nhánh".to_string(), CellValue::Text(branch.to_string())),
                ("Ghi chú".to_string(), CellValue::Text(note.to_string())),
                ("Số".to_string(), CellValue::Number(index as f64)),
            ],
        )
    }

    fn dataset(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| row(i, if i % 2 == 0 { "Hà Nội" } else { "Huế" }, "ok"))
            .collect()
    }

    #[test]
    fn columns_come_from_first_record_minus_hidden() {
        let records = dataset(3);
        let options = TableOptions {
            hidden_columns: vec!["Ghi chú".to_string()],
            ..TableOptions::default()
        };
        let view = compute_view(&records, &options, &TableViewState::new());
        assert_eq!(view.columns, vec!["Chi nhánh", "Số"]);
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let records = dataset(23);
        let mut state = TableViewState::new();
        state.go_to_page(3, 3);
        let view = compute_view(&records, &TableOptions::default(), &state);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.rows.len(), 3);
        assert_eq!((view.first_row, view.last_row), (21, 23));
        assert!(!view.has_next());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let records = dataset(5);
        let mut state = TableViewState::new();
        state.set_search("không có");
        let view = compute_view(&records, &TableOptions::default(), &state);
        assert_eq!(view.total_filtered, 0);
        assert_eq!(view.total_pages, 0);
        assert!(view.rows.is_empty());
        assert_eq!(view.first_row, 0);
        assert!(!view.has_next());
    }

    #[test]
    fn search_is_case_insensitive_over_visible_columns() {
        let records = dataset(4);
        let mut state = TableViewState::new();
        state.set_search("HUẾ");
        let view = compute_view(&records, &TableOptions::default(), &state);
        assert_eq!(view.total_filtered, 2);

        let hidden = TableOptions {
            hidden_columns: vec!["Chi nhánh".to_string()],
            ..TableOptions::default()
        };
        let view = compute_view(&records, &hidden, &state);
        assert_eq!(view.total_filtered, 0);
    }

    #[test]
    fn column_filters_require_exact_equality() {
        let records = dataset(4);
        let mut state = TableViewState::new();
        state.set_filter("Chi nhánh", "Hà");
        assert_eq!(compute_view(&records, &TableOptions::default(), &state).total_filtered, 0);
        state.set_filter("Chi nhánh", "Hà Nội");
        state.set_filter("Số", "2");
        let view = compute_view(&records, &TableOptions::default(), &state);
        assert_eq!(view.total_filtered, 1);
        assert_eq!(view.rows[0].id(), "row-2");
    }

    #[test]
    fn edits_reset_page_and_navigation_clamps() {
        let mut state = TableViewState::new();
        state.go_to_page(4, 5);
        state.set_search("x");
        assert_eq!(state.page(), 1);
        state.go_to_page(4, 5);
        state.set_filter("a", "b");
        assert_eq!(state.page(), 1);
        state.previous_page();
        assert_eq!(state.page(), 1);
        state.next_page(2);
        state.next_page(2);
        assert_eq!(state.page(), 2);
        state.clear_filters();
        assert_eq!(state.page(), 1);
        assert!(!state.has_filters());
    }

    #[test]
    fn filter_options_span_all_records_sorted() {
        let mut records = dataset(3);
        records.push(row(3, "", "ok"));
        let options = filter_options(&records, &["Chi nhánh".to_string()]);
        // Code-point order: 'u' sorts before 'à'.
        assert_eq!(options["Chi nhánh"], vec!["Huế", "Hà Nội"]);
    }
}
