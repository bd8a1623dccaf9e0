//! Record model and ingestion.
//!
//! A [`Record`] is an open-ended, ordered mapping of column name to [`CellValue`]
//! plus a synthetic identifier assigned when the batch is ingested. Column order is
//! kept exactly as the source delivered it: JSON object order for API bodies, header
//! order for CSV files. Records are never mutated after ingestion.

use log::warn;
use serde_json::Value as JsonValue;

/// Column name reserved for the synthetic identifier.
pub const SYNTHETIC_ID_COLUMN: &str = "_id";

/// Source columns consulted, in priority order, when assigning the synthetic identifier.
pub const ID_SOURCE_COLUMNS: &[&str] = &["_RowNumber", "Row ID", "ID"];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Kept apart from text so a `false` identifier is not mistaken for a value.
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Empty,
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            JsonValue::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Text(s) => JsonValue::String(s.clone()),
            CellValue::Bool(b) => JsonValue::Bool(*b),
            CellValue::Empty => JsonValue::Null,
        }
    }

    /// Stringified form used for display, search, filter matching and grouping.
    pub fn as_display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Builds a record from ordered fields. A field named [`SYNTHETIC_ID_COLUMN`] is
    /// dropped: the identifier lives beside the data, never inside it.
    pub fn new(id: impl Into<String>, fields: Vec<(String, CellValue)>) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(name, _)| name != SYNTHETIC_ID_COLUMN)
            .collect();
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Stringified value of `column`; absent columns stringify to `""`.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(CellValue::as_display).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// JSON object form with the synthetic identifier appended as `_id`.
    pub fn to_json(&self) -> JsonValue {
        let mut map = serde_json::Map::with_capacity(self.fields.len() + 1);
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        map.insert(
            SYNTHETIC_ID_COLUMN.to_string(),
            JsonValue::String(self.id.clone()),
        );
        JsonValue::Object(map)
    }
}

/// Picks the synthetic identifier for the row at `index`.
///
/// The first identifier-like column holding a non-blank, non-zero, non-`false`
/// value wins; otherwise the identifier is `row-{index}`.
pub fn synthetic_id(fields: &[(String, CellValue)], index: usize) -> String {
    for candidate in ID_SOURCE_COLUMNS {
        let Some((_, value)) = fields.iter().find(|(name, _)| name == candidate) else {
            continue;
        };
        match value {
            CellValue::Number(n) if *n != 0.0 && !n.is_nan() => return format_number(*n),
            CellValue::Text(s) if !s.is_empty() => return s.clone(),
            CellValue::Bool(true) => return true.to_string(),
            _ => {}
        }
    }
    format!("row-{index}")
}

/// Ingests a decoded API response body.
///
/// Only an array body yields records; anything else is logged and treated as an
/// empty table. Array elements that are not objects are skipped.
pub fn records_from_json(body: &JsonValue, source: &str) -> Vec<Record> {
    let Some(rows) = body.as_array() else {
        warn!("Source '{source}' returned a non-array body; treating it as empty");
        return Vec::new();
    };
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Some(object) = row.as_object() else {
            warn!("Skipping non-object element at position {index} in '{source}'");
            continue;
        };
        let fields = object
            .iter()
            .map(|(name, value)| (name.clone(), CellValue::from_json(value)))
            .collect::<Vec<_>>();
        let id = synthetic_id(&fields, index);
        records.push(Record::new(id, fields));
    }
    records
}

/// Ingests already-decoded CSV rows under `headers`.
pub fn records_from_rows(headers: &[String], rows: Vec<Vec<String>>) -> Vec<Record> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let fields = headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let raw = row.get(col).map(String::as_str).unwrap_or("");
                    let value = if raw.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(raw.to_string())
                    };
                    (name.clone(), value)
                })
                .collect::<Vec<_>>();
            let id = synthetic_id(&fields, index);
            Record::new(id, fields)
        })
        .collect()
}

pub fn records_to_json(records: &[Record]) -> JsonValue {
    JsonValue::Array(records.iter().map(Record::to_json).collect())
}
