//! Local input loading.
//!
//! Record sets can be read from a JSON array (the shape the backend API returns),
//! or from CSV/TSV exports. The format follows the file extension; `-` reads JSON
//! from stdin. Input bytes are decoded through `encoding_rs`, defaulting to UTF-8.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::record::{self, Record};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Delimited(u8),
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// JSON unless the extension says CSV or TSV; an explicit delimiter forces
/// delimited parsing.
pub fn resolve_input_format(path: &Path, delimiter: Option<u8>) -> InputFormat {
    if let Some(delim) = delimiter {
        return InputFormat::Delimited(delim);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => InputFormat::Delimited(DEFAULT_TSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Delimited(DEFAULT_CSV_DELIMITER),
        _ => InputFormat::Json,
    }
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading records from stdin")?;
    } else {
        let mut reader =
            BufReader::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?);
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn parse_json_records(text: &str, source: &str) -> Result<Vec<Record>> {
    let body: serde_json::Value =
        serde_json::from_str(text).with_context(|| format!("Parsing JSON records from {source}"))?;
    Ok(record::records_from_json(&body, source))
}

pub fn parse_delimited_records(
    bytes: &[u8],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = decode_record(&reader.byte_headers()?.clone(), encoding)?;
    let mut rows = Vec::new();
    for (idx, result) in reader.byte_records().enumerate() {
        let row = result.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(decode_record(&row, encoding).with_context(|| format!("Decoding row {}", idx + 2))?);
    }
    Ok(record::records_from_rows(&headers, rows))
}

/// Loads every record from `path` (or stdin for `-`).
pub fn load_records(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Vec<Record>> {
    let bytes = read_all(path)?;
    match resolve_input_format(path, delimiter) {
        InputFormat::Json => {
            let text = decode_bytes(&bytes, encoding)
                .with_context(|| format!("Decoding {path:?}"))?;
            parse_json_records(text.trim_start_matches('\u{feff}'), &path.display().to_string())
        }
        InputFormat::Delimited(delim) => parse_delimited_records(&bytes, delim, encoding)
            .with_context(|| format!("Parsing delimited records from {path:?}")),
    }
}

/// Writes records as a pretty JSON array to `path`, or stdout when absent or `-`.
pub fn write_records_json(path: Option<&Path>, records: &[Record]) -> Result<()> {
    let body = serde_json::to_string_pretty(&record::records_to_json(records))?;
    match path {
        Some(p) if !is_dash(p) => {
            let mut file = File::create(p).with_context(|| format!("Creating output file {p:?}"))?;
            writeln!(file, "{body}").with_context(|| format!("Writing {p:?}"))?;
        }
        _ => println!("{body}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;
    use encoding_rs::WINDOWS_1258;

    #[test]
    fn format_follows_extension() {
        assert_eq!(resolve_input_format(Path::new("a.json"), None), InputFormat::Json);
        assert_eq!(
            resolve_input_format(Path::new("a.TSV"), None),
            InputFormat::Delimited(b'\t')
        );
        assert_eq!(
            resolve_input_format(Path::new("a.txt"), Some(b';')),
            InputFormat::Delimited(b';')
        );
        assert_eq!(resolve_input_format(Path::new("-"), None), InputFormat::Json);
    }

    #[test]
    fn delimited_rows_become_records_with_empty_cells() {
        let bytes = b"Ngay,Thanh tien\n2024-05-01,\"100,000\"\n2024-05-02,\n";
        let records = parse_delimited_records(bytes, b',', UTF_8).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Thanh tien"), "100,000");
        assert_eq!(records[1].get("Thanh tien"), Some(&CellValue::Empty));
        assert_eq!(records[1].id(), "row-1");
    }

    #[test]
    fn legacy_encodings_are_decoded() {
        let (encoded, _, _) = WINDOWS_1258.encode("Tên\nAn\n");
        let records = parse_delimited_records(&encoded, b',', WINDOWS_1258).expect("parse");
        assert_eq!(records[0].columns().collect::<Vec<_>>(), vec!["Tên"]);
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(resolve_encoding(Some("klingon")).is_err());
    }
}
