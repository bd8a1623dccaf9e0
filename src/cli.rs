use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::mapping::Domain;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sales, timekeeping and personnel dashboards from spreadsheet backends", long_about = None)]
pub struct Cli {
    /// YAML configuration file (credentials, table names, candidate terms, limits)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a table from the backend and write its rows as JSON
    Fetch(FetchArgs),
    /// Guess which columns play which business role
    Mapping(MappingArgs),
    /// Daily revenue for the most recent days with sales
    Chart(ChartArgs),
    /// Revenue, order count, average order value and top product
    Stats(StatsArgs),
    /// Hours and days worked per employee
    Employees(EmployeesArgs),
    /// Searchable, filterable, paginated record table
    Table(TableArgs),
    /// Print the effective configuration (credentials masked)
    Config,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "table"])))]
pub struct SourceArgs {
    /// Local records: JSON array, CSV or TSV (`-` reads JSON from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Remote table to fetch: a configured alias (`sales`, `timekeeping`, ...) or a table name
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Delimiter for CSV input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Remote table to fetch: a configured alias or a table name
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MappingArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Business domain whose roles should be resolved
    #[arg(long, value_enum, default_value = "sales")]
    pub domain: Domain,
}

#[derive(Debug, Args, Default)]
pub struct SalesFieldArgs {
    /// Use this column as the date field instead of guessing
    #[arg(long = "date-field")]
    pub date_field: Option<String>,
    /// Use this column as the amount field instead of guessing
    #[arg(long = "amount-field")]
    pub amount_field: Option<String>,
    /// Use this column as the product field instead of guessing
    #[arg(long = "product-field")]
    pub product_field: Option<String>,
    /// Use this column as the quantity field instead of guessing
    #[arg(long = "quantity-field")]
    pub quantity_field: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub fields: SalesFieldArgs,
    /// Number of most recent days to show (defaults to the configured value)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub days: Option<usize>,
    /// Emit the points as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub fields: SalesFieldArgs,
    /// Emit the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct EmployeesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Use this column as the employee field instead of guessing
    #[arg(long = "employee-field")]
    pub employee_field: Option<String>,
    /// Use this column as the date field instead of guessing
    #[arg(long = "date-field")]
    pub date_field: Option<String>,
    /// Use this column as the hours field instead of guessing
    #[arg(long = "hours-field")]
    pub hours_field: Option<String>,
    /// Number of employees to show (defaults to the configured value)
    #[arg(long)]
    pub top: Option<usize>,
    /// Emit the totals as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Case-insensitive search across visible columns
    #[arg(long, default_value = "")]
    pub search: String,
    /// Exact-match column filter `column=value` (repeatable)
    #[arg(long = "filter", action = clap::ArgAction::Append, value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
    /// Column offering a filter dropdown; its distinct values are listed (repeatable)
    #[arg(long = "filter-column", action = clap::ArgAction::Append)]
    pub filter_columns: Vec<String>,
    /// Column to hide (repeatable)
    #[arg(long = "hide", action = clap::ArgAction::Append)]
    pub hide: Vec<String>,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (defaults to the configured value)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

/// Parses `column=value`; the value may itself contain `=`.
pub fn parse_filter(value: &str) -> Result<(String, String), String> {
    let (column, selected) = value
        .split_once('=')
        .ok_or_else(|| format!("Filter '{value}' must look like column=value"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("Filter '{value}' is missing a column name"));
    }
    Ok((column.to_string(), selected.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_filter_splits_on_first_equals() {
        assert_eq!(
            parse_filter("Ghi chú=a=b").unwrap(),
            ("Ghi chú".to_string(), "a=b".to_string())
        );
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn parse_delimiter_accepts_names() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
