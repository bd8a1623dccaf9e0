pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod fetch;
pub mod io_utils;
pub mod mapping;
pub mod record;
pub mod stats;
pub mod table;
pub mod timekeeping;
pub mod view;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, SalesFieldArgs, SourceArgs},
    config::DashboardConfig,
    mapping::{SalesMapping, TimekeepingMapping},
    record::Record,
    view::{TableOptions, TableViewState},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_dash", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref())?;
    match cli.command {
        Commands::Fetch(args) => handle_fetch(&args, &config),
        Commands::Mapping(args) => handle_mapping(&args, &config),
        Commands::Chart(args) => handle_chart(&args, &config),
        Commands::Stats(args) => handle_stats(&args, &config),
        Commands::Employees(args) => handle_employees(&args, &config),
        Commands::Table(args) => handle_table(&args, &config),
        Commands::Config => {
            print!("{}", config.to_redacted_yaml()?);
            Ok(())
        }
    }
}

fn load_source(source: &SourceArgs, config: &DashboardConfig) -> Result<Vec<Record>> {
    let records = match (&source.input, &source.table) {
        (Some(path), _) => {
            let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
            io_utils::load_records(path, source.delimiter, encoding)
                .with_context(|| format!("Loading records from {path:?}"))?
        }
        (None, Some(alias)) => {
            let table = config.tables.resolve(alias);
            fetch::TableClient::from_config(&config.api)?
                .fetch_table(table)
                .with_context(|| format!("Fetching table '{table}'"))?
        }
        (None, None) => anyhow::bail!("Provide --input or --table"),
    };
    info!("Loaded {} record(s)", records.len());
    Ok(records)
}

fn sample(records: &[Record]) -> Record {
    records
        .first()
        .cloned()
        .unwrap_or_else(|| Record::new("row-0", Vec::new()))
}

fn override_field(target: &mut String, value: &Option<String>) {
    if let Some(column) = value {
        *target = column.clone();
    }
}

fn sales_mapping(records: &[Record], fields: &SalesFieldArgs, config: &DashboardConfig) -> SalesMapping {
    let mut mapping = mapping::guess_sales_mapping(&sample(records), &config.mapping.sales);
    override_field(&mut mapping.date_field, &fields.date_field);
    override_field(&mut mapping.amount_field, &fields.amount_field);
    override_field(&mut mapping.product_field, &fields.product_field);
    override_field(&mut mapping.quantity_field, &fields.quantity_field);
    debug!("Sales mapping: {mapping:?}");
    mapping
}

fn handle_fetch(args: &cli::FetchArgs, config: &DashboardConfig) -> Result<()> {
    let client = fetch::TableClient::from_config(&config.api)?;
    let table = config.tables.resolve(&args.table);
    let records = client
        .fetch_table(table)
        .with_context(|| format!("Fetching table '{table}'"))?;
    io_utils::write_records_json(args.output.as_deref(), &records)?;
    info!("Wrote {} record(s) from '{table}'", records.len());
    Ok(())
}

fn handle_mapping(args: &cli::MappingArgs, config: &DashboardConfig) -> Result<()> {
    let records = load_source(&args.source, config)?;
    let mapping = mapping::guess_mapping(&sample(&records), args.domain, &config.mapping);
    print!("{}", table::render_mapping(&mapping));
    info!("Resolved {} mapping", args.domain);
    Ok(())
}

fn handle_chart(args: &cli::ChartArgs, config: &DashboardConfig) -> Result<()> {
    let records = load_source(&args.source, config)?;
    let mapping = sales_mapping(&records, &args.fields, config);
    let days = args.days.unwrap_or(config.display.chart_days);
    let points = chart::aggregate_by_day(&records, &mapping, days);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else if mapping.date_field.is_empty() || mapping.amount_field.is_empty() {
        println!("Cannot determine the date or amount column to chart.");
    } else if points.is_empty() {
        println!("No dated sales to chart.");
    } else {
        print!("{}", table::render_chart(&points));
    }
    info!("Charted {} day(s)", points.len());
    Ok(())
}

fn handle_stats(args: &cli::StatsArgs, config: &DashboardConfig) -> Result<()> {
    let records = load_source(&args.source, config)?;
    let mapping = sales_mapping(&records, &args.fields, config);
    let summary = stats::compute_stats(&records, &mapping);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", table::render_stats(&summary));
    }
    info!("Summarised {} order(s)", summary.total_orders);
    Ok(())
}

fn handle_employees(args: &cli::EmployeesArgs, config: &DashboardConfig) -> Result<()> {
    let records = load_source(&args.source, config)?;
    let mut mapping: TimekeepingMapping =
        mapping::guess_timekeeping_mapping(&sample(&records), &config.mapping.timekeeping);
    override_field(&mut mapping.employee_field, &args.employee_field);
    override_field(&mut mapping.date_field, &args.date_field);
    override_field(&mut mapping.hours_field, &args.hours_field);
    debug!("Timekeeping mapping: {mapping:?}");

    let limit = args.top.unwrap_or(config.display.top_employees);
    let top = timekeeping::top_employees(&records, &mapping, limit);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&top)?);
    } else {
        print!(
            "{}",
            table::render_employees(&top, config.display.full_time_hours)
        );
    }
    info!("Listed {} employee(s)", top.len());
    Ok(())
}

fn handle_table(args: &cli::TableArgs, config: &DashboardConfig) -> Result<()> {
    let records = load_source(&args.source, config)?;
    let options = TableOptions {
        hidden_columns: args.hide.clone(),
        filter_columns: args.filter_columns.clone(),
        page_size: args.page_size.unwrap_or(config.display.page_size),
    };
    let mut state = TableViewState::new();
    state.set_search(args.search.clone());
    for (column, value) in &args.filters {
        state.set_filter(column.clone(), value.clone());
    }
    // Narrowing resets to page 1; the requested page is applied afterwards.
    let total_pages = view::compute_view(&records, &options, &state).total_pages;
    state.go_to_page(args.page, total_pages);
    let projected = view::compute_view(&records, &options, &state);
    print!("{}", table::render_view(&projected));
    info!(
        "Showing page {}/{} of {} matching record(s)",
        projected.page, projected.total_pages, projected.total_filtered
    );
    Ok(())
}
