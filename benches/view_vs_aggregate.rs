use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use sheet_dash::chart::{DEFAULT_CHART_DAYS, aggregate_by_day};
use sheet_dash::mapping::{SalesCandidates, guess_sales_mapping};
use sheet_dash::record::{CellValue, Record};
use sheet_dash::stats::compute_stats;
use sheet_dash::view::{TableOptions, TableViewState, compute_view};

fn generate_sales(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            let product = match i % 3 {
                0 => "Cà phê",
                1 => "Trà",
                _ => "Bánh mì",
            };
            let day = (i % 28) + 1;
            Record::new(
                format!("row-{i}"),
                vec![
                    (
                        "Ngày".to_string(),
                        CellValue::Text(format!("{day:02}/05/2024")),
                    ),
                    ("Tên hàng".to_string(), CellValue::Text(product.to_string())),
                    (
                        "Thành tiền".to_string(),
                        CellValue::Text(format!("{},000", (i % 500) + 1)),
                    ),
                    (
                        "Chi nhánh".to_string(),
                        CellValue::Text(if i % 2 == 0 { "Hà Nội" } else { "Huế" }.to_string()),
                    ),
                ],
            )
        })
        .collect()
}

fn bench_dashboard(c: &mut Criterion) {
    let records = generate_sales(50_000);
    let mapping = guess_sales_mapping(&records[0], &SalesCandidates::default());
    let options = TableOptions {
        filter_columns: vec!["Chi nhánh".to_string()],
        ..TableOptions::default()
    };

    c.bench_function("aggregate_by_day_50k", |b| {
        b.iter(|| aggregate_by_day(&records, &mapping, DEFAULT_CHART_DAYS))
    });

    c.bench_function("compute_stats_50k", |b| {
        b.iter(|| compute_stats(&records, &mapping))
    });

    c.bench_function("compute_view_search_50k", |b| {
        b.iter_batched(
            || {
                let mut state = TableViewState::new();
                state.set_search("trà");
                state.set_filter("Chi nhánh", "Huế");
                state
            },
            |state| compute_view(&records, &options, &state).total_filtered,
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_dashboard);
criterion_main!(benches);
