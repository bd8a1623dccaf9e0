mod common;

use common::text_record;
use sheet_dash::mapping::{
    Domain, FieldMapping, MappingRules, Role, SalesCandidates, guess_column, guess_mapping,
    guess_sales_mapping,
};
use sheet_dash::record::Record;

#[test]
fn vietnamese_sales_sample_resolves_core_roles() {
    let sample = text_record(
        0,
        &[
            ("Ngày", "01/05/2024"),
            ("Thành tiền", "150,000"),
            ("Tên hàng", "Cà phê"),
        ],
    );
    let mapping = guess_sales_mapping(&sample, &SalesCandidates::default());
    assert_eq!(mapping.date_field, "Ngày");
    assert_eq!(mapping.amount_field, "Thành tiền");
    assert_eq!(mapping.product_field, "Tên hàng");
    assert_eq!(mapping.quantity_field, "");
}

#[test]
fn unaccented_and_english_headers_resolve_by_substring() {
    let sample = text_record(
        0,
        &[
            ("Order Date", "2024-05-01"),
            ("Thanh tien (VND)", "1"),
            ("Product name", "Tea"),
            ("Qty sold", "2"),
        ],
    );
    let mapping = guess_sales_mapping(&sample, &SalesCandidates::default());
    assert_eq!(mapping.date_field, "Order Date");
    assert_eq!(mapping.amount_field, "Thanh tien (VND)");
    assert_eq!(mapping.product_field, "Product name");
    assert_eq!(mapping.quantity_field, "Qty sold");
}

#[test]
fn exact_match_beats_substring_match_on_another_column() {
    let sample = text_record(0, &[("Tổng cộng", "1"), ("Amount", "2")]);
    let column = guess_column(
        &sample,
        Role::Amount,
        &SalesCandidates::default().amount,
    );
    assert_eq!(column, "Amount");
}

#[test]
fn first_substring_hit_wins_even_when_semantically_worse() {
    // "Datetime updated" appears first and contains "date".
    let sample = text_record(0, &[("Datetime updated", "x"), ("Sale date", "y")]);
    let mapping = guess_sales_mapping(&sample, &SalesCandidates::default());
    assert_eq!(mapping.date_field, "Datetime updated");
}

#[test]
fn every_domain_tolerates_an_empty_sample() {
    let empty = Record::new("row-0", Vec::new());
    let rules = MappingRules::default();
    for domain in [Domain::Sales, Domain::Timekeeping, Domain::Personnel] {
        let mapping = guess_mapping(&empty, domain, &rules);
        assert!(
            mapping.entries().iter().all(|(_, column)| column.is_empty()),
            "{domain} mapping should be unresolved"
        );
    }
}

#[test]
fn timekeeping_and_personnel_mappings_use_their_own_terms() {
    let sample = text_record(
        0,
        &[("Họ tên", "An"), ("Ngày", "01/05/2024"), ("Giờ công", "8")],
    );
    let rules = MappingRules::default();
    match guess_mapping(&sample, Domain::Timekeeping, &rules) {
        FieldMapping::Timekeeping(m) => {
            assert_eq!(m.employee_field, "Họ tên");
            assert_eq!(m.date_field, "Ngày");
            assert_eq!(m.hours_field, "Giờ công");
        }
        other => panic!("unexpected mapping {other:?}"),
    }
    match guess_mapping(&sample, Domain::Personnel, &rules) {
        FieldMapping::Personnel(m) => assert_eq!(m.name_field, "Họ tên"),
        other => panic!("unexpected mapping {other:?}"),
    }
}

#[test]
fn mapping_values_are_verbatim_sample_columns_or_empty() {
    let sample = text_record(0, &[(" Ngày ", "x"), ("Amount", "1"), ("Note", "")]);
    let mapping = guess_mapping(&sample, Domain::Sales, &MappingRules::default());
    let columns = sample.columns().collect::<Vec<_>>();
    for (_, column) in mapping.entries() {
        assert!(column.is_empty() || columns.contains(&column));
    }
}

#[test]
fn custom_candidates_replace_defaults() {
    let sample = text_record(0, &[("Doanh thu", "1"), ("Total", "2")]);
    let candidates = SalesCandidates {
        amount: vec!["doanh thu".to_string()],
        ..SalesCandidates::default()
    };
    let mapping = guess_sales_mapping(&sample, &candidates);
    assert_eq!(mapping.amount_field, "Doanh thu");
}
