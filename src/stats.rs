//! Summary statistics for the sales dashboard cards.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    data::parse_amount,
    mapping::SalesMapping,
    record::{CellValue, Record},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
    pub total_quantity: f64,
    pub top_product: Option<String>,
}

/// Computes the sales summary.
///
/// Every record counts as an order, whatever its amount looks like. Amounts that
/// do not parse contribute zero. The top product is the product value with the
/// highest cumulative amount, then the most records, then the earliest appearance.
pub fn compute_stats(records: &[Record], mapping: &SalesMapping) -> SalesStats {
    let mut accumulator = StatsAccumulator::new(mapping);
    for record in records {
        accumulator.ingest(record);
    }
    accumulator.finish()
}

struct ProductTotals {
    amount: f64,
    count: usize,
    first_seen: usize,
}

struct StatsAccumulator<'m> {
    mapping: &'m SalesMapping,
    orders: usize,
    revenue: f64,
    quantity: f64,
    products: HashMap<String, ProductTotals>,
}

impl<'m> StatsAccumulator<'m> {
    fn new(mapping: &'m SalesMapping) -> Self {
        Self {
            mapping,
            orders: 0,
            revenue: 0.0,
            quantity: 0.0,
            products: HashMap::new(),
        }
    }

    fn field_amount(record: &Record, field: &str) -> f64 {
        if field.is_empty() {
            return 0.0;
        }
        parse_amount(record.get(field).unwrap_or(&CellValue::Empty))
    }

    fn ingest(&mut self, record: &Record) {
        let amount = Self::field_amount(record, &self.mapping.amount_field);
        self.revenue += amount;
        self.quantity += Self::field_amount(record, &self.mapping.quantity_field);

        if !self.mapping.product_field.is_empty() {
            let product = record.text(&self.mapping.product_field);
            if !product.trim().is_empty() {
                let position = self.orders;
                let totals = self.products.entry(product).or_insert(ProductTotals {
                    amount: 0.0,
                    count: 0,
                    first_seen: position,
                });
                totals.amount += amount;
                totals.count += 1;
            }
        }
        self.orders += 1;
    }

    fn top_product(&self) -> Option<String> {
        self.products
            .iter()
            .max_by(|(_, a), (_, b)| {
                a.amount
                    .total_cmp(&b.amount)
                    .then_with(|| a.count.cmp(&b.count))
                    .then_with(|| b.first_seen.cmp(&a.first_seen))
            })
            .map(|(name, _)| name.clone())
    }

    fn finish(self) -> SalesStats {
        let average_order_value = if self.orders > 0 {
            self.revenue / self.orders as f64
        } else {
            0.0
        };
        SalesStats {
            total_revenue: self.revenue,
            total_orders: self.orders,
            average_order_value,
            total_quantity: self.quantity,
            top_product: self.top_product(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(product: &str, amount: CellValue) -> Record {
        Record::new(
            "row",
            vec![
                ("Tên hàng".to_string(), CellValue::Text(product.to_string())),
                ("Thành tiền".to_string(), amount),
                ("SL".to_string(), CellValue::Number(2.0)),
            ],
        )
    }

    fn mapping() -> SalesMapping {
        SalesMapping {
            date_field: String::new(),
            amount_field: "Thành tiền".to_string(),
            product_field: "Tên hàng".to_string(),
            quantity_field: "SL".to_string(),
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = compute_stats(&[], &mapping());
        assert_eq!(stats, SalesStats::default());
        assert_eq!(stats.average_order_value, 0.0);
    }

    #[test]
    fn unparseable_amounts_still_count_as_orders() {
        let records = vec![
            sale("Cà phê", CellValue::Text("150,000".into())),
            sale("Trà", CellValue::Text("n/a".into())),
        ];
        let stats = compute_stats(&records, &mapping());
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_revenue, 150000.0);
        assert_eq!(stats.average_order_value, 75000.0);
        assert_eq!(stats.total_quantity, 4.0);
    }

    #[test]
    fn top_product_uses_cumulative_amount() {
        let records = vec![
            sale("Trà", CellValue::Number(10.0)),
            sale("Trà", CellValue::Number(10.0)),
            sale("Cà phê", CellValue::Number(50.0)),
        ];
        let stats = compute_stats(&records, &mapping());
        assert_eq!(stats.top_product.as_deref(), Some("Cà phê"));
    }

    #[test]
    fn top_product_falls_back_to_count_then_first_seen() {
        let mut no_amount = mapping();
        no_amount.amount_field.clear();
        let records = vec![
            sale("Bánh", CellValue::Empty),
            sale("Trà", CellValue::Empty),
            sale("Trà", CellValue::Empty),
        ];
        let stats = compute_stats(&records, &no_amount);
        assert_eq!(stats.top_product.as_deref(), Some("Trà"));

        let tied = vec![sale("Bánh", CellValue::Empty), sale("Trà", CellValue::Empty)];
        let stats = compute_stats(&tied, &no_amount);
        assert_eq!(stats.top_product.as_deref(), Some("Bánh"));
    }

    #[test]
    fn unresolved_product_role_has_no_top_product() {
        let mut no_product = mapping();
        no_product.product_field.clear();
        let records = vec![sale("Trà", CellValue::Number(1.0))];
        assert_eq!(compute_stats(&records, &no_product).top_product, None);
    }
}
