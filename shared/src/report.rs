//! Reporting helpers: daily revenue aggregation and CSV export

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CashTransaction, Sale};
use crate::money::{to_decimal, to_f64};

/// A record that contributes revenue on a given instant
pub trait RevenueRecord {
    /// Unix millis the record is booked at
    fn booked_at(&self) -> i64;
    /// Amount counted towards the day's total
    fn revenue(&self) -> f64;
}

impl RevenueRecord for Sale {
    fn booked_at(&self) -> i64 {
        self.created_at
    }

    fn revenue(&self) -> f64 {
        self.total
    }
}

/// Cash entries count with sign, so a day's total is its net cash flow
impl RevenueRecord for CashTransaction {
    fn booked_at(&self) -> i64 {
        self.occurred_at
    }

    fn revenue(&self) -> f64 {
        self.signed_amount()
    }
}

/// Revenue of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total: f64,
    pub count: i64,
    pub average: f64,
}

/// Widest offset any real zone uses (±18h)
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Pin an offset into ±[`MAX_UTC_OFFSET_MINUTES`]
pub fn clamp_offset_minutes(utc_offset_minutes: i32) -> i32 {
    utc_offset_minutes.clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES)
}

fn offset(utc_offset_minutes: i32) -> FixedOffset {
    clamp_offset_minutes(utc_offset_minutes)
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix())
}

/// Calendar day of a timestamp at the given offset
pub fn day_of(millis: i64, utc_offset_minutes: i32) -> String {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&offset(utc_offset_minutes))
        .format("%Y-%m-%d")
        .to_string()
}

/// Group records by calendar day, summing totals and counts.
///
/// Days come out sorted ascending; `average` is `total / count` rounded to
/// two decimals.
pub fn aggregate_daily<'a, R, I>(records: I, utc_offset_minutes: i32) -> Vec<DailyRevenue>
where
    R: RevenueRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut days: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    for record in records {
        let entry = days
            .entry(day_of(record.booked_at(), utc_offset_minutes))
            .or_default();
        entry.0 += to_decimal(record.revenue());
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (total, count))| DailyRevenue {
            date,
            total: to_f64(total),
            count,
            average: to_f64(total / Decimal::from(count)),
        })
        .collect()
}

/// Column headers of the sales export
pub const SALES_CSV_HEADER: [&str; 12] = [
    "Code",
    "Date",
    "Branch",
    "Customer",
    "Items",
    "Item summary",
    "Subtotal",
    "Discount",
    "VAT",
    "Total",
    "Payment method",
    "Created by",
];

fn amount_cell(value: f64) -> String {
    format!("{value:.2}")
}

/// Map sales to CSV rows, header first
pub fn map_sales_to_csv_rows(sales: &[Sale], utc_offset_minutes: i32) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(sales.len() + 1);
    rows.push(SALES_CSV_HEADER.iter().map(|h| h.to_string()).collect());

    for sale in sales {
        let date = DateTime::from_timestamp_millis(sale.created_at)
            .unwrap_or_default()
            .with_timezone(&offset(utc_offset_minutes))
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let summary = sale
            .items
            .iter()
            .map(|i| format!("{} x{}", i.part_name, i.quantity))
            .collect::<Vec<_>>()
            .join("; ");

        rows.push(vec![
            sale.code.clone(),
            date,
            sale.branch_id.clone(),
            sale.customer_name.clone().unwrap_or_default(),
            sale.item_count().to_string(),
            summary,
            amount_cell(sale.subtotal),
            amount_cell(sale.discount),
            amount_cell(sale.vat_amount),
            amount_cell(sale.total),
            sale.payment_method.as_str().to_string(),
            sale.created_by_name
                .clone()
                .unwrap_or_else(|| sale.created_by.to_string()),
        ]);
    }
    rows
}

fn csv_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Render rows as CSV: BOM prefix, CRLF line endings, quoted where needed
pub fn render_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::from("\u{feff}");
    for row in rows {
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            csv_field(&mut out, field);
        }
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashKind, PaymentMethod, SaleItem};

    // 2026-01-15T10:00:00Z
    const JAN15: i64 = 1_768_471_200_000;
    const HOUR: i64 = 3_600_000;

    fn sale(code: &str, created_at: i64, total: f64) -> Sale {
        Sale {
            id: 1,
            code: code.to_string(),
            branch_id: "CN1".to_string(),
            customer_id: None,
            customer_name: Some("Nguyen, An".to_string()),
            items: vec![
                SaleItem {
                    part_id: 1,
                    part_name: "Brake pad".to_string(),
                    sku: "BR-1".to_string(),
                    quantity: 2,
                    unit_price: 50.0,
                    discount: 0.0,
                },
                SaleItem {
                    part_id: 2,
                    part_name: "Oil 10W-40".to_string(),
                    sku: "OIL".to_string(),
                    quantity: 1,
                    unit_price: 20.0,
                    discount: 0.0,
                },
            ],
            subtotal: 120.0,
            discount: 0.0,
            vat_rate: 0.1,
            vat_amount: 12.0,
            total,
            payment_method: PaymentMethod::Cash,
            note: None,
            created_by: 9,
            created_by_name: Some("Lan".to_string()),
            created_at,
        }
    }

    #[test]
    fn aggregate_groups_by_day_and_sorts() {
        let sales = vec![
            sale("B", JAN15 + 24 * HOUR, 50.0),
            sale("A1", JAN15, 100.0),
            sale("A2", JAN15 + HOUR, 33.0),
        ];
        let days = aggregate_daily(&sales, 0);
        assert_eq!(
            days,
            vec![
                DailyRevenue {
                    date: "2026-01-15".to_string(),
                    total: 133.0,
                    count: 2,
                    average: 66.5,
                },
                DailyRevenue {
                    date: "2026-01-16".to_string(),
                    total: 50.0,
                    count: 1,
                    average: 50.0,
                },
            ]
        );
    }

    #[test]
    fn aggregate_empty_input() {
        let sales: Vec<Sale> = vec![];
        assert!(aggregate_daily(&sales, 0).is_empty());
    }

    #[test]
    fn average_rounds_to_cents() {
        let sales = vec![
            sale("A", JAN15, 10.0),
            sale("B", JAN15, 10.0),
            sale("C", JAN15, 0.0),
        ];
        assert_eq!(aggregate_daily(&sales, 0)[0].average, 6.67);
    }

    #[test]
    fn offset_shifts_day_boundary() {
        // 20:00 UTC is already the next day at UTC+7
        let late = vec![sale("A", JAN15 + 10 * HOUR, 10.0)];
        assert_eq!(aggregate_daily(&late, 0)[0].date, "2026-01-15");
        assert_eq!(aggregate_daily(&late, 7 * 60)[0].date, "2026-01-16");
    }

    #[test]
    fn out_of_range_offsets_are_clamped() {
        let ten_am = 10 * 3_600_000;
        assert_eq!(day_of(ten_am, i32::MAX), "1970-01-02");
        assert_eq!(day_of(ten_am, 2000), day_of(ten_am, MAX_UTC_OFFSET_MINUTES));
        assert_eq!(day_of(0, i32::MIN), "1969-12-31");
        assert_eq!(clamp_offset_minutes(-5000), -MAX_UTC_OFFSET_MINUTES);
        assert_eq!(clamp_offset_minutes(420), 420);
    }

    #[test]
    fn cash_entries_count_net() {
        let entry = |kind, amount| CashTransaction {
            id: 1,
            branch_id: "CN1".to_string(),
            kind,
            category: "misc".to_string(),
            amount,
            payment_method: PaymentMethod::Cash,
            reference: None,
            description: None,
            recorded_by: None,
            occurred_at: JAN15,
            created_at: JAN15,
        };
        let txs = vec![entry(CashKind::Income, 100.0), entry(CashKind::Expense, 30.0)];
        let days = aggregate_daily(&txs, 0);
        assert_eq!(days[0].total, 70.0);
        assert_eq!(days[0].count, 2);
    }

    #[test]
    fn csv_rows_header_and_summary() {
        let rows = map_sales_to_csv_rows(&[sale("HD-20260115-0001", JAN15, 132.0)], 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Code");
        assert_eq!(rows[0].len(), rows[1].len());
        assert_eq!(rows[1][1], "2026-01-15 10:00");
        assert_eq!(rows[1][4], "3");
        assert_eq!(rows[1][5], "Brake pad x2; Oil 10W-40 x1");
        assert_eq!(rows[1][9], "132.00");
        assert_eq!(rows[1][11], "Lan");
    }

    #[test]
    fn render_quotes_and_crlf() {
        let rows = vec![
            vec!["a".to_string(), "b,c".to_string()],
            vec!["say \"hi\"".to_string(), "line\nbreak".to_string()],
        ];
        assert_eq!(
            render_csv(&rows),
            "\u{feff}a,\"b,c\"\r\n\"say \"\"hi\"\"\",\"line\nbreak\"\r\n"
        );
    }
}
