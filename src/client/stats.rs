//! Pure derivations over the in-memory collections. No I/O, no ambient clock;
//! callers pass `now` where a reference instant is needed.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::dtos::product::ProductResponse;
use crate::dtos::transaction::TransactionResponse;
use crate::models::transaction::TransactionKind;

/// How many of the most recent day buckets the finance view shows.
const DAILY_SERIES_CAP: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSummary {
    pub total: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    /// Flat 10% of catalog size. There is no per-product quantity field, so
    /// this is a proportion of the catalog, not an inventory-depth signal.
    pub low_stock: usize,
}

pub fn stock_summary(products: &[ProductResponse]) -> StockSummary {
    let total = products.len();
    let in_stock = products.iter().filter(|p| p.in_stock).count();
    StockSummary {
        total,
        in_stock,
        out_of_stock: total - in_stock,
        low_stock: (total as f64 * 0.1).floor() as usize,
    }
}

/// Sum of sale prices over in-stock products; out-of-stock items contribute
/// nothing.
pub fn total_value(products: &[ProductResponse]) -> f64 {
    products
        .iter()
        .filter(|p| p.in_stock)
        .map(|p| p.sale_price)
        .sum()
}

/// Income over the trailing 30 days, inclusive at the lower bound. Plain
/// day subtraction, not calendar-month arithmetic.
pub fn monthly_income(transactions: &[TransactionResponse], now: DateTime<Utc>) -> f64 {
    let cutoff = now - Duration::days(30);
    transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income && t.date >= cutoff)
        .map(|t| t.amount)
        .sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinanceSummary {
    /// Most recent day first, capped to the 30 most recent buckets.
    pub daily: Vec<DailyStat>,
    /// Totals run over all transactions, not just the capped window.
    pub total_income: f64,
    pub total_expense: f64,
    pub total_profit: f64,
}

/// Bucket transactions by their economic calendar date (not created_at) and
/// derive per-day income/expense/profit.
pub fn finance_summary(transactions: &[TransactionResponse]) -> FinanceSummary {
    let mut buckets: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in transactions {
        let day = transaction.date.date_naive();
        let bucket = buckets.entry(day).or_insert((0.0, 0.0));
        match transaction.kind {
            TransactionKind::Income => {
                bucket.0 += transaction.amount;
                total_income += transaction.amount;
            }
            TransactionKind::Expense => {
                bucket.1 += transaction.amount;
                total_expense += transaction.amount;
            }
        }
    }

    let daily = buckets
        .into_iter()
        .rev()
        .take(DAILY_SERIES_CAP)
        .map(|(date, (income, expense))| DailyStat {
            date,
            income,
            expense,
            profit: income - expense,
        })
        .collect();

    FinanceSummary {
        daily,
        total_income,
        total_expense,
        total_profit: total_income - total_expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(sale_price: f64, in_stock: bool) -> ProductResponse {
        ProductResponse {
            id: "p".to_string(),
            code: "001".to_string(),
            name: "Çanta".to_string(),
            brand: "Marka".to_string(),
            color: "Siyah".to_string(),
            category: "el-cantasi".to_string(),
            model: None,
            description: None,
            purchase_price: 0.0,
            sale_price,
            suggested_sale_price: None,
            images: Vec::new(),
            in_stock,
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn transaction(kind: TransactionKind, amount: f64, date: DateTime<Utc>) -> TransactionResponse {
        TransactionResponse {
            id: "t".to_string(),
            kind,
            amount,
            description: String::new(),
            category: None,
            product_id: None,
            date,
            created_at: date,
        }
    }

    #[test]
    fn total_value_excludes_out_of_stock() {
        let products = vec![product(100.0, true), product(50.0, false)];
        assert_eq!(total_value(&products), 100.0);
    }

    #[test]
    fn stock_summary_partitions_and_floors() {
        let mut products: Vec<_> = (0..11).map(|_| product(10.0, true)).collect();
        products[0].in_stock = false;

        let summary = stock_summary(&products);
        assert_eq!(summary.total, 11);
        assert_eq!(summary.in_stock, 10);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.low_stock, 1); // floor(11 * 0.1)
    }

    #[test]
    fn monthly_income_uses_trailing_30_day_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let transactions = vec![
            transaction(TransactionKind::Income, 100.0, now - Duration::days(29)),
            transaction(TransactionKind::Income, 200.0, now - Duration::days(31)),
            transaction(TransactionKind::Expense, 400.0, now - Duration::days(1)),
        ];

        assert_eq!(monthly_income(&transactions, now), 100.0);
    }

    #[test]
    fn monthly_income_includes_exact_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let transactions = vec![transaction(
            TransactionKind::Income,
            75.0,
            now - Duration::days(30),
        )];

        assert_eq!(monthly_income(&transactions, now), 75.0);
    }

    #[test]
    fn same_day_transactions_share_a_bucket() {
        let day = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
        let transactions = vec![
            transaction(TransactionKind::Income, 400.0, day),
            transaction(TransactionKind::Income, 250.0, day + Duration::hours(9)),
        ];

        let summary = finance_summary(&transactions);
        assert_eq!(summary.daily.len(), 1);
        assert_eq!(summary.daily[0].income, 650.0);
        assert_eq!(summary.daily[0].profit, 650.0);
    }

    #[test]
    fn pure_expense_day_has_negative_profit() {
        let day = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
        let transactions = vec![transaction(TransactionKind::Expense, 15000.0, day)];

        let summary = finance_summary(&transactions);
        assert_eq!(summary.daily[0].expense, 15000.0);
        assert_eq!(summary.daily[0].profit, -15000.0);
    }

    #[test]
    fn daily_series_is_newest_first_and_capped() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let transactions: Vec<_> = (0..40)
            .map(|i| transaction(TransactionKind::Income, 10.0, base + Duration::days(i)))
            .collect();

        let summary = finance_summary(&transactions);
        assert_eq!(summary.daily.len(), 30);
        assert_eq!(
            summary.daily[0].date,
            (base + Duration::days(39)).date_naive()
        );
        assert!(summary.daily[0].date > summary.daily[29].date);
        // Totals still cover everything outside the capped window
        assert_eq!(summary.total_income, 400.0);
    }
}
