//! # Report Repository
//!
//! Read-only aggregation over committed ledger state.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  daily / monthly / yearly   transactions (created_at window)           │
//! │                             + expenses (expense_date window)           │
//! │                                                                         │
//! │  sales_insight              transaction_items, all time                │
//! │  restock_suggestions        counter stock + all-time units sold        │
//! │  stockout_predictions       counter stock + units sold since today−7   │
//! │  stock_recap                counter stock + units sold in the period   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-query reports run inside one read transaction, so under WAL they see
//! a single committed snapshot even while checkouts are being written.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::transaction::items_for;
use kantin_core::report::{
    rank_sales, stockout_window_start, ExpenseDetail, MonthlyReport, ProfitSummary,
    ReportPeriod, RestockSuggestion, SalesInsight, StockRecap, StockRecapRow, StockoutPrediction,
    TransactionDetail, YearlyReport, DailyReport,
};
use kantin_core::{Money, Transaction};

/// Counter product with its stock and units sold in some window.
#[derive(Debug, sqlx::FromRow)]
struct ProductSales {
    counter_product_id: String,
    name: String,
    unit: String,
    price: Money,
    stock: i64,
    sold: i64,
}

/// Repository for reports and insights.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    // =========================================================================
    // Period Reports
    // =========================================================================

    /// Sales and expenses for one UTC calendar day, with per-transaction detail.
    pub async fn daily(&self, date: NaiveDate) -> DbResult<DailyReport> {
        let (start, end) = ReportPeriod::Day { date }.utc_range()?;
        let mut tx = self.pool.begin().await?;

        let transactions: Vec<Transaction> = sqlx::query_as(
            r#"
            SELECT id, invoice, cashier_id, cashier_username, total, cash_given, change,
                   payment_method, created_at
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<String> = transactions.iter().map(|t| t.id.clone()).collect();
        let mut items = items_for(&mut tx, &ids).await?;

        let expenses: Vec<ExpenseDetail> = sqlx::query_as(
            r#"
            SELECT description, amount, cashier_username
            FROM expenses
            WHERE expense_date = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(date)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let total_sales: Money = transactions.iter().map(|t| t.total).sum();
        let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();

        let details: Vec<TransactionDetail> = transactions
            .into_iter()
            .map(|t| TransactionDetail {
                items: items.remove(&t.id).unwrap_or_default(),
                invoice: t.invoice,
                cashier_username: t.cashier_username,
                total: t.total,
                created_at: t.created_at,
            })
            .collect();

        debug!(%date, transactions = details.len(), "Built daily report");

        Ok(DailyReport {
            date,
            transaction_count: details.len() as i64,
            total_sales,
            transactions: details,
            total_expenses,
            expenses,
            summary: ProfitSummary::new(total_sales, total_expenses),
        })
    }

    /// Totals for one calendar month.
    pub async fn monthly(&self, year: i32, month: u32) -> DbResult<MonthlyReport> {
        let period = ReportPeriod::month(year, month)?;
        let (start, end) = period.utc_range()?;
        let (first_day, next_month) = period.date_range()?;

        let mut tx = self.pool.begin().await?;

        let (count, total_sales): (i64, Money) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total), 0)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;

        let total_expenses = expense_total(&mut tx, first_day, next_month).await?;

        tx.commit().await?;

        Ok(MonthlyReport::new(year, month, count, total_sales, total_expenses))
    }

    /// Totals for one calendar year plus a twelve-month series.
    pub async fn yearly(&self, year: i32) -> DbResult<YearlyReport> {
        let period = ReportPeriod::year(year)?;
        let (start, end) = period.utc_range()?;
        let (first_day, next_year) = period.date_range()?;

        let mut tx = self.pool.begin().await?;

        // RFC 3339 and ISO dates both carry the month at characters 6-7.
        let sales_rows: Vec<(i64, Money)> = sqlx::query_as(
            r#"
            SELECT CAST(substr(created_at, 6, 2) AS INTEGER) AS month, SUM(total)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY month
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

        let expense_rows: Vec<(i64, Money)> = sqlx::query_as(
            r#"
            SELECT CAST(substr(expense_date, 6, 2) AS INTEGER) AS month, SUM(amount)
            FROM expenses
            WHERE expense_date >= ?1 AND expense_date < ?2
            GROUP BY month
            "#,
        )
        .bind(first_day)
        .bind(next_year)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(YearlyReport::from_monthly(
            year,
            bucket_by_month(sales_rows),
            bucket_by_month(expense_rows),
        ))
    }

    // =========================================================================
    // Insights
    // =========================================================================

    /// All-time units and revenue per counter product that has sold.
    ///
    /// Highest quantity first; ties by product id.
    pub async fn sales_insight(&self) -> DbResult<Vec<SalesInsight>> {
        let mut insights: Vec<SalesInsight> = sqlx::query_as(
            r#"
            SELECT c.id AS counter_product_id,
                   w.name AS name,
                   SUM(i.quantity) AS quantity_sold,
                   SUM(i.subtotal) AS revenue
            FROM transaction_items i
            JOIN counter_products c ON c.id = i.counter_product_id
            JOIN warehouse_products w ON w.id = c.warehouse_product_id
            GROUP BY c.id, w.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rank_sales(&mut insights);
        Ok(insights)
    }

    /// Suggested counter stock for every counter product.
    pub async fn restock_suggestions(&self) -> DbResult<Vec<RestockSuggestion>> {
        let rows = self.product_sales(None, None).await?;

        Ok(rows
            .into_iter()
            .map(|r| RestockSuggestion::new(r.counter_product_id, r.name, r.stock, r.sold))
            .collect())
    }

    /// Days until each counter product runs out at last week's pace.
    ///
    /// Counts sales from midnight UTC of `today − 7` onward.
    pub async fn stockout_predictions(&self, today: NaiveDate) -> DbResult<Vec<StockoutPrediction>> {
        let since = stockout_window_start(today);
        let rows = self.product_sales(Some(since), None).await?;

        Ok(rows
            .into_iter()
            .map(|r| StockoutPrediction::new(r.counter_product_id, r.name, r.stock, r.sold))
            .collect())
    }

    /// Per-product stock movement for a period.
    pub async fn stock_recap(&self, period: ReportPeriod) -> DbResult<StockRecap> {
        let (start, end) = period.utc_range()?;
        let rows = self.product_sales(Some(start), Some(end)).await?;

        Ok(StockRecap {
            period,
            label: period.label(),
            rows: rows
                .into_iter()
                .map(|r| StockRecapRow::new(r.counter_product_id, r.name, r.unit, r.price, r.stock, r.sold))
                .collect(),
        })
    }

    async fn product_sales(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<ProductSales>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT c.id AS counter_product_id, w.name, w.unit, w.price, c.stock,
                   COALESCE((
                       SELECT SUM(i.quantity)
                       FROM transaction_items i
                       JOIN transactions t ON t.id = i.transaction_id
                       WHERE i.counter_product_id = c.id
            "#,
        );
        if let Some(since) = since {
            query.push(" AND t.created_at >= ").push_bind(since);
        }
        if let Some(until) = until {
            query.push(" AND t.created_at < ").push_bind(until);
        }
        query.push(
            r#"
                   ), 0) AS sold
            FROM counter_products c
            JOIN warehouse_products w ON w.id = c.warehouse_product_id
            ORDER BY w.name, c.id
            "#,
        );

        let rows = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

async fn expense_total(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    until: NaiveDate,
) -> DbResult<Money> {
    let total: Money = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM expenses
        WHERE expense_date >= ?1 AND expense_date < ?2
        "#,
    )
    .bind(from)
    .bind(until)
    .fetch_one(conn)
    .await?;

    Ok(total)
}

fn bucket_by_month(rows: Vec<(i64, Money)>) -> [Money; 12] {
    let mut buckets = [Money::zero(); 12];
    for (month, amount) in rows {
        if (1..=12).contains(&month) {
            buckets[(month - 1) as usize] += amount;
        }
    }
    buckets
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_counter, setup};
    use crate::Database;
    use chrono::{Duration, TimeZone};
    use kantin_core::checkout::{CheckoutLine, CheckoutRequest};
    use kantin_core::report::{RestockReason, StockoutStatus, NO_SALES_SENTINEL_DAYS};
    use kantin_core::{Actor, Role};

    fn cashier() -> Actor {
        Actor::new("u-budi", "budi", Role::Cashier)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn sell(db: &Database, counter_id: &str, qty: i64, cash_major: i64, at: DateTime<Utc>) {
        let request = CheckoutRequest::new(
            vec![CheckoutLine::new(counter_id, qty)],
            Money::from_major(cash_major),
        );
        db.transactions().checkout_at(&cashier(), &request, at).await.unwrap();
    }

    #[tokio::test]
    async fn test_daily_report() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 100).await;
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();

        sell(&db, &tea.counter_product_id, 5, 5_000, day).await;
        sell(&db, &tea.counter_product_id, 2, 2_000, day + Duration::hours(3)).await;
        sell(&db, &tea.counter_product_id, 1, 1_000, day + Duration::days(1)).await;
        db.expenses()
            .record_on(&cashier(), "Es batu", Money::from_major(1_500), ymd(2026, 3, 10))
            .await
            .unwrap();

        let report = db.reports().daily(ymd(2026, 3, 10)).await.unwrap();

        assert_eq!(report.transaction_count, 2);
        assert_eq!(report.total_sales, Money::from_major(7_000));
        assert_eq!(report.total_expenses, Money::from_major(1_500));
        assert_eq!(report.summary.net_profit, Money::from_major(5_500));
        assert_eq!(report.transactions[0].items[0].name, "Teh Botol");
        assert_eq!(report.transactions[0].cashier_username, "budi");
        assert_eq!(report.expenses[0].description, "Es batu");
    }

    #[tokio::test]
    async fn test_daily_report_empty_day() {
        let db = setup().await;

        let report = db.reports().daily(ymd(2026, 1, 1)).await.unwrap();

        assert_eq!(report.transaction_count, 0);
        assert!(report.summary.net_profit.is_zero());
    }

    #[tokio::test]
    async fn test_monthly_and_yearly_reports() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 100).await;

        sell(&db, &tea.counter_product_id, 3, 3_000, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()).await;
        sell(&db, &tea.counter_product_id, 4, 4_000, Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap()).await;
        sell(&db, &tea.counter_product_id, 6, 6_000, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()).await;
        db.expenses()
            .record_on(&cashier(), "Gas", Money::from_major(2_000), ymd(2026, 2, 14))
            .await
            .unwrap();

        let february = db.reports().monthly(2026, 2).await.unwrap();
        assert_eq!(february.transaction_count, 2);
        assert_eq!(february.total_sales, Money::from_major(7_000));
        assert_eq!(february.gross_profit, february.total_sales);
        assert_eq!(february.net_profit, Money::from_major(5_000));

        let year = db.reports().yearly(2026).await.unwrap();
        assert_eq!(year.months.len(), 12);
        assert_eq!(year.months[1].sales, Money::from_major(7_000));
        assert_eq!(year.months[1].expenses, Money::from_major(2_000));
        assert_eq!(year.months[2].sales, Money::from_major(6_000));
        assert_eq!(year.total_sales, Money::from_major(13_000));
        assert_eq!(year.net_profit, Money::from_major(11_000));

        assert!(db.reports().monthly(2026, 13).await.is_err());
    }

    #[tokio::test]
    async fn test_sales_insight_ranking() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 100).await;
        let (_, bread) = seed_counter(&db, "Roti", 2_000, 0, 100).await;
        let now = Utc::now();

        sell(&db, &tea.counter_product_id, 3, 3_000, now).await;
        sell(&db, &bread.counter_product_id, 5, 10_000, now).await;
        sell(&db, &tea.counter_product_id, 1, 1_000, now).await;

        let insight = db.reports().sales_insight().await.unwrap();

        assert_eq!(insight.len(), 2);
        assert_eq!(insight[0].name, "Roti");
        assert_eq!(insight[0].quantity_sold, 5);
        assert_eq!(insight[0].revenue, Money::from_major(10_000));
        assert_eq!(insight[1].quantity_sold, 4);

        // Reading twice without writes gives the same answer.
        assert_eq!(db.reports().sales_insight().await.unwrap(), insight);
    }

    #[tokio::test]
    async fn test_restock_suggestions() {
        let db = setup().await;
        let (_, hot) = seed_counter(&db, "Kopi", 1_000, 0, 80).await;
        let (_, slow) = seed_counter(&db, "Roti", 1_000, 0, 10).await;

        sell(&db, &hot.counter_product_id, 60, 60_000, Utc::now()).await;

        let suggestions = db.reports().restock_suggestions().await.unwrap();
        let kopi = suggestions.iter().find(|s| s.counter_product_id == hot.counter_product_id).unwrap();
        let roti = suggestions.iter().find(|s| s.counter_product_id == slow.counter_product_id).unwrap();

        assert_eq!(kopi.current_stock, 20);
        assert_eq!(kopi.suggested_stock, 40);
        assert_eq!(kopi.reason, RestockReason::HighSales);
        assert_eq!(roti.suggested_stock, 10);
        assert_eq!(roti.reason, RestockReason::StableSales);
    }

    #[tokio::test]
    async fn test_stockout_predictions_use_trailing_window() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 20).await;
        let (_, idle) = seed_counter(&db, "Roti", 1_000, 0, 5).await;
        let today = ymd(2026, 3, 10);

        // Outside the window: ignored.
        sell(&db, &tea.counter_product_id, 3, 3_000, Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()).await;
        // Inside: 14 units over the week, 3 left.
        sell(&db, &tea.counter_product_id, 14, 14_000, Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap()).await;

        let predictions = db.reports().stockout_predictions(today).await.unwrap();
        let tea_p = predictions.iter().find(|p| p.counter_product_id == tea.counter_product_id).unwrap();
        let idle_p = predictions.iter().find(|p| p.counter_product_id == idle.counter_product_id).unwrap();

        assert_eq!(tea_p.current_stock, 3);
        assert_eq!(tea_p.sold_in_window, 14);
        assert_eq!(tea_p.days_remaining, 1);
        assert_eq!(tea_p.status, StockoutStatus::Imminent);

        assert_eq!(idle_p.days_remaining, NO_SALES_SENTINEL_DAYS);
        assert_eq!(idle_p.status, StockoutStatus::NoSalesData);
    }

    #[tokio::test]
    async fn test_stock_recap_for_period() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 30).await;

        sell(&db, &tea.counter_product_id, 4, 4_000, Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap()).await;
        sell(&db, &tea.counter_product_id, 6, 6_000, Utc.with_ymd_and_hms(2026, 6, 2, 10, 0, 0).unwrap()).await;

        let recap = db
            .reports()
            .stock_recap(ReportPeriod::Month { year: 2026, month: 5 })
            .await
            .unwrap();

        assert_eq!(recap.label, "05-2026");
        assert_eq!(recap.rows.len(), 1);
        assert_eq!(recap.rows[0].sold, 4);
        assert_eq!(recap.rows[0].remaining_stock, 20);
        assert_eq!(recap.rows[0].opening_stock, 24);
        assert_eq!(recap.rows[0].unit, "pcs");
    }
}
