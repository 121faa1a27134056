//! # Report Policies
//!
//! Pure pieces of the reporting engine: period windows, restock and stockout
//! rules, and the report shapes returned to callers. The SQL that gathers the
//! numbers lives in `kantin-db`; everything here is deterministic and takes
//! plain values.
//!
//! ## Insight Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Restock (all-time sold)                                                │
//! │    sold > 50   ──► suggested = current + 20   "high sales"             │
//! │    otherwise   ──► suggested = current        "stable sales"           │
//! │                                                                         │
//! │  Stockout (sold in trailing 7 days, window start = today − 7)          │
//! │    sold > 0    ──► days = ⌊stock × 7 / sold⌋                           │
//! │                      days ≤ 3 ──► "imminent"   else ──► "safe"         │
//! │    sold = 0    ──► days = 999                  "no sales data"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Time windows are UTC calendar ranges, half open: `[start, end)`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ItemDetail;
use crate::validation::{validate_month, ValidationResult};

// =============================================================================
// Constants
// =============================================================================

/// All-time units sold above which a restock bump is suggested.
pub const RESTOCK_HIGH_SALES_THRESHOLD: i64 = 50;

/// Units added to the current counter stock for high sellers.
pub const RESTOCK_BUMP: i64 = 20;

/// Length of the trailing sales window used for stockout prediction.
pub const STOCKOUT_WINDOW_DAYS: i64 = 7;

/// Days-remaining at or below which a product is flagged imminent.
pub const STOCKOUT_IMMINENT_DAYS: i64 = 3;

/// Reported days-remaining when a product had no sales in the window.
pub const NO_SALES_SENTINEL_DAYS: i64 = 999;

// =============================================================================
// Restock
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RestockReason {
    #[serde(rename = "high sales")]
    HighSales,
    #[serde(rename = "stable sales")]
    StableSales,
}

impl fmt::Display for RestockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestockReason::HighSales => f.write_str("high sales"),
            RestockReason::StableSales => f.write_str("stable sales"),
        }
    }
}

/// Suggested counter stock from current stock and all-time units sold.
pub fn suggest_restock(current_stock: i64, total_sold: i64) -> (i64, RestockReason) {
    if total_sold > RESTOCK_HIGH_SALES_THRESHOLD {
        (current_stock + RESTOCK_BUMP, RestockReason::HighSales)
    } else {
        (current_stock, RestockReason::StableSales)
    }
}

// =============================================================================
// Stockout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockoutStatus {
    #[serde(rename = "imminent")]
    Imminent,
    #[serde(rename = "safe")]
    Safe,
    #[serde(rename = "no sales data")]
    NoSalesData,
}

impl fmt::Display for StockoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockoutStatus::Imminent => f.write_str("imminent"),
            StockoutStatus::Safe => f.write_str("safe"),
            StockoutStatus::NoSalesData => f.write_str("no sales data"),
        }
    }
}

/// Estimated days until the counter runs out, from units sold in the window.
///
/// `stock / (sold / 7)` floored, evaluated in integers as `stock * 7 / sold`.
///
/// ## Example
/// ```rust
/// use kantin_core::report::{predict_stockout, StockoutStatus};
///
/// assert_eq!(predict_stockout(3, 14), (1, StockoutStatus::Imminent));
/// assert_eq!(predict_stockout(100, 7), (100, StockoutStatus::Safe));
/// assert_eq!(predict_stockout(5, 0), (999, StockoutStatus::NoSalesData));
/// ```
pub fn predict_stockout(stock: i64, sold_in_window: i64) -> (i64, StockoutStatus) {
    if sold_in_window <= 0 {
        return (NO_SALES_SENTINEL_DAYS, StockoutStatus::NoSalesData);
    }

    let days = stock.saturating_mul(STOCKOUT_WINDOW_DAYS) / sold_in_window;
    let status = if days <= STOCKOUT_IMMINENT_DAYS {
        StockoutStatus::Imminent
    } else {
        StockoutStatus::Safe
    };

    (days, status)
}

/// First instant counted by the stockout window: midnight UTC of `today − 7`.
pub fn stockout_window_start(today: NaiveDate) -> DateTime<Utc> {
    start_of_day(today - Duration::days(STOCKOUT_WINDOW_DAYS))
}

// =============================================================================
// Report Period
// =============================================================================

/// A calendar period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportPeriod {
    Day {
        #[ts(as = "String")]
        date: NaiveDate,
    },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl ReportPeriod {
    pub fn month(year: i32, month: u32) -> ValidationResult<Self> {
        validate_month(month)?;
        first_of_month(year, month)?;
        Ok(ReportPeriod::Month { year, month })
    }

    pub fn year(year: i32) -> ValidationResult<Self> {
        first_of_month(year, 1)?;
        Ok(ReportPeriod::Year { year })
    }

    /// Picks a period from optional query parameters.
    ///
    /// Precedence: `date`, then `month` + `year`, then `year`, else `today`.
    pub fn resolve(
        date: Option<NaiveDate>,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> ValidationResult<Self> {
        match (date, month, year) {
            (Some(date), _, _) => Ok(ReportPeriod::Day { date }),
            (None, Some(month), Some(year)) => ReportPeriod::month(year, month),
            (None, None, Some(year)) => ReportPeriod::year(year),
            _ => Ok(ReportPeriod::Day { date: today }),
        }
    }

    /// First and one-past-last calendar dates of the period.
    pub fn date_range(&self) -> ValidationResult<(NaiveDate, NaiveDate)> {
        match *self {
            ReportPeriod::Day { date } => {
                let next = date.succ_opt().ok_or_else(|| date_out_of_range("date"))?;
                Ok((date, next))
            }
            ReportPeriod::Month { year, month } => {
                let start = first_of_month(year, month)?;
                let end = if month == 12 {
                    first_of_month(year + 1, 1)?
                } else {
                    first_of_month(year, month + 1)?
                };
                Ok((start, end))
            }
            ReportPeriod::Year { year } => {
                Ok((first_of_month(year, 1)?, first_of_month(year + 1, 1)?))
            }
        }
    }

    /// The period as a half-open UTC instant range.
    pub fn utc_range(&self) -> ValidationResult<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = self.date_range()?;
        Ok((start_of_day(start), start_of_day(end)))
    }

    /// Human-readable label: `2026-10-16`, `10-2026` or `2026`.
    pub fn label(&self) -> String {
        match self {
            ReportPeriod::Day { date } => date.format("%Y-%m-%d").to_string(),
            ReportPeriod::Month { year, month } => format!("{month:02}-{year}"),
            ReportPeriod::Year { year } => year.to_string(),
        }
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(year: i32, month: u32) -> ValidationResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| date_out_of_range("year"))
}

fn date_out_of_range(field: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "date out of range".to_string(),
    }
}

// =============================================================================
// Report Shapes
// =============================================================================

/// Sales minus expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitSummary {
    pub total_sales: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
}

impl ProfitSummary {
    pub fn new(total_sales: Money, total_expenses: Money) -> Self {
        ProfitSummary {
            total_sales,
            total_expenses,
            net_profit: total_sales - total_expenses,
        }
    }
}

/// One transaction as listed in the daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    pub invoice: String,
    pub cashier_username: String,
    pub items: Vec<ItemDetail>,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One expense as listed in the daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpenseDetail {
    pub description: String,
    pub amount: Money,
    pub cashier_username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub transaction_count: i64,
    pub total_sales: Money,
    pub transactions: Vec<TransactionDetail>,
    pub total_expenses: Money,
    pub expenses: Vec<ExpenseDetail>,
    pub summary: ProfitSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub transaction_count: i64,
    pub total_sales: Money,
    pub total_expenses: Money,
    /// Equal to `total_sales`; there is no cost-of-goods model.
    pub gross_profit: Money,
    pub net_profit: Money,
}

impl MonthlyReport {
    pub fn new(
        year: i32,
        month: u32,
        transaction_count: i64,
        total_sales: Money,
        total_expenses: Money,
    ) -> Self {
        MonthlyReport {
            year,
            month,
            transaction_count,
            total_sales,
            total_expenses,
            gross_profit: total_sales,
            net_profit: total_sales - total_expenses,
        }
    }
}

/// One point of the yearly series. `month` is `"01"` through `"12"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthPoint {
    pub month: String,
    pub sales: Money,
    pub expenses: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YearlyReport {
    pub year: i32,
    pub total_sales: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
    pub months: Vec<MonthPoint>,
}

impl YearlyReport {
    /// Builds the report from per-month totals, index 0 being January.
    pub fn from_monthly(year: i32, sales: [Money; 12], expenses: [Money; 12]) -> Self {
        let months: Vec<MonthPoint> = (0..12)
            .map(|i| MonthPoint {
                month: format!("{:02}", i + 1),
                sales: sales[i],
                expenses: expenses[i],
            })
            .collect();

        let total_sales: Money = sales.iter().sum();
        let total_expenses: Money = expenses.iter().sum();

        YearlyReport {
            year,
            total_sales,
            total_expenses,
            net_profit: total_sales - total_expenses,
            months,
        }
    }
}

// =============================================================================
// Insight Shapes
// =============================================================================

/// All-time sales of one counter product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesInsight {
    pub counter_product_id: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
}

/// Orders insights by quantity sold, highest first. Ties go by product id.
pub fn rank_sales(insights: &mut [SalesInsight]) {
    insights.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.counter_product_id.cmp(&b.counter_product_id))
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockSuggestion {
    pub counter_product_id: String,
    pub name: String,
    pub current_stock: i64,
    pub total_sold: i64,
    pub suggested_stock: i64,
    pub reason: RestockReason,
}

impl RestockSuggestion {
    pub fn new(
        counter_product_id: String,
        name: String,
        current_stock: i64,
        total_sold: i64,
    ) -> Self {
        let (suggested_stock, reason) = suggest_restock(current_stock, total_sold);
        RestockSuggestion {
            counter_product_id,
            name,
            current_stock,
            total_sold,
            suggested_stock,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockoutPrediction {
    pub counter_product_id: String,
    pub name: String,
    pub current_stock: i64,
    pub sold_in_window: i64,
    pub days_remaining: i64,
    pub status: StockoutStatus,
}

impl StockoutPrediction {
    pub fn new(
        counter_product_id: String,
        name: String,
        current_stock: i64,
        sold_in_window: i64,
    ) -> Self {
        let (days_remaining, status) = predict_stockout(current_stock, sold_in_window);
        StockoutPrediction {
            counter_product_id,
            name,
            current_stock,
            sold_in_window,
            days_remaining,
            status,
        }
    }
}

// =============================================================================
// Stock Recap
// =============================================================================

/// Per-product stock movement over a period.
///
/// Opening stock is reconstructed as `remaining + sold`; transfers in during
/// the period are not tracked separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockRecapRow {
    pub counter_product_id: String,
    pub name: String,
    pub unit: String,
    pub price: Money,
    pub sold: i64,
    pub opening_stock: i64,
    pub remaining_stock: i64,
}

impl StockRecapRow {
    pub fn new(
        counter_product_id: String,
        name: String,
        unit: String,
        price: Money,
        remaining_stock: i64,
        sold: i64,
    ) -> Self {
        StockRecapRow {
            counter_product_id,
            name,
            unit,
            price,
            sold,
            opening_stock: remaining_stock + sold,
            remaining_stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockRecap {
    pub period: ReportPeriod,
    pub label: String,
    pub rows: Vec<StockRecapRow>,
}

// =============================================================================
// Unit Tests
// =============================================================================
