//! # Expense Repository
//!
//! Append-only record of cash outlays (gas, ice, cleaning supplies, ...).
//! Expenses never touch stock; they only feed the profit lines of reports.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::repository::{generate_id, with_retry};
use kantin_core::validation::{validate_amount, validate_description};
use kantin_core::{Actor, Expense, Money};

const EXPENSE_SELECT: &str = r#"
    SELECT id, cashier_id, cashier_username, description, amount,
           expense_date AS date, created_at
    FROM expenses
"#;

/// Repository for expense records.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense dated today (UTC).
    pub async fn record(&self, actor: &Actor, description: &str, amount: Money) -> DbResult<Expense> {
        self.record_on(actor, description, amount, Utc::now().date_naive())
            .await
    }

    /// Records an expense against a specific business date.
    pub async fn record_on(
        &self,
        actor: &Actor,
        description: &str,
        amount: Money,
        date: NaiveDate,
    ) -> DbResult<Expense> {
        validate_description(description)?;
        validate_amount("amount", amount)?;

        let expense = Expense {
            id: generate_id(),
            cashier_id: actor.id.clone(),
            cashier_username: actor.username.clone(),
            description: description.trim().to_string(),
            amount,
            date,
            created_at: Utc::now(),
        };

        let row = &expense;
        let pool = &self.pool;
        with_retry("record_expense", move || async move {
            sqlx::query(
                r#"
                INSERT INTO expenses (
                    id, cashier_id, cashier_username, description, amount,
                    expense_date, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&row.id)
            .bind(&row.cashier_id)
            .bind(&row.cashier_username)
            .bind(&row.description)
            .bind(row.amount)
            .bind(row.date)
            .bind(row.created_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        info!(
            id = %expense.id,
            cashier = %expense.cashier_username,
            amount = %expense.amount,
            "Expense recorded"
        );

        Ok(expense)
    }

    /// Lists expenses newest first, optionally only those on `date`.
    pub async fn list(&self, date: Option<NaiveDate>) -> DbResult<Vec<Expense>> {
        let expenses = match date {
            Some(date) => {
                sqlx::query_as::<_, Expense>(&format!(
                    "{EXPENSE_SELECT} WHERE expense_date = ?1 ORDER BY created_at DESC, id"
                ))
                .bind(date)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Expense>(&format!(
                    "{EXPENSE_SELECT} ORDER BY expense_date DESC, created_at DESC, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::testing::setup;
    use kantin_core::{CoreError, Role};

    fn cashier() -> Actor {
        Actor::new("u-budi", "budi", Role::Cashier)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_record_defaults_to_today() {
        let db = setup().await;

        let expense = db
            .expenses()
            .record(&cashier(), "Beli gas LPG", Money::from_major(22_000))
            .await
            .unwrap();

        assert_eq!(expense.date, Utc::now().date_naive());
        assert_eq!(expense.cashier_username, "budi");

        let listed = db.expenses().list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, expense.id);
        assert_eq!(listed[0].amount, Money::from_major(22_000));
    }

    #[tokio::test]
    async fn test_list_filters_by_date() {
        let db = setup().await;
        let repo = db.expenses();

        repo.record_on(&cashier(), "Es batu", Money::from_major(5_000), ymd(2026, 3, 1))
            .await
            .unwrap();
        repo.record_on(&cashier(), "Sabun", Money::from_major(8_000), ymd(2026, 3, 2))
            .await
            .unwrap();

        let march_first = repo.list(Some(ymd(2026, 3, 1))).await.unwrap();
        assert_eq!(march_first.len(), 1);
        assert_eq!(march_first[0].description, "Es batu");

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, ymd(2026, 3, 2));
    }

    #[tokio::test]
    async fn test_record_validates_input() {
        let db = setup().await;

        let err = db.expenses().record(&cashier(), "", Money::from_major(1)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        let err = db
            .expenses()
            .record(&cashier(), "Gas", Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }
}
