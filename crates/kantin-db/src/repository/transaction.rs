//! # Transaction Repository
//!
//! Checkout commits and sales history.
//!
//! ## Checkout Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  outside the write lock                                                 │
//! │    request.validate()                                                   │
//! │    counter_views(ids) ──► CheckoutPlan::build   (NotFound, stock,       │
//! │                                                   payment, change)      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    invoice::allocate(year)           first statement takes the lock     │
//! │    decrement_counter_stock × N       guarded, re-checks under the lock  │
//! │    INSERT transactions                                                  │
//! │    INSERT transaction_items × N      price snapshot                     │
//! │  COMMIT                              any error: rollback, nothing kept  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The plan is built from a snapshot that may be stale by the time the lock is
//! taken. The guarded decrement is the authoritative stock check; the plan's
//! check only lets most rejections skip the write lock.

use chrono::{DateTime, Datelike, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::stock::{decrement_counter_stock, StockLedger};
use crate::repository::{generate_id, invoice, with_retry};
use kantin_core::checkout::{CheckoutPlan, CheckoutRequest};
use kantin_core::{Actor, ItemDetail, Receipt, Transaction};

const TRANSACTION_SELECT: &str = r#"
    SELECT id, invoice, cashier_id, cashier_username, total, cash_given, change,
           payment_method, created_at
    FROM transactions
"#;

/// Repository for checkout and transaction history.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Commits a checkout for `actor` and returns its receipt.
    ///
    /// ## Errors
    /// - `Validation` for empty line lists, non-positive quantities or cash
    /// - `NotFound` for unknown counter products
    /// - `InsufficientStock` (counter) when any product runs short
    /// - `InsufficientPayment` when `cash_given < total`
    /// - `ConcurrencyConflict` when the write lock stays busy after retries
    ///
    /// On any error nothing is written: stock, invoice sequence and ledger are
    /// exactly as before the call.
    pub async fn checkout(&self, actor: &Actor, request: &CheckoutRequest) -> DbResult<Receipt> {
        self.checkout_at(actor, request, Utc::now()).await
    }

    /// [`checkout`](Self::checkout) with an explicit commit time.
    ///
    /// The invoice year is the UTC year of `now`.
    pub async fn checkout_at(
        &self,
        actor: &Actor,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> DbResult<Receipt> {
        request.validate()?;

        with_retry("checkout", move || self.checkout_once(actor, request, now)).await
    }

    async fn checkout_once(
        &self,
        actor: &Actor,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> DbResult<Receipt> {
        let catalog = StockLedger::new(self.pool.clone())
            .counter_views(&request.product_ids())
            .await?;
        let plan = CheckoutPlan::build(request, &catalog)?;

        self.commit_plan(actor, plan, now).await
    }

    /// Writes a planned checkout as one unit of work.
    ///
    /// Stock is re-checked line by line under the write lock. If any line
    /// runs short the whole unit rolls back, including the invoice number
    /// and decrements already applied for earlier lines.
    async fn commit_plan(
        &self,
        actor: &Actor,
        plan: CheckoutPlan,
        now: DateTime<Utc>,
    ) -> DbResult<Receipt> {
        let mut tx = self.pool.begin().await?;

        let invoice = invoice::allocate(&mut tx, now.year()).await?;

        for (counter_product_id, quantity) in plan.stock_demand() {
            let remaining = decrement_counter_stock(&mut tx, &counter_product_id, quantity).await?;
            debug!(product_id = %counter_product_id, quantity, remaining, "Counter stock taken");
        }

        let transaction = Transaction {
            id: generate_id(),
            invoice: invoice.to_string(),
            cashier_id: actor.id.clone(),
            cashier_username: actor.username.clone(),
            total: plan.total,
            cash_given: plan.cash_given,
            change: plan.change,
            payment_method: plan.payment_method,
            created_at: now,
        };

        insert_transaction(&mut tx, &transaction).await?;

        for line in &plan.lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, counter_product_id, product_name,
                    quantity, unit_price, subtotal, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(generate_id())
            .bind(&transaction.id)
            .bind(&line.counter_product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            invoice = %transaction.invoice,
            cashier = %actor.username,
            total = %transaction.total,
            lines = plan.lines.len(),
            "Checkout committed"
        );

        let items = plan
            .lines
            .into_iter()
            .map(|line| ItemDetail {
                counter_product_id: line.counter_product_id,
                name: line.name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            })
            .collect();

        Ok(Receipt { transaction, items })
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Transactions visible to `actor`, newest first, each with its items.
    ///
    /// Admins see every transaction; cashiers only their own.
    pub async fn history(&self, actor: &Actor) -> DbResult<Vec<Receipt>> {
        let transactions: Vec<Transaction> = if actor.is_admin() {
            sqlx::query_as(&format!(
                "{TRANSACTION_SELECT} ORDER BY created_at DESC, rowid DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "{TRANSACTION_SELECT} WHERE cashier_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))
            .bind(&actor.id)
            .fetch_all(&self.pool)
            .await?
        };

        let mut conn = self.pool.acquire().await?;
        let ids: Vec<String> = transactions.iter().map(|t| t.id.clone()).collect();
        let mut items = items_for(&mut conn, &ids).await?;

        Ok(transactions
            .into_iter()
            .map(|transaction| Receipt {
                items: items.remove(&transaction.id).unwrap_or_default(),
                transaction,
            })
            .collect())
    }

    /// Looks a transaction up by its invoice number.
    pub async fn get_by_invoice(&self, invoice: &str) -> DbResult<Option<Receipt>> {
        let transaction: Option<Transaction> =
            sqlx::query_as(&format!("{TRANSACTION_SELECT} WHERE invoice = ?1"))
                .bind(invoice)
                .fetch_optional(&self.pool)
                .await?;

        let Some(transaction) = transaction else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;
        let mut items = items_for(&mut conn, std::slice::from_ref(&transaction.id)).await?;

        Ok(Some(Receipt {
            items: items.remove(&transaction.id).unwrap_or_default(),
            transaction,
        }))
    }

    /// Number of committed transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_transaction(conn: &mut SqliteConnection, t: &Transaction) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, invoice, cashier_id, cashier_username,
            total, cash_given, change, payment_method, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&t.id)
    .bind(&t.invoice)
    .bind(&t.cashier_id)
    .bind(&t.cashier_username)
    .bind(t.total)
    .bind(t.cash_given)
    .bind(t.change)
    .bind(t.payment_method)
    .bind(t.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    transaction_id: String,
    #[sqlx(flatten)]
    detail: ItemDetail,
}

/// Line items grouped by transaction id, in insertion order.
pub(crate) async fn items_for(
    conn: &mut SqliteConnection,
    transaction_ids: &[String],
) -> DbResult<HashMap<String, Vec<ItemDetail>>> {
    if transaction_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT transaction_id, counter_product_id, product_name AS name,
               quantity, unit_price, subtotal
        FROM transaction_items
        WHERE transaction_id IN (
        "#,
    );
    let mut list = query.separated(", ");
    for id in transaction_ids {
        list.push_bind(id);
    }
    list.push_unseparated(") ORDER BY rowid");

    let rows: Vec<ItemRow> = query.build_query_as().fetch_all(conn).await?;

    let mut grouped: HashMap<String, Vec<ItemDetail>> = HashMap::new();
    for row in rows {
        grouped.entry(row.transaction_id).or_default().push(row.detail);
    }
    Ok(grouped)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::testing::{seed_counter, setup};
    use chrono::TimeZone;
    use kantin_core::checkout::CheckoutLine;
    use kantin_core::{CoreError, Money, PaymentMethod, Role, StockTier};

    fn cashier() -> Actor {
        Actor::new("u-budi", "budi", Role::Cashier)
    }

    fn request(lines: Vec<(&str, i64)>, cash_major: i64) -> CheckoutRequest {
        CheckoutRequest::new(
            lines.into_iter().map(|(id, q)| CheckoutLine::new(id, q)).collect(),
            Money::from_major(cash_major),
        )
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let db = setup().await;
        let (_, counter) = seed_counter(&db, "Teh Botol", 1_000, 70, 30).await;

        let receipt = db
            .transactions()
            .checkout(&cashier(), &request(vec![(&counter.counter_product_id, 5)], 10_000))
            .await
            .unwrap();

        assert!(receipt.transaction.invoice.starts_with("INV-"));
        assert!(receipt.transaction.invoice.ends_with("-001"));
        assert_eq!(receipt.transaction.total, Money::from_major(5_000));
        assert_eq!(receipt.transaction.change, Money::from_major(5_000));
        assert_eq!(receipt.transaction.cashier_username, "budi");
        assert_eq!(receipt.transaction.payment_method, PaymentMethod::Cash);
        assert_eq!(receipt.items_total(), receipt.transaction.total);

        let view = db
            .stock()
            .get_counter_product(&counter.counter_product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.stock, 25);
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_no_trace() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 10).await;
        let (_, bread) = seed_counter(&db, "Roti", 2_000, 0, 2).await;

        let err = db
            .transactions()
            .checkout(
                &cashier(),
                &request(
                    vec![(&tea.counter_product_id, 3), (&bread.counter_product_id, 5)],
                    100_000,
                ),
            )
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::InsufficientStock { tier, product, .. }) => {
                assert_eq!(tier, StockTier::Counter);
                assert_eq!(product, "Roti");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let tea_view = db.stock().get_counter_product(&tea.counter_product_id).await.unwrap().unwrap();
        assert_eq!(tea_view.stock, 10);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
        assert_eq!(db.invoices().last_issued(Utc::now().year()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_shortfall_under_lock_rolls_back_earlier_lines() {
        let db = setup().await;
        let (_, tea) = seed_counter(&db, "Teh Botol", 1_000, 0, 10).await;
        let (_, bread) = seed_counter(&db, "Roti", 2_000, 0, 2).await;
        let repo = db.transactions();
        let checkout = request(
            vec![(&tea.counter_product_id, 3), (&bread.counter_product_id, 2)],
            100_000,
        );

        // Plan against the current catalog, then sell one Roti elsewhere.
        let catalog = db.stock().counter_views(&checkout.product_ids()).await.unwrap();
        let plan = CheckoutPlan::build(&checkout, &catalog).unwrap();
        {
            let mut conn = db.pool().acquire().await.unwrap();
            decrement_counter_stock(&mut conn, &bread.counter_product_id, 1)
                .await
                .unwrap();
        }

        let now = Utc::now();
        let err = repo.commit_plan(&cashier(), plan, now).await.unwrap_err();
        match err {
            DbError::Core(CoreError::InsufficientStock { product, available, requested, .. }) => {
                assert_eq!(product, "Roti");
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let tea_view = db.stock().get_counter_product(&tea.counter_product_id).await.unwrap().unwrap();
        assert_eq!(tea_view.stock, 10);
        let bread_view = db.stock().get_counter_product(&bread.counter_product_id).await.unwrap().unwrap();
        assert_eq!(bread_view.stock, 1);
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(db.invoices().last_issued(now.year()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insufficient_payment_rejected() {
        let db = setup().await;
        let (_, meal) = seed_counter(&db, "Nasi Goreng", 15_000, 0, 10).await;

        let err = db
            .transactions()
            .checkout(&cashier(), &request(vec![(&meal.counter_product_id, 1)], 10_000))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::InsufficientPayment { .. })));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = setup().await;

        let err = db
            .transactions()
            .checkout(&cashier(), &request(vec![("missing", 1)], 10_000))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_checkout_is_validation_error() {
        let db = setup().await;

        let err = db
            .transactions()
            .checkout(&cashier(), &request(vec![], 10_000))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invoices_are_sequential_and_reset_each_year() {
        let db = setup().await;
        let (_, counter) = seed_counter(&db, "Teh Botol", 1_000, 0, 50).await;
        let line = request(vec![(&counter.counter_product_id, 1)], 1_000);
        let repo = db.transactions();

        let dec_31 = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let jan_1 = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();

        let a = repo.checkout_at(&cashier(), &line, dec_31).await.unwrap();
        let b = repo.checkout_at(&cashier(), &line, dec_31).await.unwrap();
        let c = repo.checkout_at(&cashier(), &line, jan_1).await.unwrap();

        assert_eq!(a.transaction.invoice, "INV-2025-001");
        assert_eq!(b.transaction.invoice, "INV-2025-002");
        assert_eq!(c.transaction.invoice, "INV-2026-001");
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_price_change() {
        let db = setup().await;
        let (product, counter) = seed_counter(&db, "Kopi", 6_000, 0, 10).await;

        let receipt = db
            .transactions()
            .checkout(&cashier(), &request(vec![(&counter.counter_product_id, 2)], 20_000))
            .await
            .unwrap();

        db.stock().update_price(&product.id, Money::from_major(9_000)).await.unwrap();

        let stored = db
            .transactions()
            .get_by_invoice(&receipt.transaction.invoice)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.items[0].unit_price, Money::from_major(6_000));
        assert_eq!(stored.transaction.total, Money::from_major(12_000));
    }

    #[tokio::test]
    async fn test_history_scoped_by_role() {
        let db = setup().await;
        let (_, counter) = seed_counter(&db, "Teh Botol", 1_000, 0, 50).await;
        let line = request(vec![(&counter.counter_product_id, 1)], 1_000);
        let budi = cashier();
        let ani = Actor::new("u-ani", "ani", Role::Cashier);
        let admin = Actor::new("u-admin", "siti", Role::Admin);

        db.transactions().checkout(&budi, &line).await.unwrap();
        db.transactions().checkout(&ani, &line).await.unwrap();
        db.transactions().checkout(&budi, &line).await.unwrap();

        let own = db.transactions().history(&budi).await.unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|r| r.transaction.cashier_id == "u-budi"));
        assert!(own.iter().all(|r| r.items.len() == 1));

        let all = db.transactions().history(&admin).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].transaction.invoice > all[2].transaction.invoice);
    }

    #[tokio::test]
    async fn test_history_orders_same_instant_by_commit_order() {
        let db = setup().await;
        let (_, counter) = seed_counter(&db, "Teh Botol", 1_000, 0, 50).await;
        let line = request(vec![(&counter.counter_product_id, 1)], 1_000);
        let admin = Actor::new("u-admin", "siti", Role::Admin);
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();

        sqlx::query("INSERT INTO invoice_sequences (year, last_seq) VALUES (2026, 998)")
            .execute(db.pool())
            .await
            .unwrap();

        let repo = db.transactions();
        repo.checkout_at(&admin, &line, at).await.unwrap();
        repo.checkout_at(&admin, &line, at).await.unwrap();

        let history = repo.history(&admin).await.unwrap();
        let invoices: Vec<&str> = history.iter().map(|r| r.transaction.invoice.as_str()).collect();
        assert_eq!(invoices, vec!["INV-2026-1000", "INV-2026-999"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::Database::new(crate::DbConfig::new(dir.path().join("kantin.db")))
            .await
            .unwrap();
        let (_, counter) = seed_counter(&db, "Teh Botol", 1_000, 0, 10).await;
        let line = request(vec![(&counter.counter_product_id, 6)], 10_000);

        let (first, second) = tokio::join!(
            {
                let db = db.clone();
                let line = line.clone();
                tokio::spawn(async move { db.transactions().checkout(&cashier(), &line).await })
            },
            {
                let db = db.clone();
                let line = line.clone();
                tokio::spawn(async move { db.transactions().checkout(&cashier(), &line).await })
            }
        );
        let results = [first.unwrap(), second.unwrap()];

        let committed = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(committed, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(DbError::Core(CoreError::InsufficientStock { .. }))
        )));

        let view = db
            .stock()
            .get_counter_product(&counter.counter_product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.stock, 4);
        assert_eq!(db.transactions().count().await.unwrap(), 1);

        db.close().await;
    }

    #[tokio::test]
    async fn test_get_by_invoice_unknown() {
        let db = setup().await;
        assert!(db.transactions().get_by_invoice("INV-2026-999").await.unwrap().is_none());
    }
}
