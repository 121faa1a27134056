//! # Stock Ledger
//!
//! Two-tier inventory: warehouse stock (back room) and counter stock
//! (sellable). Stock only moves warehouse → counter (transfer) and
//! counter → customer (checkout); restocks add to the warehouse.
//!
//! ## Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  restock_warehouse(+q)                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────┐  transfer_to_counter(q)  ┌──────────────┐            │
//! │  │  warehouse   │ ───────────────────────► │   counter    │            │
//! │  │  stock ≥ 0   │   −q            +q       │  stock ≥ 0   │            │
//! │  └──────────────┘                          └──────┬───────┘            │
//! │                                                   │ checkout(−q)        │
//! │                                                   ▼                     │
//! │                                               customer                  │
//! │                                                                         │
//! │  Every decrement is a guarded UPDATE ... WHERE stock >= q, so a         │
//! │  counter can never go negative even under concurrent writers.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, with_retry};
use kantin_core::validation::{
    validate_category, validate_initial_stock, validate_price, validate_product_name,
    validate_quantity, validate_unit,
};
use kantin_core::{
    CoreError, CounterProductView, Money, NewWarehouseProduct, RestockOutcome, StockTier,
    TransferOutcome, ValidationError, WarehouseProduct,
};

const WAREHOUSE_SELECT: &str = r#"
    SELECT id, name, category, price, stock, unit, is_active, created_at, updated_at
    FROM warehouse_products
"#;

const COUNTER_VIEW_SELECT: &str = r#"
    SELECT c.id, c.warehouse_product_id, w.name, w.category, w.unit, w.price, c.stock
    FROM counter_products c
    JOIN warehouse_products w ON w.id = c.warehouse_product_id
"#;

/// Repository for both stock tiers.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Registers a warehouse product with its opening stock.
    pub async fn insert_warehouse_product(
        &self,
        product: &NewWarehouseProduct,
    ) -> DbResult<WarehouseProduct> {
        validate_product_name(&product.name)?;
        validate_category(&product.category)?;
        validate_unit(&product.unit)?;
        validate_price(product.price)?;
        validate_initial_stock(product.stock)?;

        let now = Utc::now();
        let created = WarehouseProduct {
            id: generate_id(),
            name: product.name.trim().to_string(),
            category: product.category.trim().to_string(),
            price: product.price,
            stock: product.stock,
            unit: product.unit.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %created.id, name = %created.name, "Inserting warehouse product");

        sqlx::query(
            r#"
            INSERT INTO warehouse_products (
                id, name, category, price, stock, unit, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.category)
        .bind(created.price)
        .bind(created.stock)
        .bind(&created.unit)
        .bind(created.is_active)
        .bind(created.created_at)
        .bind(created.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    /// Gets a warehouse product by ID.
    pub async fn get_warehouse_product(&self, id: &str) -> DbResult<Option<WarehouseProduct>> {
        let product = sqlx::query_as::<_, WarehouseProduct>(&format!("{WAREHOUSE_SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active warehouse products by name.
    pub async fn list_warehouse_products(&self) -> DbResult<Vec<WarehouseProduct>> {
        let products = sqlx::query_as::<_, WarehouseProduct>(&format!(
            "{WAREHOUSE_SELECT} WHERE is_active = 1 ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Changes the current unit price.
    ///
    /// Counter views pick the new price up immediately; committed line items
    /// keep their snapshot.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        validate_price(price)?;

        let result = sqlx::query(
            "UPDATE warehouse_products SET price = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(price)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Warehouse product", id).into());
        }

        debug!(id = %id, price = %price, "Updated warehouse price");
        Ok(())
    }

    /// Gets a counter product joined with its warehouse product.
    pub async fn get_counter_product(&self, id: &str) -> DbResult<Option<CounterProductView>> {
        let mut conn = self.pool.acquire().await?;
        fetch_counter_view(&mut conn, id).await
    }

    /// Gets the counter record of a warehouse product, if one exists yet.
    pub async fn counter_for_warehouse(
        &self,
        warehouse_product_id: &str,
    ) -> DbResult<Option<CounterProductView>> {
        let view = sqlx::query_as::<_, CounterProductView>(&format!(
            "{COUNTER_VIEW_SELECT} WHERE c.warehouse_product_id = ?1"
        ))
        .bind(warehouse_product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(view)
    }

    /// Lists every counter product by name.
    pub async fn list_counter_products(&self) -> DbResult<Vec<CounterProductView>> {
        let views = sqlx::query_as::<_, CounterProductView>(&format!(
            "{COUNTER_VIEW_SELECT} ORDER BY w.name, c.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(views)
    }

    /// Looks up several counter products at once, keyed by id.
    ///
    /// Unknown ids are simply absent from the map.
    pub async fn counter_views(
        &self,
        ids: &[String],
    ) -> DbResult<HashMap<String, CounterProductView>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(COUNTER_VIEW_SELECT);
        query.push(" WHERE c.id IN (");
        let mut list = query.separated(", ");
        for id in ids {
            list.push_bind(id);
        }
        list.push_unseparated(")");

        let views: Vec<CounterProductView> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(views.into_iter().map(|v| (v.id.clone(), v)).collect())
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Moves `quantity` units from warehouse to counter.
    ///
    /// Creates the counter record (stock 0) on first transfer. Both counters
    /// change in one transaction, so `warehouse + counter` is conserved.
    ///
    /// ## Errors
    /// - `Validation` when `quantity <= 0`
    /// - `NotFound` when the warehouse product does not exist
    /// - `InsufficientStock` (warehouse) when `stock < quantity`
    pub async fn transfer_to_counter(
        &self,
        warehouse_product_id: &str,
        quantity: i64,
    ) -> DbResult<TransferOutcome> {
        validate_quantity(quantity)?;

        with_retry("transfer_to_counter", move || {
            self.transfer_once(warehouse_product_id, quantity)
        })
        .await
    }

    async fn transfer_once(
        &self,
        warehouse_product_id: &str,
        quantity: i64,
    ) -> DbResult<TransferOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let taken: Option<(String, i64)> = sqlx::query_as(
            r#"
            UPDATE warehouse_products
            SET stock = stock - ?1, updated_at = ?2
            WHERE id = ?3 AND stock >= ?1
            RETURNING name, stock
            "#,
        )
        .bind(quantity)
        .bind(now)
        .bind(warehouse_product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (name, warehouse_stock) = match taken {
            Some(row) => row,
            None => return Err(warehouse_shortfall(&mut *tx, warehouse_product_id, quantity).await),
        };

        // Get-or-create and increment in one statement. The update is skipped
        // when the sum would leave the i64 range.
        let counter: Option<(String, i64)> = sqlx::query_as(
            r#"
            INSERT INTO counter_products (id, warehouse_product_id, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (warehouse_product_id)
            DO UPDATE SET stock = stock + excluded.stock, updated_at = excluded.updated_at
            WHERE counter_products.stock <= ?5
            RETURNING id, stock
            "#,
        )
        .bind(generate_id())
        .bind(warehouse_product_id)
        .bind(quantity)
        .bind(now)
        .bind(stock_ceiling(quantity))
        .fetch_optional(&mut *tx)
        .await?;

        let (counter_product_id, counter_stock) = match counter {
            Some(row) => row,
            None => {
                let current: i64 = sqlx::query_scalar(
                    "SELECT stock FROM counter_products WHERE warehouse_product_id = ?1",
                )
                .bind(warehouse_product_id)
                .fetch_one(&mut *tx)
                .await?;
                return Err(stock_overflow(current).into());
            }
        };

        tx.commit().await?;

        info!(
            product_id = %warehouse_product_id,
            quantity,
            warehouse_stock,
            counter_stock,
            "Transferred stock to counter"
        );

        Ok(TransferOutcome {
            warehouse_product_id: warehouse_product_id.to_string(),
            counter_product_id,
            name,
            quantity,
            warehouse_stock,
            counter_stock,
        })
    }

    /// Adds `quantity` units to warehouse stock. No upper bound.
    pub async fn restock_warehouse(
        &self,
        warehouse_product_id: &str,
        quantity: i64,
    ) -> DbResult<RestockOutcome> {
        validate_quantity(quantity)?;

        with_retry("restock_warehouse", move || async move {
            let row: Option<(String, i64)> = sqlx::query_as(
                r#"
                UPDATE warehouse_products
                SET stock = stock + ?1, updated_at = ?2
                WHERE id = ?3 AND stock <= ?4
                RETURNING name, stock
                "#,
            )
            .bind(quantity)
            .bind(Utc::now())
            .bind(warehouse_product_id)
            .bind(stock_ceiling(quantity))
            .fetch_optional(&self.pool)
            .await?;

            let (name, warehouse_stock) = match row {
                Some(row) => row,
                None => {
                    let current: Option<i64> =
                        sqlx::query_scalar("SELECT stock FROM warehouse_products WHERE id = ?1")
                            .bind(warehouse_product_id)
                            .fetch_optional(&self.pool)
                            .await?;
                    let err: DbError = match current {
                        Some(stock) => stock_overflow(stock).into(),
                        None => CoreError::not_found("Warehouse product", warehouse_product_id).into(),
                    };
                    return Err(err);
                }
            };

            info!(product_id = %warehouse_product_id, quantity, warehouse_stock, "Restocked warehouse");

            Ok(RestockOutcome {
                warehouse_product_id: warehouse_product_id.to_string(),
                name,
                quantity,
                warehouse_stock,
            })
        })
        .await
    }
}

// =============================================================================
// Unit-of-work helpers
// =============================================================================

/// Takes `quantity` from a counter product inside the caller's transaction.
///
/// Returns the new counter stock.
///
/// ## Errors
/// - `NotFound` when the counter product does not exist
/// - `InsufficientStock` (counter) when `stock < quantity` at write time
pub async fn decrement_counter_stock(
    conn: &mut SqliteConnection,
    counter_product_id: &str,
    quantity: i64,
) -> DbResult<i64> {
    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE counter_products
        SET stock = stock - ?1, updated_at = ?2
        WHERE id = ?3 AND stock >= ?1
        RETURNING stock
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(counter_product_id)
    .fetch_optional(&mut *conn)
    .await?;

    match remaining {
        Some(stock) => Ok(stock),
        None => match fetch_counter_view(conn, counter_product_id).await? {
            Some(view) => Err(CoreError::InsufficientStock {
                tier: StockTier::Counter,
                product: view.name,
                available: view.stock,
                requested: quantity,
            }
            .into()),
            None => Err(CoreError::not_found("Counter product", counter_product_id).into()),
        },
    }
}

async fn fetch_counter_view(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<CounterProductView>> {
    let view = sqlx::query_as::<_, CounterProductView>(&format!("{COUNTER_VIEW_SELECT} WHERE c.id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(view)
}

/// Highest current stock that can still absorb `quantity` more units.
fn stock_ceiling(quantity: i64) -> i64 {
    i64::MAX - quantity
}

fn stock_overflow(current: i64) -> ValidationError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: i64::MAX - current,
    }
}

/// Explains why a guarded warehouse decrement touched no row.
async fn warehouse_shortfall(conn: &mut SqliteConnection, id: &str, requested: i64) -> DbError {
    let row: Result<Option<(String, i64)>, sqlx::Error> =
        sqlx::query_as("SELECT name, stock FROM warehouse_products WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await;

    match row {
        Ok(Some((product, available))) => CoreError::InsufficientStock {
            tier: StockTier::Warehouse,
            product,
            available,
            requested,
        }
        .into(),
        Ok(None) => CoreError::not_found("Warehouse product", id).into(),
        Err(err) => err.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
