//! Fixtures shared by the repository tests.

use kantin_core::{Money, NewWarehouseProduct, TransferOutcome, WarehouseProduct};

use crate::{Database, DbConfig};

pub(crate) async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub(crate) async fn seed_product(
    db: &Database,
    name: &str,
    price_major: i64,
    stock: i64,
) -> WarehouseProduct {
    db.stock()
        .insert_warehouse_product(&NewWarehouseProduct {
            name: name.to_string(),
            category: "Minuman".to_string(),
            price: Money::from_major(price_major),
            stock,
            unit: "pcs".to_string(),
        })
        .await
        .unwrap()
}

/// A warehouse product with `counter` units already moved to the counter.
pub(crate) async fn seed_counter(
    db: &Database,
    name: &str,
    price_major: i64,
    warehouse: i64,
    counter: i64,
) -> (WarehouseProduct, TransferOutcome) {
    let product = seed_product(db, name, price_major, warehouse + counter).await;
    let outcome = db.stock().transfer_to_counter(&product.id, counter).await.unwrap();
    (product, outcome)
}
