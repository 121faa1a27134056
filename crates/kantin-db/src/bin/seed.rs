//! # Seed Data Generator
//!
//! Populates the database with canteen products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p kantin-db --bin seed
//!
//! # Move 20 units of every product to the counter as well
//! cargo run -p kantin-db --bin seed -- --counter 20
//!
//! # Specify database path
//! cargo run -p kantin-db --bin seed -- --db ./data/kantin.db
//! ```
//!
//! Every product gets a deterministic price and a warehouse stock between
//! 40 and 139 units so reports and insights have something to show.

use kantin_core::{Money, NewWarehouseProduct};
use kantin_db::{Database, DbConfig};
use std::env;

/// Catalog grouped by category: (name, unit, price in rupiah)
const CATALOG: &[(&str, &[(&str, &str, i64)])] = &[
    (
        "Minuman",
        &[
            ("Teh Botol", "botol", 5_000),
            ("Air Mineral 600ml", "botol", 4_000),
            ("Es Teh Manis", "gelas", 3_000),
            ("Kopi Susu", "gelas", 8_000),
            ("Jus Jeruk", "gelas", 10_000),
            ("Susu Kotak", "kotak", 6_000),
        ],
    ),
    (
        "Makanan",
        &[
            ("Nasi Goreng", "porsi", 15_000),
            ("Mie Goreng", "porsi", 12_000),
            ("Nasi Uduk", "porsi", 10_000),
            ("Soto Ayam", "porsi", 14_000),
            ("Bakso", "porsi", 13_000),
        ],
    ),
    (
        "Jajanan",
        &[
            ("Roti Bakar", "pcs", 7_000),
            ("Pisang Goreng", "pcs", 2_000),
            ("Tahu Isi", "pcs", 1_500),
            ("Risoles", "pcs", 2_500),
            ("Keripik Singkong", "bungkus", 5_000),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut counter: i64 = 0;
    let mut db_path = String::from("./kantin_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--counter" | "-c" => {
                if i + 1 < args.len() {
                    counter = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kantin Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --counter <N>  Units to transfer to the counter per product (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./kantin_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kantin Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.stock().list_warehouse_products().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (category, products) in CATALOG {
        for (name, unit, price) in products.iter() {
            let product = NewWarehouseProduct {
                name: name.to_string(),
                category: category.to_string(),
                price: Money::from_major(*price),
                stock: 40 + (generated * 37) % 100,
                unit: unit.to_string(),
            };

            let created = match db.stock().insert_warehouse_product(&product).await {
                Ok(created) => created,
                Err(e) => {
                    eprintln!("Failed to insert {}: {}", name, e);
                    continue;
                }
            };

            if counter > 0 {
                if let Err(e) = db.stock().transfer_to_counter(&created.id, counter).await {
                    eprintln!("Failed to transfer {}: {}", name, e);
                }
            }

            generated += 1;
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let counters = db.stock().list_counter_products().await?;
    println!("  Counter products: {}", counters.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
