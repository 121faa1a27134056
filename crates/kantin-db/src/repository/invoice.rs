//! # Invoice Sequence
//!
//! One counter row per calendar year. Allocation is a single upsert executed
//! inside the checkout transaction, so the number is only consumed when the
//! checkout commits and two checkouts can never receive the same number.
//!
//! ```text
//!  year   last_seq          allocate(2026) ──► INV-2026-043
//!  2025      812                   │
//!  2026       42 ──────────────► 43
//!  2027        -            allocate(2027) ──► INV-2027-001 (row created)
//! ```

use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kantin_core::invoice::InvoiceNumber;

/// Read access to the per-year invoice counters.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// The last invoice issued in `year`, if any.
    pub async fn last_issued(&self, year: i32) -> DbResult<Option<InvoiceNumber>> {
        let seq: Option<i64> =
            sqlx::query_scalar("SELECT last_seq FROM invoice_sequences WHERE year = ?1")
                .bind(year)
                .fetch_optional(&self.pool)
                .await?;

        seq.map(|seq| to_invoice(year, seq)).transpose()
    }
}

/// Allocates the next invoice number for `year` inside the caller's transaction.
///
/// Rolling the transaction back releases the number.
pub async fn allocate(conn: &mut SqliteConnection, year: i32) -> DbResult<InvoiceNumber> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (year, last_seq) VALUES (?1, 1)
        ON CONFLICT (year) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(year)
    .fetch_one(conn)
    .await?;

    let invoice = to_invoice(year, seq)?;
    debug!(invoice = %invoice, "Allocated invoice number");
    Ok(invoice)
}

fn to_invoice(year: i32, seq: i64) -> DbResult<InvoiceNumber> {
    let seq = u32::try_from(seq)
        .map_err(|_| DbError::Internal(format!("invoice sequence out of range: {seq}")))?;
    Ok(InvoiceNumber::new(year, seq))
}
