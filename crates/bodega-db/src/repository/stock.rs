//! # Stock Repository
//!
//! Per-area stock rows and the quantity mutations behind every inventory
//! operation.
//!
//! ## Atomic Decrements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why Conditional UPDATE, Not Check-Then-Act           │
//! │                                                                         │
//! │  ❌ RACY                              ✅ ATOMIC                          │
//! │  ──────────                           ──────────                        │
//! │  SELECT quantity  (reads 5)           UPDATE stock                      │
//! │        │                              SET quantity = quantity - 5       │
//! │  [another sale takes 3]               WHERE product_id = ?              │
//! │        │                                AND area_id = ?                 │
//! │  UPDATE quantity = 0                    AND quantity >= 5               │
//! │  (lost 3 units!)                      ── 0 rows → insufficient          │
//! │                                       ── 1 row  → decremented           │
//! │                                                                         │
//! │  The CHECK (quantity >= 0) constraint backs this up at the schema      │
//! │  level.                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection-Level Helpers
//! `apply_entry` and `apply_exit` take a `&mut SqliteConnection` so the
//! movement and sale repositories can compose them into their own
//! transactions. The public methods here wrap them in a transaction of
//! their own for callers that only touch stock.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::{LowStockAlert, Product, ProductStock, Stock, TenantCtx};

const STOCK_COLUMNS: &str = r#"
    id, product_id, area_id, quantity,
    agency_id, sub_account_id, created_at, updated_at
"#;

// =============================================================================
// Connection-Level Mutations
// =============================================================================

/// Adds `quantity` units to the (product, area) stock row, creating the
/// row if it doesn't exist yet. Returns the row after the mutation.
///
/// Runs on the caller's connection so it composes into larger
/// transactions (movement + stock, sale + stock).
pub(crate) async fn apply_entry(
    conn: &mut SqliteConnection,
    product_id: &str,
    area_id: &str,
    quantity: i64,
    ctx: &TenantCtx,
) -> DbResult<Stock> {
    let now = Utc::now();

    let updated = sqlx::query(
        r#"
        UPDATE stock
        SET quantity = quantity + ?1, updated_at = ?2
        WHERE product_id = ?3 AND area_id = ?4 AND agency_id = ?5
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .bind(area_id)
    .bind(&ctx.agency_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        // Find-or-create: first entry for this (product, area) pair.
        // The UNIQUE constraint catches a concurrent creator.
        sqlx::query(
            r#"
            INSERT INTO stock (
                id, product_id, area_id, quantity,
                agency_id, sub_account_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(product_id)
        .bind(area_id)
        .bind(quantity)
        .bind(&ctx.agency_id)
        .bind(&ctx.sub_account_id)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    fetch_row(conn, product_id, area_id, &ctx.agency_id).await
}

/// Removes `quantity` units from the (product, area) stock row via an
/// atomic conditional decrement.
///
/// ## Errors
/// * `DbError::InsufficientStock` - row missing or holds fewer units than
///   requested. Raised before any write, so the enclosing transaction
///   rolls back untouched.
pub(crate) async fn apply_exit(
    conn: &mut SqliteConnection,
    product_id: &str,
    area_id: &str,
    quantity: i64,
    ctx: &TenantCtx,
) -> DbResult<Stock> {
    let now = Utc::now();

    let updated = sqlx::query(
        r#"
        UPDATE stock
        SET quantity = quantity - ?1, updated_at = ?2
        WHERE product_id = ?3 AND area_id = ?4 AND agency_id = ?5
          AND quantity >= ?1
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .bind(area_id)
    .bind(&ctx.agency_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        // Distinguish "not enough" from "no row" only in the reported
        // available count; both are insufficient stock to the caller.
        let available: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM stock
            WHERE product_id = ?1 AND area_id = ?2 AND agency_id = ?3
            "#,
        )
        .bind(product_id)
        .bind(area_id)
        .bind(&ctx.agency_id)
        .fetch_one(&mut *conn)
        .await?;

        return Err(DbError::InsufficientStock {
            product_id: product_id.to_string(),
            area_id: area_id.to_string(),
            available,
            requested: quantity,
        });
    }

    fetch_row(conn, product_id, area_id, &ctx.agency_id).await
}

async fn fetch_row(
    conn: &mut SqliteConnection,
    product_id: &str,
    area_id: &str,
    agency_id: &str,
) -> DbResult<Stock> {
    let sql = format!(
        "SELECT {STOCK_COLUMNS} FROM stock \
         WHERE product_id = ?1 AND area_id = ?2 AND agency_id = ?3"
    );

    let stock = sqlx::query_as::<_, Stock>(&sql)
        .bind(product_id)
        .bind(area_id)
        .bind(agency_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Stock", format!("{product_id}@{area_id}")))?;

    Ok(stock)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets the stock row for a (product, area) pair, if one exists.
    pub async fn get(
        &self,
        product_id: &str,
        area_id: &str,
        ctx: &TenantCtx,
    ) -> DbResult<Option<Stock>> {
        let sql = format!(
            "SELECT {STOCK_COLUMNS} FROM stock \
             WHERE product_id = ?1 AND area_id = ?2 AND agency_id = ?3"
        );

        let stock = sqlx::query_as::<_, Stock>(&sql)
            .bind(product_id)
            .bind(area_id)
            .bind(&ctx.agency_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Total quantity of a product across all areas of the agency.
    pub async fn total_quantity(&self, product_id: &str, ctx: &TenantCtx) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM stock
            WHERE product_id = ?1 AND agency_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(&ctx.agency_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Adds stock in its own transaction.
    pub async fn entry(
        &self,
        product_id: &str,
        area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> DbResult<Stock> {
        let mut tx = self.pool.begin().await?;
        let stock = apply_entry(&mut tx, product_id, area_id, quantity, ctx).await?;
        tx.commit().await?;

        debug!(product_id, area_id, quantity = stock.quantity, "Stock entry applied");
        Ok(stock)
    }

    /// Removes stock in its own transaction.
    pub async fn exit(
        &self,
        product_id: &str,
        area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> DbResult<Stock> {
        let mut tx = self.pool.begin().await?;
        let stock = apply_exit(&mut tx, product_id, area_id, quantity, ctx).await?;
        tx.commit().await?;

        debug!(product_id, area_id, quantity = stock.quantity, "Stock exit applied");
        Ok(stock)
    }

    /// Moves stock between two areas atomically.
    ///
    /// ## Guarantee
    /// Both legs commit or neither does. A failed destination leg (e.g.
    /// foreign key violation on a bad area id) rolls the source decrement
    /// back.
    ///
    /// ## Returns
    /// `(source, destination)` stock rows after the transfer.
    pub async fn transfer(
        &self,
        product_id: &str,
        source_area_id: &str,
        destination_area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> DbResult<(Stock, Stock)> {
        let mut tx = self.pool.begin().await?;

        let source = apply_exit(&mut tx, product_id, source_area_id, quantity, ctx).await?;
        let destination =
            apply_entry(&mut tx, product_id, destination_area_id, quantity, ctx).await?;

        tx.commit().await?;

        debug!(
            product_id,
            source_area_id, destination_area_id, quantity, "Stock transferred"
        );
        Ok((source, destination))
    }

    /// Products of the agency that have a configured minimum, with their
    /// agency-wide totals. The low-stock rules themselves live in
    /// bodega-core; this only gathers candidates.
    pub async fn low_stock_candidates(&self, ctx: &TenantCtx) -> DbResult<Vec<LowStockAlert>> {
        let alerts = sqlx::query_as::<_, LowStockAlert>(
            r#"
            SELECT
                p.id AS product_id,
                p.sku,
                p.name,
                p.min_stock,
                COALESCE(SUM(s.quantity), 0) AS total_quantity
            FROM products p
            LEFT JOIN stock s ON s.product_id = p.id AND s.agency_id = p.agency_id
            WHERE p.agency_id = ?1
              AND p.is_active = 1
              AND p.min_stock IS NOT NULL
            GROUP BY p.id
            ORDER BY p.name
            "#,
        )
        .bind(&ctx.agency_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// All active products of the agency joined with their stock rows.
    pub async fn products_with_stock(&self, ctx: &TenantCtx) -> DbResult<Vec<ProductStock>> {
        let products = crate::repository::product::ProductRepository::new(self.pool.clone())
            .list_active(&ctx.agency_id)
            .await?;

        let sql = format!(
            "SELECT {STOCK_COLUMNS} FROM stock WHERE agency_id = ?1 ORDER BY product_id, area_id"
        );

        let rows = sqlx::query_as::<_, Stock>(&sql)
            .bind(&ctx.agency_id)
            .fetch_all(&self.pool)
            .await?;

        // Group stock rows by product in memory; the catalogs involved are
        // small enough that two queries beat N+1.
        let mut by_product: std::collections::HashMap<String, Vec<Stock>> =
            std::collections::HashMap::new();
        for row in rows {
            by_product.entry(row.product_id.clone()).or_default().push(row);
        }

        let result = products
            .into_iter()
            .map(|product: Product| {
                let stocks = by_product.remove(&product.id).unwrap_or_default();
                let total_quantity = stocks.iter().map(|s| s.quantity).sum();
                ProductStock {
                    product,
                    total_quantity,
                    stocks,
                }
            })
            .collect();

        Ok(result)
    }
}
