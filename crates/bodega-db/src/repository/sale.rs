//! # Sale Repository
//!
//! Persisting completed sales, their line items, and the stock exits they
//! cause - all in one transaction.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  create_completed: one transaction                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO sales (...)                                              │
//! │    for each item:                                                       │
//! │        INSERT INTO sale_items (...)                                     │
//! │        apply_exit(product, sale.area)  ── atomic decrement              │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  If ANY item lacks stock the whole sale rolls back: no sale row, no    │
//! │  items, no stock changed. Two concurrent sales racing for the last     │
//! │  units cannot both succeed.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::stock::apply_exit;
use bodega_core::{CompletedSale, Sale, SaleItem, Stock, TenantCtx};

const SALE_COLUMNS: &str = r#"
    id, sale_number, status, subtotal_cents, tax_cents, discount_cents,
    total_cents, payment_method, notes, customer_id, cashier_id,
    area_id, agency_id, sub_account_id, created_at
"#;

const SALE_ITEM_COLUMNS: &str = r#"
    id, sale_id, product_id, quantity, unit_price_cents,
    discount_bps, subtotal_cents, created_at
"#;

/// Generates a unique sale number.
///
/// ## Format
/// `SALE-{timestamp_millis}-{random}`
/// Example: `SALE-1703123456789-042`
///
/// The random suffix disambiguates sales created in the same millisecond;
/// the UNIQUE constraint on sale_number catches the residual collision.
pub fn generate_sale_number() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let millis = now.as_millis();
    let random = now.subsec_nanos() % 1000;

    format!("SALE-{}-{:03}", millis, random)
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a completed sale, its items, and the stock exits for every
    /// item, atomically.
    ///
    /// The caller has already validated the items and computed the totals;
    /// this method owns the transaction boundary.
    ///
    /// ## Returns
    /// The stock rows after decrementing, one per item, in item order.
    ///
    /// ## Errors
    /// * `DbError::InsufficientStock` - some item short; nothing persisted
    /// * `DbError::UniqueViolation` - sale_number collision; caller may retry
    pub async fn create_completed(&self, sale: &Sale, items: &[SaleItem]) -> DbResult<Vec<Stock>> {
        let ctx = TenantCtx {
            agency_id: sale.agency_id.clone(),
            sub_account_id: sale.sub_account_id.clone(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, status, subtotal_cents, tax_cents,
                discount_cents, total_cents, payment_method, notes,
                customer_id, cashier_id, area_id,
                agency_id, sub_account_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(sale.status)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.notes)
        .bind(&sale.customer_id)
        .bind(&sale.cashier_id)
        .bind(&sale.area_id)
        .bind(&sale.agency_id)
        .bind(&sale.sub_account_id)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut stocks = Vec::with_capacity(items.len());

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity, unit_price_cents,
                    discount_bps, subtotal_cents, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.discount_bps)
            .bind(item.subtotal_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            let stock =
                apply_exit(&mut tx, &item.product_id, &sale.area_id, item.quantity, &ctx).await?;
            stocks.push(stock);
        }

        tx.commit().await?;

        debug!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            items = items.len(),
            total_cents = sale.total_cents,
            "Sale persisted"
        );
        Ok(stocks)
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<CompletedSale> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = self.get_items(id).await?;

        Ok(CompletedSale { sale, items })
    }

    /// Gets the items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items \
             WHERE sale_id = ?1 ORDER BY created_at, id"
        );

        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists sales of an agency, most recent first.
    pub async fn list_for_agency(&self, ctx: &TenantCtx, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE agency_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(&ctx.agency_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
