//! # Product Repository
//!
//! Catalog reads used by the stock ledger and sale processor, plus the
//! inserts the seed tool needs. Catalog editing (price changes, soft
//! deletes) happens in the administration surface, not here.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::Product;

/// All product columns, in schema order. Shared by every SELECT so the
/// FromRow mapping stays consistent.
const PRODUCT_COLUMNS: &str = r#"
    id, agency_id, sub_account_id, sku, name,
    price_cents, cost_cents, min_stock,
    tax_rate_bps, discount_bps, discount_start, discount_end,
    discount_minimum_price_cents,
    is_active, category_id, created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - Product doesn't exist
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Gets a product by SKU within an agency.
    pub async fn get_by_sku(&self, agency_id: &str, sku: &str) -> DbResult<Product> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE agency_id = ?1 AND sku = ?2");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(agency_id)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", sku))?;

        Ok(product)
    }

    /// Lists active products of an agency, ordered by name.
    pub async fn list_active(&self, agency_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE agency_id = ?1 AND is_active = 1 ORDER BY name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(agency_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - SKU already exists for the agency
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, agency_id, sub_account_id, sku, name,
                price_cents, cost_cents, min_stock,
                tax_rate_bps, discount_bps, discount_start, discount_end,
                discount_minimum_price_cents,
                is_active, category_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&product.id)
        .bind(&product.agency_id)
        .bind(&product.sub_account_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.min_stock)
        .bind(product.tax_rate_bps)
        .bind(product.discount_bps)
        .bind(product.discount_start)
        .bind(product.discount_end)
        .bind(product.discount_minimum_price_cents)
        .bind(product.is_active)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products for an agency.
    ///
    /// ## Usage
    /// Used by the seed tool to skip seeding a populated database.
    pub async fn count(&self, agency_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE agency_id = ?1")
            .bind(agency_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
