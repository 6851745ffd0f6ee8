//! # Saved Sale Repository
//!
//! Parked carts: snapshots of unfinished sales a cashier set aside.
//!
//! ## Storage Shape
//! The cart lines are stored as a JSON array in a single TEXT column.
//! Parked carts are write-once blobs read back whole; nothing queries
//! inside them, so normalizing to rows would buy nothing.

use sqlx::SqlitePool;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{CartLine, SavedSale, TenantCtx};

/// Generates a saved-sale identifier.
///
/// ## Format
/// `SAVED-{timestamp_millis}-{random}`
pub fn generate_saved_sale_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let millis = now.as_millis();
    let random = now.subsec_nanos() % 1000;

    format!("SAVED-{}-{:03}", millis, random)
}

/// Row shape as stored; `lines` is the JSON blob before decoding.
#[derive(sqlx::FromRow)]
struct SavedSaleRow {
    id: String,
    agency_id: String,
    sub_account_id: Option<String>,
    area_id: String,
    client_id: Option<String>,
    client_name: Option<String>,
    notes: Option<String>,
    lines: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl SavedSaleRow {
    fn decode(self) -> DbResult<SavedSale> {
        let lines: Vec<CartLine> = serde_json::from_str(&self.lines)
            .map_err(|e| DbError::Internal(format!("corrupt saved-sale lines: {e}")))?;

        Ok(SavedSale {
            id: self.id,
            agency_id: self.agency_id,
            sub_account_id: self.sub_account_id,
            area_id: self.area_id,
            client_id: self.client_id,
            client_name: self.client_name,
            notes: self.notes,
            lines,
            created_at: self.created_at,
        })
    }
}

/// Repository for parked carts.
#[derive(Debug, Clone)]
pub struct SavedSaleRepository {
    pool: SqlitePool,
}

impl SavedSaleRepository {
    /// Creates a new SavedSaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SavedSaleRepository { pool }
    }

    /// Inserts a parked cart.
    pub async fn insert(&self, saved: &SavedSale) -> DbResult<()> {
        let lines = serde_json::to_string(&saved.lines)
            .map_err(|e| DbError::Internal(format!("encode saved-sale lines: {e}")))?;

        debug!(saved_sale_id = %saved.id, lines = saved.lines.len(), "Parking cart");

        sqlx::query(
            r#"
            INSERT INTO saved_sales (
                id, agency_id, sub_account_id, area_id,
                client_id, client_name, notes, lines, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&saved.id)
        .bind(&saved.agency_id)
        .bind(&saved.sub_account_id)
        .bind(&saved.area_id)
        .bind(&saved.client_id)
        .bind(&saved.client_name)
        .bind(&saved.notes)
        .bind(lines)
        .bind(saved.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a parked cart by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<SavedSale> {
        let row = sqlx::query_as::<_, SavedSaleRow>(
            r#"
            SELECT id, agency_id, sub_account_id, area_id,
                   client_id, client_name, notes, lines, created_at
            FROM saved_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SavedSale", id))?;

        row.decode()
    }

    /// Lists parked carts of an agency, most recent first.
    pub async fn list(&self, ctx: &TenantCtx) -> DbResult<Vec<SavedSale>> {
        let rows = sqlx::query_as::<_, SavedSaleRow>(
            r#"
            SELECT id, agency_id, sub_account_id, area_id,
                   client_id, client_name, notes, lines, created_at
            FROM saved_sales
            WHERE agency_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(&ctx.agency_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SavedSaleRow::decode).collect()
    }

    /// Deletes a parked cart (after resume, or on discard).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no cart with that id in this agency
    pub async fn delete(&self, id: &str, ctx: &TenantCtx) -> DbResult<()> {
        let deleted = sqlx::query("DELETE FROM saved_sales WHERE id = ?1 AND agency_id = ?2")
            .bind(id)
            .bind(&ctx.agency_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("SavedSale", id));
        }

        debug!(saved_sale_id = %id, "Parked cart deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_sale_id_format() {
        let id = generate_saved_sale_id();
        assert!(id.starts_with("SAVED-"));
        assert_eq!(id.split('-').count(), 3);
    }

    #[test]
    fn test_row_decode_rejects_bad_json() {
        let row = SavedSaleRow {
            id: "SAVED-1-001".to_string(),
            agency_id: "agency-1".to_string(),
            sub_account_id: None,
            area_id: "area-1".to_string(),
            client_id: None,
            client_name: None,
            notes: None,
            lines: "not json".to_string(),
            created_at: chrono::Utc::now(),
        };

        assert!(row.decode().is_err());
    }
}
