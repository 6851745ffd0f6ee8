//! # Movement Repository
//!
//! Append-only movement ledger and the transactional pairing of a
//! movement record with its stock mutation.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              record_with_stock: one transaction                         │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO movements (...)                                          │
//! │    ENTRADA        → apply_entry(area)                                  │
//! │    SALIDA         → apply_exit(area)     ── may raise InsufficientStock│
//! │    TRANSFERENCIA  → apply_exit(area) + apply_entry(destination)        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back BOTH the history row and the quantity change.  │
//! │  Current stock can never disagree with the ledger.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::stock::{apply_entry, apply_exit};
use bodega_core::{Movement, MovementType, Stock, TenantCtx};

const MOVEMENT_COLUMNS: &str = r#"
    id, movement_type, quantity, product_id, area_id, destination_area_id,
    provider_id, notes, agency_id, sub_account_id, created_at
"#;

/// The stock rows touched by a recorded movement.
#[derive(Debug, Clone)]
pub enum MovementEffect {
    /// ENTRADA: the receiving row after the increment.
    Entry(Stock),
    /// SALIDA: the source row after the decrement.
    Exit(Stock),
    /// TRANSFERENCIA: both rows after the move.
    Transfer { source: Stock, destination: Stock },
}

/// Repository for the movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Inserts a movement and applies its stock effect in one transaction.
    ///
    /// The caller builds the `Movement` (validated, with id and timestamp
    /// already assigned); this method owns the transaction boundary.
    ///
    /// ## Errors
    /// * `DbError::InsufficientStock` - SALIDA or TRANSFERENCIA source
    ///   short; nothing is written
    /// * `DbError::ForeignKeyViolation` - unknown product or area
    pub async fn record_with_stock(&self, movement: &Movement) -> DbResult<MovementEffect> {
        let ctx = TenantCtx {
            agency_id: movement.agency_id.clone(),
            sub_account_id: movement.sub_account_id.clone(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, movement_type, quantity, product_id, area_id,
                destination_area_id, provider_id, notes,
                agency_id, sub_account_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(&movement.product_id)
        .bind(&movement.area_id)
        .bind(&movement.destination_area_id)
        .bind(&movement.provider_id)
        .bind(&movement.notes)
        .bind(&movement.agency_id)
        .bind(&movement.sub_account_id)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        let effect = match movement.movement_type {
            MovementType::Entrada => {
                let stock = apply_entry(
                    &mut tx,
                    &movement.product_id,
                    &movement.area_id,
                    movement.quantity,
                    &ctx,
                )
                .await?;
                MovementEffect::Entry(stock)
            }

            MovementType::Salida => {
                let stock = apply_exit(
                    &mut tx,
                    &movement.product_id,
                    &movement.area_id,
                    movement.quantity,
                    &ctx,
                )
                .await?;
                MovementEffect::Exit(stock)
            }

            MovementType::Transferencia => {
                let destination_area_id = movement.destination_area_id.as_deref().ok_or_else(
                    || DbError::QueryFailed("transfer without destination area".to_string()),
                )?;

                let source = apply_exit(
                    &mut tx,
                    &movement.product_id,
                    &movement.area_id,
                    movement.quantity,
                    &ctx,
                )
                .await?;
                let destination = apply_entry(
                    &mut tx,
                    &movement.product_id,
                    destination_area_id,
                    movement.quantity,
                    &ctx,
                )
                .await?;

                MovementEffect::Transfer {
                    source,
                    destination,
                }
            }
        };

        tx.commit().await?;

        debug!(
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            quantity = movement.quantity,
            "Movement recorded"
        );
        Ok(effect)
    }

    /// Gets a movement by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Movement> {
        let sql = format!("SELECT {MOVEMENT_COLUMNS} FROM movements WHERE id = ?1");

        let movement = sqlx::query_as::<_, Movement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))?;

        Ok(movement)
    }

    /// Lists movements of an agency, most recent first.
    pub async fn list_for_agency(&self, ctx: &TenantCtx, limit: u32) -> DbResult<Vec<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE agency_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        );

        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(&ctx.agency_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Lists movements for one product, most recent first.
    pub async fn list_for_product(
        &self,
        product_id: &str,
        ctx: &TenantCtx,
        limit: u32,
    ) -> DbResult<Vec<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE agency_id = ?1 AND product_id = ?2 \
             ORDER BY created_at DESC LIMIT ?3"
        );

        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(&ctx.agency_id)
            .bind(product_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }
}
