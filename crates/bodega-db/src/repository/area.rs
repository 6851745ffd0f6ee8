//! # Area Repository
//!
//! Database operations for stock-holding areas (warehouses, store floors).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::Area;

/// Repository for area database operations.
#[derive(Debug, Clone)]
pub struct AreaRepository {
    pool: SqlitePool,
}

impl AreaRepository {
    /// Creates a new AreaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AreaRepository { pool }
    }

    /// Inserts a new area and returns it.
    pub async fn insert(&self, agency_id: &str, name: &str) -> DbResult<Area> {
        let area = Area {
            id: Uuid::new_v4().to_string(),
            agency_id: agency_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(area_id = %area.id, name = %area.name, "Inserting area");

        sqlx::query(
            r#"
            INSERT INTO areas (id, agency_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&area.id)
        .bind(&area.agency_id)
        .bind(&area.name)
        .bind(area.created_at)
        .execute(&self.pool)
        .await?;

        Ok(area)
    }

    /// Gets an area by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Area> {
        let area = sqlx::query_as::<_, Area>(
            r#"
            SELECT id, agency_id, name, created_at
            FROM areas
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Area", id))?;

        Ok(area)
    }

    /// Lists all areas of an agency, ordered by name.
    pub async fn list(&self, agency_id: &str) -> DbResult<Vec<Area>> {
        let areas = sqlx::query_as::<_, Area>(
            r#"
            SELECT id, agency_id, name, created_at
            FROM areas
            WHERE agency_id = ?1
            ORDER BY name
            "#,
        )
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(areas)
    }
}
