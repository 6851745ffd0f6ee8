//! # Movement Recorder Service
//!
//! Records inventory movements (entries, exits, transfers) and keeps the
//! append-only history in lock-step with current stock.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use bodega_core::validation::{validate_id, validate_movement_quantity};
use bodega_core::{Movement, MovementType, TenantCtx, ValidationError};
use bodega_db::{Database, MovementEffect};

use crate::error::ServiceResult;
use crate::events::{DomainEvent, EventSink};
use crate::stock::StockLedger;

/// Request to record a movement.
#[derive(Debug, Clone)]
pub struct RecordMovement {
    pub movement_type: MovementType,
    pub product_id: String,
    pub area_id: String,
    /// Required for TRANSFERENCIA, rejected otherwise.
    pub destination_area_id: Option<String>,
    pub quantity: i64,
    pub provider_id: Option<String>,
    pub notes: Option<String>,
}

/// Service recording movements against the ledger.
#[derive(Clone)]
pub struct MovementRecorder {
    db: Database,
    events: Arc<dyn EventSink>,
    ledger: StockLedger,
}

impl MovementRecorder {
    /// Creates a new MovementRecorder.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        let ledger = StockLedger::new(db.clone(), events.clone());
        MovementRecorder { db, events, ledger }
    }

    /// Validates and records a movement, applying its stock effect in the
    /// same database transaction.
    ///
    /// ## Errors
    /// * `ServiceError::Validation` - bad quantity, missing destination on
    ///   a transfer, or a destination on a non-transfer
    /// * `ServiceError::InsufficientStock` - source short; history and
    ///   stock both untouched
    pub async fn record(&self, req: RecordMovement, ctx: &TenantCtx) -> ServiceResult<Movement> {
        validate_id("product_id", &req.product_id)?;
        validate_id("area_id", &req.area_id)?;
        validate_movement_quantity(req.quantity)?;

        match (req.movement_type, &req.destination_area_id) {
            (MovementType::Transferencia, None) => {
                return Err(ValidationError::Required {
                    field: "destination_area_id".to_string(),
                }
                .into());
            }
            (MovementType::Transferencia, Some(dest)) => {
                validate_id("destination_area_id", dest)?;
                if *dest == req.area_id {
                    return Err(ValidationError::InvalidFormat {
                        field: "destination_area_id".to_string(),
                        reason: "transfer source and destination must differ".to_string(),
                    }
                    .into());
                }
            }
            (_, Some(_)) => {
                return Err(ValidationError::InvalidFormat {
                    field: "destination_area_id".to_string(),
                    reason: "only transfers take a destination area".to_string(),
                }
                .into());
            }
            (_, None) => {}
        }

        // Fail fast on unknown products with a NotFound instead of a
        // foreign key violation out of the transaction.
        self.db.products().get_by_id(&req.product_id).await?;

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            movement_type: req.movement_type,
            quantity: req.quantity,
            product_id: req.product_id,
            area_id: req.area_id,
            destination_area_id: req.destination_area_id,
            provider_id: req.provider_id,
            notes: req.notes,
            agency_id: ctx.agency_id.clone(),
            sub_account_id: ctx.sub_account_id.clone(),
            created_at: Utc::now(),
        };

        let effect = self.db.movements().record_with_stock(&movement).await?;

        info!(
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            product_id = %movement.product_id,
            quantity = movement.quantity,
            "Movement recorded"
        );

        self.events.publish(DomainEvent::MovementCreated {
            movement: movement.clone(),
        });

        match &effect {
            MovementEffect::Entry(stock) => {
                self.events.publish(DomainEvent::stock_updated(stock));
            }
            MovementEffect::Exit(stock) => {
                self.events.publish(DomainEvent::stock_updated(stock));
                self.ledger.alert_if_below_minimum(stock).await;
            }
            MovementEffect::Transfer {
                source,
                destination,
            } => {
                self.events.publish(DomainEvent::stock_updated(source));
                self.events.publish(DomainEvent::stock_updated(destination));
                self.ledger.alert_if_below_minimum(source).await;
            }
        }

        Ok(movement)
    }

    /// Gets a movement by ID.
    pub async fn get(&self, id: &str) -> ServiceResult<Movement> {
        Ok(self.db.movements().get_by_id(id).await?)
    }

    /// Recent movements of the agency, newest first.
    pub async fn history(&self, ctx: &TenantCtx, limit: u32) -> ServiceResult<Vec<Movement>> {
        Ok(self.db.movements().list_for_agency(ctx, limit).await?)
    }

    /// Recent movements of one product, newest first.
    pub async fn product_history(
        &self,
        product_id: &str,
        ctx: &TenantCtx,
        limit: u32,
    ) -> ServiceResult<Vec<Movement>> {
        Ok(self
            .db
            .movements()
            .list_for_product(product_id, ctx, limit)
            .await?)
    }
}
