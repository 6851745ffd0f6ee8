//! # Stock Ledger Service
//!
//! Per-area stock operations: entries, exits, transfers, and low-stock
//! scans. Validates inputs, delegates the mutation to the repository's
//! transaction, and emits events after commit.

use std::sync::Arc;
use tracing::{debug, info, warn};

use bodega_core::inventory::{breaches_minimum, is_low_stock};
use bodega_core::validation::{validate_id, validate_movement_quantity, validate_threshold_pct};
use bodega_core::{
    LowStockAlert, ProductStock, Stock, TenantCtx, DEFAULT_LOW_STOCK_THRESHOLD_PCT,
};
use bodega_db::Database;

use crate::error::ServiceResult;
use crate::events::{DomainEvent, EventSink};

/// Service over per-area stock quantities.
#[derive(Clone)]
pub struct StockLedger {
    db: Database,
    events: Arc<dyn EventSink>,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        StockLedger { db, events }
    }

    /// Adds units of a product to an area, creating the stock row on
    /// first entry.
    pub async fn entry(
        &self,
        product_id: &str,
        area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> ServiceResult<Stock> {
        validate_id("product_id", product_id)?;
        validate_id("area_id", area_id)?;
        validate_movement_quantity(quantity)?;

        let stock = self
            .db
            .stock()
            .entry(product_id, area_id, quantity, ctx)
            .await?;

        info!(product_id, area_id, quantity, new_quantity = stock.quantity, "Stock entry");
        self.events.publish(DomainEvent::stock_updated(&stock));

        Ok(stock)
    }

    /// Removes units of a product from an area.
    ///
    /// ## Errors
    /// * `ServiceError::InsufficientStock` - area holds fewer units than
    ///   requested; nothing changed
    pub async fn exit(
        &self,
        product_id: &str,
        area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> ServiceResult<Stock> {
        validate_id("product_id", product_id)?;
        validate_id("area_id", area_id)?;
        validate_movement_quantity(quantity)?;

        let stock = self
            .db
            .stock()
            .exit(product_id, area_id, quantity, ctx)
            .await?;

        info!(product_id, area_id, quantity, new_quantity = stock.quantity, "Stock exit");
        self.events.publish(DomainEvent::stock_updated(&stock));
        self.alert_if_below_minimum(&stock).await;

        Ok(stock)
    }

    /// Moves units between two areas atomically.
    pub async fn transfer(
        &self,
        product_id: &str,
        source_area_id: &str,
        destination_area_id: &str,
        quantity: i64,
        ctx: &TenantCtx,
    ) -> ServiceResult<(Stock, Stock)> {
        validate_id("product_id", product_id)?;
        validate_id("source_area_id", source_area_id)?;
        validate_id("destination_area_id", destination_area_id)?;
        validate_movement_quantity(quantity)?;

        let (source, destination) = self
            .db
            .stock()
            .transfer(product_id, source_area_id, destination_area_id, quantity, ctx)
            .await?;

        info!(
            product_id,
            source_area_id, destination_area_id, quantity, "Stock transferred"
        );
        self.events.publish(DomainEvent::stock_updated(&source));
        self.events.publish(DomainEvent::stock_updated(&destination));
        self.alert_if_below_minimum(&source).await;

        Ok((source, destination))
    }

    /// Current stock row for a (product, area) pair, if any.
    pub async fn get(
        &self,
        product_id: &str,
        area_id: &str,
        ctx: &TenantCtx,
    ) -> ServiceResult<Option<Stock>> {
        Ok(self.db.stock().get(product_id, area_id, ctx).await?)
    }

    /// All active products of the agency with their per-area stock rows
    /// and agency-wide totals.
    pub async fn products_with_stock(&self, ctx: &TenantCtx) -> ServiceResult<Vec<ProductStock>> {
        Ok(self.db.stock().products_with_stock(ctx).await?)
    }

    /// Scans the agency for low-stock products.
    ///
    /// ## Rules
    /// A product with a configured minimum is low when EITHER:
    /// - its total is at or below `threshold%` of the minimum, or
    /// - it is within 10 units of the minimum without exceeding it
    ///
    /// `threshold_pct` defaults to 10 when not given.
    pub async fn check_low_stock(
        &self,
        ctx: &TenantCtx,
        threshold_pct: Option<u32>,
    ) -> ServiceResult<Vec<LowStockAlert>> {
        let threshold = threshold_pct.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD_PCT);
        validate_threshold_pct(threshold)?;

        let candidates = self.db.stock().low_stock_candidates(ctx).await?;

        let alerts: Vec<LowStockAlert> = candidates
            .into_iter()
            .filter(|c| is_low_stock(c.total_quantity, c.min_stock, threshold))
            .collect();

        debug!(
            agency_id = %ctx.agency_id,
            threshold_pct = threshold,
            alerts = alerts.len(),
            "Low-stock scan complete"
        );
        Ok(alerts)
    }

    /// Emits a StockBelowMinimum event when a decrement left the product
    /// at or below its configured minimum.
    ///
    /// Runs after the write committed, so a failed product lookup is
    /// logged rather than surfaced: the caller's operation already
    /// succeeded.
    pub(crate) async fn alert_if_below_minimum(&self, stock: &Stock) {
        let product = match self.db.products().get_by_id(&stock.product_id).await {
            Ok(product) => product,
            Err(err) => {
                warn!(
                    product_id = %stock.product_id,
                    error = %err,
                    "Skipping below-minimum check: product lookup failed"
                );
                return;
            }
        };

        if breaches_minimum(stock.quantity, product.min_stock) {
            // min_stock is Some here by breaches_minimum's contract
            if let Some(min) = product.min_stock {
                self.events
                    .publish(DomainEvent::stock_below_minimum(stock, min));
            }
        }
    }
}
