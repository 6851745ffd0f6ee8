//! # Sale Transaction Processor
//!
//! Turns a cart into a completed sale: validates, prices every line,
//! persists the sale + items + stock exits atomically, and emits events.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Processing Flow                             │
//! │                                                                         │
//! │  CreateSale { area, items, payment }                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate: 1..=100 lines, quantities 1..=999, rates ≤ 100%          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Load products, resolve effective unit prices (catalog discounts)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Pre-check stock → friendly error naming the short product          │
//! │       │    (the transaction's atomic decrement remains the real guard) │
//! │       ▼                                                                 │
//! │  4. Compute totals: total = subtotal + tax − discount                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. ONE transaction: sale + items + stock exits                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  6. Emit sale-completed, stock-updated, discount-applied, alerts       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use bodega_core::pricing::{compute_sale_totals, LineQuote};
use bodega_core::validation::{
    validate_id, validate_line_count, validate_line_quantity, validate_rate_bps,
};
use bodega_core::{
    resolve_price, CartLine, CompletedSale, PaymentMethod, Rate, Sale, SaleItem, SaleStatus,
    SavedSale, TenantCtx,
};
use bodega_db::{generate_sale_number, generate_saved_sale_id, Database};

use crate::error::{ServiceError, ServiceResult};
use crate::events::{DomainEvent, EventSink};
use crate::stock::StockLedger;

// =============================================================================
// Requests
// =============================================================================

/// One requested line of a sale.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    /// Per-item discount decided at the terminal, in basis points.
    pub discount_bps: u32,
}

/// Request to complete a sale.
#[derive(Debug, Clone)]
pub struct CreateSale {
    /// Area the stock is drawn from.
    pub area_id: String,
    pub items: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub customer_id: Option<String>,
    pub cashier_id: Option<String>,
}

/// Request to park an unfinished cart.
#[derive(Debug, Clone)]
pub struct ParkCart {
    pub area_id: String,
    pub lines: Vec<CartLine>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Processor
// =============================================================================

/// Service completing sales and managing parked carts.
#[derive(Clone)]
pub struct SaleProcessor {
    db: Database,
    events: Arc<dyn EventSink>,
    ledger: StockLedger,
}

impl SaleProcessor {
    /// Creates a new SaleProcessor.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        let ledger = StockLedger::new(db.clone(), events.clone());
        SaleProcessor { db, events, ledger }
    }

    /// Completes a sale.
    ///
    /// ## Errors
    /// * `ServiceError::Validation` - empty cart, oversize cart, bad line
    /// * `ServiceError::NotFound` - unknown product or area
    /// * `ServiceError::InsufficientStock` - some line short; NOTHING is
    ///   persisted, not even the other lines
    pub async fn complete_sale(
        &self,
        req: CreateSale,
        ctx: &TenantCtx,
    ) -> ServiceResult<CompletedSale> {
        validate_id("area_id", &req.area_id)?;
        validate_line_count(req.items.len())?;
        for line in &req.items {
            validate_id("product_id", &line.product_id)?;
            validate_line_quantity(line.quantity)?;
            validate_rate_bps(line.discount_bps)?;
        }

        // Reject unknown areas with NotFound rather than a foreign key
        // violation from inside the transaction.
        self.db.areas().get_by_id(&req.area_id).await?;

        let now = Utc::now();
        let mut quotes = Vec::with_capacity(req.items.len());
        let mut discount_events = Vec::new();

        for line in &req.items {
            let product = self.db.products().get_by_id(&line.product_id).await?;

            // Friendly pre-check naming the product. The conditional
            // decrement inside the transaction is the real guard.
            let available = self
                .db
                .stock()
                .get(&line.product_id, &req.area_id, ctx)
                .await?
                .map(|s| s.quantity)
                .unwrap_or(0);
            if available < line.quantity {
                return Err(ServiceError::InsufficientStock {
                    product: product.name.clone(),
                    area_id: req.area_id.clone(),
                    available,
                    requested: line.quantity,
                });
            }

            let resolution = resolve_price(&product, now);
            if resolution.has_active_discount {
                discount_events.push(DomainEvent::discount_applied(
                    &product.id,
                    resolution.original_price,
                    resolution.discounted_price,
                ));
            }

            quotes.push(LineQuote {
                unit_price: resolution.discounted_price,
                quantity: line.quantity,
                discount: Rate::from_bps(line.discount_bps),
                tax_rate: product.tax_rate(),
            });
        }

        let totals = compute_sale_totals(&quotes);

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: generate_sale_number(),
            status: SaleStatus::Completed,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            payment_method: req.payment_method,
            notes: req.notes,
            customer_id: req.customer_id,
            cashier_id: req.cashier_id,
            area_id: req.area_id,
            agency_id: ctx.agency_id.clone(),
            sub_account_id: ctx.sub_account_id.clone(),
            created_at: now,
        };

        let items: Vec<SaleItem> = req
            .items
            .iter()
            .zip(&quotes)
            .map(|(line, quote)| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: quote.unit_price.cents(),
                discount_bps: line.discount_bps,
                subtotal_cents: quote.subtotal().cents(),
                created_at: now,
            })
            .collect();

        let stocks = self.db.sales().create_completed(&sale, &items).await?;

        info!(
            sale_number = %sale.sale_number,
            items = items.len(),
            total_cents = sale.total_cents,
            "Sale completed"
        );

        self.events
            .publish(DomainEvent::SaleCompleted { sale: sale.clone() });
        for event in discount_events {
            self.events.publish(event);
        }
        for stock in &stocks {
            self.events.publish(DomainEvent::stock_updated(stock));
            self.ledger.alert_if_below_minimum(stock).await;
        }

        Ok(CompletedSale { sale, items })
    }

    /// Gets a completed sale with its items.
    pub async fn get(&self, id: &str) -> ServiceResult<CompletedSale> {
        Ok(self.db.sales().get_by_id(id).await?)
    }

    /// Recent sales of the agency, newest first.
    pub async fn history(&self, ctx: &TenantCtx, limit: u32) -> ServiceResult<Vec<Sale>> {
        Ok(self.db.sales().list_for_agency(ctx, limit).await?)
    }

    // =========================================================================
    // Parked Carts
    // =========================================================================

    /// Parks an unfinished cart for later resumption.
    ///
    /// Parking does NOT touch stock: the cart is a snapshot, not a
    /// reservation.
    pub async fn park_cart(&self, req: ParkCart, ctx: &TenantCtx) -> ServiceResult<SavedSale> {
        validate_id("area_id", &req.area_id)?;
        validate_line_count(req.lines.len())?;
        for line in &req.lines {
            validate_id("product_id", &line.product_id)?;
            validate_line_quantity(line.quantity)?;
        }

        let saved = SavedSale {
            id: generate_saved_sale_id(),
            agency_id: ctx.agency_id.clone(),
            sub_account_id: ctx.sub_account_id.clone(),
            area_id: req.area_id,
            client_id: req.client_id,
            client_name: req.client_name,
            notes: req.notes,
            lines: req.lines,
            created_at: Utc::now(),
        };

        self.db.saved_sales().insert(&saved).await?;

        info!(saved_sale_id = %saved.id, lines = saved.lines.len(), "Cart parked");
        self.events.publish(DomainEvent::CartUpdated {
            saved_sale_id: saved.id.clone(),
            deleted: false,
        });

        Ok(saved)
    }

    /// Lists the agency's parked carts, newest first.
    pub async fn parked_carts(&self, ctx: &TenantCtx) -> ServiceResult<Vec<SavedSale>> {
        Ok(self.db.saved_sales().list(ctx).await?)
    }

    /// Deletes a parked cart (after resume, or on discard).
    pub async fn delete_parked_cart(&self, id: &str, ctx: &TenantCtx) -> ServiceResult<()> {
        self.db.saved_sales().delete(id, ctx).await?;

        info!(saved_sale_id = %id, "Parked cart removed");
        self.events.publish(DomainEvent::CartUpdated {
            saved_sale_id: id.to_string(),
            deleted: true,
        });

        Ok(())
    }
}
