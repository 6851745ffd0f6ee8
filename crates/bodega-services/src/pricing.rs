//! # Pricing Resolver Service
//!
//! Loads a product and resolves its effective price at the current
//! instant. The arithmetic lives in bodega-core; this wrapper adds the
//! catalog lookup and the discount-applied event.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use bodega_core::{resolve_price, PriceResolution};
use bodega_db::Database;

use crate::error::ServiceResult;
use crate::events::{DomainEvent, EventSink};

/// Service resolving effective product prices.
#[derive(Clone)]
pub struct PricingResolver {
    db: Database,
    events: Arc<dyn EventSink>,
}

impl PricingResolver {
    /// Creates a new PricingResolver.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        PricingResolver { db, events }
    }

    /// Resolves the effective unit price of a product right now.
    ///
    /// Emits a DiscountApplied event only when a discount actually
    /// lowered the price.
    pub async fn resolve(&self, product_id: &str) -> ServiceResult<PriceResolution> {
        let product = self.db.products().get_by_id(product_id).await?;
        let resolution = resolve_price(&product, Utc::now());

        debug!(
            product_id,
            original = resolution.original_price.cents(),
            effective = resolution.discounted_price.cents(),
            active = resolution.has_active_discount,
            "Price resolved"
        );

        if resolution.has_active_discount {
            self.events.publish(DomainEvent::discount_applied(
                product_id,
                resolution.original_price,
                resolution.discounted_price,
            ));
        }

        Ok(resolution)
    }
}
