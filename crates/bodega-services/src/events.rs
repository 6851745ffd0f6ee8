//! # Domain Events
//!
//! Fire-and-forget notifications emitted after successful operations.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Event Flow                                      │
//! │                                                                         │
//! │  Service operation                                                      │
//! │       │                                                                 │
//! │       │  1. database transaction COMMITS                               │
//! │       ▼                                                                 │
//! │  sink.publish(DomainEvent::StockUpdated { .. })                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────────────────────────────────────┐                            │
//! │  │  tokio::sync::broadcast channel        │                            │
//! │  │  ├── UI refresh subscriber             │                            │
//! │  │  ├── alert subscriber                  │                            │
//! │  │  └── (lagging receivers drop events)   │                            │
//! │  └────────────────────────────────────────┘                            │
//! │                                                                         │
//! │  Events are emitted AFTER commit and never awaited: a full channel     │
//! │  or absent subscriber cannot fail or delay the operation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bodega_core::{Money, Movement, Sale, Stock};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Events
// =============================================================================

/// Notification emitted after a state change committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DomainEvent {
    /// A stock row changed quantity.
    StockUpdated {
        product_id: String,
        area_id: String,
        quantity: i64,
    },

    /// A stock change left a product at or below its configured minimum.
    StockBelowMinimum {
        product_id: String,
        area_id: String,
        quantity: i64,
        min_stock: i64,
    },

    /// A movement was appended to the ledger.
    MovementCreated { movement: Movement },

    /// A sale completed and its stock was drawn down.
    SaleCompleted { sale: Sale },

    /// A catalog discount actually lowered a resolved price.
    DiscountApplied {
        product_id: String,
        original_price_cents: i64,
        discounted_price_cents: i64,
    },

    /// A parked cart was created or deleted.
    CartUpdated {
        saved_sale_id: String,
        deleted: bool,
    },
}

impl DomainEvent {
    /// Stable wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::StockUpdated { .. } => "stock-updated",
            DomainEvent::StockBelowMinimum { .. } => "stock-below-minimum",
            DomainEvent::MovementCreated { .. } => "movement-created",
            DomainEvent::SaleCompleted { .. } => "sale-completed",
            DomainEvent::DiscountApplied { .. } => "discount-applied",
            DomainEvent::CartUpdated { .. } => "cart-updated",
        }
    }

    /// Builds a StockUpdated event from a stock row.
    pub fn stock_updated(stock: &Stock) -> Self {
        DomainEvent::StockUpdated {
            product_id: stock.product_id.clone(),
            area_id: stock.area_id.clone(),
            quantity: stock.quantity,
        }
    }

    /// Builds a StockBelowMinimum event from a stock row and its minimum.
    pub fn stock_below_minimum(stock: &Stock, min_stock: i64) -> Self {
        DomainEvent::StockBelowMinimum {
            product_id: stock.product_id.clone(),
            area_id: stock.area_id.clone(),
            quantity: stock.quantity,
            min_stock,
        }
    }

    /// Builds a DiscountApplied event.
    pub fn discount_applied(product_id: &str, original: Money, discounted: Money) -> Self {
        DomainEvent::DiscountApplied {
            product_id: product_id.to_string(),
            original_price_cents: original.cents(),
            discounted_price_cents: discounted.cents(),
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination for domain events.
///
/// Publishing never blocks and never fails: an event with nobody
/// listening is silently dropped.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

/// Broadcasts events over a `tokio::sync::broadcast` channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: tokio::sync::broadcast::Sender<DomainEvent>,
}

impl BroadcastSink {
    /// Creates a sink with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(capacity);
        BroadcastSink { sender }
    }

    /// Subscribes to the event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        BroadcastSink::new(256)
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: DomainEvent) {
        debug!(event = event.name(), "Publishing domain event");

        // SendError only means no receivers are subscribed right now.
        let _ = self.sender.send(event);
    }
}

/// Discards all events. Useful in tests and batch tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: DomainEvent) {}
}

// =============================================================================
// Unit Tests
// =============================================================================
