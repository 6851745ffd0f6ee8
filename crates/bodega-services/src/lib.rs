//! # bodega-services: Application Services for Bodega
//!
//! The orchestration layer: validates input, composes pure core logic
//! with database transactions, and publishes domain events.
//!
//! ## Services
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bodega-services                                  │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────────┐ ┌───────────────────────────┐   │
//! │  │ StockLedger  │ │ MovementRecorder │ │      SaleProcessor        │   │
//! │  │ entry/exit/  │ │ ENTRADA/SALIDA/  │ │ complete_sale,            │   │
//! │  │ transfer,    │ │ TRANSFERENCIA +  │ │ parked carts              │   │
//! │  │ low-stock    │ │ history          │ │                           │   │
//! │  └──────┬───────┘ └────────┬─────────┘ └─────────────┬─────────────┘   │
//! │         │                  │                         │                 │
//! │  ┌──────┴──────────────────┴─────────────────────────┴─────────────┐   │
//! │  │  PricingResolver        │        EventSink (broadcast)          │   │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                              │
//! │         ▼                                                              │
//! │  bodega-core (pure logic)  +  bodega-db (transactions)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use bodega_db::{Database, DbConfig};
//! use bodega_services::{BroadcastSink, Services};
//!
//! let db = Database::new(DbConfig::new("./bodega.db")).await?;
//! let services = Services::new(db, Arc::new(BroadcastSink::default()));
//! let stock = services.stock.entry("product-id", "area-id", 10, &ctx).await?;
//! ```

pub mod error;
pub mod events;
pub mod movement;
pub mod pricing;
pub mod sale;
pub mod stock;

pub use error::{ServiceError, ServiceResult};
pub use events::{BroadcastSink, DomainEvent, EventSink, NullSink};
pub use movement::{MovementRecorder, RecordMovement};
pub use pricing::PricingResolver;
pub use sale::{CreateSale, ParkCart, SaleLine, SaleProcessor};
pub use stock::StockLedger;

use std::sync::Arc;

use bodega_db::Database;

/// All services wired over one database handle and one event sink.
#[derive(Clone)]
pub struct Services {
    pub stock: StockLedger,
    pub movements: MovementRecorder,
    pub sales: SaleProcessor,
    pub pricing: PricingResolver,
}

impl Services {
    /// Wires the full service set.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        Services {
            stock: StockLedger::new(db.clone(), events.clone()),
            movements: MovementRecorder::new(db.clone(), events.clone()),
            sales: SaleProcessor::new(db.clone(), events.clone()),
            pricing: PricingResolver::new(db, events),
        }
    }
}
