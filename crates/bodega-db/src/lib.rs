//! # bodega-db: Database Layer for Bodega
//!
//! SQLite persistence for the Bodega inventory and point-of-sale engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     bodega-services                                     │
//! │        stock ledger, movement recorder, sale processor                  │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//! │                               │                                         │
//! ┌───────────────────────────────▼─────────────────────────────────────────┐
//! │                  ★ bodega-db (THIS CRATE) ★                             │
//! │                                                                         │
//! │   ┌──────────┐  ┌────────────┐  ┌──────────────────────────────────┐   │
//! │   │   pool   │  │ migrations │  │          repository              │   │
//! │   │ Database │  │  embedded  │  │  product, area, stock, movement, │   │
//! │   │ DbConfig │  │    SQL     │  │  sale, saved_sale                │   │
//! │   └──────────┘  └────────────┘  └──────────────────────────────────┘   │
//! │                                                                         │
//! │   Transaction boundaries live HERE: movement + stock mutation and      │
//! │   sale + items + stock exits each commit as one unit.                  │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//! │                               │                                         │
//! ┌───────────────────────────────▼─────────────────────────────────────────┐
//! │                        SQLite (WAL mode)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bodega.db")).await?;
//! let stock = db.stock().entry("product-id", "area-id", 10, &ctx).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::area::AreaRepository;
pub use repository::movement::{MovementEffect, MovementRepository};
pub use repository::product::ProductRepository;
pub use repository::sale::{generate_sale_number, SaleRepository};
pub use repository::saved_sale::{generate_saved_sale_id, SavedSaleRepository};
pub use repository::stock::StockRepository;
