//! # Repository Module
//!
//! Database repository implementations for Bodega.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service (bodega-services)                                             │
//! │       │                                                                 │
//! │       │  db.stock().entry(product_id, area_id, qty, &ctx)              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StockRepository                                                       │
//! │  ├── get(&self, product_id, area_id)                                   │
//! │  ├── entry(&self, ...)      ← one transaction                          │
//! │  ├── exit(&self, ...)       ← atomic conditional decrement             │
//! │  └── transfer(&self, ...)   ← both legs or neither                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Transaction boundaries live next to the queries they protect        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product catalog reads and inserts
//! - [`area::AreaRepository`] - Stock-holding locations
//! - [`stock::StockRepository`] - Per-area quantities, entry/exit/transfer
//! - [`movement::MovementRepository`] - Append-only movement ledger
//! - [`sale::SaleRepository`] - Sales with items and stock exits
//! - [`saved_sale::SavedSaleRepository`] - Parked carts

pub mod area;
pub mod movement;
pub mod product;
pub mod sale;
pub mod saved_sale;
pub mod stock;
