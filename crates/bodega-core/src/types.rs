//! # Domain Types
//!
//! Core domain types used throughout Bodega.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Stock       │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  product_id     │   │  movement_type  │       │
//! │  │  price_cents    │   │  area_id        │   │  quantity       │       │
//! │  │  min_stock      │   │  quantity ≥ 0   │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │    SaleItem     │   │   SavedSale     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sale_number    │   │  unit_price     │   │  parked cart    │       │
//! │  │  totals (cents) │   │  discount_bps   │   │  JSON lines     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! Every entity is scoped by an `agency_id` (the owning tenant) and an
//! optional `sub_account_id`. Service operations take a [`TenantCtx`] and
//! never cross tenant boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{Money, Rate};

// =============================================================================
// Tenant Context
// =============================================================================

/// Tenant scoping carried through every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCtx {
    /// The owning agency (top-level tenant).
    pub agency_id: String,

    /// Optional sub-account within the agency.
    pub sub_account_id: Option<String>,
}

impl TenantCtx {
    /// Creates a tenant context for an agency without a sub-account.
    pub fn agency(agency_id: impl Into<String>) -> Self {
        TenantCtx {
            agency_id: agency_id.into(),
            sub_account_id: None,
        }
    }

    /// Creates a tenant context scoped to a sub-account.
    pub fn sub_account(agency_id: impl Into<String>, sub_account_id: impl Into<String>) -> Self {
        TenantCtx {
            agency_id: agency_id.into(),
            sub_account_id: Some(sub_account_id.into()),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the agency catalog.
///
/// The core treats products as read-only reference data: catalog management
/// creates and edits them, the ledger and sale processor only read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Agency this product belongs to.
    pub agency_id: String,

    /// Optional sub-account scoping.
    pub sub_account_id: Option<String>,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on receipts and alerts.
    pub name: String,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,

    /// Minimum stock level; products with a value participate in
    /// low-stock detection.
    pub min_stock: Option<i64>,

    /// Tax rate in basis points (1500 = 15%).
    pub tax_rate_bps: u32,

    /// Active discount in basis points (1000 = 10%), if any.
    pub discount_bps: Option<u32>,

    /// Discount validity window start (unset = always started).
    pub discount_start: Option<DateTime<Utc>>,

    /// Discount validity window end (unset = never expires).
    pub discount_end: Option<DateTime<Utc>>,

    /// Floor the discounted price may not undercut.
    pub discount_minimum_price_cents: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Optional category reference.
    pub category_id: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }

    /// Returns the configured discount rate, if any.
    #[inline]
    pub fn discount(&self) -> Option<Rate> {
        self.discount_bps.map(Rate::from_bps)
    }
}

// =============================================================================
// Area
// =============================================================================

/// A physical or logical stock-holding location (warehouse, store floor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Area {
    pub id: String,
    pub agency_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock
// =============================================================================

/// Current quantity of one product at one area.
///
/// ## Invariants
/// - `quantity >= 0` at all times (enforced at mutation time)
/// - At most one row per (product_id, area_id) pair; the ledger
///   find-or-creates rather than duplicating
/// - Never deleted by the core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub id: String,
    pub product_id: String,
    pub area_id: String,
    pub quantity: i64,
    pub agency_id: String,
    pub sub_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Movement
// =============================================================================

/// Kind of inventory movement.
///
/// Serialized and stored with the ledger's historical vocabulary:
/// `ENTRADA` (entry), `SALIDA` (exit), `TRANSFERENCIA` (transfer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock entering an area (reception, restock).
    Entrada,
    /// Stock leaving an area (sale, loss, manual exit).
    Salida,
    /// Stock moving between two areas atomically.
    Transferencia,
}

impl MovementType {
    /// Stable string form, as stored in the ledger.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::Salida => "SALIDA",
            MovementType::Transferencia => "TRANSFERENCIA",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRADA" => Ok(MovementType::Entrada),
            "SALIDA" => Ok(MovementType::Salida),
            "TRANSFERENCIA" => Ok(MovementType::Transferencia),
            other => Err(ValidationError::NotAllowed {
                field: format!("movement type '{}'", other),
                allowed: vec![
                    "ENTRADA".to_string(),
                    "SALIDA".to_string(),
                    "TRANSFERENCIA".to_string(),
                ],
            }),
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of an inventory quantity change.
///
/// Movements are an append-only ledger: created once, never updated or
/// deleted. The stock mutation they describe commits in the same database
/// transaction, so history and current stock cannot diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub movement_type: MovementType,
    /// Quantity moved; always positive.
    pub quantity: i64,
    pub product_id: String,
    /// Source area (or receiving area for ENTRADA).
    pub area_id: String,
    /// Destination area; required only for TRANSFERENCIA.
    pub destination_area_id: Option<String>,
    /// Supplier reference for receptions.
    pub provider_id: Option<String>,
    pub notes: Option<String>,
    pub agency_id: String,
    pub sub_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale transaction.
///
/// Sales are created already completed; no partial states are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Completed,
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// A completed POS sale.
///
/// Created atomically with its items in one persistence call; immutable
/// thereafter. `total_cents = subtotal_cents + tax_cents - discount_cents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Unique business identifier: `SALE-<epoch millis>-<random 0-999>`.
    pub sale_number: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub customer_id: Option<String>,
    pub cashier_id: Option<String>,
    /// Area the sale draws stock from.
    pub area_id: String,
    pub agency_id: String,
    pub sub_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a sale. Owned exclusively by its Sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Per-item discount in basis points; a point-of-sale decision,
    /// distinct from the product's catalog discount.
    pub discount_bps: u32,
    /// Line total before tax (unit_price × quantity).
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// A persisted sale together with its ordered line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Saved Sale (parked cart)
// =============================================================================

/// One line of a parked cart snapshot.
///
/// Snapshot pattern: name and price are frozen at park time so the cart
/// displays consistently even if the catalog changes before resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

/// A parked, unfinished cart - not yet a committed sale.
///
/// Created when a cashier parks a cart; deleted explicitly when resumed or
/// discarded; never otherwise mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSale {
    /// Business identifier: `SAVED-<epoch millis>-<random>`.
    pub id: String,
    pub agency_id: String,
    pub sub_account_id: Option<String>,
    pub area_id: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub notes: Option<String>,
    /// Ordered snapshot of the cart contents.
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Read Models
// =============================================================================

/// A product together with its stock rows across all areas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStock {
    pub product: Product,
    /// Sum of quantities across all areas.
    pub total_quantity: i64,
    pub stocks: Vec<Stock>,
}

/// A product flagged by the low-stock scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockAlert {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub min_stock: i64,
    /// Quantity summed across all areas of the agency.
    pub total_quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
