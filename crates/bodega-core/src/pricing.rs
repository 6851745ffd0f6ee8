//! # Pricing Module
//!
//! Pure price resolution and sale total computation.
//!
//! ## Discount Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Effective Price Resolution                           │
//! │                                                                         │
//! │  Product { price: $100, discount: 20%,                                 │
//! │            window: [start, end], minimum: $85 }                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount > 0 AND start ≤ now ≤ end ?                                  │
//! │       │                                                                 │
//! │       ├── no  → { original: $100, discounted: $100, active: false }    │
//! │       │                                                                 │
//! │       └── yes → discounted = $100 − 20% = $80                          │
//! │                 clamp up to minimum → max($80, $85) = $85              │
//! │                 { original: $100, discounted: $85, active: true }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is deterministic given `(product, now)`; event emission
//! for applied discounts lives in bodega-services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};
use crate::types::Product;

// =============================================================================
// Price Resolution
// =============================================================================

/// The effective unit price of a product at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResolution {
    /// The catalog list price.
    pub original_price: Money,

    /// The effective price after discount and minimum-price clamping.
    /// Equals `original_price` when no discount is active.
    pub discounted_price: Money,

    /// The configured discount rate (zero when none configured).
    pub discount: Rate,

    /// Whether a discount was actually applied at `now`.
    pub has_active_discount: bool,
}

/// Computes the effective unit price for `product` at `now`.
///
/// A discount applies only when all of these hold:
/// - `discount_bps` is configured and greater than zero
/// - `discount_start` is unset or at/before `now`
/// - `discount_end` is unset or at/after `now`
///
/// When applicable, the discounted price is clamped upward to
/// `discount_minimum_price_cents` if that floor is configured.
///
/// ## Example
/// ```rust
/// use bodega_core::pricing::resolve_price;
/// # use bodega_core::types::Product;
/// # use chrono::Utc;
/// # fn demo(product: &Product) {
/// let quote = resolve_price(product, Utc::now());
/// let unit_price = quote.discounted_price;
/// # }
/// ```
pub fn resolve_price(product: &Product, now: DateTime<Utc>) -> PriceResolution {
    let original = product.price();
    let discount = product.discount().unwrap_or_else(Rate::zero);

    let window_open = product.discount_start.map_or(true, |start| start <= now);
    let window_not_closed = product.discount_end.map_or(true, |end| end >= now);
    let active = !discount.is_zero() && window_open && window_not_closed;

    if !active {
        return PriceResolution {
            original_price: original,
            discounted_price: original,
            discount,
            has_active_discount: false,
        };
    }

    let mut discounted = original.apply_discount(discount);
    if let Some(floor_cents) = product.discount_minimum_price_cents {
        let floor = Money::from_cents(floor_cents);
        if discounted < floor {
            discounted = floor;
        }
    }

    PriceResolution {
        original_price: original,
        discounted_price: discounted,
        discount,
        has_active_discount: true,
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// One priced line of a sale, ready for total computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineQuote {
    /// Unit price charged at the terminal.
    pub unit_price: Money,
    pub quantity: i64,
    /// Per-item discount (point-of-sale decision).
    pub discount: Rate,
    /// Tax rate taken from the product catalog, not the line.
    pub tax_rate: Rate,
}

impl LineQuote {
    /// Line subtotal before tax and discount (unit price × quantity).
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Accumulated totals of a sale.
///
/// Invariant: `total = subtotal + tax - discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

/// Computes sale totals across all lines.
///
/// Per line: subtotal contribution is `price × qty`; the discount
/// contribution is `price × qty × discount`; the tax contribution is
/// `price × qty × tax_rate`. Tax intentionally uses the product's rate
/// while discount uses the line's rate.
pub fn compute_sale_totals(lines: &[LineQuote]) -> SaleTotals {
    let mut totals = SaleTotals::default();

    for line in lines {
        let subtotal = line.subtotal();
        totals.subtotal += subtotal;
        totals.discount += subtotal.portion(line.discount);
        totals.tax += subtotal.portion(line.tax_rate);
    }

    totals.total = totals.subtotal + totals.tax - totals.discount;
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================
