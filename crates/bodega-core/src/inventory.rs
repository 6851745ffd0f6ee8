//! # Inventory Rules
//!
//! Pure stock-level rules shared by the ledger and the low-stock scan.

use crate::DEFAULT_LOW_STOCK_THRESHOLD_PCT;

/// Decides whether a product's total stock counts as "low".
///
/// ## The Dual Condition
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  A product with configured min_stock is LOW when EITHER:                │
/// │                                                                         │
/// │  1. Proportional:  (total / min_stock) × 100 <= threshold_pct          │
/// │     e.g. min_stock=200, threshold=10% → low at total <= 20             │
/// │                                                                         │
/// │  2. Absolute:      (min_stock − total) <= 10  AND  total <= min_stock  │
/// │     e.g. min_stock=1000 → total=995 is low even though it is 99.5%     │
/// │                                                                         │
/// │  Condition 2 catches products with large min_stock values that         │
/// │  condition 1 alone would only flag when nearly empty.                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// `threshold_pct` is a whole percentage (default 10).
pub fn is_low_stock(total_quantity: i64, min_stock: i64, threshold_pct: u32) -> bool {
    // Proportional check in integer math: total/min*100 <= threshold
    // rewritten as total*100 <= threshold*min to avoid division.
    let proportionally_low = total_quantity * 100 <= threshold_pct as i64 * min_stock;

    let near_minimum = (min_stock - total_quantity) <= 10 && total_quantity <= min_stock;

    proportionally_low || near_minimum
}

/// [`is_low_stock`] with the default 10% threshold.
pub fn is_low_stock_default(total_quantity: i64, min_stock: i64) -> bool {
    is_low_stock(total_quantity, min_stock, DEFAULT_LOW_STOCK_THRESHOLD_PCT)
}

/// Whether an exit that left `new_quantity` behind should raise a
/// below-minimum alert for a product with the given `min_stock`.
///
/// Used on the SALIDA path and on the source side of a TRANSFERENCIA.
pub fn breaches_minimum(new_quantity: i64, min_stock: Option<i64>) -> bool {
    match min_stock {
        Some(min) => new_quantity <= min,
        None => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
