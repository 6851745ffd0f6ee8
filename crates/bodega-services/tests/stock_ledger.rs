//! Stock ledger integration tests: entries, exits, transfers, low-stock
//! scans, and the events they emit.

mod common;

use common::{fixture, insert_product, quiet_fixture};

use bodega_core::{MovementType, TenantCtx};
use bodega_services::{DomainEvent, RecordMovement, ServiceError};

fn movement(
    movement_type: MovementType,
    product_id: &str,
    area_id: &str,
    quantity: i64,
) -> RecordMovement {
    RecordMovement {
        movement_type,
        product_id: product_id.to_string(),
        area_id: area_id.to_string(),
        destination_area_id: None,
        quantity,
        provider_id: None,
        notes: None,
    }
}

// =============================================================================
// Entries
// =============================================================================

#[tokio::test]
async fn entry_creates_stock_row_then_accumulates() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    // First entry creates the row
    let stock = f
        .services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 10);

    // Second entry increments the SAME row: entries are not idempotent
    let stock = f
        .services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 20);

    // Still exactly one row for the pair
    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 20);
}

#[tokio::test]
async fn entry_rejects_nonpositive_quantity() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let err = f
        .services
        .stock
        .entry(&p.id, &f.warehouse.id, 0, &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = f
        .services
        .stock
        .entry(&p.id, &f.warehouse.id, -5, &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn bulk_restock_entry_has_no_upper_bound() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    // A pallet-sized restock well past any per-line sale cap
    let stock = f
        .services
        .stock
        .entry(&p.id, &f.warehouse.id, 1000, &f.ctx)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 1000);

    let recorded = f
        .services
        .movements
        .record(
            movement(MovementType::Entrada, &p.id, &f.warehouse.id, 5000),
            &f.ctx,
        )
        .await
        .unwrap();
    assert_eq!(recorded.quantity, 5000);

    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 6000);
}

// =============================================================================
// Exits
// =============================================================================

#[tokio::test]
async fn exit_decrements_down_to_zero() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 5, &f.ctx)
        .await
        .unwrap();

    let stock = f
        .services
        .stock
        .exit(&p.id, &f.warehouse.id, 5, &f.ctx)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 0);
}

#[tokio::test]
async fn exit_beyond_available_fails_and_changes_nothing() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 3, &f.ctx)
        .await
        .unwrap();

    let err = f
        .services
        .stock
        .exit(&p.id, &f.warehouse.id, 4, &f.ctx)
        .await
        .unwrap_err();
    match err {
        ServiceError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, 3);
            assert_eq!(requested, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 3);
}

#[tokio::test]
async fn exit_from_area_without_stock_row_is_insufficient() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let err = f
        .services
        .stock
        .exit(&p.id, &f.warehouse.id, 1, &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InsufficientStock { available: 0, .. }
    ));
}

#[tokio::test]
async fn exit_survives_catalog_row_vanishing_before_alert_check() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |p| p.min_stock = Some(5)).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();

    // Remove the catalog row out from under the ledger. The in-memory
    // pool holds a single connection, so the PRAGMA applies to the
    // connection every later statement uses.
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(f.db.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(&p.id)
        .execute(f.db.pool())
        .await
        .unwrap();

    // The decrement committed; the post-commit below-minimum check must
    // not turn its failed product lookup into an error for the caller.
    let stock = f
        .services
        .stock
        .exit(&p.id, &f.warehouse.id, 7, &f.ctx)
        .await
        .unwrap();
    assert_eq!(stock.quantity, 3);
}

// =============================================================================
// Transfers
// =============================================================================

#[tokio::test]
async fn transfer_moves_units_and_conserves_total() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();

    let (source, destination) = f
        .services
        .stock
        .transfer(&p.id, &f.warehouse.id, &f.floor.id, 4, &f.ctx)
        .await
        .unwrap();

    assert_eq!(source.quantity, 6);
    assert_eq!(destination.quantity, 4);
    assert_eq!(source.quantity + destination.quantity, 10);
}

#[tokio::test]
async fn transfer_to_unknown_area_rolls_back_source() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();

    // Destination area doesn't exist: the foreign key violation on the
    // destination leg must undo the source decrement.
    let result = f
        .services
        .stock
        .transfer(&p.id, &f.warehouse.id, "no-such-area", 4, &f.ctx)
        .await;
    assert!(result.is_err());

    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 10, "source must be untouched after rollback");
}

#[tokio::test]
async fn transfer_beyond_available_fails_without_creating_destination() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 2, &f.ctx)
        .await
        .unwrap();

    let err = f
        .services
        .stock
        .transfer(&p.id, &f.warehouse.id, &f.floor.id, 5, &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { .. }));

    let destination = f
        .services
        .stock
        .get(&p.id, &f.floor.id, &f.ctx)
        .await
        .unwrap();
    assert!(destination.is_none());
}

// =============================================================================
// Movement recorder
// =============================================================================

#[tokio::test]
async fn recorded_entry_appears_in_history_with_stock_applied() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let recorded = f
        .services
        .movements
        .record(
            movement(MovementType::Entrada, &p.id, &f.warehouse.id, 7),
            &f.ctx,
        )
        .await
        .unwrap();
    assert_eq!(recorded.movement_type, MovementType::Entrada);

    let history = f.services.movements.history(&f.ctx, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, recorded.id);

    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 7);
}

#[tokio::test]
async fn failed_exit_leaves_no_movement_in_history() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let err = f
        .services
        .movements
        .record(
            movement(MovementType::Salida, &p.id, &f.warehouse.id, 5),
            &f.ctx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { .. }));

    // The movement row must have rolled back with the stock mutation
    let history = f.services.movements.history(&f.ctx, 10).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn transfer_movement_requires_destination() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let err = f
        .services
        .movements
        .record(
            movement(MovementType::Transferencia, &p.id, &f.warehouse.id, 1),
            &f.ctx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn non_transfer_movement_rejects_destination() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let mut req = movement(MovementType::Entrada, &p.id, &f.warehouse.id, 1);
    req.destination_area_id = Some(f.floor.id.clone());

    let err = f.services.movements.record(req, &f.ctx).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn transfer_movement_moves_both_legs() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();

    let mut req = movement(MovementType::Transferencia, &p.id, &f.warehouse.id, 6);
    req.destination_area_id = Some(f.floor.id.clone());
    f.services.movements.record(req, &f.ctx).await.unwrap();

    let source = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    let destination = f
        .services
        .stock
        .get(&p.id, &f.floor.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.quantity, 4);
    assert_eq!(destination.quantity, 6);
}

// =============================================================================
// Low-stock scans
// =============================================================================

#[tokio::test]
async fn low_stock_scan_flags_proportional_rule() {
    let f = quiet_fixture().await;
    // min 100: at 10 units total = 10% of minimum → flagged at default threshold
    let low = insert_product(&f.db, "LOW", 1000, |p| p.min_stock = Some(100)).await;
    // min 100 at 50 units → neither rule fires
    let ok = insert_product(&f.db, "OK", 1000, |p| p.min_stock = Some(100)).await;
    // no minimum configured → never scanned
    let unmanaged = insert_product(&f.db, "UNM", 1000, |_| {}).await;

    f.services.stock.entry(&low.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();
    f.services.stock.entry(&ok.id, &f.warehouse.id, 50, &f.ctx).await.unwrap();
    f.services
        .stock
        .entry(&unmanaged.id, &f.warehouse.id, 1, &f.ctx)
        .await
        .unwrap();

    let alerts = f.services.stock.check_low_stock(&f.ctx, None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].product_id, low.id);
    assert_eq!(alerts[0].total_quantity, 10);
}

#[tokio::test]
async fn low_stock_scan_flags_absolute_rule() {
    let f = quiet_fixture().await;
    // min 20 at 15 units: 75% of minimum (proportional rule silent) but
    // within 10 units of the minimum → flagged
    let near = insert_product(&f.db, "NEAR", 1000, |p| p.min_stock = Some(20)).await;

    f.services
        .stock
        .entry(&near.id, &f.warehouse.id, 15, &f.ctx)
        .await
        .unwrap();

    let alerts = f.services.stock.check_low_stock(&f.ctx, None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].product_id, near.id);
}

#[tokio::test]
async fn low_stock_scan_sums_across_areas() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SPLIT", 1000, |p| p.min_stock = Some(100)).await;

    // 30 + 30 across areas = 60 total → not low at default threshold,
    // not within 10 of the minimum
    f.services.stock.entry(&p.id, &f.warehouse.id, 30, &f.ctx).await.unwrap();
    f.services.stock.entry(&p.id, &f.floor.id, 30, &f.ctx).await.unwrap();

    let alerts = f.services.stock.check_low_stock(&f.ctx, None).await.unwrap();
    assert!(alerts.is_empty());

    // A higher threshold flips the proportional rule
    let alerts = f
        .services
        .stock
        .check_low_stock(&f.ctx, Some(60))
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn entry_emits_stock_updated() {
    let f = fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    let mut rx = f.events.subscribe();

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 5, &f.ctx)
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        DomainEvent::StockUpdated {
            product_id,
            quantity,
            ..
        } => {
            assert_eq!(product_id, p.id);
            assert_eq!(quantity, 5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn exit_below_minimum_emits_alert() {
    let f = fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |p| p.min_stock = Some(5)).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 6, &f.ctx)
        .await
        .unwrap();

    let mut rx = f.events.subscribe();
    f.services
        .stock
        .exit(&p.id, &f.warehouse.id, 2, &f.ctx)
        .await
        .unwrap();

    // First stock-updated, then the below-minimum alert (4 <= 5)
    assert_eq!(rx.recv().await.unwrap().name(), "stock-updated");
    match rx.recv().await.unwrap() {
        DomainEvent::StockBelowMinimum {
            quantity,
            min_stock,
            ..
        } => {
            assert_eq!(quantity, 4);
            assert_eq!(min_stock, 5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

// =============================================================================
// Tenancy
// =============================================================================

#[tokio::test]
async fn stock_is_scoped_to_the_agency() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    f.services
        .stock
        .entry(&p.id, &f.warehouse.id, 10, &f.ctx)
        .await
        .unwrap();

    let other = TenantCtx::agency("agency-other");
    let visible = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &other)
        .await
        .unwrap();
    assert!(visible.is_none());

    let err = f
        .services
        .stock
        .exit(&p.id, &f.warehouse.id, 1, &other)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { .. }));
}
