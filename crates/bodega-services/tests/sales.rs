//! Sale processor integration tests: totals, catalog discounts, atomic
//! stock draw-down, and parked carts.

mod common;

use chrono::{Duration, Utc};
use common::{fixture, insert_product, quiet_fixture};

use bodega_core::{CartLine, PaymentMethod};
use bodega_services::{CreateSale, DomainEvent, ParkCart, SaleLine, ServiceError};

fn sale(area_id: &str, items: Vec<SaleLine>) -> CreateSale {
    CreateSale {
        area_id: area_id.to_string(),
        items,
        payment_method: PaymentMethod::Cash,
        notes: None,
        customer_id: None,
        cashier_id: None,
    }
}

fn line(product_id: &str, quantity: i64, discount_bps: u32) -> SaleLine {
    SaleLine {
        product_id: product_id.to_string(),
        quantity,
        discount_bps,
    }
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn sale_totals_follow_subtotal_plus_tax_minus_discount() {
    let f = quiet_fixture().await;
    // $10.00 at 15% tax
    let p = insert_product(&f.db, "SKU-1", 1000, |p| p.tax_rate_bps = 1500).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();

    // 2 × $10 with a 10% line discount:
    // subtotal 2000, tax 300, discount 200, total 2100
    let completed = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 2, 1000)]), &f.ctx)
        .await
        .unwrap();

    assert_eq!(completed.sale.subtotal_cents, 2000);
    assert_eq!(completed.sale.tax_cents, 300);
    assert_eq!(completed.sale.discount_cents, 200);
    assert_eq!(completed.sale.total_cents, 2100);

    assert_eq!(completed.items.len(), 1);
    assert_eq!(completed.items[0].unit_price_cents, 1000);
    assert_eq!(completed.items[0].subtotal_cents, 2000);

    assert!(completed.sale.sale_number.starts_with("SALE-"));
}

#[tokio::test]
async fn sale_freezes_catalog_discounted_price_into_items() {
    let f = quiet_fixture().await;
    let now = Utc::now();
    // $100 at 20% off inside an open window, floored at $85
    let p = insert_product(&f.db, "SKU-1", 10000, |p| {
        p.discount_bps = Some(2000);
        p.discount_start = Some(now - Duration::days(1));
        p.discount_end = Some(now + Duration::days(1));
        p.discount_minimum_price_cents = Some(8500);
    })
    .await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 5, &f.ctx).await.unwrap();

    let completed = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 1, 0)]), &f.ctx)
        .await
        .unwrap();

    // Clamped to the floor, not the raw 20% discount
    assert_eq!(completed.items[0].unit_price_cents, 8500);
    assert_eq!(completed.sale.subtotal_cents, 8500);
    assert_eq!(completed.sale.total_cents, 8500);
}

#[tokio::test]
async fn expired_discount_charges_list_price() {
    let f = quiet_fixture().await;
    let now = Utc::now();
    let p = insert_product(&f.db, "SKU-1", 10000, |p| {
        p.discount_bps = Some(2000);
        p.discount_end = Some(now - Duration::days(1));
    })
    .await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 5, &f.ctx).await.unwrap();

    let completed = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 1, 0)]), &f.ctx)
        .await
        .unwrap();

    assert_eq!(completed.items[0].unit_price_cents, 10000);
}

// =============================================================================
// Stock draw-down
// =============================================================================

#[tokio::test]
async fn completed_sale_draws_stock_from_the_sale_area() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();

    f.services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 3, 0)]), &f.ctx)
        .await
        .unwrap();

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
async fn short_line_rolls_back_the_entire_sale() {
    let f = quiet_fixture().await;
    let covered = insert_product(&f.db, "OK", 1000, |_| {}).await;
    let short = insert_product(&f.db, "SHORT", 1000, |_| {}).await;

    f.services.stock.entry(&covered.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();
    f.services.stock.entry(&short.id, &f.warehouse.id, 1, &f.ctx).await.unwrap();

    let err = f
        .services
        .sales
        .complete_sale(
            sale(
                &f.warehouse.id,
                vec![line(&covered.id, 2, 0), line(&short.id, 5, 0)],
            ),
            &f.ctx,
        )
        .await
        .unwrap_err();

    match err {
        ServiceError::InsufficientStock {
            product,
            available,
            requested,
            ..
        } => {
            // Error names the product, not just its id
            assert_eq!(product, short.name);
            assert_eq!(available, 1);
            assert_eq!(requested, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Nothing persisted: no sale, both stocks untouched
    let sales = f.services.sales.history(&f.ctx, 10).await.unwrap();
    assert!(sales.is_empty());

    let row = f
        .services
        .stock
        .get(&covered.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 10);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let f = quiet_fixture().await;

    let err = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![]), &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn oversize_line_quantity_is_rejected_at_the_terminal() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 2000, &f.ctx).await.unwrap();

    // 1000 units on one line is a typo, not a purchase, even with stock
    // on hand. The cap applies at the point of sale only.
    let err = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 1000, 0)]), &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = f
        .services
        .sales
        .park_cart(
            ParkCart {
                area_id: f.warehouse.id.clone(),
                lines: vec![CartLine {
                    product_id: p.id.clone(),
                    name: p.name.clone(),
                    price_cents: p.price_cents,
                    quantity: 1000,
                }],
                client_id: None,
                client_name: None,
                notes: None,
            },
            &f.ctx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn unknown_area_is_not_found() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let err = f
        .services
        .sales
        .complete_sale(sale("no-such-area", vec![line(&p.id, 1, 0)]), &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn sale_is_retrievable_with_items() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();

    let completed = f
        .services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 2, 0)]), &f.ctx)
        .await
        .unwrap();

    let fetched = f.services.sales.get(&completed.sale.id).await.unwrap();
    assert_eq!(fetched.sale.sale_number, completed.sale.sale_number);
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].product_id, p.id);
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn sale_emits_completion_and_stock_events() {
    let f = fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();

    let mut rx = f.events.subscribe();
    f.services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 2, 0)]), &f.ctx)
        .await
        .unwrap();

    assert_eq!(rx.recv().await.unwrap().name(), "sale-completed");
    match rx.recv().await.unwrap() {
        DomainEvent::StockUpdated { quantity, .. } => assert_eq!(quantity, 8),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn active_catalog_discount_emits_discount_applied() {
    let f = fixture().await;
    let p = insert_product(&f.db, "SKU-1", 10000, |p| p.discount_bps = Some(1000)).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 5, &f.ctx).await.unwrap();

    let mut rx = f.events.subscribe();
    f.services
        .sales
        .complete_sale(sale(&f.warehouse.id, vec![line(&p.id, 1, 0)]), &f.ctx)
        .await
        .unwrap();

    assert_eq!(rx.recv().await.unwrap().name(), "sale-completed");
    match rx.recv().await.unwrap() {
        DomainEvent::DiscountApplied {
            original_price_cents,
            discounted_price_cents,
            ..
        } => {
            assert_eq!(original_price_cents, 10000);
            assert_eq!(discounted_price_cents, 9000);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

// =============================================================================
// Pricing resolver
// =============================================================================

#[tokio::test]
async fn pricing_resolver_reports_effective_price() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 10000, |p| {
        p.discount_bps = Some(2000);
        p.discount_minimum_price_cents = Some(8500);
    })
    .await;

    let resolution = f.services.pricing.resolve(&p.id).await.unwrap();
    assert!(resolution.has_active_discount);
    assert_eq!(resolution.original_price.cents(), 10000);
    assert_eq!(resolution.discounted_price.cents(), 8500);
}

// =============================================================================
// Parked carts
// =============================================================================

fn cart_line(product_id: &str, name: &str, price_cents: i64, quantity: i64) -> CartLine {
    CartLine {
        product_id: product_id.to_string(),
        name: name.to_string(),
        price_cents,
        quantity,
    }
}

#[tokio::test]
async fn park_list_and_delete_cart() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;

    let saved = f
        .services
        .sales
        .park_cart(
            ParkCart {
                area_id: f.warehouse.id.clone(),
                lines: vec![cart_line(&p.id, &p.name, p.price_cents, 2)],
                client_id: None,
                client_name: Some("Walk-in".to_string()),
                notes: None,
            },
            &f.ctx,
        )
        .await
        .unwrap();
    assert!(saved.id.starts_with("SAVED-"));

    let carts = f.services.sales.parked_carts(&f.ctx).await.unwrap();
    assert_eq!(carts.len(), 1);
    assert_eq!(carts[0].lines, saved.lines);
    assert_eq!(carts[0].client_name.as_deref(), Some("Walk-in"));

    f.services
        .sales
        .delete_parked_cart(&saved.id, &f.ctx)
        .await
        .unwrap();

    let carts = f.services.sales.parked_carts(&f.ctx).await.unwrap();
    assert!(carts.is_empty());
}

#[tokio::test]
async fn parking_does_not_reserve_stock() {
    let f = quiet_fixture().await;
    let p = insert_product(&f.db, "SKU-1", 1000, |_| {}).await;
    f.services.stock.entry(&p.id, &f.warehouse.id, 10, &f.ctx).await.unwrap();

    f.services
        .sales
        .park_cart(
            ParkCart {
                area_id: f.warehouse.id.clone(),
                lines: vec![cart_line(&p.id, &p.name, p.price_cents, 4)],
                client_id: None,
                client_name: None,
                notes: None,
            },
            &f.ctx,
        )
        .await
        .unwrap();

    let row = f
        .services
        .stock
        .get(&p.id, &f.warehouse.id, &f.ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 10);
}

#[tokio::test]
async fn deleting_unknown_cart_is_not_found() {
    let f = quiet_fixture().await;

    let err = f
        .services
        .sales
        .delete_parked_cart("SAVED-0-000", &f.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn empty_cart_cannot_be_parked() {
    let f = quiet_fixture().await;

    let err = f
        .services
        .sales
        .park_cart(
            ParkCart {
                area_id: f.warehouse.id.clone(),
                lines: vec![],
                client_id: None,
                client_name: None,
                notes: None,
            },
            &f.ctx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}
