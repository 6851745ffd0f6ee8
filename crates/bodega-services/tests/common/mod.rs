//! Shared fixtures for service integration tests.
//!
//! Every test gets its own in-memory SQLite database with migrations
//! applied, one agency, two areas, and a small catalog.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use bodega_core::{Area, Product, TenantCtx};
use bodega_db::{Database, DbConfig};
use bodega_services::{BroadcastSink, NullSink, Services};

pub const AGENCY: &str = "agency-test";

pub struct Fixture {
    pub db: Database,
    pub services: Services,
    pub events: Arc<BroadcastSink>,
    pub ctx: TenantCtx,
    pub warehouse: Area,
    pub floor: Area,
}

/// Fresh database + services wired to a broadcast sink.
pub async fn fixture() -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let events = Arc::new(BroadcastSink::new(64));
    let services = Services::new(db.clone(), events.clone());
    let ctx = TenantCtx::agency(AGENCY);

    let warehouse = db.areas().insert(AGENCY, "Warehouse").await.unwrap();
    let floor = db.areas().insert(AGENCY, "Store Floor").await.unwrap();

    Fixture {
        db,
        services,
        events,
        ctx,
        warehouse,
        floor,
    }
}

/// Fresh database + services that drop all events.
pub async fn quiet_fixture() -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let events = Arc::new(BroadcastSink::new(64));
    let services = Services::new(db.clone(), Arc::new(NullSink));
    let ctx = TenantCtx::agency(AGENCY);

    let warehouse = db.areas().insert(AGENCY, "Warehouse").await.unwrap();
    let floor = db.areas().insert(AGENCY, "Store Floor").await.unwrap();

    Fixture {
        db,
        services,
        events,
        ctx,
        warehouse,
        floor,
    }
}

/// A plain product: no discount, no tax, no minimum.
pub fn product(sku: &str, price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        agency_id: AGENCY.to_string(),
        sub_account_id: None,
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        price_cents,
        cost_cents: None,
        min_stock: None,
        tax_rate_bps: 0,
        discount_bps: None,
        discount_start: None,
        discount_end: None,
        discount_minimum_price_cents: None,
        is_active: true,
        category_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts a product built by `build` on top of the plain defaults.
pub async fn insert_product(
    db: &Database,
    sku: &str,
    price_cents: i64,
    build: impl FnOnce(&mut Product),
) -> Product {
    let mut p = product(sku, price_cents);
    build(&mut p);
    db.products().insert(&p).await.unwrap();
    p
}
