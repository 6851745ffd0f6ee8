//! # Seed Data Generator
//!
//! Populates a development database with an agency, areas, a product
//! catalog, and opening stock.
//!
//! ## Usage
//! ```bash
//! # Default: 200 products into ./bodega_dev.db
//! cargo run -p bodega-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p bodega-db --bin seed -- --count 500 --db ./data/bodega.db
//! ```
//!
//! ## Generated Data
//! - One agency (`agency-dev`) with three areas (warehouse + two floors)
//! - Products with SKU `{CATEGORY}-{NAME}-{INDEX}`, prices $0.99-$19.99,
//!   tax rates 0%/5%/8.25%/10%
//! - Every third product carries a minimum stock level; every fifth an
//!   open-ended 10% discount
//! - Opening stock in the warehouse (0-100 units)

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bodega_core::{Product, TenantCtx};
use bodega_db::{Database, DbConfig};

const AGENCY_ID: &str = "agency-dev";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Coca-Cola", "Pepsi", "Sprite", "Fanta", "Red Bull", "Gatorade",
            "Orange Juice", "Apple Juice", "Iced Tea", "Still Water",
        ],
    ),
    (
        "SNK",
        &[
            "Lays Classic", "Doritos Nacho", "Pringles", "Snickers", "M&Ms",
            "Kit Kat", "Oreos", "Goldfish", "Pretzels", "Gummy Bears",
        ],
    ),
    (
        "DRY",
        &[
            "Whole Milk", "Skim Milk", "Cheddar Cheese", "Butter",
            "Greek Yogurt", "Sour Cream", "Eggs Dozen", "Cream Cheese",
        ],
    ),
    (
        "GRO",
        &[
            "White Bread", "Pasta Spaghetti", "Rice White", "Canned Beans",
            "Canned Soup", "Oatmeal", "Peanut Butter", "Honey", "Flour", "Sugar",
        ],
    ),
];

/// Tax rates in basis points.
const TAX_RATES: &[u32] = &[0, 500, 825, 1000];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./bodega_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bodega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./bodega_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bodega Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count(AGENCY_ID).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let ctx = TenantCtx::agency(AGENCY_ID);

    println!();
    println!("Creating areas...");
    let warehouse = db.areas().insert(AGENCY_ID, "Main Warehouse").await?;
    db.areas().insert(AGENCY_ID, "Store Floor A").await?;
    db.areas().insert(AGENCY_ID, "Store Floor B").await?;
    println!("✓ 3 areas created");

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_code, names) in CATEGORIES {
        for (idx, name) in names.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let product = generate_product(category_code, name, generated + idx);

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.sku, e);
                continue;
            }

            // Opening stock in the warehouse
            let opening = ((generated * 13) % 101) as i64;
            if opening > 0 {
                db.stock()
                    .entry(&product.id, &warehouse.id, opening, &ctx)
                    .await?;
            }

            generated += 1;

            if generated % 50 == 0 {
                println!("  Generated {} products...", generated);
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let alerts = db.stock().low_stock_candidates(&ctx).await?;
    println!("  Products with a minimum configured: {}", alerts.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(category: &str, name: &str, seed: usize) -> Product {
    let now = Utc::now();

    let compact: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let prefix = compact[..compact.len().min(3)].to_uppercase();
    let sku = format!("{}-{}-{:03}", category, prefix, seed);

    // Base $0.99-$19.99
    let price_cents = 99 + ((seed * 17) % 1900) as i64;

    // Cost 60-80% of price
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_cents = Some(price_cents * cost_pct / 100);

    let tax_rate_bps = TAX_RATES[seed % TAX_RATES.len()];

    // Every third product participates in low-stock detection
    let min_stock = if seed % 3 == 0 { Some(10 + (seed % 20) as i64) } else { None };

    // Every fifth product has an always-on 10% discount
    let (discount_bps, discount_minimum_price_cents) = if seed % 5 == 0 {
        (Some(1000), Some(price_cents * 80 / 100))
    } else {
        (None, None)
    };

    Product {
        id: Uuid::new_v4().to_string(),
        agency_id: AGENCY_ID.to_string(),
        sub_account_id: None,
        sku,
        name: name.to_string(),
        price_cents,
        cost_cents,
        min_stock,
        tax_rate_bps,
        discount_bps,
        discount_start: None,
        discount_end: None,
        discount_minimum_price_cents,
        is_active: true,
        category_id: Some(category.to_string()),
        created_at: now,
        updated_at: now,
    }
}
