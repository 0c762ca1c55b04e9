//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./atlas.db)
//! cargo run -p atlas-db --bin seed
//!
//! # Specify database path
//! cargo run -p atlas-db --bin seed -- --db ./data/atlas.db
//! ```
//!
//! ## Generated Data
//! - Store settings (guest party, receipt numbering, header/footer)
//! - Two cashier accounts: admin/admin and cashier/cashier
//! - Three categories with a handful of products each
//! - Payment modes: cash, and a stripe mode with a placeholder test key

use chrono::Utc;
use uuid::Uuid;

use atlas_core::{Category, PaymentMode, PaymentProcessor, Product, Settings};
use atlas_db::{Database, DbConfig};

/// Demo catalog: (category, [(sku, name, price_cents, tax_rate_bps)])
const CATALOG: &[(&str, &[(&str, &str, i64, u32)])] = &[
    (
        "Beverages",
        &[
            ("BEV-001", "Coca-Cola 330ml", 299, 825),
            ("BEV-002", "Sparkling Water 500ml", 199, 825),
            ("BEV-003", "Cold Brew Coffee", 449, 825),
            ("BEV-004", "Orange Juice 1L", 399, 825),
        ],
    ),
    (
        "Snacks",
        &[
            ("SNK-001", "Salted Pretzels", 249, 825),
            ("SNK-002", "Dark Chocolate Bar", 349, 825),
            ("SNK-003", "Trail Mix 200g", 549, 825),
            ("SNK-004", "Potato Chips", 299, 825),
        ],
    ),
    (
        "Grocery",
        &[
            ("GRO-001", "Pasta 500g", 189, 0),
            ("GRO-002", "Tomato Sauce", 259, 0),
            ("GRO-003", "Olive Oil 750ml", 1099, 0),
            ("GRO-004", "Basmati Rice 1kg", 499, 0),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // Minimal arg parsing: --db <path>
    let mut db_path = "./atlas.db".to_string();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--db" {
            db_path = args
                .next()
                .ok_or("--db requires a path argument")?;
        }
    }

    println!("Seeding database at {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    // Guest party backs anonymous walk-in sales
    let guest = db.parties().create("Guest", None, None).await?;
    db.parties()
        .create("Sharon Mutual", Some("+1 555 0100"), Some("sharon@example.com"))
        .await?;

    db.settings()
        .upsert(&Settings {
            id: 1,
            store_name: "Atlas General Store".to_string(),
            currency: "usd".to_string(),
            guest_party_id: guest.id.clone(),
            receipt_prefix: "POS-".to_string(),
            next_receipt_number: 1,
            receipt_header: Some("12 Harbour Road".to_string()),
            receipt_footer: Some("Thank you for shopping with us!".to_string()),
        })
        .await?;

    db.users().create("admin", "admin").await?;
    db.users().create("cashier", "cashier").await?;

    let mut product_count = 0;
    for (category_name, products) in CATALOG {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: category_name.to_string(),
            is_active: true,
        };
        db.categories().insert(&category).await?;

        for (sku, name, price_cents, tax_rate_bps) in *products {
            db.products()
                .insert(&Product {
                    id: Uuid::new_v4().to_string(),
                    sku: sku.to_string(),
                    name: name.to_string(),
                    category_id: category.id.clone(),
                    price_cents: *price_cents,
                    tax_rate_bps: *tax_rate_bps,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            product_count += 1;
        }
    }

    db.payment_modes()
        .insert(&PaymentMode {
            id: Uuid::new_v4().to_string(),
            name: "cash".to_string(),
            processor: PaymentProcessor::Cash,
            stripe_api_key: None,
        })
        .await?;
    db.payment_modes()
        .insert(&PaymentMode {
            id: Uuid::new_v4().to_string(),
            name: "card".to_string(),
            processor: PaymentProcessor::Stripe,
            stripe_api_key: Some("sk_test_placeholder".to_string()),
        })
        .await?;

    println!(
        "Seeded {} products, 2 users (admin/admin, cashier/cashier), 2 payment modes",
        product_count
    );

    Ok(())
}
