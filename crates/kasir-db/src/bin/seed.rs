//! # Seed Data Generator
//!
//! Populates the database with a demo minimarket catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the full demo catalog
//! cargo run -p kasir-db --bin seed
//!
//! # Cap the number of products
//! cargo run -p kasir-db --bin seed -- --count 50
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Products
//! Realistic Indonesian minimarket items across categories:
//! - Minuman (bottled drinks, coffee, milk)
//! - Makanan instan (noodles, canned food)
//! - Snack (chips, wafers, chocolate)
//! - Sembako (rice, oil, sugar, flour)
//! - Perawatan (soap, shampoo, toothpaste)
//!
//! Each product gets a whole-rupiah price and a starting stock level.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use kasir_core::Product;
use kasir_db::{Database, DbConfig};

/// Demo catalog: (category, [(name, price_rupiah, base_stock)]).
const CATALOG: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Minuman",
        &[
            ("Aqua 600ml", 4_000, 120),
            ("Aqua 1500ml", 7_000, 60),
            ("Teh Botol Sosro 450ml", 6_000, 72),
            ("Teh Pucuk Harum 350ml", 4_500, 90),
            ("Ultra Milk Coklat 250ml", 7_500, 48),
            ("Ultra Milk Plain 1L", 19_500, 24),
            ("Kopi Kapal Api Sachet", 2_000, 200),
            ("Good Day Cappuccino", 2_500, 150),
            ("Pocari Sweat 500ml", 8_500, 40),
            ("Floridina Orange 360ml", 4_000, 80),
            ("Susu Bear Brand", 11_500, 36),
            ("Es Kopi Susu Botol", 12_000, 20),
        ],
    ),
    (
        "Makanan Instan",
        &[
            ("Indomie Goreng", 3_500, 240),
            ("Indomie Soto", 3_200, 180),
            ("Indomie Ayam Bawang", 3_200, 160),
            ("Mie Sedaap Goreng", 3_300, 140),
            ("Pop Mie Ayam", 6_500, 60),
            ("Sarden ABC 155g", 12_500, 40),
            ("Kornet Pronas 198g", 22_000, 24),
            ("Bubur Ayam Instan", 5_500, 48),
        ],
    ),
    (
        "Snack",
        &[
            ("Chitato Sapi Panggang 68g", 10_500, 50),
            ("Qtela Singkong 60g", 8_000, 45),
            ("Tango Wafer Coklat", 7_500, 60),
            ("Roma Kelapa 300g", 11_000, 40),
            ("SilverQueen Cashew 58g", 14_500, 30),
            ("Beng Beng", 2_500, 120),
            ("Chocolatos Wafer", 2_000, 150),
            ("Oreo Original 133g", 9_500, 55),
            ("Taro Net Seaweed", 9_000, 50),
            ("Kacang Garuda 200g", 13_500, 35),
        ],
    ),
    (
        "Sembako",
        &[
            ("Beras Premium 5kg", 78_000, 20),
            ("Minyak Goreng Bimoli 1L", 24_000, 36),
            ("Minyak Goreng Bimoli 2L", 46_000, 24),
            ("Gula Pasir Gulaku 1kg", 18_500, 40),
            ("Tepung Segitiga Biru 1kg", 14_000, 30),
            ("Telur Ayam 1kg", 28_000, 25),
            ("Kecap Bango 275ml", 21_500, 32),
            ("Saus Sambal ABC 335ml", 16_000, 28),
            ("Garam Dapur 500g", 5_000, 50),
            ("Santan Kara 200ml", 8_500, 40),
        ],
    ),
    (
        "Perawatan",
        &[
            ("Sabun Lifebuoy 110g", 5_500, 60),
            ("Shampoo Pantene Sachet", 1_500, 200),
            ("Pasta Gigi Pepsodent 190g", 15_500, 40),
            ("Sikat Gigi Formula", 8_000, 35),
            ("Deterjen Rinso 770g", 21_000, 30),
            ("Sunlight Jeruk Nipis 755ml", 15_000, 28),
            ("Tissue Paseo 250s", 17_500, 32),
            ("Baygon Aerosol 600ml", 42_000, 15),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./kasir_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
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
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Max products to generate (default: full catalog)");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count(false).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let now = Utc::now();
    let mut generated = 0;

    let mut tx = db.begin().await?;

    'outer: for (category, items) in CATALOG {
        for (name, price, stock) in *items {
            if generated >= count {
                break 'outer;
            }

            let product = Product {
                id: Uuid::new_v4().to_string(),
                name: format!("{} ({})", name, category),
                price: *price,
                track_stock: true,
                stock: *stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            db.products().insert(&mut tx, &product).await?;
            generated += 1;
        }
    }

    tx.commit().await?;

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    println!();
    println!("Verifying catalog...");
    let results = db.products().search("Indomie", 10).await?;
    println!("  Search 'Indomie': {} results", results.len());
    let results = db.products().search("Aqua", 10).await?;
    println!("  Search 'Aqua': {} results", results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
