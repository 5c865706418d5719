//! Shared fixtures for service tests: an in-memory store, canned actors,
//! and product seeding.

use chrono::Utc;
use uuid::Uuid;

use kasir_core::{Actor, DiscountKind, PaymentMethod, Product, Role};
use kasir_db::{Database, DbConfig};

use crate::transaction::{NewTransaction, NewTransactionItem};
use crate::{Pos, StoreSettings};

pub(crate) async fn pos() -> Pos {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    Pos::new(db, StoreSettings::default())
}

pub(crate) fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub(crate) fn cashier(id: &str) -> Actor {
    Actor::new(id, Role::Cashier)
}

pub(crate) async fn seed_product(pos: &Pos, name: &str, price: i64, stock: i64) -> Product {
    seed(pos, name, price, stock, true, true).await
}

pub(crate) async fn seed_untracked_product(pos: &Pos, name: &str, price: i64) -> Product {
    seed(pos, name, price, 0, false, true).await
}

pub(crate) async fn seed_inactive_product(pos: &Pos, name: &str, price: i64) -> Product {
    seed(pos, name, price, 0, true, false).await
}

async fn seed(
    pos: &Pos,
    name: &str,
    price: i64,
    stock: i64,
    track_stock: bool,
    is_active: bool,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price,
        track_stock,
        stock,
        is_active,
        created_at: now,
        updated_at: now,
    };

    let db = pos.database();
    let mut tx = db.begin().await.expect("begin");
    db.products()
        .insert(&mut *tx, &product)
        .await
        .expect("insert product");
    tx.commit().await.expect("commit");

    product
}

/// A plain cash sale of one product, paid exactly.
pub(crate) fn cash_sale(product: &Product, quantity: i64) -> NewTransaction {
    NewTransaction {
        items: vec![NewTransactionItem {
            product_id: product.id.clone(),
            quantity,
        }],
        discount_kind: DiscountKind::Nominal,
        discount_value: 0,
        tax: 0,
        payment_method: PaymentMethod::Cash,
        paid_amount: product.price * quantity,
        notes: None,
    }
}
