//! # Product Repository
//!
//! Catalog reads plus the stock column updates owned by the stock ledger.
//!
//! Product CRUD beyond what the register needs lives in the back office;
//! this repository covers lookups, a simple name search, and the guarded
//! stock updates the sale/void/restock paths rely on.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use chrono::{DateTime, Utc};
use kasir_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, track_stock, stock, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Counts products, optionally restricted to active ones.
    pub async fn count(&self, active_only: bool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE (?1 = 0 OR is_active = 1)",
        )
        .bind(active_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Searches active products by name substring.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, track_stock, stock, is_active,
                   created_at, updated_at
            FROM products
            WHERE is_active = 1 AND name LIKE '%' || ?1 || '%'
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product inside an open transaction.
    ///
    /// The sale path reads stock through this so the level it decides on and
    /// the update it writes share one snapshot.
    pub async fn fetch_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, track_stock, stock, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    /// Inserts a product (seeding and tests; the catalog service owns CRUD).
    pub async fn insert(&self, conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price, track_stock, stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.track_stock)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Compare-and-set stock update.
    ///
    /// Only succeeds when the stock column still holds `expected_stock`, so a
    /// write based on a stale read affects zero rows instead of clobbering a
    /// concurrent change. Returns the number of rows updated (0 or 1).
    pub async fn set_stock_cas(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected_stock: i64,
        new_stock: i64,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = ?3, updated_at = ?4
            WHERE id = ?1 AND stock = ?2
            "#,
        )
        .bind(id)
        .bind(expected_stock)
        .bind(new_stock)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
