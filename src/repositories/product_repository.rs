//! Repository for product catalog and popularity state.

use crate::error::RepositoryError;
use crate::models::Product;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product
    pub async fn create(
        &self,
        name: &str,
        category: &str,
        price_cents: i64,
        stock: i64,
    ) -> SqlxResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, price_cents, stock, recent_sales,
                      total_orders, total_quantity_sold, popularity_score, active,
                      created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(price_cents)
        .bind(stock)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a product by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, stock, recent_sales,
                   total_orders, total_quantity_sold, popularity_score, active,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List the catalog ranked by popularity
    pub async fn list_ranked(&self) -> SqlxResult<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, stock, recent_sales,
                   total_orders, total_quantity_sold, popularity_score, active,
                   created_at, updated_at
            FROM products
            WHERE active = TRUE
            ORDER BY popularity_score DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Update catalog fields (sales counters and the window are owned by
    /// the settlement path, not this method)
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        category: &str,
        price_cents: i64,
        stock: i64,
        active: bool,
    ) -> SqlxResult<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, category = $3, price_cents = $4, stock = $5, active = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, category, price_cents, stock, recent_sales,
                      total_orders, total_quantity_sold, popularity_score, active,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(price_cents)
        .bind(stock)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
    }

    /// Ids of all active products, for the popularity sweep
    pub async fn list_active_ids(&self) -> SqlxResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE active = TRUE ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// Prune one product's recent-sales window relative to `now` and persist
    /// the recomputed score. Runs under a row lock so a concurrent order
    /// settlement cannot interleave with the sweep.
    pub async fn refresh_popularity(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, stock, recent_sales,
                   total_orders, total_quantity_sold, popularity_score, active,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Product {} not found", id)))?;

        product.refresh_popularity(now);

        sqlx::query(
            r#"
            UPDATE products
            SET recent_sales = $2, popularity_score = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(product.recent_sales.clone())
        .bind(product.popularity_score)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
