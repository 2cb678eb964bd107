//! Repository for inventory restock purchases.

use crate::error::RepositoryError;
use crate::models::Purchase;
use chrono::NaiveDate;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a restock and increment the product's stock in one
    /// transaction.
    pub async fn create_and_restock(
        &self,
        product_id: Uuid,
        quantity: i64,
        unit_price_cents: i64,
        day_of_order: NaiveDate,
    ) -> Result<Purchase, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let restocked = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE products
            SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        if restocked.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (product_id, quantity, unit_price_cents, day_of_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, quantity, unit_price_cents, day_of_order, created_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price_cents)
        .bind(day_of_order)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    /// Purchases recorded on a business day, newest first
    pub async fn find_by_day(&self, day: NaiveDate) -> SqlxResult<Vec<Purchase>> {
        sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, product_id, quantity, unit_price_cents, day_of_order, created_at
            FROM purchases
            WHERE day_of_order = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await
    }
}
