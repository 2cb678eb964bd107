//! Repository for order settlement and reversal.
//!
//! The whole per-order effect (line-item stock and popularity updates, the
//! order insert, the payer debit) runs inside one transaction, with
//! `FOR UPDATE` row locks serializing concurrent orders against the same
//! product or payer. Any failure rolls the entire order back.

use crate::error::RepositoryError;
use crate::models::{Order, OrderLine, Product, User};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Result as SqlxResult, Transaction};
use uuid::Uuid;

/// A validated line-item request: product and positive count.
#[derive(Debug, Clone, Copy)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    /// Settle an order atomically.
    ///
    /// `host_id` is `Some` when the payer is a guest; the host's balance is
    /// then the one debited by the total, while the guest's own balance and
    /// order count track the spend.
    pub async fn settle(
        &self,
        payer_id: Uuid,
        host_id: Option<Uuid>,
        staff_id: Uuid,
        lines: &[LineRequest],
        placed_at: DateTime<Utc>,
        day_of_order: NaiveDate,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut total_cents: i64 = 0;
        let mut priced_lines: Vec<(Uuid, i64, i64)> = Vec::with_capacity(lines.len());

        for line in lines {
            let mut product = lock_product(&mut tx, line.product_id).await?;

            if product.stock - line.quantity < 0 {
                return Err(RepositoryError::InsufficientStock(format!(
                    "{}: requested {}, available {}",
                    product.name, line.quantity, product.stock
                )));
            }

            total_cents += product.price_cents * line.quantity;
            priced_lines.push((line.product_id, line.quantity, product.price_cents));

            product.apply_sale(placed_at, line.quantity);
            store_product_counters(&mut tx, &product).await?;
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (payer_id, staff_id, total_cents, day_of_order, placed_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, payer_id, staff_id, total_cents, day_of_order, placed_at, created_at
            "#,
        )
        .bind(payer_id)
        .bind(staff_id)
        .bind(total_cents)
        .bind(day_of_order)
        .bind(placed_at)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity, unit_price_cents) in &priced_lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        // Debit the payer. Guest orders bill the host; the guest's own
        // balance and order count only track the spend.
        match host_id {
            Some(host_id) => {
                debit_user(&mut tx, payer_id, total_cents, true).await?;
                debit_user(&mut tx, host_id, total_cents, false).await?;
            }
            None => {
                debit_user(&mut tx, payer_id, total_cents, true).await?;
            }
        }

        tx.commit().await?;

        Ok(order)
    }

    // =========================================================================
    // Reversal
    // =========================================================================

    /// Delete an order and compensate all of its effects atomically: stock
    /// restored, counters decremented, the exact sale events removed from
    /// the product windows, and the payer (plus host, for guest orders)
    /// credited by the order total.
    pub async fn delete_with_reversal(
        &self,
        order_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, payer_id, staff_id, total_cents, day_of_order, placed_at, created_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Order {} not found", order_id)))?;

        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            let mut product = lock_product(&mut tx, line.product_id).await?;
            product.revert_sale(order.placed_at, line.quantity, now);
            store_product_counters(&mut tx, &product).await?;
        }

        let payer = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, balance_cents, is_guest, host_id, active, order_count, created_at, updated_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order.payer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Payer {} not found", order.payer_id))
        })?;

        if payer.is_guest {
            let host_id = payer.host_id.ok_or_else(|| {
                RepositoryError::BusinessRule(format!("Guest {} has no host", payer.id))
            })?;
            credit_user(&mut tx, payer.id, order.total_cents, true).await?;
            credit_user(&mut tx, host_id, order.total_cents, false).await?;
        } else {
            credit_user(&mut tx, payer.id, order.total_cents, true).await?;
        }

        // Lines cascade with the order row
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find an order by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Order>> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, payer_id, staff_id, total_cents, day_of_order, placed_at, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Line items of an order
    pub async fn find_lines(&self, order_id: Uuid) -> SqlxResult<Vec<OrderLine>> {
        sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Orders settled on a business day, newest first
    pub async fn find_by_day(&self, day: NaiveDate) -> SqlxResult<Vec<Order>> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, payer_id, staff_id, total_cents, day_of_order, placed_at, created_at
            FROM orders
            WHERE day_of_order = $1
            ORDER BY placed_at DESC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await
    }
}

/// Lock a product row for the duration of the transaction
async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
) -> Result<Product, RepositoryError> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, category, price_cents, stock, recent_sales,
               total_orders, total_quantity_sold, popularity_score, active,
               created_at, updated_at
        FROM products
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| RepositoryError::NotFound(format!("Product {} not found", product_id)))
}

/// Persist the stock, counters, window, and score of a locked product
async fn store_product_counters(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        UPDATE products
        SET stock = $2, recent_sales = $3, total_orders = $4,
            total_quantity_sold = $5, popularity_score = $6, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(product.id)
    .bind(product.stock)
    .bind(product.recent_sales.clone())
    .bind(product.total_orders)
    .bind(product.total_quantity_sold)
    .bind(product.popularity_score)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn debit_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount_cents: i64,
    bump_order_count: bool,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET balance_cents = balance_cents - $2,
            order_count = order_count + CASE WHEN $3 THEN 1 ELSE 0 END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(amount_cents)
    .bind(bump_order_count)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound(format!("User {} not found", user_id)));
    }

    Ok(())
}

async fn credit_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount_cents: i64,
    drop_order_count: bool,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET balance_cents = balance_cents + $2,
            order_count = GREATEST(order_count - CASE WHEN $3 THEN 1 ELSE 0 END, 0),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(amount_cents)
    .bind(drop_order_count)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound(format!("User {} not found", user_id)));
    }

    Ok(())
}
