//! Repository for balance raises (manual top-ups).

use crate::error::RepositoryError;
use crate::models::Raise;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub struct RaiseRepository {
    pool: PgPool,
}

impl RaiseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a raise and credit the target balance in one transaction.
    /// Returns the raise together with the user's new balance.
    pub async fn create_and_apply(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        raiser_id: Uuid,
        via_bank: bool,
    ) -> Result<(Raise, i64), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let new_balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET balance_cents = balance_cents + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING balance_cents
            "#,
        )
        .bind(user_id)
        .bind(amount_cents)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", user_id)))?;

        let raise = sqlx::query_as::<_, Raise>(
            r#"
            INSERT INTO raises (user_id, amount_cents, raiser_id, via_bank)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, amount_cents, raiser_id, via_bank, created_at
            "#,
        )
        .bind(user_id)
        .bind(amount_cents)
        .bind(raiser_id)
        .bind(via_bank)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((raise, new_balance))
    }

    /// Raise history for a user, newest first
    pub async fn find_by_user(&self, user_id: Uuid) -> SqlxResult<Vec<Raise>> {
        sqlx::query_as::<_, Raise>(
            r#"
            SELECT id, user_id, amount_cents, raiser_id, via_bank, created_at
            FROM raises
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
