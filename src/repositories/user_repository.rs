use crate::models::User;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for user and guest data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user with an opening balance
    pub async fn create(&self, name: &str, opening_balance_cents: i64) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, balance_cents)
            VALUES ($1, $2)
            RETURNING id, name, balance_cents, is_guest, host_id, active, order_count, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(opening_balance_cents)
        .fetch_one(&self.pool)
        .await
    }

    /// Insert a new guest tied to a host user
    pub async fn create_guest(&self, name: &str, host_id: Uuid) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, is_guest, host_id)
            VALUES ($1, TRUE, $2)
            RETURNING id, name, balance_cents, is_guest, host_id, active, order_count, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(host_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, balance_cents, is_guest, host_id, active, order_count, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Soft-delete a user: scrub identifying fields and deactivate.
    /// Balances and order history are kept for the books.
    pub async fn anonymize(&self, id: Uuid) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = 'Anonymized', active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, balance_cents, is_guest, host_id, active, order_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
