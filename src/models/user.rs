use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account with a stored balance, in integer minor-currency units.
/// Guests are users flagged `is_guest` whose orders are billed to the
/// linked host; their own balance only tracks spend.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub balance_cents: i64,
    pub is_guest: bool,
    pub host_id: Option<Uuid>,
    pub active: bool,
    pub order_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
