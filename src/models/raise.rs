use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A manual balance top-up applied to a user's account by staff.
/// Append-only; the signed amount allows corrections.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Raise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub raiser_id: Uuid,
    pub via_bank: bool,
    pub created_at: DateTime<Utc>,
}
