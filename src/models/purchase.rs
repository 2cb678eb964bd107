use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An inventory restock entered by staff. Creation increments the
/// product's stock; `day_of_order` follows the same business-day rule as
/// orders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub day_of_order: NaiveDate,
    pub created_at: DateTime<Utc>,
}
