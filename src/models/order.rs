use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A settled order. `day_of_order` is the business day (8 AM cutoff), not
/// the wall-clock calendar day of `placed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub staff_id: Uuid,
    pub total_cents: i64,
    pub day_of_order: NaiveDate,
    pub placed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One order line. Quantity and unit price are persisted so reversal can
/// restore stock and remove the exact sale event from the product window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl OrderLine {
    /// Line cost in minor-currency units.
    pub fn cost_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}
