//! Product catalog model with stock, sales counters, and popularity state.

use crate::popularity::{self, SaleEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog product. Prices are integer minor-currency units; the
/// recent-sales window is a JSONB column pruned to a trailing 30-day
/// horizon on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub recent_sales: Json<Vec<SaleEvent>>,
    pub total_orders: i64,
    pub total_quantity_sold: i64,
    pub popularity_score: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Apply one sale: append the window event, prune, bump the counters,
    /// decrement stock, and refresh the score. The caller is responsible
    /// for checking stock beforehand.
    pub fn apply_sale(&mut self, at: DateTime<Utc>, quantity: i64) {
        self.recent_sales.0.push(SaleEvent { at, quantity });
        popularity::prune_window(&mut self.recent_sales.0, at);
        self.total_orders += 1;
        self.total_quantity_sold += quantity;
        self.stock -= quantity;
        self.refresh_score();
    }

    /// Undo one previously recorded sale. The matching window event is
    /// removed when it is still inside the horizon; events the window has
    /// already pruned need no removal.
    pub fn revert_sale(&mut self, at: DateTime<Utc>, quantity: i64, now: DateTime<Utc>) {
        if let Some(pos) = self
            .recent_sales
            .0
            .iter()
            .position(|event| event.at == at && event.quantity == quantity)
        {
            self.recent_sales.0.remove(pos);
        }
        popularity::prune_window(&mut self.recent_sales.0, now);
        self.total_orders = (self.total_orders - 1).max(0);
        self.total_quantity_sold = (self.total_quantity_sold - quantity).max(0);
        self.stock += quantity;
        self.refresh_score();
    }

    /// Prune the window relative to `now` and recompute the score. Used by
    /// the periodic sweep so idle products keep decaying.
    pub fn refresh_popularity(&mut self, now: DateTime<Utc>) {
        popularity::prune_window(&mut self.recent_sales.0, now);
        self.refresh_score();
    }

    fn refresh_score(&mut self) {
        self.popularity_score = popularity::score(
            popularity::recent_quantity(&self.recent_sales.0),
            self.total_quantity_sold,
        );
    }
}
