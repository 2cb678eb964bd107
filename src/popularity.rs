//! Popularity scoring for catalog ranking.
//!
//! The score blends a product's recent (30-day) sales with its lifetime
//! volume: `recent * 0.7 + lifetime * 0.3`. It is recomputed after every
//! stock-affecting mutation and by the periodic sweep, so scores keep
//! decaying for products nobody orders.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Weight of the pruned 30-day sales window.
pub const RECENT_WEIGHT: f64 = 0.7;
/// Weight of the lifetime quantity sold.
pub const LIFETIME_WEIGHT: f64 = 0.3;
/// Trailing horizon of the recent-sales window, in days.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// A single sale recorded in a product's recent-sales window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub at: DateTime<Utc>,
    pub quantity: i64,
}

/// Drop window entries older than the trailing 30-day horizon from `now`.
pub fn prune_window(events: &mut Vec<SaleEvent>, now: DateTime<Utc>) {
    let horizon = now - Duration::days(RECENT_WINDOW_DAYS);
    events.retain(|event| event.at >= horizon);
}

/// Sum of quantities remaining in the window.
pub fn recent_quantity(events: &[SaleEvent]) -> i64 {
    events.iter().map(|event| event.quantity).sum()
}

/// Weighted blend of recent and lifetime volume.
pub fn score(recent_quantity: i64, total_quantity_sold: i64) -> f64 {
    recent_quantity as f64 * RECENT_WEIGHT + total_quantity_sold as f64 * LIFETIME_WEIGHT
}
