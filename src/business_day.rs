//! Business-day resolution.
//!
//! Sales made before 08:00 venue time belong to the previous calendar day,
//! because the bar trades past midnight. Every place that buckets by day
//! (order creation, restock purchases, day-keyed grouping) goes through
//! this module so transaction data and aggregates can never disagree.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};

/// Sales before this local hour are attributed to the previous calendar day.
pub const DAY_CUTOFF_HOUR: u32 = 8;

/// Build the venue's fixed UTC offset from a whole-hour offset.
///
/// Config validation bounds the offset to [-12, 14], so the fallback to UTC
/// is unreachable in practice.
pub fn venue_offset(offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Resolve the business day an instant belongs to.
///
/// Local hour >= 8 maps to that local calendar date; anything earlier maps
/// to the previous one.
pub fn business_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let local = instant.with_timezone(&offset);
    let date = local.date_naive();
    if local.hour() >= DAY_CUTOFF_HOUR {
        date
    } else {
        date.pred_opt().unwrap_or(date)
    }
}
