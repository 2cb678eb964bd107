use chrono::{Duration, TimeZone, Utc};
use sqlx::types::Json;
use taproom_backend::business_day::{business_day, venue_offset};
use taproom_backend::error::AppError;
use taproom_backend::models::{OrderLine, Product};
use taproom_backend::popularity::{self, SaleEvent};
use uuid::Uuid;

fn test_product(price_cents: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: "Pilsner".to_string(),
        category: "beer".to_string(),
        price_cents,
        stock,
        recent_sales: Json(Vec::new()),
        total_orders: 0,
        total_quantity_sold: 0,
        popularity_score: 0.0,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Unit tests for the Day-Boundary Resolver
#[test]
fn test_sale_before_cutoff_belongs_to_previous_day() {
    let offset = venue_offset(0);
    let instant = Utc.with_ymd_and_hms(2024, 6, 15, 7, 59, 59).unwrap();

    let day = business_day(instant, offset);
    assert_eq!(day.to_string(), "2024-06-14");
}

#[test]
fn test_sale_at_cutoff_belongs_to_current_day() {
    let offset = venue_offset(0);
    let instant = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();

    let day = business_day(instant, offset);
    assert_eq!(day.to_string(), "2024-06-15");
}

#[test]
fn test_sale_past_midnight_belongs_to_previous_day() {
    let offset = venue_offset(0);
    let instant = Utc.with_ymd_and_hms(2024, 6, 15, 0, 30, 0).unwrap();

    let day = business_day(instant, offset);
    assert_eq!(day.to_string(), "2024-06-14");
}

#[test]
fn test_business_day_uses_venue_offset() {
    // 06:30 UTC is 08:30 at UTC+2: already past the cutoff there,
    // still before it at UTC+0.
    let instant = Utc.with_ymd_and_hms(2024, 6, 15, 6, 30, 0).unwrap();

    assert_eq!(business_day(instant, venue_offset(2)).to_string(), "2024-06-15");
    assert_eq!(business_day(instant, venue_offset(0)).to_string(), "2024-06-14");
}

/// Unit tests for the Popularity Scorer
#[test]
fn test_popularity_formula() {
    let score = popularity::score(10, 100);
    assert!((score - 37.0).abs() < 1e-9);
}

#[test]
fn test_popularity_weights_sum_to_one() {
    assert!((popularity::RECENT_WEIGHT + popularity::LIFETIME_WEIGHT - 1.0).abs() < 1e-9);
}

#[test]
fn test_popularity_monotonic_in_lifetime_volume() {
    // Same recent window, larger lifetime volume: score must not drop
    assert!(popularity::score(5, 100) > popularity::score(5, 50));
    assert!((popularity::score(0, 0)).abs() < 1e-9);
}

#[test]
fn test_prune_window_drops_events_past_horizon() {
    let now = Utc::now();
    let mut events = vec![
        SaleEvent { at: now - Duration::days(31), quantity: 4 },
        SaleEvent { at: now - Duration::days(29), quantity: 2 },
        SaleEvent { at: now, quantity: 1 },
    ];

    popularity::prune_window(&mut events, now);

    assert_eq!(events.len(), 2);
    assert_eq!(popularity::recent_quantity(&events), 3);
}

/// Unit tests for product sale mutations
#[test]
fn test_apply_sale_updates_stock_and_counters() {
    let mut product = test_product(150, 10);
    let now = Utc::now();

    product.apply_sale(now, 3);

    assert_eq!(product.stock, 7);
    assert_eq!(product.total_orders, 1);
    assert_eq!(product.total_quantity_sold, 3);
    assert_eq!(product.recent_sales.0.len(), 1);
    // recent 3 * 0.7 + lifetime 3 * 0.3
    assert!((product.popularity_score - 3.0).abs() < 1e-9);
}

#[test]
fn test_revert_sale_restores_state() {
    let mut product = test_product(150, 10);
    let now = Utc::now();

    product.apply_sale(now, 3);
    product.revert_sale(now, 3, now);

    assert_eq!(product.stock, 10);
    assert_eq!(product.total_orders, 0);
    assert_eq!(product.total_quantity_sold, 0);
    assert!(product.recent_sales.0.is_empty());
    assert!((product.popularity_score - 0.0).abs() < 1e-9);
}

#[test]
fn test_revert_sale_after_window_aged_out() {
    let mut product = test_product(150, 10);
    let sold_at = Utc::now() - Duration::days(40);

    product.apply_sale(sold_at, 2);
    // The event has aged past the horizon by the time the order is deleted
    product.revert_sale(sold_at, 2, Utc::now());

    assert_eq!(product.stock, 10);
    assert_eq!(product.total_orders, 0);
    assert_eq!(product.total_quantity_sold, 0);
    assert!(product.recent_sales.0.is_empty());
}

#[test]
fn test_refresh_popularity_decays_idle_products() {
    let mut product = test_product(150, 10);
    let sold_at = Utc::now() - Duration::days(5);

    product.apply_sale(sold_at, 10);
    let fresh_score = product.popularity_score;

    // 40 days later the window is empty; only lifetime volume remains
    product.refresh_popularity(sold_at + Duration::days(40));

    assert!(product.popularity_score < fresh_score);
    assert!((product.popularity_score - 10.0 * popularity::LIFETIME_WEIGHT).abs() < 1e-9);
}

/// Unit tests for order lines
#[test]
fn test_order_line_cost() {
    let line = OrderLine {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        quantity: 3,
        unit_price_cents: 150,
    };

    assert_eq!(line.cost_cents(), 450);
}

/// Unit tests for error classification
#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
    assert_eq!(AppError::Validation("x".into()).status_code(), 400);
    assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
    assert_eq!(AppError::InsufficientStock("x".into()).status_code(), 409);
    assert!(AppError::NotFound("x".into()).is_not_found());
}
