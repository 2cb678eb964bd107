//! Settlement-flow tests against a real database.
//!
//! Ignored by default; run with `cargo test -- --ignored` against a
//! PostgreSQL instance reachable via TEST_DATABASE_URL.

mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use taproom_backend::business_day::{business_day, venue_offset};
use taproom_backend::error::RepositoryError;
use taproom_backend::repositories::order_repository::LineRequest;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_order_settlement_applies_all_effects() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "alice", 10_000).await;
    let product = create_test_product(&db, "Pilsner", 150, 10).await;

    let placed_at = Utc::now();
    let day = business_day(placed_at, venue_offset(0));
    let lines = [LineRequest {
        product_id: product.id,
        quantity: 3,
    }];

    let order = db
        .order_repo
        .settle(user.id, None, Uuid::new_v4(), &lines, placed_at, day)
        .await
        .expect("Failed to settle order");

    assert_eq!(order.total_cents, 450);
    assert_eq!(order.day_of_order, day);

    let product = db
        .product_repo
        .find_by_id(product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 7);
    assert_eq!(product.total_orders, 1);
    assert_eq!(product.total_quantity_sold, 3);
    assert_eq!(product.recent_sales.0.len(), 1);

    let user = db.user_repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.balance_cents, 9_550);
    assert_eq!(user.order_count, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_order_reversal_restores_state() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "bob", 5_000).await;
    let product = create_test_product(&db, "Stout", 200, 8).await;

    let placed_at = Utc::now();
    let day = business_day(placed_at, venue_offset(0));
    let lines = [LineRequest {
        product_id: product.id,
        quantity: 2,
    }];

    let order = db
        .order_repo
        .settle(user.id, None, Uuid::new_v4(), &lines, placed_at, day)
        .await
        .expect("Failed to settle order");

    db.order_repo
        .delete_with_reversal(order.id, Utc::now())
        .await
        .expect("Failed to reverse order");

    let product = db
        .product_repo
        .find_by_id(product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 8);
    assert_eq!(product.total_orders, 0);
    assert_eq!(product.total_quantity_sold, 0);
    assert!(product.recent_sales.0.is_empty());

    let user = db.user_repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.balance_cents, 5_000);
    assert_eq!(user.order_count, 0);

    assert!(db.order_repo.find_by_id(order.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_insufficient_stock_rolls_back_whole_order() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "carol", 10_000).await;
    let plenty = create_test_product(&db, "Lager", 100, 10).await;
    let scarce = create_test_product(&db, "Barrel Aged", 900, 2).await;

    let placed_at = Utc::now();
    let day = business_day(placed_at, venue_offset(0));
    let lines = [
        LineRequest {
            product_id: plenty.id,
            quantity: 1,
        },
        LineRequest {
            product_id: scarce.id,
            quantity: 5,
        },
    ];

    let result = db
        .order_repo
        .settle(user.id, None, Uuid::new_v4(), &lines, placed_at, day)
        .await;

    assert!(matches!(result, Err(RepositoryError::InsufficientStock(_))));

    // The first line's effects must have been rolled back too
    let plenty = db.product_repo.find_by_id(plenty.id).await.unwrap().unwrap();
    assert_eq!(plenty.stock, 10);
    assert_eq!(plenty.total_orders, 0);

    let user = db.user_repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.balance_cents, 10_000);
    assert_eq!(user.order_count, 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_guest_order_debits_host_balance() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let host = create_test_user(&db, "host", 20_000).await;
    let guest = create_test_guest(&db, "guest", &host).await;
    let product = create_test_product(&db, "Cider", 300, 6).await;

    let placed_at = Utc::now();
    let day = business_day(placed_at, venue_offset(0));
    let lines = [LineRequest {
        product_id: product.id,
        quantity: 2,
    }];

    db.order_repo
        .settle(guest.id, Some(host.id), Uuid::new_v4(), &lines, placed_at, day)
        .await
        .expect("Failed to settle guest order");

    let host = db.user_repo.find_by_id(host.id).await.unwrap().unwrap();
    let guest = db.user_repo.find_by_id(guest.id).await.unwrap().unwrap();

    // The host pays; the guest's balance and order count only track spend
    assert_eq!(host.balance_cents, 19_400);
    assert_eq!(host.order_count, 0);
    assert_eq!(guest.balance_cents, -600);
    assert_eq!(guest.order_count, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_raise_credits_balance() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "dave", 1_000).await;

    let (raise, new_balance) = db
        .raise_repo
        .create_and_apply(user.id, 2_500, Uuid::new_v4(), false)
        .await
        .expect("Failed to apply raise");

    assert_eq!(raise.amount_cents, 2_500);
    assert_eq!(new_balance, 3_500);

    let user = db.user_repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.balance_cents, 3_500);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_purchase_restocks_product() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let product = create_test_product(&db, "Porter", 250, 4).await;
    let day = business_day(Utc::now(), venue_offset(0));

    let purchase = db
        .purchase_repo
        .create_and_restock(product.id, 24, 120, day)
        .await
        .expect("Failed to record purchase");

    assert_eq!(purchase.quantity, 24);
    assert_eq!(purchase.day_of_order, day);

    let product = db.product_repo.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 28);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_popularity_refresh_prunes_aged_window() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "erin", 50_000).await;
    let product = create_test_product(&db, "Wheat", 150, 20).await;

    let placed_at = Utc::now();
    let day = business_day(placed_at, venue_offset(0));
    let lines = [LineRequest {
        product_id: product.id,
        quantity: 4,
    }];

    db.order_repo
        .settle(user.id, None, Uuid::new_v4(), &lines, placed_at, day)
        .await
        .expect("Failed to settle order");

    // Well past the 30-day horizon only lifetime volume remains
    db.product_repo
        .refresh_popularity(product.id, placed_at + Duration::days(40))
        .await
        .expect("Failed to refresh popularity");

    let product = db.product_repo.find_by_id(product.id).await.unwrap().unwrap();
    assert!(product.recent_sales.0.is_empty());
    assert!((product.popularity_score - 4.0 * 0.3).abs() < 1e-9);
}
