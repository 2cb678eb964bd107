//! Taproom Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod api;
pub mod business_day;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod popularity;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use std::sync::Arc;

/// Application state containing all repositories
pub struct AppState {
    pub database: Database,
    pub user_repo: Arc<UserRepository>,
    pub product_repo: Arc<ProductRepository>,
    pub order_repo: Arc<OrderRepository>,
    pub raise_repo: Arc<RaiseRepository>,
    pub purchase_repo: Arc<PurchaseRepository>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool) -> Self {
        let database = Database::new(pool.clone());

        Self {
            database: database.clone(),
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            product_repo: Arc::new(ProductRepository::new(pool.clone())),
            order_repo: Arc::new(OrderRepository::new(pool.clone())),
            raise_repo: Arc::new(RaiseRepository::new(pool.clone())),
            purchase_repo: Arc::new(PurchaseRepository::new(pool)),
        }
    }
}
