use crate::error::AppResult;
use crate::repositories::ProductRepository;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

/// Background sweep that recomputes popularity scores for every active
/// product, so the 30-day window keeps aging for products nobody orders.
pub struct PopularitySweeper {
    product_repo: Arc<ProductRepository>,
    sweep_interval: Duration,
}

impl PopularitySweeper {
    /// Create a new popularity sweeper
    pub fn new(product_repo: Arc<ProductRepository>) -> Self {
        Self {
            product_repo,
            sweep_interval: Duration::from_secs(86_400), // Default: once per day
        }
    }

    /// Set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Start sweeping
    pub async fn start(self) {
        let mut interval = time::interval(self.sweep_interval);
        info!(
            "Popularity sweep started, running every {:?}",
            self.sweep_interval
        );

        loop {
            interval.tick().await;

            match self.sweep_once().await {
                Ok(refreshed) => info!("Popularity sweep refreshed {} products", refreshed),
                Err(e) => error!("Error in popularity sweep: {}", e),
            }
        }
    }

    /// Refresh every active product once. Individual failures are logged
    /// and skipped so one broken row cannot stall the whole sweep.
    pub async fn sweep_once(&self) -> AppResult<usize> {
        let now = Utc::now();
        let ids = self.product_repo.list_active_ids().await?;

        let mut refreshed = 0;
        for id in ids {
            match self.product_repo.refresh_popularity(id, now).await {
                Ok(()) => refreshed += 1,
                Err(e) => warn!("Popularity refresh failed for product {}: {}", id, e),
            }
        }

        Ok(refreshed)
    }
}
