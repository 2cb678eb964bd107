use crate::business_day::business_day;
use crate::error::{AppError, AppResult};
use crate::models::Purchase;
use crate::repositories::PurchaseRepository;
use crate::services::AuditTrailService;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for inventory restock purchases
pub struct PurchaseService {
    purchase_repo: Arc<PurchaseRepository>,
    audit: Arc<AuditTrailService>,
    venue_offset: FixedOffset,
}

impl PurchaseService {
    pub fn new(
        purchase_repo: Arc<PurchaseRepository>,
        audit: Arc<AuditTrailService>,
        venue_offset: FixedOffset,
    ) -> Self {
        Self {
            purchase_repo,
            audit,
            venue_offset,
        }
    }

    /// Record a restock against the current business day and increment the
    /// product's stock.
    pub async fn record_purchase(
        &self,
        product_id: Uuid,
        quantity: i64,
        unit_price_cents: i64,
        staff_id: Uuid,
    ) -> AppResult<Purchase> {
        if quantity <= 0 {
            return Err(AppError::Validation(
                "Purchase quantity must be positive".into(),
            ));
        }
        if unit_price_cents < 0 {
            return Err(AppError::Validation(
                "Purchase unit price must not be negative".into(),
            ));
        }

        let day_of_order = business_day(Utc::now(), self.venue_offset);

        info!(
            "Recording purchase: product={}, quantity={}, day={}",
            product_id, quantity, day_of_order
        );

        let purchase = self
            .purchase_repo
            .create_and_restock(product_id, quantity, unit_price_cents, day_of_order)
            .await
            .map_err(AppError::from)?;

        if let Err(e) = self.audit.log_purchase_recorded(&purchase, staff_id).await {
            warn!("Audit log failed for purchase {}: {}", purchase.id, e);
        }

        Ok(purchase)
    }

    /// Purchases recorded on a business day; defaults to the current one
    pub async fn purchases_for_day(&self, day: Option<NaiveDate>) -> AppResult<Vec<Purchase>> {
        let day = day.unwrap_or_else(|| business_day(Utc::now(), self.venue_offset));

        Ok(self.purchase_repo.find_by_day(day).await?)
    }
}
