use crate::business_day::business_day;
use crate::error::{AppError, AppResult};
use crate::models::{Order, OrderLine, User};
use crate::repositories::order_repository::LineRequest;
use crate::repositories::{OrderRepository, UserRepository};
use crate::services::AuditTrailService;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for order settlement and reversal
pub struct OrderService {
    order_repo: Arc<OrderRepository>,
    user_repo: Arc<UserRepository>,
    audit: Arc<AuditTrailService>,
    venue_offset: FixedOffset,
}

impl OrderService {
    pub fn new(
        order_repo: Arc<OrderRepository>,
        user_repo: Arc<UserRepository>,
        audit: Arc<AuditTrailService>,
        venue_offset: FixedOffset,
    ) -> Self {
        Self {
            order_repo,
            user_repo,
            audit,
            venue_offset,
        }
    }

    /// Place an order
    ///
    /// All line items are validated and every referenced account resolved
    /// before anything is written; the write itself is a single
    /// transaction in the repository.
    pub async fn place_order(
        &self,
        user_id: Option<Uuid>,
        guest_id: Option<Uuid>,
        lines: &[LineRequest],
        staff_id: Uuid,
    ) -> AppResult<Order> {
        if lines.is_empty() {
            return Err(AppError::Validation(
                "Order must contain at least one line item".into(),
            ));
        }
        for line in lines {
            if line.quantity <= 0 {
                return Err(AppError::Validation(format!(
                    "Invalid quantity {} for product {}",
                    line.quantity, line.product_id
                )));
            }
        }

        let (payer, host) = self.resolve_payer(user_id, guest_id).await?;

        let placed_at = Utc::now();
        let day_of_order = business_day(placed_at, self.venue_offset);

        info!(
            "Placing order: payer={}, lines={}, day={}",
            payer.id,
            lines.len(),
            day_of_order
        );

        let order = self
            .order_repo
            .settle(
                payer.id,
                host.as_ref().map(|h| h.id),
                staff_id,
                lines,
                placed_at,
                day_of_order,
            )
            .await
            .map_err(AppError::from)?;

        if let Err(e) = self.audit.log_order_placed(&order, payer.is_guest).await {
            warn!("Audit log failed for order {}: {}", order.id, e);
        }

        Ok(order)
    }

    /// Delete an order, compensating all of its effects
    pub async fn delete_order(&self, order_id: Uuid, staff_id: Uuid) -> AppResult<Order> {
        info!("Deleting order {}", order_id);

        let order = self
            .order_repo
            .delete_with_reversal(order_id, Utc::now())
            .await
            .map_err(AppError::from)?;

        if let Err(e) = self.audit.log_order_deleted(&order, staff_id).await {
            warn!("Audit log failed for order {}: {}", order.id, e);
        }

        Ok(order)
    }

    /// Fetch an order together with its line items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<(Order, Vec<OrderLine>)> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        let lines = self.order_repo.find_lines(order_id).await?;

        Ok((order, lines))
    }

    /// Orders settled on a business day; defaults to the current one
    pub async fn orders_for_day(&self, day: Option<NaiveDate>) -> AppResult<Vec<Order>> {
        let day = day.unwrap_or_else(|| business_day(Utc::now(), self.venue_offset));

        Ok(self.order_repo.find_by_day(day).await?)
    }

    /// Resolve the payer reference to the paying accounts.
    ///
    /// Returns the account the order is recorded against, plus the host
    /// account when the payer is a guest.
    async fn resolve_payer(
        &self,
        user_id: Option<Uuid>,
        guest_id: Option<Uuid>,
    ) -> AppResult<(User, Option<User>)> {
        match (user_id, guest_id) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Provide either user_id or guest_id, not both".into(),
            )),
            (None, None) => Err(AppError::Validation("Missing payer reference".into())),
            (Some(id), None) => {
                let user = self
                    .user_repo
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

                if user.is_guest {
                    return Err(AppError::Validation(
                        "Account is a guest; order with guest_id".into(),
                    ));
                }
                if !user.active {
                    return Err(AppError::BusinessLogic("Account is inactive".into()));
                }

                Ok((user, None))
            }
            (None, Some(id)) => {
                let guest = self
                    .user_repo
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Guest {} not found", id)))?;

                if !guest.is_guest {
                    return Err(AppError::Validation(
                        "Account is not a guest; order with user_id".into(),
                    ));
                }
                if !guest.active {
                    return Err(AppError::BusinessLogic("Guest is inactive".into()));
                }

                let host_id = guest
                    .host_id
                    .ok_or_else(|| AppError::NotFound(format!("Guest {} has no host", id)))?;

                let host = self
                    .user_repo
                    .find_by_id(host_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Host {} not found", host_id)))?;

                if !host.active {
                    return Err(AppError::BusinessLogic("Host account is inactive".into()));
                }

                Ok((guest, Some(host)))
            }
        }
    }
}
