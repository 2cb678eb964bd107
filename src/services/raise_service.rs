use crate::error::{AppError, AppResult};
use crate::models::Raise;
use crate::repositories::{RaiseRepository, UserRepository};
use crate::services::AuditTrailService;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for manual balance raises
pub struct RaiseService {
    raise_repo: Arc<RaiseRepository>,
    user_repo: Arc<UserRepository>,
    audit: Arc<AuditTrailService>,
}

impl RaiseService {
    pub fn new(
        raise_repo: Arc<RaiseRepository>,
        user_repo: Arc<UserRepository>,
        audit: Arc<AuditTrailService>,
    ) -> Self {
        Self {
            raise_repo,
            user_repo,
            audit,
        }
    }

    /// Apply a raise to a user's balance. Returns the raise and the new
    /// balance. The amount is signed so staff can correct a mistaken
    /// top-up with a negative one.
    pub async fn create_raise(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        raiser_id: Uuid,
        via_bank: bool,
    ) -> AppResult<(Raise, i64)> {
        if amount_cents == 0 {
            return Err(AppError::Validation("Raise amount must be non-zero".into()));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if user.is_guest {
            return Err(AppError::Validation(
                "Guests cannot receive raises; raise the host instead".into(),
            ));
        }
        if !user.active {
            return Err(AppError::BusinessLogic("Account is inactive".into()));
        }

        info!("Applying raise: user={}, amount={}", user_id, amount_cents);

        let (raise, new_balance) = self
            .raise_repo
            .create_and_apply(user_id, amount_cents, raiser_id, via_bank)
            .await
            .map_err(AppError::from)?;

        if let Err(e) = self.audit.log_raise_applied(&raise, new_balance).await {
            warn!("Audit log failed for raise {}: {}", raise.id, e);
        }

        Ok((raise, new_balance))
    }

    /// Raise history for a user, newest first
    pub async fn raises_for_user(&self, user_id: Uuid) -> AppResult<Vec<Raise>> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        Ok(self.raise_repo.find_by_user(user_id).await?)
    }
}
