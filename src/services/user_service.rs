use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::AuditTrailService;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for user and guest account management
pub struct UserService {
    user_repo: Arc<UserRepository>,
    audit: Arc<AuditTrailService>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>, audit: Arc<AuditTrailService>) -> Self {
        Self { user_repo, audit }
    }

    /// Create a user account
    pub async fn create_user(&self, name: &str, opening_balance_cents: i64) -> AppResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("User name must not be empty".into()));
        }

        Ok(self.user_repo.create(name, opening_balance_cents).await?)
    }

    /// Create a guest account billed to a host user
    pub async fn create_guest(&self, host_id: Uuid, name: &str) -> AppResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Guest name must not be empty".into()));
        }

        let host = self
            .user_repo
            .find_by_id(host_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Host {} not found", host_id)))?;

        if host.is_guest {
            return Err(AppError::Validation("A guest cannot host guests".into()));
        }
        if !host.active {
            return Err(AppError::BusinessLogic("Host account is inactive".into()));
        }

        info!("Creating guest for host {}", host_id);

        Ok(self.user_repo.create_guest(name, host_id).await?)
    }

    /// Fetch a user by id
    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Soft-delete a user: scrub identifying fields and deactivate
    pub async fn anonymize_user(&self, id: Uuid, staff_id: Uuid) -> AppResult<User> {
        let user = self
            .user_repo
            .anonymize(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Err(e) = self.audit.log_user_anonymized(user.id, staff_id).await {
            warn!("Audit log failed for user {}: {}", user.id, e);
        }

        Ok(user)
    }
}
