use crate::error::{AppError, AppResult};
use crate::models::{Order, Purchase, Raise};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub event_type: String, // "order_placed", "raise_applied", etc.
    pub entity_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub details: serde_json::Value,
}

/// Audit trail service for logging all financially significant actions
pub struct AuditTrailService {
    #[allow(dead_code)]
    log_file: PathBuf,
    file_handle: Arc<Mutex<std::fs::File>>,
}

impl AuditTrailService {
    /// Create a new audit trail service
    pub fn new(log_directory: PathBuf) -> AppResult<Self> {
        // Ensure directory exists
        std::fs::create_dir_all(&log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create log directory: {}", e)))?;

        // Create log file with date
        let date = chrono::Utc::now().format("%Y-%m-%d");
        let log_file = log_directory.join(format!("audit_{}.log", date));

        // Open file in append mode
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| AppError::Message(format!("Failed to open audit log file: {}", e)))?;

        info!("Audit trail initialized: {:?}", log_file);

        Ok(Self {
            log_file,
            file_handle: Arc::new(Mutex::new(file)),
        })
    }

    /// Log an audit entry
    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let json = serde_json::to_string(&entry).map_err(AppError::Serialization)?;

        let mut file = self.file_handle.lock().await;
        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write audit log: {}", e)))?;

        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Log order placement
    pub async fn log_order_placed(&self, order: &Order, guest_order: bool) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "order_placed".to_string(),
            entity_id: Some(order.id),
            staff_id: Some(order.staff_id),
            details: serde_json::json!({
                "payer_id": order.payer_id.to_string(),
                "total_cents": order.total_cents,
                "day_of_order": order.day_of_order.to_string(),
                "guest_order": guest_order,
            }),
        };

        self.log(entry).await
    }

    /// Log order deletion (reversal)
    pub async fn log_order_deleted(&self, order: &Order, staff_id: Uuid) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "order_deleted".to_string(),
            entity_id: Some(order.id),
            staff_id: Some(staff_id),
            details: serde_json::json!({
                "payer_id": order.payer_id.to_string(),
                "total_cents": order.total_cents,
                "day_of_order": order.day_of_order.to_string(),
            }),
        };

        self.log(entry).await
    }

    /// Log an applied raise
    pub async fn log_raise_applied(&self, raise: &Raise, new_balance_cents: i64) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "raise_applied".to_string(),
            entity_id: Some(raise.id),
            staff_id: Some(raise.raiser_id),
            details: serde_json::json!({
                "user_id": raise.user_id.to_string(),
                "amount_cents": raise.amount_cents,
                "via_bank": raise.via_bank,
                "new_balance_cents": new_balance_cents,
            }),
        };

        self.log(entry).await
    }

    /// Log an inventory restock
    pub async fn log_purchase_recorded(&self, purchase: &Purchase, staff_id: Uuid) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "purchase_recorded".to_string(),
            entity_id: Some(purchase.id),
            staff_id: Some(staff_id),
            details: serde_json::json!({
                "product_id": purchase.product_id.to_string(),
                "quantity": purchase.quantity,
                "unit_price_cents": purchase.unit_price_cents,
                "day_of_order": purchase.day_of_order.to_string(),
            }),
        };

        self.log(entry).await
    }

    /// Log a user anonymization
    pub async fn log_user_anonymized(&self, user_id: Uuid, staff_id: Uuid) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "user_anonymized".to_string(),
            entity_id: Some(user_id),
            staff_id: Some(staff_id),
            details: serde_json::json!({}),
        };

        self.log(entry).await
    }
}
