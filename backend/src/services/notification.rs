//! Notification service
//!
//! Fire-and-forget feed for the external notification dispatcher. Failures
//! are logged and swallowed; callers never see them.

use sqlx::PgPool;
use uuid::Uuid;

/// Notification service writing the outbound notification feed
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a dispatch-completion notification
    pub async fn dispatch_completed(&self, order_id: Uuid, order_no: &str) {
        let message = format!("Order {} dispatched", order_no);

        let result = sqlx::query(
            "INSERT INTO notifications (kind, order_id, message) VALUES ($1, $2, $3)",
        )
        .bind("dispatch_completed")
        .bind(order_id)
        .bind(&message)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => tracing::info!(%order_id, "dispatch notification recorded"),
            Err(e) => tracing::warn!(%order_id, error = %e, "dispatch notification failed"),
        }
    }
}
