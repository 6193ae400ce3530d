//! In-app notifications and their read state.

use chrono::Utc;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{Result, SwachhError};
use crate::models::Notification;
use crate::schema::{timestamp_param, NOTIFICATION_COLUMNS};
use crate::sql_builder::SqlBuilder;

pub struct NotificationQuery<'a> {
    conn: &'a Connection,
}

impl<'a> NotificationQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Unread notifications for a user, newest first.
    pub fn unread(&self, user_id: i64) -> Result<Vec<Notification>> {
        let (sql, params) = SqlBuilder::new("notifications")
            .select(NOTIFICATION_COLUMNS)
            .where_id("user_id", user_id)
            .where_raw("is_read = FALSE")
            .order_by(&["created_at DESC", "id DESC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Mark one notification read. Marking an already-read one is a no-op.
    pub fn mark_read(&self, id: i64) -> Result<()> {
        let updated = self.conn.execute_update(
            "UPDATE notifications SET is_read = TRUE WHERE id = CAST(? AS BIGINT)",
            &[id.to_string()],
        )?;
        if updated == 0 {
            return Err(SwachhError::NotFound(format!("notification {}", id)));
        }
        debug!(notification_id = id, "notification marked read");
        Ok(())
    }

    pub fn create(&self, user_id: i64, kind: &str, message: &str) -> Result<Notification> {
        let sql = format!(
            "INSERT INTO notifications (user_id, kind, message, created_at) \
             VALUES (CAST(? AS BIGINT), ?, ?, CAST(? AS TIMESTAMP)) RETURNING {}",
            NOTIFICATION_COLUMNS.join(", ")
        );
        self.conn
            .execute_one(
                &sql,
                &[
                    user_id.to_string(),
                    kind.to_string(),
                    message.to_string(),
                    timestamp_param(&Utc::now()),
                ],
            )?
            .ok_or_else(|| SwachhError::NotFound("notification after insert".into()))
    }
}
