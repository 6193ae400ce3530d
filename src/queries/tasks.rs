//! Collection tasks: waste that was actually picked up.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::connection::Connection;
use crate::error::{Result, SwachhError};
use crate::models::CollectionTask;
use crate::schema::{timestamp_param, TASK_COLUMNS};
use crate::sql_builder::SqlBuilder;

pub struct TaskQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TaskQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Most recent tasks, newest first.
    pub fn list(&self, limit: usize) -> Result<Vec<CollectionTask>> {
        let (sql, params) = SqlBuilder::new("collected_wastes")
            .select(TASK_COLUMNS)
            .order_by(&["created_at DESC", "id DESC"])
            .limit(limit)
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Tasks recorded at or after `since`.
    pub fn since(&self, since: &DateTime<Utc>) -> Result<Vec<CollectionTask>> {
        let (sql, params) = SqlBuilder::new("collected_wastes")
            .select(TASK_COLUMNS)
            .created_since("created_at", &timestamp_param(since))
            .order_by(&["created_at DESC", "id DESC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    pub fn create(
        &self,
        location: &str,
        waste_type: Option<&str>,
        amount: &str,
    ) -> Result<CollectionTask> {
        self.create_at(location, waste_type, amount, &Utc::now())
    }

    /// Record a task with an explicit timestamp (backfills, imports).
    pub fn create_at(
        &self,
        location: &str,
        waste_type: Option<&str>,
        amount: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<CollectionTask> {
        let sql = format!(
            "INSERT INTO collected_wastes (location, waste_type, amount, created_at) \
             VALUES (?, NULLIF(?, ''), ?, CAST(? AS TIMESTAMP)) RETURNING {}",
            TASK_COLUMNS.join(", ")
        );
        let params = [
            location.to_string(),
            waste_type.unwrap_or_default().to_string(),
            amount.to_string(),
            timestamp_param(created_at),
        ];
        let task: CollectionTask = self
            .conn
            .execute_one(&sql, &params)?
            .ok_or_else(|| SwachhError::NotFound("collection task after insert".into()))?;
        info!(task_id = task.id, amount = %task.amount, "recorded collection task");
        Ok(task)
    }

    /// Move a task to a new status, e.g. `"in_progress"` or `"completed"`.
    pub fn set_status(&self, id: i64, status: &str) -> Result<()> {
        let updated = self.conn.execute_update(
            "UPDATE collected_wastes SET status = ? WHERE id = CAST(? AS BIGINT)",
            &[status.to_string(), id.to_string()],
        )?;
        if updated == 0 {
            return Err(SwachhError::NotFound(format!("collection task {}", id)));
        }
        Ok(())
    }
}
