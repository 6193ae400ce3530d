//! Reward records. Deciding when to issue one is up to the caller.

use chrono::Utc;
use tracing::info;

use crate::connection::Connection;
use crate::error::{Result, SwachhError};
use crate::models::Reward;
use crate::schema::{timestamp_param, REWARD_COLUMNS};
use crate::sql_builder::SqlBuilder;

pub struct RewardQuery<'a> {
    conn: &'a Connection,
}

impl<'a> RewardQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every reward ever granted, newest first.
    pub fn all(&self) -> Result<Vec<Reward>> {
        let (sql, params) = SqlBuilder::new("rewards")
            .select(REWARD_COLUMNS)
            .order_by(&["created_at DESC", "id DESC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    pub fn for_user(&self, user_id: i64) -> Result<Vec<Reward>> {
        let (sql, params) = SqlBuilder::new("rewards")
            .select(REWARD_COLUMNS)
            .where_id("user_id", user_id)
            .order_by(&["created_at DESC", "id DESC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Record a grant of `points` (or an unvalued grant when `None`).
    pub fn grant(
        &self,
        user_id: i64,
        points: Option<i64>,
        name: &str,
        description: Option<&str>,
    ) -> Result<Reward> {
        let sql = format!(
            "INSERT INTO rewards (user_id, points, name, description, created_at) \
             VALUES (CAST(? AS BIGINT), TRY_CAST(NULLIF(?, '') AS BIGINT), ?, NULLIF(?, ''), \
             CAST(? AS TIMESTAMP)) RETURNING {}",
            REWARD_COLUMNS.join(", ")
        );
        let params = [
            user_id.to_string(),
            points.map(|p| p.to_string()).unwrap_or_default(),
            name.to_string(),
            description.unwrap_or_default().to_string(),
            timestamp_param(&Utc::now()),
        ];
        let reward: Reward = self
            .conn
            .execute_one(&sql, &params)?
            .ok_or_else(|| SwachhError::NotFound("reward after insert".into()))?;
        info!(reward_id = reward.id, user_id, points = ?points, "granted reward");
        Ok(reward)
    }
}
