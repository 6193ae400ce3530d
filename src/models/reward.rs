use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point grant issued to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    pub user_id: i64,
    /// `None` is counted as zero everywhere points are summed.
    pub points: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
