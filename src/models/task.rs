use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Waste physically collected, as opposed to merely reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTask {
    pub id: i64,
    pub location: String,
    pub waste_type: Option<String>,
    pub amount: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
