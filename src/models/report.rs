use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Report: A user-submitted sighting of waste
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub location: String,
    pub waste_type: String,
    /// Free-text magnitude and unit, e.g. `"2 kg"`.
    pub amount: String,
    /// Photo as a `data:` URI, when one was attached.
    pub image_url: Option<String>,
    /// Raw JSON of the verification that preceded the submission.
    pub verification_result: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewReport: Everything needed to persist a report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub user_id: i64,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub verification_result: Option<String>,
}
