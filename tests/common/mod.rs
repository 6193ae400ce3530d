//! Shared test fixtures for the Swachh SDK integration tests.
//!
//! Provides `setup_sample_db()` which builds an SDK on a temporary data
//! directory and seeds users, reports, rewards, collection tasks and
//! notifications through NDJSON imports.

#![allow(dead_code)]

use swachh_sdk::models::{CollectionTask, Report, Reward, User};
use swachh_sdk::{RecordSource, Result, SwachhError, SwachhSdk};
use std::io::Write;
use tempfile::NamedTempFile;

/// Raw sum of the seeded task amounts (10 + 4.5 + 2 + 3.5).
pub const SEEDED_WASTE_KG: f64 = 20.0;
/// Sum of the seeded reward points; one reward has none.
pub const SEEDED_TOKENS: i64 = 70;

/// Build an SDK on a temporary data directory with sample data loaded.
///
/// Returns `(SwachhSdk, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test so the database file is not
/// deleted prematurely.
pub fn setup_sample_db() -> (SwachhSdk, tempfile::TempDir) {
    let (sdk, tmp_dir) = setup_empty_db();

    register_users(&sdk);
    let ana = sdk.users().get_by_email("ana@example.com").unwrap().unwrap();
    let ben = sdk.users().get_by_email("ben@example.com").unwrap().unwrap();

    register_reports(&sdk, &ana, &ben);
    register_rewards(&sdk, &ana, &ben);
    register_tasks(&sdk);
    register_notifications(&sdk, &ana, &ben);

    (sdk, tmp_dir)
}

/// An SDK with the schema but no rows, and no vision API key.
pub fn setup_empty_db() -> (SwachhSdk, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let sdk = SwachhSdk::builder()
        .data_dir(tmp_dir.path())
        .build()
        .unwrap();
    (sdk, tmp_dir)
}

fn register_users(sdk: &SwachhSdk) {
    let users = vec![
        serde_json::json!({
            "email": "ana@example.com",
            "name": "Ana",
            "created_at": "2024-01-01 09:00:00"
        }),
        serde_json::json!({
            "email": "ben@example.com",
            "name": "Ben",
            "created_at": "2024-01-02 09:00:00"
        }),
    ];
    write_ndjson_and_import(sdk, "users", &users);
}

fn register_reports(sdk: &SwachhSdk, ana: &User, ben: &User) {
    let reports = vec![
        serde_json::json!({
            "user_id": ana.id,
            "location": "Central Park, east lawn",
            "waste_type": "plastic bottles",
            "amount": "2 kg",
            "status": "pending",
            "created_at": "2024-01-10 12:00:00"
        }),
        serde_json::json!({
            "user_id": ana.id,
            "location": "Harbor front",
            "waste_type": "glass",
            "amount": "5 kg",
            "status": "pending",
            "created_at": "2024-02-03 08:30:00"
        }),
        serde_json::json!({
            "user_id": ben.id,
            "location": "Old Town market",
            "waste_type": "organic",
            "amount": "12 liters",
            "status": "collected",
            "created_at": "2024-02-15 17:45:00"
        }),
    ];
    write_ndjson_and_import(sdk, "reports", &reports);
}

fn register_rewards(sdk: &SwachhSdk, ana: &User, ben: &User) {
    let rewards = vec![
        serde_json::json!({
            "user_id": ana.id,
            "points": 50,
            "name": "First report",
            "description": "Filed a first verified report",
            "created_at": "2024-01-10 12:05:00"
        }),
        serde_json::json!({
            "user_id": ana.id,
            "points": null,
            "name": "Badge",
            "description": null,
            "created_at": "2024-02-03 08:35:00"
        }),
        serde_json::json!({
            "user_id": ben.id,
            "points": 20,
            "name": "Market cleanup",
            "description": "Reported organic waste",
            "created_at": "2024-02-15 17:50:00"
        }),
    ];
    write_ndjson_and_import(sdk, "rewards", &rewards);
}

fn register_tasks(sdk: &SwachhSdk) {
    let tasks = vec![
        serde_json::json!({
            "location": "Central Park",
            "waste_type": "Organic food scraps",
            "amount": "10 kg",
            "status": "completed",
            "created_at": "2024-01-05 10:00:00"
        }),
        serde_json::json!({
            "location": "Harbor front",
            "waste_type": "Recyclable plastics",
            "amount": "4.5 kg",
            "status": "completed",
            "created_at": "2024-02-10 11:00:00"
        }),
        serde_json::json!({
            "location": "Old Town market",
            "waste_type": null,
            "amount": "2 kg",
            "status": "pending",
            "created_at": "2024-02-20 15:00:00"
        }),
        serde_json::json!({
            "location": "Depot",
            "waste_type": "hazardous batteries",
            "amount": "about 3.5 bags",
            "status": "completed",
            "created_at": "2023-11-01 07:00:00"
        }),
    ];
    write_ndjson_and_import(sdk, "collected_wastes", &tasks);
}

fn register_notifications(sdk: &SwachhSdk, ana: &User, ben: &User) {
    let notifications = vec![
        serde_json::json!({
            "user_id": ana.id,
            "kind": "reward",
            "message": "You earned 50 points",
            "is_read": false,
            "created_at": "2024-01-10 12:06:00"
        }),
        serde_json::json!({
            "user_id": ana.id,
            "kind": "report",
            "message": "Your report at Harbor front was received",
            "is_read": false,
            "created_at": "2024-02-03 08:36:00"
        }),
        serde_json::json!({
            "user_id": ana.id,
            "kind": "system",
            "message": "Welcome",
            "is_read": true,
            "created_at": "2024-01-01 09:01:00"
        }),
        serde_json::json!({
            "user_id": ben.id,
            "kind": "reward",
            "message": "You earned 20 points",
            "is_read": false,
            "created_at": "2024-02-15 17:51:00"
        }),
    ];
    write_ndjson_and_import(sdk, "notifications", &notifications);
}

/// Helper: write a slice of JSON values as NDJSON to a temp file and append
/// them to a table via `SwachhSdk::import_ndjson`.
fn write_ndjson_and_import(sdk: &SwachhSdk, table: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let inserted = sdk.import_ndjson(table, file.path()).unwrap();
    assert_eq!(inserted, rows.len(), "seeding {}", table);
}

/// A record source whose rewards fetch always fails.
pub struct FailingRewards<'a>(pub &'a SwachhSdk);

impl RecordSource for FailingRewards<'_> {
    fn recent_reports(&self, limit: usize) -> Result<Vec<Report>> {
        self.0.recent_reports(limit)
    }

    fn all_rewards(&self) -> Result<Vec<Reward>> {
        Err(SwachhError::NotFound("rewards backend unavailable".into()))
    }

    fn collection_tasks(&self, limit: usize) -> Result<Vec<CollectionTask>> {
        self.0.collection_tasks(limit)
    }
}
