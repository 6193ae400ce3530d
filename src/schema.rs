//! Table definitions for the waste-reporting database.
//!
//! Timestamps are stored as naive UTC `TIMESTAMP` values and always bound
//! from Rust, never defaulted by DuckDB, so the stored value does not depend
//! on the session time zone.

/// DDL executed on every open. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS reports_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS rewards_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS collected_wastes_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS notifications_id_seq START 1;

CREATE TABLE IF NOT EXISTS users (
    id BIGINT PRIMARY KEY DEFAULT nextval('users_id_seq'),
    email VARCHAR NOT NULL UNIQUE,
    name VARCHAR NOT NULL,
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    id BIGINT PRIMARY KEY DEFAULT nextval('reports_id_seq'),
    user_id BIGINT NOT NULL,
    location VARCHAR NOT NULL,
    waste_type VARCHAR NOT NULL,
    amount VARCHAR NOT NULL,
    image_url VARCHAR,
    verification_result VARCHAR,
    status VARCHAR NOT NULL DEFAULT 'pending',
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS rewards (
    id BIGINT PRIMARY KEY DEFAULT nextval('rewards_id_seq'),
    user_id BIGINT NOT NULL,
    points BIGINT,
    name VARCHAR NOT NULL,
    description VARCHAR,
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS collected_wastes (
    id BIGINT PRIMARY KEY DEFAULT nextval('collected_wastes_id_seq'),
    location VARCHAR NOT NULL,
    waste_type VARCHAR,
    amount VARCHAR NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'pending',
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id BIGINT PRIMARY KEY DEFAULT nextval('notifications_id_seq'),
    user_id BIGINT NOT NULL,
    kind VARCHAR NOT NULL,
    message VARCHAR NOT NULL,
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMP NOT NULL
);
"#;

/// Tables that accept NDJSON imports.
pub const TABLES: &[&str] = &[
    "users",
    "reports",
    "rewards",
    "collected_wastes",
    "notifications",
];

/// `created_at` rendered as RFC 3339 so rows deserialize straight into
/// `DateTime<Utc>`. Column lists below alias snake_case columns to the
/// camelCase field names the models serialize with.
pub const CREATED_AT_COLUMN: &str =
    "strftime(created_at, '%Y-%m-%dT%H:%M:%S.%fZ') AS \"createdAt\"";

pub const USER_COLUMNS: &[&str] = &["id", "email", "name", CREATED_AT_COLUMN];

pub const REPORT_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "location",
    "waste_type AS \"wasteType\"",
    "amount",
    "image_url AS \"imageUrl\"",
    "verification_result AS \"verificationResult\"",
    "status",
    CREATED_AT_COLUMN,
];

pub const REWARD_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "points",
    "name",
    "description",
    CREATED_AT_COLUMN,
];

pub const TASK_COLUMNS: &[&str] = &[
    "id",
    "location",
    "waste_type AS \"wasteType\"",
    "amount",
    "status",
    CREATED_AT_COLUMN,
];

pub const NOTIFICATION_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "kind AS \"type\"",
    "message",
    "is_read AS \"isRead\"",
    CREATED_AT_COLUMN,
];

/// Format a timestamp the way DuckDB parses a naive `TIMESTAMP`.
pub fn timestamp_param(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
