//! Waste report persistence.

use chrono::Utc;
use tracing::info;

use crate::connection::Connection;
use crate::error::{Result, SwachhError};
use crate::models::{NewReport, Report};
use crate::schema::{timestamp_param, REPORT_COLUMNS};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// ReportQuery
// ---------------------------------------------------------------------------

/// Query interface for the `reports` table.
pub struct ReportQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ReportQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Persist a report.
    ///
    /// Location, type and amount must be non-blank. The image and the
    /// verification JSON are optional and stored as NULL when absent.
    pub fn create(&self, report: &NewReport) -> Result<Report> {
        for (field, value) in [
            ("location", &report.location),
            ("wasteType", &report.waste_type),
            ("amount", &report.amount),
        ] {
            if value.trim().is_empty() {
                return Err(SwachhError::InvalidArgument(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        let sql = format!(
            "INSERT INTO reports \
             (user_id, location, waste_type, amount, image_url, verification_result, created_at) \
             VALUES (CAST(? AS BIGINT), ?, ?, ?, NULLIF(?, ''), NULLIF(?, ''), CAST(? AS TIMESTAMP)) \
             RETURNING {}",
            REPORT_COLUMNS.join(", ")
        );
        let params = [
            report.user_id.to_string(),
            report.location.trim().to_string(),
            report.waste_type.clone(),
            report.amount.clone(),
            report.image_url.clone().unwrap_or_default(),
            report.verification_result.clone().unwrap_or_default(),
            timestamp_param(&Utc::now()),
        ];
        let created: Report = self
            .conn
            .execute_one(&sql, &params)?
            .ok_or_else(|| SwachhError::NotFound("report after insert".into()))?;
        info!(
            report_id = created.id,
            user_id = created.user_id,
            waste_type = %created.waste_type,
            "created report"
        );
        Ok(created)
    }

    /// Most recent reports, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<Report>> {
        let (sql, params) = SqlBuilder::new("reports")
            .select(REPORT_COLUMNS)
            .order_by(&["created_at DESC", "id DESC"])
            .limit(limit)
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// All reports filed by one user, newest first.
    pub fn by_user(&self, user_id: i64) -> Result<Vec<Report>> {
        let (sql, params) = SqlBuilder::new("reports")
            .select(REPORT_COLUMNS)
            .where_id("user_id", user_id)
            .order_by(&["created_at DESC", "id DESC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    pub fn get(&self, id: i64) -> Result<Option<Report>> {
        let (sql, params) = SqlBuilder::new("reports")
            .select(REPORT_COLUMNS)
            .where_id("id", id)
            .build();
        self.conn.execute_one(&sql, &params)
    }
}
