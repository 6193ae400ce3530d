//! User lookups, creation and point balances.

use chrono::Utc;
use tracing::info;

use crate::connection::Connection;
use crate::error::{Result, SwachhError};
use crate::models::User;
use crate::schema::{timestamp_param, USER_COLUMNS};
use crate::sql_builder::SqlBuilder;

/// Query interface for the `users` table.
pub struct UserQuery<'a> {
    conn: &'a Connection,
}

impl<'a> UserQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new user.
    ///
    /// Fails with `InvalidArgument` for an empty email; the database rejects
    /// duplicates.
    pub fn create(&self, email: &str, name: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SwachhError::InvalidArgument("email must not be empty".into()));
        }
        let sql = format!(
            "INSERT INTO users (email, name, created_at) \
             VALUES (?, ?, CAST(? AS TIMESTAMP)) RETURNING {}",
            USER_COLUMNS.join(", ")
        );
        let user: User = self
            .conn
            .execute_one(
                &sql,
                &[email.to_string(), name.to_string(), timestamp_param(&Utc::now())],
            )?
            .ok_or_else(|| SwachhError::NotFound(format!("user {} after insert", email)))?;
        info!(user_id = user.id, email = %user.email, "created user");
        Ok(user)
    }

    /// Look a user up by email (case-insensitive).
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let (sql, params) = SqlBuilder::new("users")
            .select(USER_COLUMNS)
            .where_eq_ignore_case("email", email.trim())
            .limit(1)
            .build();
        self.conn.execute_one(&sql, &params)
    }

    pub fn get(&self, id: i64) -> Result<Option<User>> {
        let (sql, params) = SqlBuilder::new("users")
            .select(USER_COLUMNS)
            .where_id("id", id)
            .build();
        self.conn.execute_one(&sql, &params)
    }

    /// Return the existing user for `email`, creating it with `name` if absent.
    pub fn get_or_create(&self, email: &str, name: &str) -> Result<User> {
        match self.get_by_email(email)? {
            Some(user) => Ok(user),
            None => self.create(email, name),
        }
    }

    /// Sum of the user's reward points; missing points count as zero.
    pub fn balance(&self, user_id: i64) -> Result<i64> {
        let value = self.conn.execute_scalar(
            "SELECT CAST(COALESCE(SUM(COALESCE(points, 0)), 0) AS BIGINT) \
             FROM rewards WHERE user_id = CAST(? AS BIGINT)",
            &[user_id.to_string()],
        )?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }
}
