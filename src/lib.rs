//! Swachh SDK for Rust.
//!
//! Backend for a community waste-reporting app: users sign in, photograph
//! waste, have the photo classified by a vision model, file verified reports
//! and follow rewards plus environmental-impact figures on a dashboard.
//! Records live in an embedded DuckDB database.
//!
//! # Quick start
//!
//! ```no_run
//! use swachh_sdk::{ImagePayload, ReportForm, SwachhSdk};
//!
//! let sdk = SwachhSdk::builder().from_env().build().unwrap();
//! let user = sdk.users().get_or_create("ana@example.com", "Ana").unwrap();
//!
//! let mut form = ReportForm::new();
//! form.set_image(Some(ImagePayload::from_path("bottles.jpg").unwrap()));
//! form.set_location("Riverside Park, north gate");
//! form.verify_with(sdk.verifier());
//! let report = sdk.submit_report(&mut form, Some(&user)).unwrap();
//!
//! let view = sdk.dashboard();
//! println!("{} kg collected", view.summary.waste_collected);
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod identity;
pub mod models;
pub mod queries;
pub mod schema;
pub mod sql_builder;
pub mod submission;
pub mod verify;

#[cfg(feature = "async")]
pub use async_client::{AsyncSwachhSdk, NotificationPoll};
pub use connection::Connection;
pub use dashboard::{DashboardView, RecordSource};
pub use error::{Result, SwachhError};
pub use identity::{EmailIdentity, IdentityProvider, IdentitySession, IdentityUser, SessionStatus};
pub use sql_builder::SqlBuilder;
pub use submission::{ReportForm, VerificationStatus};
pub use verify::{ImagePayload, VisionClient};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::models::{Report, VerificationResult};

// ---------------------------------------------------------------------------
// SwachhSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SwachhSdk`] instance.
///
/// Use [`SwachhSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SwachhSdkBuilder::build) to create the SDK.
#[derive(Clone)]
pub struct SwachhSdkBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
    timeout: Duration,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl Default for SwachhSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            in_memory: false,
            timeout: config::DEFAULT_TIMEOUT,
            api_key: None,
            model: config::DEFAULT_VISION_MODEL.to_string(),
            api_base: config::GEMINI_API_BASE.to_string(),
        }
    }
}

impl SwachhSdkBuilder {
    /// Directory holding the database file.
    ///
    /// Defaults to the platform data directory (e.g.
    /// `~/.local/share/swachh-sdk` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep everything in memory; nothing is written to disk.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// HTTP timeout for vision requests. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the vision API base URL.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Pick up `GEMINI_API_KEY`, `SWACHH_DATA_DIR` and
    /// `SWACHH_VISION_MODEL` where set.
    pub fn from_env(mut self) -> Self {
        if let Ok(key) = std::env::var(config::API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Ok(dir) = std::env::var(config::DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(model) = std::env::var(config::MODEL_ENV) {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        self
    }

    /// Open the database (creating the schema if needed) and set up the
    /// vision client. No network traffic happens here.
    pub fn build(self) -> Result<SwachhSdk> {
        let conn = if self.in_memory {
            Connection::open_in_memory()?
        } else {
            let dir = self.data_dir.unwrap_or_else(config::default_data_dir);
            Connection::open(dir.join(config::DATABASE_FILE))?
        };
        let vision = VisionClient::new(self.api_base, self.api_key, self.model, self.timeout);
        if !vision.is_configured() {
            info!("no vision API key configured; image verification will fail");
        }
        Ok(SwachhSdk { conn, vision })
    }
}

// ---------------------------------------------------------------------------
// SwachhSdk
// ---------------------------------------------------------------------------

/// The main entry point.
///
/// Owns the database [`Connection`] and the [`VisionClient`], and exposes
/// the tables through lightweight borrowing query interfaces.
pub struct SwachhSdk {
    conn: Connection,
    vision: VisionClient,
}

impl SwachhSdk {
    pub fn builder() -> SwachhSdkBuilder {
        SwachhSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    pub fn users(&self) -> queries::UserQuery<'_> {
        queries::UserQuery::new(&self.conn)
    }

    pub fn reports(&self) -> queries::ReportQuery<'_> {
        queries::ReportQuery::new(&self.conn)
    }

    pub fn rewards(&self) -> queries::RewardQuery<'_> {
        queries::RewardQuery::new(&self.conn)
    }

    /// Access the collection task interface (`collected_wastes` table).
    pub fn tasks(&self) -> queries::TaskQuery<'_> {
        queries::TaskQuery::new(&self.conn)
    }

    pub fn notifications(&self) -> queries::NotificationQuery<'_> {
        queries::NotificationQuery::new(&self.conn)
    }

    // -- Verification, submission and dashboard ----------------------------

    pub fn verifier(&self) -> &VisionClient {
        &self.vision
    }

    /// Classify one image with the configured vision model.
    pub fn verify_image(&self, image: &ImagePayload) -> Result<VerificationResult> {
        self.vision.verify(image)
    }

    /// Persist the report described by `form` and reset the form.
    ///
    /// The form is left untouched when anything fails.
    pub fn submit_report(
        &self,
        form: &mut ReportForm,
        user: Option<&models::User>,
    ) -> Result<Report> {
        let new_report = form.prepare_submission(user)?;
        let report = self.reports().create(&new_report)?;
        form.finish_submission();
        Ok(report)
    }

    /// Load and aggregate the dashboard. Never fails; a failed fetch yields
    /// the fallback view with an error banner.
    pub fn dashboard(&self) -> DashboardView {
        DashboardView::load(self)
    }

    /// Load the dashboard and write it to `path` (gzip for `.gz`).
    pub fn export_dashboard<P: AsRef<Path>>(&self, path: P) -> Result<DashboardView> {
        let view = self.dashboard();
        export::write_report(path, &view)?;
        Ok(view)
    }

    // -- Utility methods ----------------------------------------------------

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Bulk-load one table from newline-delimited JSON.
    pub fn import_ndjson<P: AsRef<Path>>(&self, table: &str, path: P) -> Result<usize> {
        self.conn.import_ndjson(table, path)
    }

    /// Consume the SDK and release all resources.
    pub fn close(self) {
        drop(self);
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SwachhSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwachhSdk(database={}, model={}, verification={})",
            self.conn
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            self.vision.model(),
            if self.vision.is_configured() {
                "configured"
            } else {
                "disabled"
            }
        )
    }
}
